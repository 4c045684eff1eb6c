use thiserror::Error;
use tree_patch_codec::CodecError;
use tree_patch_node::AssembleError;

use crate::model::Op;

/// A string that is not one of the six op tags.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown op {0:?}")]
pub struct UnknownOp(pub String);

/// A path segment the slash-delimited form cannot carry: it is empty or
/// contains `/`, so it would not parse back to the same path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("path segment {position} ({segment:?}) cannot be written")]
pub struct InvalidSegment {
    pub position: usize,
    pub segment: String,
}

/// The wire document does not have the declared shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

impl DecodeError {
    /// The schema-level cause, wherever it surfaced.
    pub fn assemble_error(&self) -> Option<&AssembleError> {
        match self {
            DecodeError::Codec(err) => err.assemble_error(),
            DecodeError::Assemble(err) => Some(err),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("operation {index}: unknown op {op:?}")]
    UnknownOp { index: usize, op: String },
    #[error("operation {index}: {op} requires a value")]
    MissingValue { index: usize, op: Op },
    #[error("operation {index}: {op} requires from")]
    MissingFrom { index: usize, op: Op },
}

impl NormalizeError {
    /// Position of the offending operation in the input.
    pub fn index(&self) -> usize {
        match self {
            NormalizeError::UnknownOp { index, .. }
            | NormalizeError::MissingValue { index, .. }
            | NormalizeError::MissingFrom { index, .. } => *index,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("normalize: {0}")]
    Normalize(#[from] NormalizeError),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("operation {index}: {source}")]
    Path {
        index: usize,
        #[source]
        source: InvalidSegment,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}
