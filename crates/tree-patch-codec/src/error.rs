use thiserror::Error;
use tree_patch_node::AssembleError;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The document was well-formed but the assembler refused it.
    #[error("{source} at line {line}, column {column}")]
    Assemble {
        source: AssembleError,
        line: usize,
        column: usize,
    },
    /// Malformed input, trailing content, unrepresentable values or I/O.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// The assembler failure behind this error, if any.
    pub fn assemble_error(&self) -> Option<&AssembleError> {
        match self {
            CodecError::Assemble { source, .. } => Some(source),
            CodecError::Json(_) => None,
        }
    }
}
