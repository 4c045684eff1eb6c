//! `tree-patch`: decode patch documents into ordered, normalized operations.
//!
//! Wire bytes are bound against the representation of the embedded
//! `OperationSequence` type ([`catalog`]), giving a raw mirror with string
//! fields ([`decode`]). Normalization then resolves each tag to an [`Op`],
//! splits paths into [`Path`] segments and keeps `value`/`from` presence
//! ([`normalize`]). Either stage can fail; no partial list is ever returned.
//!
//! # Example
//!
//! ```
//! use tree_patch::{parse_bytes, Op, Path};
//! use tree_patch_codec::JsonCodec;
//!
//! let ops = parse_bytes(
//!     br#"[{"op": "move", "path": "/b", "from": "/a"}]"#,
//!     &JsonCodec::plain(),
//! )
//! .unwrap();
//! assert_eq!(ops[0].op, Op::Move);
//! assert_eq!(ops[0].from, Some(Path::parse("/a")));
//! assert!(ops[0].value.is_none());
//! ```

pub mod catalog;
pub mod decode;
pub mod encode;
pub mod error;
pub mod instruction;
pub mod model;
pub mod normalize;
pub mod options;

use std::io::Read;

use tree_patch_codec::Decoder;

pub use catalog::{lookup_type, type_system};
pub use decode::{decode, OperationRaw};
pub use encode::{encode, to_wire};
pub use error::{DecodeError, EncodeError, InvalidSegment, NormalizeError, ParseError, UnknownOp};
pub use instruction::{
    parse_instruction, parse_instruction_bytes, parse_instruction_bytes_with,
    parse_instruction_result, parse_instruction_with, Instruction, InstructionError,
    InstructionResult,
};
pub use model::{Op, Operation, Path};
pub use normalize::{normalize, normalize_with};
pub use options::ParseOptions;

/// Decode and normalize an operation sequence.
pub fn parse(reader: impl Read, decoder: &dyn Decoder) -> Result<Vec<Operation>, ParseError> {
    parse_with(reader, decoder, &ParseOptions::default())
}

pub fn parse_with(
    mut reader: impl Read,
    decoder: &dyn Decoder,
    options: &ParseOptions,
) -> Result<Vec<Operation>, ParseError> {
    let raw = decode(&mut reader, decoder)?;
    Ok(normalize_with(&raw, options)?)
}

pub fn parse_bytes(bytes: &[u8], decoder: &dyn Decoder) -> Result<Vec<Operation>, ParseError> {
    parse(bytes, decoder)
}

pub fn parse_bytes_with(
    bytes: &[u8],
    decoder: &dyn Decoder,
    options: &ParseOptions,
) -> Result<Vec<Operation>, ParseError> {
    parse_with(bytes, decoder, options)
}
