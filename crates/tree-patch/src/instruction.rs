//! Instructions (operations plus the tree they apply to) and their results.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use tree_patch_codec::Decoder;
use tree_patch_node::{Link, Node};

use crate::decode::{decode_as, OperationRaw};
use crate::encode::to_wire;
use crate::error::{DecodeError, EncodeError, ParseError};
use crate::model::Operation;
use crate::normalize::normalize_with;
use crate::options::ParseOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub start_at: Link,
    pub operations: Vec<Operation>,
}

impl Instruction {
    pub fn to_node(&self) -> Result<Node, EncodeError> {
        Ok(Node::map([
            ("startAt", Node::Link(self.start_at.clone())),
            ("operations", to_wire(&self.operations)?),
        ]))
    }
}

/// Failure reported by whatever executed an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error, Deserialize)]
#[error("{code}: {message}")]
pub struct InstructionError {
    pub code: String,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl InstructionError {
    pub fn to_node(&self) -> Node {
        Node::map([
            ("code", Node::from(self.code.as_str())),
            ("message", Node::from(self.message.as_str())),
            (
                "details",
                Node::map(self.details.iter().map(|(k, v)| (k.as_str(), Node::from(v.as_str())))),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionResult {
    Error(InstructionError),
    /// The tree after applying the instruction.
    Result(Link),
}

impl InstructionResult {
    /// Keyed representation: `{"error": {...}}` or `{"result": <link>}`.
    pub fn to_node(&self) -> Node {
        match self {
            InstructionResult::Error(err) => Node::map([("error", err.to_node())]),
            InstructionResult::Result(link) => Node::map([("result", Node::Link(link.clone()))]),
        }
    }
}

#[derive(Deserialize)]
struct InstructionRaw {
    #[serde(rename = "startAt")]
    start_at: Link,
    operations: Vec<OperationRaw>,
}

/// Typed view of the `InstructionResult` union: keyed by member type name.
#[derive(Deserialize)]
enum InstructionResultRaw {
    Error(InstructionError),
    Link(Link),
}

pub fn parse_instruction(reader: impl Read, decoder: &dyn Decoder) -> Result<Instruction, ParseError> {
    parse_instruction_with(reader, decoder, &ParseOptions::default())
}

pub fn parse_instruction_with(
    mut reader: impl Read,
    decoder: &dyn Decoder,
    options: &ParseOptions,
) -> Result<Instruction, ParseError> {
    let raw: InstructionRaw = decode_as(&mut reader, decoder, "Instruction")?;
    debug!(start_at = %raw.start_at, operations = raw.operations.len(), "decoded instruction");
    let operations = normalize_with(&raw.operations, options)?;
    Ok(Instruction {
        start_at: raw.start_at,
        operations,
    })
}

pub fn parse_instruction_bytes(bytes: &[u8], decoder: &dyn Decoder) -> Result<Instruction, ParseError> {
    parse_instruction(bytes, decoder)
}

pub fn parse_instruction_bytes_with(
    bytes: &[u8],
    decoder: &dyn Decoder,
    options: &ParseOptions,
) -> Result<Instruction, ParseError> {
    parse_instruction_with(bytes, decoder, options)
}

pub fn parse_instruction_result(
    mut reader: impl Read,
    decoder: &dyn Decoder,
) -> Result<InstructionResult, DecodeError> {
    let raw: InstructionResultRaw = decode_as(&mut reader, decoder, "InstructionResult")?;
    Ok(match raw {
        InstructionResultRaw::Error(err) => InstructionResult::Error(err),
        InstructionResultRaw::Link(link) => InstructionResult::Result(link),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup_type;
    use tree_patch_node::to_representation;

    fn sample_error() -> InstructionError {
        InstructionError {
            code: "NOT_FOUND".into(),
            message: "no such path".into(),
            details: BTreeMap::from([("path".to_string(), "/a".to_string())]),
        }
    }

    #[test]
    fn result_node_matches_catalog_representation() {
        let ty = lookup_type("InstructionResult").unwrap();
        let err = sample_error();
        let typed = Node::map([("Error", err.to_node())]);
        assert_eq!(
            to_representation(ty, &typed).unwrap(),
            InstructionResult::Error(err).to_node()
        );

        let link = Link::new("bafyresult");
        let typed = Node::map([("Link", Node::Link(link.clone()))]);
        assert_eq!(
            to_representation(ty, &typed).unwrap(),
            InstructionResult::Result(link).to_node()
        );
    }

    #[test]
    fn error_displays_code_and_message() {
        assert_eq!(sample_error().to_string(), "NOT_FOUND: no such path");
    }
}
