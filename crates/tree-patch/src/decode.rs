//! Binding wire bytes to the raw operation mirror.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use tree_patch_codec::Decoder;
use tree_patch_node::{present, Node, Prototype};

use crate::catalog::type_system;
use crate::error::DecodeError;

/// Wire-shaped twin of [`Operation`](crate::Operation), before paths are
/// parsed and the tag is resolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationRaw {
    pub op: String,
    pub path: String,
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Node>,
    #[serde(default)]
    pub from: Option<String>,
}

/// Decode an `OperationSequence` document.
pub fn decode(reader: &mut dyn Read, decoder: &dyn Decoder) -> Result<Vec<OperationRaw>, DecodeError> {
    let raw: Vec<OperationRaw> = decode_as(reader, decoder, "OperationSequence")?;
    debug!(operations = raw.len(), "decoded operation sequence");
    Ok(raw)
}

/// Decode a document of catalog type `type_name` through its representation
/// and bind the result to `T`.
pub(crate) fn decode_as<T: DeserializeOwned>(
    reader: &mut dyn Read,
    decoder: &dyn Decoder,
    type_name: &str,
) -> Result<T, DecodeError> {
    let prototype = Prototype::new(type_system(), type_name)?.representation();
    let mut builder = prototype.bound_builder::<T>();
    decoder.decode(reader, &mut builder)?;
    Ok(builder.build()?)
}
