//! `tree-patch-codec`: wire codecs for the tree-patch node model.
//!
//! A [`Decoder`] reads one document from a byte stream and drives any
//! [`NodeAssembler`] with it; an [`Encoder`] writes a [`Node`] back out.
//! [`JsonCodec`] implements both, in plain JSON or DAG-JSON flavour.

pub mod error;
mod events;
pub mod json;
mod view;

use std::io::{Read, Write};

use tree_patch_node::{Node, NodeAssembler};

pub use error::CodecError;
pub use json::JsonCodec;

/// Reads a wire document into an assembler.
pub trait Decoder {
    fn decode(&self, reader: &mut dyn Read, asm: &mut dyn NodeAssembler) -> Result<(), CodecError>;

    fn decode_bytes(&self, mut bytes: &[u8], asm: &mut dyn NodeAssembler) -> Result<(), CodecError> {
        self.decode(&mut bytes, asm)
    }
}

/// Writes a node in a wire format.
pub trait Encoder {
    fn encode(&self, node: &Node, writer: &mut dyn Write) -> Result<(), CodecError>;

    fn encode_to_vec(&self, node: &Node) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode(node, &mut out)?;
        Ok(out)
    }
}
