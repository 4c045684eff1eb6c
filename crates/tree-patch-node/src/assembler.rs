//! The uniform assembler protocol.
//!
//! Decoders push a document through an assembler one event at a time without
//! knowing what is being built: an untyped [`Node`](crate::Node), a
//! schema-checked value, or a native record.
//!
//! Maps alternate `assemble_key` with exactly one value each. Every
//! `begin_*` is closed by the matching `finish_*`.

use crate::error::AssembleError;
use crate::node::{Link, Node};

pub trait NodeAssembler {
    fn begin_map(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError>;
    fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError>;
    fn finish_map(&mut self) -> Result<(), AssembleError>;

    fn begin_list(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError>;
    fn finish_list(&mut self) -> Result<(), AssembleError>;

    fn assign_null(&mut self) -> Result<(), AssembleError>;
    fn assign_bool(&mut self, value: bool) -> Result<(), AssembleError>;
    fn assign_int(&mut self, value: i64) -> Result<(), AssembleError>;
    fn assign_float(&mut self, value: f64) -> Result<(), AssembleError>;
    fn assign_string(&mut self, value: &str) -> Result<(), AssembleError>;
    fn assign_bytes(&mut self, value: &[u8]) -> Result<(), AssembleError>;
    fn assign_link(&mut self, value: &Link) -> Result<(), AssembleError>;

    /// Assign an already-built node by replaying it.
    fn assign_node(&mut self, node: &Node) -> Result<(), AssembleError> {
        replay(node, self)
    }
}

/// Drive `asm` with the events that describe `node`.
pub fn replay<A: NodeAssembler + ?Sized>(node: &Node, asm: &mut A) -> Result<(), AssembleError> {
    match node {
        Node::Null => asm.assign_null(),
        Node::Bool(b) => asm.assign_bool(*b),
        Node::Int(i) => asm.assign_int(*i),
        Node::Float(f) => asm.assign_float(*f),
        Node::String(s) => asm.assign_string(s),
        Node::Bytes(b) => asm.assign_bytes(b),
        Node::Link(l) => asm.assign_link(l),
        Node::List(items) => {
            asm.begin_list(Some(items.len()))?;
            for item in items {
                replay(item, asm)?;
            }
            asm.finish_list()
        }
        Node::Map(entries) => {
            asm.begin_map(Some(entries.len()))?;
            for (k, v) in entries {
                asm.assemble_key(k)?;
                replay(v, asm)?;
            }
            asm.finish_map()
        }
    }
}
