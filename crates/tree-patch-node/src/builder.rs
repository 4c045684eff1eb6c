//! Untyped node builder.

use indexmap::IndexMap;

use crate::assembler::NodeAssembler;
use crate::error::AssembleError;
use crate::node::{Link, Node};

#[derive(Debug)]
enum Frame {
    Map {
        entries: IndexMap<String, Node>,
        key: Option<String>,
    },
    List(Vec<Node>),
}

/// Assembles a [`Node`] without any schema.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    stack: Vec<Frame>,
    result: Option<Node>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a complete value has been assembled.
    pub fn is_complete(&self) -> bool {
        self.stack.is_empty() && self.result.is_some()
    }

    pub fn build(self) -> Result<Node, AssembleError> {
        if !self.stack.is_empty() {
            return Err(AssembleError::Incomplete);
        }
        self.result.ok_or(AssembleError::Incomplete)
    }

    fn check_slot(&self) -> Result<(), AssembleError> {
        match self.stack.last() {
            None if self.result.is_some() => Err(AssembleError::InvalidState("value already assigned")),
            Some(Frame::Map { key: None, .. }) => Err(AssembleError::InvalidState("map value without a key")),
            _ => Ok(()),
        }
    }

    fn deliver(&mut self, node: Node) -> Result<(), AssembleError> {
        match self.stack.last_mut() {
            None => {
                if self.result.is_some() {
                    return Err(AssembleError::InvalidState("value already assigned"));
                }
                self.result = Some(node);
                Ok(())
            }
            Some(Frame::List(items)) => {
                items.push(node);
                Ok(())
            }
            Some(Frame::Map { entries, key }) => match key.take() {
                Some(k) => {
                    entries.insert(k, node);
                    Ok(())
                }
                None => Err(AssembleError::InvalidState("map value without a key")),
            },
        }
    }
}

impl NodeAssembler for NodeBuilder {
    fn begin_map(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError> {
        self.check_slot()?;
        self.stack.push(Frame::Map {
            entries: IndexMap::with_capacity(size_hint.unwrap_or(0)),
            key: None,
        });
        Ok(())
    }

    fn assemble_key(&mut self, k: &str) -> Result<(), AssembleError> {
        match self.stack.last_mut() {
            Some(Frame::Map { entries, key: key @ None }) => {
                if entries.contains_key(k) {
                    return Err(AssembleError::DuplicateKey { key: k.to_string() });
                }
                *key = Some(k.to_string());
                Ok(())
            }
            Some(Frame::Map { .. }) => Err(AssembleError::InvalidState("key while a value is pending")),
            _ => Err(AssembleError::InvalidState("key outside of a map")),
        }
    }

    fn finish_map(&mut self) -> Result<(), AssembleError> {
        match self.stack.pop() {
            Some(Frame::Map { entries, key: None }) => self.deliver(Node::Map(entries)),
            Some(Frame::Map { .. }) => Err(AssembleError::InvalidState("map finished with a dangling key")),
            _ => Err(AssembleError::InvalidState("finish_map without begin_map")),
        }
    }

    fn begin_list(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError> {
        self.check_slot()?;
        self.stack
            .push(Frame::List(Vec::with_capacity(size_hint.unwrap_or(0))));
        Ok(())
    }

    fn finish_list(&mut self) -> Result<(), AssembleError> {
        match self.stack.pop() {
            Some(Frame::List(items)) => self.deliver(Node::List(items)),
            _ => Err(AssembleError::InvalidState("finish_list without begin_list")),
        }
    }

    fn assign_null(&mut self) -> Result<(), AssembleError> {
        self.deliver(Node::Null)
    }

    fn assign_bool(&mut self, value: bool) -> Result<(), AssembleError> {
        self.deliver(Node::Bool(value))
    }

    fn assign_int(&mut self, value: i64) -> Result<(), AssembleError> {
        self.deliver(Node::Int(value))
    }

    fn assign_float(&mut self, value: f64) -> Result<(), AssembleError> {
        self.deliver(Node::Float(value))
    }

    fn assign_string(&mut self, value: &str) -> Result<(), AssembleError> {
        self.deliver(Node::String(value.to_string()))
    }

    fn assign_bytes(&mut self, value: &[u8]) -> Result<(), AssembleError> {
        self.deliver(Node::Bytes(value.to_vec()))
    }

    fn assign_link(&mut self, value: &Link) -> Result<(), AssembleError> {
        self.deliver(Node::Link(value.clone()))
    }
}
