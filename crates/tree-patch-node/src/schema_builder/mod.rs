//! Schema-directed builders.
//!
//! A [`Prototype`] pairs a named type with a view. Builders obtained from
//! the typed view accept the in-memory shape (struct field names, unions as
//! `{MemberType: value}`); builders obtained from the representation view
//! accept the wire shape (renamed keys, keyed or string-prefixed unions).
//! Both produce the typed-shape node, checked against the schema as events
//! arrive.

mod strategy;

use std::borrow::Cow;

use tree_patch_schema::{Kind, TypeHandle, TypeSystem};

use crate::assembler::{replay, NodeAssembler};
use crate::bind::BoundBuilder;
use crate::error::AssembleError;
use crate::node::{Link, Node};
use crate::representation::to_representation;
use strategy::{accept_scalar, Expect, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Typed,
    Representation,
}

/// A named type plus the view builders should follow.
#[derive(Debug, Clone, Copy)]
pub struct Prototype<'ts> {
    ty: TypeHandle<'ts>,
    view: View,
}

impl<'ts> Prototype<'ts> {
    /// The typed-view prototype of `name`.
    pub fn new(system: &'ts TypeSystem, name: &str) -> Result<Self, AssembleError> {
        let ty = system
            .type_by_name(name)
            .ok_or_else(|| AssembleError::UnknownType(name.to_string()))?;
        Ok(Self {
            ty,
            view: View::Typed,
        })
    }

    pub fn type_handle(&self) -> TypeHandle<'ts> {
        self.ty
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// The same type, seen through its representation.
    pub fn representation(self) -> Self {
        Self {
            view: View::Representation,
            ..self
        }
    }

    pub fn new_builder(&self) -> SchemaBuilder<'ts> {
        SchemaBuilder {
            root: self.ty,
            view: self.view,
            stack: Vec::new(),
            result: None,
        }
    }

    /// A builder that finishes into the native type `T`.
    pub fn bound_builder<T>(&self) -> BoundBuilder<'ts, T> {
        BoundBuilder::new(self.new_builder())
    }
}

/// A typed-shape node together with the name of the type it conforms to.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedNode {
    pub type_name: String,
    pub node: Node,
}

/// Assembler that checks events against a schema type.
#[derive(Debug)]
pub struct SchemaBuilder<'ts> {
    root: TypeHandle<'ts>,
    view: View,
    stack: Vec<Strategy<'ts>>,
    result: Option<Node>,
}

impl<'ts> SchemaBuilder<'ts> {
    pub fn view(&self) -> View {
        self.view
    }

    pub fn type_handle(&self) -> TypeHandle<'ts> {
        self.root
    }

    pub fn build(self) -> Result<Node, AssembleError> {
        if !self.stack.is_empty() {
            return Err(AssembleError::Incomplete);
        }
        self.result.ok_or(AssembleError::Incomplete)
    }

    pub fn build_typed(self) -> Result<TypedNode, AssembleError> {
        let type_name = self.root.name().to_string();
        self.build().map(|node| TypedNode { type_name, node })
    }

    /// Assign a value built through another typed-view builder.
    ///
    /// In the representation view the value is first re-derived into its
    /// representation. Strategies that cannot be re-derived report
    /// [`AssembleError::UnsupportedAssignment`].
    pub fn assign_typed(&mut self, value: &TypedNode) -> Result<(), AssembleError> {
        tracing::trace!(type_name = %value.type_name, view = ?self.view, "assign typed value");
        let node = match self.view {
            View::Typed => Cow::Borrowed(&value.node),
            View::Representation => {
                let ty = self
                    .root
                    .resolve(&value.type_name)
                    .ok_or_else(|| AssembleError::UnknownType(value.type_name.clone()))?;
                Cow::Owned(to_representation(ty, &value.node)?)
            }
        };
        replay(&node, self)
    }

    fn next_slot(&self) -> Result<Expect<'ts>, AssembleError> {
        match self.stack.last() {
            None if self.result.is_some() => Err(AssembleError::InvalidState("value already assigned")),
            None => Ok(Expect::new(self.root, self.view)),
            Some(frame) => frame.expect_child(),
        }
    }

    fn open_any(&mut self) -> Option<&mut strategy::AnyBuilder> {
        match self.stack.last_mut() {
            Some(Strategy::Any(any)) => Some(any),
            _ => None,
        }
    }

    fn deliver(&mut self, node: Node) -> Result<(), AssembleError> {
        match self.stack.last_mut() {
            None => {
                self.result = Some(node);
                Ok(())
            }
            Some(frame) => frame.accept_child(node),
        }
    }

    fn scalar(&mut self, node: Node) -> Result<(), AssembleError> {
        if let Some(any) = self.open_any() {
            return replay(&node, &mut any.builder);
        }
        let slot = self.next_slot()?;
        let accepted = accept_scalar(slot, node)?;
        self.deliver(accepted)
    }

    fn begin(&mut self, kind: Kind, size_hint: Option<usize>) -> Result<(), AssembleError> {
        if let Some(any) = self.open_any() {
            any.depth += 1;
            return match kind {
                Kind::Map => any.builder.begin_map(size_hint),
                _ => any.builder.begin_list(size_hint),
            };
        }
        let slot = self.next_slot()?;
        let frame = Strategy::begin(slot, kind, size_hint)?;
        self.stack.push(frame);
        Ok(())
    }

    fn finish(&mut self, kind: Kind) -> Result<(), AssembleError> {
        if let Some(any) = self.open_any() {
            let finished = match kind {
                Kind::Map => any.builder.finish_map(),
                _ => any.builder.finish_list(),
            };
            finished?;
            any.depth -= 1;
            if any.depth > 0 {
                return Ok(());
            }
        } else if self.stack.last().map(Strategy::kind) != Some(kind) {
            return Err(AssembleError::InvalidState("finish does not match the open container"));
        }
        let frame = self
            .stack
            .pop()
            .ok_or(AssembleError::InvalidState("finish without begin"))?;
        let node = frame.finish()?;
        self.deliver(node)
    }
}

impl NodeAssembler for SchemaBuilder<'_> {
    fn begin_map(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError> {
        self.begin(Kind::Map, size_hint)
    }

    fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError> {
        match self.stack.last_mut() {
            Some(frame) => frame.assemble_key(key),
            None => Err(AssembleError::InvalidState("key outside of a map")),
        }
    }

    fn finish_map(&mut self) -> Result<(), AssembleError> {
        self.finish(Kind::Map)
    }

    fn begin_list(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError> {
        self.begin(Kind::List, size_hint)
    }

    fn finish_list(&mut self) -> Result<(), AssembleError> {
        self.finish(Kind::List)
    }

    fn assign_null(&mut self) -> Result<(), AssembleError> {
        self.scalar(Node::Null)
    }

    fn assign_bool(&mut self, value: bool) -> Result<(), AssembleError> {
        self.scalar(Node::Bool(value))
    }

    fn assign_int(&mut self, value: i64) -> Result<(), AssembleError> {
        self.scalar(Node::Int(value))
    }

    fn assign_float(&mut self, value: f64) -> Result<(), AssembleError> {
        self.scalar(Node::Float(value))
    }

    fn assign_string(&mut self, value: &str) -> Result<(), AssembleError> {
        self.scalar(Node::String(value.to_string()))
    }

    fn assign_bytes(&mut self, value: &[u8]) -> Result<(), AssembleError> {
        self.scalar(Node::Bytes(value.to_vec()))
    }

    fn assign_link(&mut self, value: &Link) -> Result<(), AssembleError> {
        self.scalar(Node::Link(value.clone()))
    }
}
