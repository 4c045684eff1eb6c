//! One builder per representation strategy.
//!
//! Container values open a [`Strategy`] frame; scalar values (including enums
//! and string-prefixed unions in their representation view) are accepted in
//! one step by [`accept_scalar`]. Every strategy produces the typed-shape
//! node regardless of the view it was driven through.

use indexmap::IndexMap;
use tree_patch_schema::{
    EnumType, Kind, ListType, MapType, StructField, StructType, TypeDef, TypeHandle, UnionRepr,
    UnionType,
};

use super::View;
use crate::assembler::NodeAssembler;
use crate::builder::NodeBuilder;
use crate::error::AssembleError;
use crate::node::Node;

/// What the next value must look like.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expect<'ts> {
    pub ty: TypeHandle<'ts>,
    pub view: View,
    pub nullable: bool,
}

impl<'ts> Expect<'ts> {
    pub fn new(ty: TypeHandle<'ts>, view: View) -> Self {
        Self {
            ty,
            view,
            nullable: false,
        }
    }

    fn child(&self, type_name: &str, nullable: bool) -> Result<Expect<'ts>, AssembleError> {
        let ty = self
            .ty
            .resolve(type_name)
            .ok_or_else(|| AssembleError::UnknownType(type_name.to_string()))?;
        Ok(Expect {
            ty,
            view: self.view,
            nullable,
        })
    }

    /// Kind this slot accepts in its view; `None` accepts anything.
    pub fn kind(&self) -> Option<Kind> {
        match self.view {
            View::Typed => self.ty.kind(),
            View::Representation => self.ty.representation_kind(),
        }
    }

    fn wrong_kind(&self, actual: Kind) -> AssembleError {
        AssembleError::WrongKind {
            type_name: self.ty.name().to_string(),
            expected: self.kind().unwrap_or(actual),
            actual,
        }
    }
}

/// A container frame on the schema builder's stack.
#[derive(Debug)]
pub(crate) enum Strategy<'ts> {
    StructMap(StructMapBuilder<'ts>),
    List(ListBuilder<'ts>),
    Map(MapBuilder<'ts>),
    /// Keyed unions in their representation view, and every union in its
    /// typed view (a single-entry map keyed by member type name).
    KeyedUnion(UnionBuilder<'ts>),
    Any(AnyBuilder),
}

impl<'ts> Strategy<'ts> {
    /// Open a frame for a map or list value in `expect`'s slot.
    pub fn begin(expect: Expect<'ts>, kind: Kind, size_hint: Option<usize>) -> Result<Self, AssembleError> {
        let def = expect.ty.def();
        match (def, kind) {
            (TypeDef::Any, _) => AnyBuilder::begin(kind, size_hint).map(Strategy::Any),
            (TypeDef::Struct(s), Kind::Map) => Ok(Strategy::StructMap(StructMapBuilder {
                expect,
                def: s,
                fields: IndexMap::with_capacity(s.fields.len()),
                pending: None,
            })),
            (TypeDef::List(l), Kind::List) => Ok(Strategy::List(ListBuilder {
                expect,
                def: l,
                items: Vec::with_capacity(size_hint.unwrap_or(0)),
            })),
            (TypeDef::Map(m), Kind::Map) => Ok(Strategy::Map(MapBuilder {
                expect,
                def: m,
                entries: IndexMap::with_capacity(size_hint.unwrap_or(0)),
                pending: None,
            })),
            (TypeDef::Union(u), Kind::Map)
                if expect.view == View::Typed || matches!(u.repr, UnionRepr::Keyed { .. }) =>
            {
                Ok(Strategy::KeyedUnion(UnionBuilder {
                    expect,
                    def: u,
                    member: None,
                    value: None,
                }))
            }
            _ => Err(expect.wrong_kind(kind)),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Strategy::List(_) => Kind::List,
            Strategy::Any(any) => any.kind,
            _ => Kind::Map,
        }
    }

    pub fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError> {
        match self {
            Strategy::StructMap(b) => b.assemble_key(key),
            Strategy::Map(b) => b.assemble_key(key),
            Strategy::KeyedUnion(b) => b.assemble_key(key),
            Strategy::List(_) => Err(AssembleError::InvalidState("key inside a list")),
            Strategy::Any(b) => b.builder.assemble_key(key),
        }
    }

    /// Slot for the next child value.
    pub fn expect_child(&self) -> Result<Expect<'ts>, AssembleError> {
        match self {
            Strategy::StructMap(b) => b.expect_child(),
            Strategy::List(b) => b.expect.child(&b.def.value_type, b.def.value_nullable),
            Strategy::Map(b) => b.expect_child(),
            Strategy::KeyedUnion(b) => b.expect_child(),
            Strategy::Any(_) => Err(AssembleError::InvalidState("untyped frames take events directly")),
        }
    }

    pub fn accept_child(&mut self, node: Node) -> Result<(), AssembleError> {
        match self {
            Strategy::StructMap(b) => match b.pending.take() {
                Some(field) => {
                    b.fields.insert(field.name.clone(), node);
                    Ok(())
                }
                None => Err(AssembleError::InvalidState("struct value without a key")),
            },
            Strategy::List(b) => {
                b.items.push(node);
                Ok(())
            }
            Strategy::Map(b) => match b.pending.take() {
                Some(key) => {
                    b.entries.insert(key, node);
                    Ok(())
                }
                None => Err(AssembleError::InvalidState("map value without a key")),
            },
            Strategy::KeyedUnion(b) => {
                if b.member.is_none() || b.value.is_some() {
                    return Err(AssembleError::InvalidState("union value without a key"));
                }
                b.value = Some(node);
                Ok(())
            }
            Strategy::Any(_) => Err(AssembleError::InvalidState("untyped frames take events directly")),
        }
    }

    /// Close the frame and produce the typed-shape node.
    pub fn finish(self) -> Result<Node, AssembleError> {
        match self {
            Strategy::StructMap(b) => b.finish(),
            Strategy::List(b) => Ok(Node::List(b.items)),
            Strategy::Map(b) => {
                if b.pending.is_some() {
                    return Err(AssembleError::InvalidState("map finished with a dangling key"));
                }
                Ok(Node::Map(b.entries))
            }
            Strategy::KeyedUnion(b) => b.finish(),
            Strategy::Any(b) => b.builder.build(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct StructMapBuilder<'ts> {
    expect: Expect<'ts>,
    def: &'ts StructType,
    fields: IndexMap<String, Node>,
    pending: Option<&'ts StructField>,
}

impl<'ts> StructMapBuilder<'ts> {
    fn type_name(&self) -> String {
        self.expect.ty.name().to_string()
    }

    fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError> {
        if self.pending.is_some() {
            return Err(AssembleError::InvalidState("key while a value is pending"));
        }
        let def: &'ts StructType = self.def;
        let field = match self.expect.view {
            View::Typed => def.field(key),
            View::Representation => def.field_for_wire(key),
        }
        .ok_or_else(|| AssembleError::UnknownField {
            type_name: self.type_name(),
            field: key.to_string(),
        })?;
        if self.fields.contains_key(&field.name) {
            return Err(AssembleError::DuplicateKey { key: key.to_string() });
        }
        self.pending = Some(field);
        Ok(())
    }

    fn expect_child(&self) -> Result<Expect<'ts>, AssembleError> {
        let field = self
            .pending
            .ok_or(AssembleError::InvalidState("struct value without a key"))?;
        self.expect.child(&field.type_name, field.nullable)
    }

    fn finish(mut self) -> Result<Node, AssembleError> {
        if self.pending.is_some() {
            return Err(AssembleError::InvalidState("map finished with a dangling key"));
        }
        let mut out = IndexMap::with_capacity(self.fields.len());
        for field in &self.def.fields {
            match self.fields.shift_remove(&field.name) {
                Some(value) => {
                    out.insert(field.name.clone(), value);
                }
                None if field.optional => {}
                None => {
                    return Err(AssembleError::MissingField {
                        type_name: self.type_name(),
                        field: field.name.clone(),
                    })
                }
            }
        }
        Ok(Node::Map(out))
    }
}

#[derive(Debug)]
pub(crate) struct ListBuilder<'ts> {
    expect: Expect<'ts>,
    def: &'ts ListType,
    items: Vec<Node>,
}

#[derive(Debug)]
pub(crate) struct MapBuilder<'ts> {
    expect: Expect<'ts>,
    def: &'ts MapType,
    entries: IndexMap<String, Node>,
    pending: Option<String>,
}

impl<'ts> MapBuilder<'ts> {
    fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError> {
        if self.pending.is_some() {
            return Err(AssembleError::InvalidState("key while a value is pending"));
        }
        if self.entries.contains_key(key) {
            return Err(AssembleError::DuplicateKey { key: key.to_string() });
        }
        self.pending = Some(key.to_string());
        Ok(())
    }

    fn expect_child(&self) -> Result<Expect<'ts>, AssembleError> {
        if self.pending.is_none() {
            return Err(AssembleError::InvalidState("map value without a key"));
        }
        self.expect.child(&self.def.value_type, self.def.value_nullable)
    }
}

#[derive(Debug)]
pub(crate) struct UnionBuilder<'ts> {
    expect: Expect<'ts>,
    def: &'ts UnionType,
    member: Option<&'ts str>,
    value: Option<Node>,
}

impl<'ts> UnionBuilder<'ts> {
    fn type_name(&self) -> String {
        self.expect.ty.name().to_string()
    }

    fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError> {
        if self.member.is_some() {
            return Err(AssembleError::UnionArity {
                type_name: self.type_name(),
                count: 2,
            });
        }
        let def: &'ts UnionType = self.def;
        let member = match self.expect.view {
            View::Typed => def.members.iter().find(|m| m.as_str() == key),
            View::Representation => def.repr.discriminants().get(key),
        }
        .ok_or_else(|| AssembleError::UnknownDiscriminant {
            type_name: self.type_name(),
            value: key.to_string(),
        })?;
        self.member = Some(member.as_str());
        Ok(())
    }

    fn expect_child(&self) -> Result<Expect<'ts>, AssembleError> {
        match (self.member, &self.value) {
            (Some(member), None) => self.expect.child(member, false),
            _ => Err(AssembleError::InvalidState("union value without a key")),
        }
    }

    fn finish(self) -> Result<Node, AssembleError> {
        match (self.member, self.value) {
            (Some(member), Some(value)) => Ok(Node::map([(member, value)])),
            (None, _) => Err(AssembleError::UnionArity {
                type_name: self.expect.ty.name().to_string(),
                count: 0,
            }),
            (Some(_), None) => Err(AssembleError::InvalidState("map finished with a dangling key")),
        }
    }
}

/// Collects an untyped subtree under an `Any` slot.
#[derive(Debug)]
pub(crate) struct AnyBuilder {
    pub builder: NodeBuilder,
    pub kind: Kind,
    /// Open containers inside this subtree, including its root.
    pub depth: usize,
}

impl AnyBuilder {
    fn begin(kind: Kind, size_hint: Option<usize>) -> Result<Self, AssembleError> {
        let mut builder = NodeBuilder::new();
        match kind {
            Kind::Map => builder.begin_map(size_hint)?,
            Kind::List => builder.begin_list(size_hint)?,
            _ => return Err(AssembleError::InvalidState("only maps and lists open frames")),
        }
        Ok(Self {
            builder,
            kind,
            depth: 1,
        })
    }
}

/// Accept a scalar value into `expect`'s slot.
pub(crate) fn accept_scalar(expect: Expect<'_>, node: Node) -> Result<Node, AssembleError> {
    let ty = expect.ty;
    match (ty.def(), node) {
        (TypeDef::Any, node) => Ok(node),
        (_, Node::Null) if expect.nullable => Ok(Node::Null),
        (TypeDef::Scalar(s), node) => {
            if node.kind() == s.kind() {
                Ok(node)
            } else if let (Kind::Float, Node::Int(i)) = (s.kind(), &node) {
                Ok(Node::Float(*i as f64))
            } else {
                Err(expect.wrong_kind(node.kind()))
            }
        }
        (TypeDef::Enum(e), Node::String(s)) => accept_enum(expect, e, s),
        (TypeDef::Union(u), Node::String(s)) if expect.view == View::Representation => {
            match &u.repr {
                UnionRepr::StringPrefix {
                    delimiter,
                    discriminants,
                } => {
                    let found = discriminants.iter().find_map(|(disc, member)| {
                        s.strip_prefix(disc.as_str())
                            .and_then(|rest| rest.strip_prefix(delimiter.as_str()))
                            .map(|rest| (member, rest))
                    });
                    let (member, rest) = found.ok_or_else(|| AssembleError::UnknownDiscriminant {
                        type_name: ty.name().to_string(),
                        value: s.clone(),
                    })?;
                    let inner = accept_scalar(expect.child(member, false)?, Node::String(rest.to_string()))?;
                    Ok(Node::map([(member.as_str(), inner)]))
                }
                UnionRepr::Keyed { .. } => Err(expect.wrong_kind(Kind::String)),
            }
        }
        (_, node) => Err(expect.wrong_kind(node.kind())),
    }
}

fn accept_enum(expect: Expect<'_>, def: &EnumType, value: String) -> Result<Node, AssembleError> {
    let member = match expect.view {
        View::Typed => def.has_member(&value).then(|| value.clone()),
        View::Representation => def.member_for_wire(&value).map(str::to_string),
    };
    member.map(Node::String).ok_or_else(|| AssembleError::InvalidEnumMember {
        type_name: expect.ty.name().to_string(),
        value,
    })
}
