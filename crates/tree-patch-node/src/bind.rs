//! Native-type binding.
//!
//! Plain Rust records are projected onto the node protocol through serde:
//! any `T: DeserializeOwned` can be filled from a typed-shape node. Struct
//! fields match typed field names, union nodes (`{Member: value}`) bind to
//! externally tagged enums, and `Option` fields are `None` when the entry is
//! absent.

use std::marker::PhantomData;

use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeOwned, Deserializer, EnumAccess, IntoDeserializer, VariantAccess, Visitor,
};

use crate::assembler::NodeAssembler;
use crate::error::{AssembleError, BindError};
use crate::node::{Link, Node, LINK_TOKEN};
use crate::schema_builder::SchemaBuilder;

/// Project a typed-shape node onto a native type.
pub fn bind<T: DeserializeOwned>(node: Node) -> Result<T, AssembleError> {
    T::deserialize(node).map_err(AssembleError::from)
}

/// A schema builder that finishes into the native type `T`.
#[derive(Debug)]
pub struct BoundBuilder<'ts, T> {
    inner: SchemaBuilder<'ts>,
    _native: PhantomData<fn() -> T>,
}

impl<'ts, T> BoundBuilder<'ts, T> {
    pub fn new(inner: SchemaBuilder<'ts>) -> Self {
        Self {
            inner,
            _native: PhantomData,
        }
    }

    pub fn schema_builder(&mut self) -> &mut SchemaBuilder<'ts> {
        &mut self.inner
    }
}

impl<T: DeserializeOwned> BoundBuilder<'_, T> {
    pub fn build(self) -> Result<T, AssembleError> {
        bind(self.inner.build()?)
    }
}

impl<T> NodeAssembler for BoundBuilder<'_, T> {
    fn begin_map(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError> {
        self.inner.begin_map(size_hint)
    }

    fn assemble_key(&mut self, key: &str) -> Result<(), AssembleError> {
        self.inner.assemble_key(key)
    }

    fn finish_map(&mut self) -> Result<(), AssembleError> {
        self.inner.finish_map()
    }

    fn begin_list(&mut self, size_hint: Option<usize>) -> Result<(), AssembleError> {
        self.inner.begin_list(size_hint)
    }

    fn finish_list(&mut self) -> Result<(), AssembleError> {
        self.inner.finish_list()
    }

    fn assign_null(&mut self) -> Result<(), AssembleError> {
        self.inner.assign_null()
    }

    fn assign_bool(&mut self, value: bool) -> Result<(), AssembleError> {
        self.inner.assign_bool(value)
    }

    fn assign_int(&mut self, value: i64) -> Result<(), AssembleError> {
        self.inner.assign_int(value)
    }

    fn assign_float(&mut self, value: f64) -> Result<(), AssembleError> {
        self.inner.assign_float(value)
    }

    fn assign_string(&mut self, value: &str) -> Result<(), AssembleError> {
        self.inner.assign_string(value)
    }

    fn assign_bytes(&mut self, value: &[u8]) -> Result<(), AssembleError> {
        self.inner.assign_bytes(value)
    }

    fn assign_link(&mut self, value: &Link) -> Result<(), AssembleError> {
        self.inner.assign_link(value)
    }
}

/// Keeps an explicitly assigned value distinct from an absent one: use as
/// `#[serde(default, deserialize_with = "present")]` on `Option<T>` fields
/// whose values may themselves be null.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: de::Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<'de> IntoDeserializer<'de, BindError> for Node {
    type Deserializer = Node;

    fn into_deserializer(self) -> Node {
        self
    }
}

impl<'de> Deserializer<'de> for Node {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        match self {
            Node::Null => visitor.visit_unit(),
            Node::Bool(b) => visitor.visit_bool(b),
            Node::Int(i) => visitor.visit_i64(i),
            Node::Float(f) => visitor.visit_f64(f),
            Node::String(s) => visitor.visit_string(s),
            Node::Bytes(b) => visitor.visit_byte_buf(b),
            Node::Link(link) => visitor.visit_newtype_struct(link_deserializer(link)),
            Node::List(items) => {
                let mut seq = SeqDeserializer::<_, BindError>::new(items.into_iter());
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Node::Map(entries) => {
                let mut map = MapDeserializer::<_, BindError>::new(entries.into_iter());
                let value = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        match self {
            Node::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BindError> {
        match self {
            Node::Link(link) if name == LINK_TOKEN => visitor.visit_newtype_struct(link_deserializer(link)),
            other => visitor.visit_newtype_struct(other),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BindError> {
        match self {
            Node::String(variant) => visitor.visit_enum(variant.into_deserializer()),
            Node::Map(entries) if entries.len() == 1 => {
                let mut entries = entries.into_iter();
                match entries.next() {
                    Some((variant, value)) => visitor.visit_enum(UnionAccess { variant, value }),
                    None => Err(de::Error::custom("empty union")),
                }
            }
            other => Err(de::Error::invalid_type(unexpected(&other), &"a union or enum member")),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

fn link_deserializer(link: Link) -> StringDeserializer<BindError> {
    link.into_string().into_deserializer()
}

fn unexpected(node: &Node) -> de::Unexpected<'_> {
    match node {
        Node::Null => de::Unexpected::Unit,
        Node::Bool(b) => de::Unexpected::Bool(*b),
        Node::Int(i) => de::Unexpected::Signed(*i),
        Node::Float(f) => de::Unexpected::Float(*f),
        Node::String(s) => de::Unexpected::Str(s),
        Node::Bytes(b) => de::Unexpected::Bytes(b),
        Node::List(_) => de::Unexpected::Seq,
        Node::Map(_) => de::Unexpected::Map,
        Node::Link(_) => de::Unexpected::NewtypeStruct,
    }
}

struct UnionAccess {
    variant: String,
    value: Node,
}

impl<'de> EnumAccess<'de> for UnionAccess {
    type Error = BindError;
    type Variant = Node;

    fn variant_seed<V: de::DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Node), BindError> {
        let name: StringDeserializer<BindError> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, self.value))
    }
}

impl<'de> VariantAccess<'de> for Node {
    type Error = BindError;

    fn unit_variant(self) -> Result<(), BindError> {
        match self {
            Node::Null => Ok(()),
            other => Err(de::Error::invalid_type(unexpected(&other), &"a unit variant")),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, BindError> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, BindError> {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BindError> {
        self.deserialize_map(visitor)
    }
}
