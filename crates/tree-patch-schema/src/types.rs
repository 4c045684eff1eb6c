//! Type declarations.
//!
//! Every declared type has two shapes: the typed shape (how the value looks
//! in memory) and the representation shape (how it looks on the wire). The
//! representation strategy attached to each declaration decides the latter.

use std::collections::BTreeMap;
use std::fmt;

/// Data-model kinds. Both views of a type resolve to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    List,
    Map,
    Link,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Link => "link",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar kinds that can be declared directly (`type Gamma string`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Bool,
    Int,
    Float,
    Bytes,
    Link,
}

impl ScalarKind {
    pub fn kind(self) -> Kind {
        match self {
            ScalarKind::String => Kind::String,
            ScalarKind::Bool => Kind::Bool,
            ScalarKind::Int => Kind::Int,
            ScalarKind::Float => Kind::Float,
            ScalarKind::Bytes => Kind::Bytes,
            ScalarKind::Link => Kind::Link,
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "string" => Some(ScalarKind::String),
            "bool" => Some(ScalarKind::Bool),
            "int" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "bytes" => Some(ScalarKind::Bytes),
            "link" => Some(ScalarKind::Link),
            _ => None,
        }
    }
}

/// An enumeration of string members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumType {
    pub members: Vec<String>,
    /// Member name -> wire string. Members without an entry use their name.
    pub renames: BTreeMap<String, String>,
}

impl EnumType {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            renames: BTreeMap::new(),
        }
    }

    pub fn has_member(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    pub fn wire_name<'a>(&'a self, member: &'a str) -> &'a str {
        self.renames.get(member).map(String::as_str).unwrap_or(member)
    }

    /// Resolve a wire string back to the member it represents.
    pub fn member_for_wire(&self, wire: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| self.wire_name(m) == wire)
            .map(String::as_str)
    }
}

/// A single struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub type_name: String,
    pub optional: bool,
    pub nullable: bool,
}

impl StructField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            optional: false,
            nullable: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructRepr {
    /// Fields become map entries; `renames` maps field name -> wire key.
    Map { renames: BTreeMap<String, String> },
}

impl Default for StructRepr {
    fn default() -> Self {
        StructRepr::Map {
            renames: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructType {
    pub fields: Vec<StructField>,
    pub repr: StructRepr,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn wire_key<'a>(&'a self, field: &'a str) -> &'a str {
        match &self.repr {
            StructRepr::Map { renames } => renames.get(field).map(String::as_str).unwrap_or(field),
        }
    }

    /// Resolve a wire key back to its field.
    pub fn field_for_wire(&self, key: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| self.wire_key(&f.name) == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListType {
    pub value_type: String,
    pub value_nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType {
    pub key_type: String,
    pub value_type: String,
    pub value_nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionRepr {
    /// The active member is wrapped in a single-entry map under its discriminant.
    Keyed { discriminants: BTreeMap<String, String> },
    /// The active member is a string, prefixed by its discriminant and a delimiter.
    StringPrefix {
        delimiter: String,
        discriminants: BTreeMap<String, String>,
    },
}

impl UnionRepr {
    pub fn strategy(&self) -> &'static str {
        match self {
            UnionRepr::Keyed { .. } => "keyed",
            UnionRepr::StringPrefix { .. } => "stringprefix",
        }
    }

    /// Discriminant -> member type name.
    pub fn discriminants(&self) -> &BTreeMap<String, String> {
        match self {
            UnionRepr::Keyed { discriminants } => discriminants,
            UnionRepr::StringPrefix { discriminants, .. } => discriminants,
        }
    }

    pub fn discriminant_for(&self, member: &str) -> Option<&str> {
        self.discriminants()
            .iter()
            .find(|(_, m)| m.as_str() == member)
            .map(|(d, _)| d.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub members: Vec<String>,
    pub repr: UnionRepr,
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Scalar(ScalarKind),
    Any,
    Enum(EnumType),
    Struct(StructType),
    List(ListType),
    Map(MapType),
    Union(UnionType),
}

impl TypeDef {
    /// Kind of the typed view.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            TypeDef::Scalar(s) => Some(s.kind()),
            TypeDef::Any => None,
            TypeDef::Enum(_) => Some(Kind::String),
            TypeDef::Struct(_) => Some(Kind::Map),
            TypeDef::List(_) => Some(Kind::List),
            TypeDef::Map(_) => Some(Kind::Map),
            TypeDef::Union(_) => Some(Kind::Map),
        }
    }

    /// Kind of the representation view. `None` means any kind is accepted.
    pub fn representation_kind(&self) -> Option<Kind> {
        match self {
            TypeDef::Union(u) => match u.repr {
                UnionRepr::Keyed { .. } => Some(Kind::Map),
                UnionRepr::StringPrefix { .. } => Some(Kind::String),
            },
            TypeDef::Struct(s) => match s.repr {
                StructRepr::Map { .. } => Some(Kind::Map),
            },
            other => other.kind(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TypeDef::Scalar(_) => "scalar",
            TypeDef::Any => "any",
            TypeDef::Enum(_) => "enum",
            TypeDef::Struct(_) => "struct",
            TypeDef::List(_) => "list",
            TypeDef::Map(_) => "map",
            TypeDef::Union(_) => "union",
        }
    }

    /// Names of the types this declaration refers to.
    pub fn references(&self) -> Vec<&str> {
        match self {
            TypeDef::Scalar(_) | TypeDef::Any | TypeDef::Enum(_) => Vec::new(),
            TypeDef::Struct(s) => s.fields.iter().map(|f| f.type_name.as_str()).collect(),
            TypeDef::List(l) => vec![l.value_type.as_str()],
            TypeDef::Map(m) => vec![m.key_type.as_str(), m.value_type.as_str()],
            TypeDef::Union(u) => u.members.iter().map(String::as_str).collect(),
        }
    }
}
