//! The registry of named types.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SchemaError;
use crate::types::{Kind, ScalarKind, TypeDef, UnionRepr};

const PRELUDE: [(&str, Option<ScalarKind>); 7] = [
    ("String", Some(ScalarKind::String)),
    ("Bool", Some(ScalarKind::Bool)),
    ("Int", Some(ScalarKind::Int)),
    ("Float", Some(ScalarKind::Float)),
    ("Bytes", Some(ScalarKind::Bytes)),
    ("Link", Some(ScalarKind::Link)),
    ("Any", None),
];

/// A closed set of named types.
///
/// Built once through [`accumulate`](Self::accumulate) (or the DSL loader)
/// and read through [`type_by_name`](Self::type_by_name). Nothing mutates a
/// system once it has been validated, so shared references can be handed to
/// any number of builders at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSystem {
    types: BTreeMap<String, TypeDef>,
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem {
    /// A system pre-seeded with the prelude scalars and `Any`.
    pub fn new() -> Self {
        let types = PRELUDE
            .iter()
            .map(|(name, scalar)| {
                let def = match scalar {
                    Some(s) => TypeDef::Scalar(*s),
                    None => TypeDef::Any,
                };
                (name.to_string(), def)
            })
            .collect();
        Self { types }
    }

    /// Register a named type. Redeclaring a name is an error, except that an
    /// identical redeclaration is accepted (synthesized inline types repeat).
    pub fn accumulate(&mut self, name: impl Into<String>, def: TypeDef) -> Result<(), SchemaError> {
        let name = name.into();
        match self.types.get(&name) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(SchemaError::DuplicateType(name)),
            None => {
                self.types.insert(name, def);
                Ok(())
            }
        }
    }

    /// Check that the declarations form a closed, well-formed set.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (name, def) in &self.types {
            for referenced in def.references() {
                if !self.types.contains_key(referenced) {
                    return Err(SchemaError::UnknownType {
                        referenced_by: name.clone(),
                        name: referenced.to_string(),
                    });
                }
            }
            match def {
                TypeDef::Map(m) => {
                    let key_kind = self.types.get(&m.key_type).and_then(TypeDef::kind);
                    if key_kind != Some(Kind::String) {
                        return Err(SchemaError::InvalidKeyType {
                            type_name: name.clone(),
                            key_type: m.key_type.clone(),
                        });
                    }
                }
                TypeDef::Union(u) => validate_union(name, &u.members, &u.repr)?,
                TypeDef::Enum(e) => unique_wire_names(name, e.members.iter().map(|m| e.wire_name(m)))?,
                TypeDef::Struct(s) => unique_wire_names(name, s.fields.iter().map(|f| s.wire_key(&f.name)))?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeHandle<'_>> {
        self.types
            .get_key_value(name)
            .map(|(name, def)| TypeHandle { system: self, name, def })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Wire strings must map back to exactly one member or field.
fn unique_wire_names<'a>(name: &str, wires: impl Iterator<Item = &'a str>) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for wire in wires {
        if !seen.insert(wire) {
            return Err(SchemaError::DuplicateWireName {
                type_name: name.to_string(),
                wire: wire.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_union(name: &str, members: &[String], repr: &UnionRepr) -> Result<(), SchemaError> {
    let invalid = |message: String| SchemaError::InvalidUnion {
        type_name: name.to_string(),
        message,
    };
    if members.is_empty() {
        return Err(invalid("no members".into()));
    }
    if let UnionRepr::StringPrefix { delimiter, .. } = repr {
        if delimiter.is_empty() {
            return Err(invalid("stringprefix delimiter is empty".into()));
        }
    }
    for member in members {
        if repr.discriminant_for(member).is_none() {
            return Err(invalid(format!("member {member} has no discriminant")));
        }
    }
    for member in repr.discriminants().values() {
        if !members.contains(member) {
            return Err(invalid(format!("discriminant names non-member {member}")));
        }
    }
    Ok(())
}

/// A resolved reference to a named type within its system.
#[derive(Debug, Clone, Copy)]
pub struct TypeHandle<'a> {
    system: &'a TypeSystem,
    name: &'a str,
    def: &'a TypeDef,
}

impl<'a> TypeHandle<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn def(&self) -> &'a TypeDef {
        self.def
    }

    pub fn system(&self) -> &'a TypeSystem {
        self.system
    }

    /// Kind of the typed view; `None` for `Any`.
    pub fn kind(&self) -> Option<Kind> {
        self.def.kind()
    }

    /// Kind of the representation view; `None` for `Any`.
    pub fn representation_kind(&self) -> Option<Kind> {
        self.def.representation_kind()
    }

    /// Resolve another name in the same system.
    pub fn resolve(&self, name: &str) -> Option<TypeHandle<'a>> {
        self.system.type_by_name(name)
    }
}

impl PartialEq for TypeHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.system, other.system) && self.name == other.name
    }
}
