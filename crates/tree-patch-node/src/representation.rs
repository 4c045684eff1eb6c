//! Re-deriving the representation of typed-shape nodes.

use indexmap::IndexMap;
use tree_patch_schema::{Kind, TypeDef, TypeHandle, UnionRepr};

use crate::error::AssembleError;
use crate::node::Node;

/// Convert a typed-shape node of type `ty` into its wire shape.
pub fn to_representation(ty: TypeHandle<'_>, node: &Node) -> Result<Node, AssembleError> {
    let resolve = |name: &str| {
        ty.resolve(name)
            .ok_or_else(|| AssembleError::UnknownType(name.to_string()))
    };
    let wrong_kind = |expected: Kind| AssembleError::WrongKind {
        type_name: ty.name().to_string(),
        expected,
        actual: node.kind(),
    };
    let nested = |type_name: &str, nullable: bool, value: &Node| -> Result<Node, AssembleError> {
        if nullable && value.is_null() {
            Ok(Node::Null)
        } else {
            to_representation(resolve(type_name)?, value)
        }
    };

    match (ty.def(), node) {
        (TypeDef::Any | TypeDef::Scalar(_), node) => Ok(node.clone()),
        (TypeDef::Enum(e), Node::String(member)) => Ok(Node::String(e.wire_name(member).to_string())),
        (TypeDef::Enum(_), _) => Err(wrong_kind(Kind::String)),
        (TypeDef::Struct(s), Node::Map(fields)) => {
            let mut out = IndexMap::with_capacity(fields.len());
            for (name, value) in fields {
                let field = s.field(name).ok_or_else(|| AssembleError::UnknownField {
                    type_name: ty.name().to_string(),
                    field: name.clone(),
                })?;
                out.insert(
                    s.wire_key(name).to_string(),
                    nested(&field.type_name, field.nullable, value)?,
                );
            }
            Ok(Node::Map(out))
        }
        (TypeDef::List(l), Node::List(items)) => items
            .iter()
            .map(|item| nested(&l.value_type, l.value_nullable, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::List),
        (TypeDef::Map(m), Node::Map(entries)) => entries
            .iter()
            .map(|(k, v)| -> Result<(String, Node), AssembleError> {
                Ok((k.clone(), nested(&m.value_type, m.value_nullable, v)?))
            })
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Node::Map),
        (TypeDef::Union(u), Node::Map(entries)) => {
            let (member, value) = match entries.iter().next() {
                Some(entry) if entries.len() == 1 => entry,
                _ => {
                    return Err(AssembleError::UnionArity {
                        type_name: ty.name().to_string(),
                        count: entries.len(),
                    })
                }
            };
            let discriminant = u.repr.discriminant_for(member).ok_or_else(|| {
                AssembleError::UnknownDiscriminant {
                    type_name: ty.name().to_string(),
                    value: member.clone(),
                }
            })?;
            let inner = to_representation(resolve(member)?, value)?;
            match &u.repr {
                UnionRepr::Keyed { .. } => Ok(Node::map([(discriminant, inner)])),
                UnionRepr::StringPrefix { delimiter, .. } => match inner {
                    Node::String(s) => Ok(Node::String(format!("{discriminant}{delimiter}{s}"))),
                    other => Err(AssembleError::UnsupportedAssignment {
                        type_name: ty.name().to_string(),
                        strategy: u.repr.strategy(),
                        reason: format!(
                            "member {member} represents as {} rather than a string",
                            other.kind()
                        ),
                    }),
                },
            }
        }
        (def, _) => Err(wrong_kind(def.kind().unwrap_or(Kind::Map))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tree_patch_schema::parse_schema;

    #[test]
    fn struct_and_enum_renames_are_applied() {
        let ts = parse_schema(
            r#"
            type Op enum { | add ("ADD") }
            type Step struct { op Op (rename "o") }
            "#,
        )
        .unwrap();
        let step = ts.type_by_name("Step").unwrap();
        let repr = to_representation(step, &Node::from(json!({"op": "add"}))).unwrap();
        assert_eq!(repr, Node::from(json!({"o": "ADD"})));
    }

    #[test]
    fn keyed_union_uses_discriminant() {
        let ts = parse_schema(
            r#"type R union { | String "error" | Int "count" } representation keyed"#,
        )
        .unwrap();
        let r = ts.type_by_name("R").unwrap();
        let repr = to_representation(r, &Node::map([("Int", Node::Int(3))])).unwrap();
        assert_eq!(repr, Node::map([("count", Node::Int(3))]));
    }

    #[test]
    fn union_with_two_entries_is_rejected() {
        let ts = parse_schema(
            r#"type R union { | String "s" | Int "i" } representation keyed"#,
        )
        .unwrap();
        let r = ts.type_by_name("R").unwrap();
        let node = Node::map([("String", Node::from("a")), ("Int", Node::Int(1))]);
        assert_eq!(
            to_representation(r, &node),
            Err(AssembleError::UnionArity {
                type_name: "R".into(),
                count: 2
            })
        );
    }
}
