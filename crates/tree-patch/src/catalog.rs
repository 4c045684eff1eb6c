//! The process-wide patch schema.

use std::sync::OnceLock;

use tracing::trace;
use tree_patch_schema::{parse_schema, TypeHandle, TypeSystem};

/// Declarations for operations, instructions and their results.
pub const SCHEMA: &str = r#"
# Op is the kind of edit an operation performs.
# The set follows JSON Patch.
type Op enum {
    | add
    | remove
    | replace
    | move
    | copy
    | test
}

# An operation says what to change, not which tree to change.
# Instruction pairs operations with the tree they apply to.
type Operation struct {
    op Op
    path String
    value optional Any
    from optional String
}
type OperationSequence [Operation]

type Instruction struct {
    startAt Link
    operations OperationSequence
}
type InstructionResult union {
    | Error "error"
    | Link "result"
} representation keyed
type Error struct {
    code String
    message String
    details {String:String}
}
"#;

static TYPE_SYSTEM: OnceLock<TypeSystem> = OnceLock::new();

/// The catalog, built on first use.
///
/// # Panics
///
/// If [`SCHEMA`] does not load. It is a constant, so this is a build defect
/// rather than a runtime condition.
pub fn type_system() -> &'static TypeSystem {
    TYPE_SYSTEM.get_or_init(|| match parse_schema(SCHEMA) {
        Ok(ts) => {
            trace!(types = ts.len(), "built patch schema catalog");
            ts
        }
        Err(err) => panic!("embedded patch schema is malformed: {err}"),
    })
}

pub fn lookup_type(name: &str) -> Option<TypeHandle<'static>> {
    type_system().type_by_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_patch_schema::{Kind, TypeDef};

    #[test]
    fn declares_every_wire_type() {
        for name in [
            "Op",
            "Operation",
            "OperationSequence",
            "Instruction",
            "InstructionResult",
            "Error",
        ] {
            assert!(lookup_type(name).is_some(), "{name} missing");
        }
        assert!(lookup_type("Nope").is_none());
    }

    #[test]
    fn result_union_is_keyed() {
        let result = lookup_type("InstructionResult").unwrap();
        assert_eq!(result.kind(), Some(Kind::Map));
        match result.def() {
            TypeDef::Union(u) => {
                assert_eq!(u.repr.strategy(), "keyed");
                assert_eq!(u.repr.discriminant_for("Link"), Some("result"));
                assert_eq!(u.repr.discriminant_for("Error"), Some("error"));
            }
            other => panic!("unexpected {}", other.describe()),
        }
    }

    #[test]
    fn catalog_is_built_once() {
        assert!(std::ptr::eq(type_system(), type_system()));
    }
}
