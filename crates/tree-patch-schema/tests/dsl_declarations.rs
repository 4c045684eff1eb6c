use tree_patch_schema::{parse_schema, Kind, SchemaError, StructRepr, TypeDef, UnionRepr};

const PATCH_SCHEMA: &str = r#"
    type Op enum {
        | add
        | remove
        | replace
        | move
        | copy
        | test
    }
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

#[test]
fn patch_schema_declares_every_type() {
    let ts = parse_schema(PATCH_SCHEMA).unwrap();
    for name in [
        "Op",
        "Operation",
        "OperationSequence",
        "Instruction",
        "InstructionResult",
        "Error",
        "Map__String__String",
    ] {
        assert!(ts.type_by_name(name).is_some(), "missing {name}");
    }
}

#[test]
fn operation_fields_keep_optionality() {
    let ts = parse_schema(PATCH_SCHEMA).unwrap();
    let TypeDef::Struct(op) = ts.type_by_name("Operation").unwrap().def() else {
        panic!("Operation should be a struct");
    };
    let flags: Vec<(&str, bool)> = op
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.optional))
        .collect();
    assert_eq!(
        flags,
        vec![("op", false), ("path", false), ("value", true), ("from", true)]
    );
}

#[test]
fn keyed_union_resolves_discriminants() {
    let ts = parse_schema(PATCH_SCHEMA).unwrap();
    let result = ts.type_by_name("InstructionResult").unwrap();
    assert_eq!(result.representation_kind(), Some(Kind::Map));
    let TypeDef::Union(u) = result.def() else {
        panic!("InstructionResult should be a union");
    };
    assert_eq!(u.repr.strategy(), "keyed");
    assert_eq!(u.repr.discriminant_for("Error"), Some("error"));
    assert_eq!(u.repr.discriminant_for("Link"), Some("result"));
}

#[test]
fn renames_land_in_representation() {
    let ts = parse_schema(
        r#"
        type Op enum { | add ("ADD") | remove }
        type Step struct { op Op (rename "o") }
        "#,
    )
    .unwrap();
    let TypeDef::Struct(step) = ts.type_by_name("Step").unwrap().def() else {
        panic!("Step should be a struct");
    };
    let StructRepr::Map { renames } = &step.repr;
    assert_eq!(renames.get("op").map(String::as_str), Some("o"));
    let TypeDef::Enum(op) = ts.type_by_name("Op").unwrap().def() else {
        panic!("Op should be an enum");
    };
    assert_eq!(op.wire_name("add"), "ADD");
}

#[test]
fn stringprefix_union_carries_delimiter() {
    let ts = parse_schema(
        r#"
        type Beta union { | Gamma "gamma" } representation stringprefix ":"
        type Gamma string
        "#,
    )
    .unwrap();
    let TypeDef::Union(u) = ts.type_by_name("Beta").unwrap().def() else {
        panic!("Beta should be a union");
    };
    match &u.repr {
        UnionRepr::StringPrefix { delimiter, .. } => assert_eq!(delimiter, ":"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn undeclared_reference_is_rejected() {
    let err = parse_schema("type Seq [Missing]").unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownType {
            referenced_by: "Seq".into(),
            name: "Missing".into()
        }
    );
}

#[test]
fn duplicate_declaration_is_rejected() {
    let err = parse_schema("type A string\ntype A bool").unwrap_err();
    assert_eq!(err, SchemaError::DuplicateType("A".into()));
}

#[test]
fn union_member_without_discriminant_is_rejected() {
    let err = parse_schema(r#"type U union { | Missing "m" } representation keyed"#).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownType { .. }));
}

#[test]
fn colliding_wire_names_are_rejected() {
    let err = parse_schema(r#"type Op enum { | add ("x") | remove ("x") }"#).unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateWireName {
            type_name: "Op".into(),
            wire: "x".into()
        }
    );

    let err = parse_schema(
        r#"
        type Step struct {
            at String (rename "path")
            path String
        }
        "#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateWireName {
            type_name: "Step".into(),
            wire: "path".into()
        }
    );
}
