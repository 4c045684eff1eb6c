use std::collections::BTreeMap;

use serde_json::json;
use tree_patch_node::{to_representation, AssembleError, Node, NodeAssembler, Prototype, TypedNode};
use tree_patch_schema::{
    parse_schema, ScalarKind, StructField, StructRepr, StructType, TypeDef, TypeSystem, UnionRepr,
    UnionType,
};

fn alpha_beta_gamma() -> TypeSystem {
    let mut ts = TypeSystem::new();
    ts.accumulate("String", TypeDef::Scalar(ScalarKind::String)).unwrap();
    ts.accumulate(
        "Alpha",
        TypeDef::Struct(StructType {
            fields: vec![StructField::new("beta", "Beta")],
            repr: StructRepr::default(),
        }),
    )
    .unwrap();
    ts.accumulate(
        "Beta",
        TypeDef::Union(UnionType {
            members: vec!["Gamma".into()],
            repr: UnionRepr::StringPrefix {
                delimiter: ":".into(),
                discriminants: BTreeMap::from([("gamma".to_string(), "Gamma".to_string())]),
            },
        }),
    )
    .unwrap();
    ts.accumulate("Gamma", TypeDef::Scalar(ScalarKind::String)).unwrap();
    ts.validate().unwrap();
    ts
}

fn gamma_and_beta(ts: &TypeSystem) -> (TypedNode, TypedNode) {
    let mut gamma = Prototype::new(ts, "Gamma").unwrap().new_builder();
    gamma.assign_string("ok").unwrap();
    let gamma = gamma.build_typed().unwrap();

    let mut beta = Prototype::new(ts, "Beta").unwrap().new_builder();
    beta.begin_map(Some(1)).unwrap();
    beta.assemble_key("Gamma").unwrap();
    beta.assign_typed(&gamma).unwrap();
    beta.finish_map().unwrap();
    (gamma, beta.build_typed().unwrap())
}

fn alpha_through(proto: Prototype<'_>, beta: &TypedNode) -> Result<Node, AssembleError> {
    let mut alpha = proto.new_builder();
    alpha.begin_map(Some(1))?;
    alpha.assemble_key("beta")?;
    alpha.assign_typed(beta)?;
    alpha.finish_map()?;
    alpha.build()
}

#[test]
fn union_nested_in_struct_builds_through_typed_view() {
    let ts = alpha_beta_gamma();
    let (gamma, beta) = gamma_and_beta(&ts);
    assert_eq!(gamma.node, Node::from("ok"));
    assert_eq!(beta.node, Node::map([("Gamma", Node::from("ok"))]));

    let alpha = alpha_through(Prototype::new(&ts, "Alpha").unwrap(), &beta).unwrap();
    assert_eq!(alpha, Node::from(json!({"beta": {"Gamma": "ok"}})));
}

#[test]
fn union_nested_in_struct_builds_through_representation_view() {
    let ts = alpha_beta_gamma();
    let (_, beta) = gamma_and_beta(&ts);
    let typed = alpha_through(Prototype::new(&ts, "Alpha").unwrap(), &beta).unwrap();
    let repr = alpha_through(Prototype::new(&ts, "Alpha").unwrap().representation(), &beta).unwrap();
    assert_eq!(repr, typed);
}

#[test]
fn representation_of_nested_union_is_prefixed_string() {
    let ts = alpha_beta_gamma();
    let alpha = ts.type_by_name("Alpha").unwrap();
    let node = Node::from(json!({"beta": {"Gamma": "ok"}}));
    assert_eq!(
        to_representation(alpha, &node).unwrap(),
        Node::from(json!({"beta": "gamma:ok"}))
    );
}

#[test]
fn wire_string_decodes_into_typed_union() {
    let ts = alpha_beta_gamma();
    let mut alpha = Prototype::new(&ts, "Alpha").unwrap().representation().new_builder();
    alpha.assign_node(&Node::from(json!({"beta": "gamma:ok"}))).unwrap();
    assert_eq!(
        alpha.build().unwrap(),
        Node::from(json!({"beta": {"Gamma": "ok"}}))
    );

    let mut alpha = Prototype::new(&ts, "Alpha").unwrap().representation().new_builder();
    let err = alpha
        .assign_node(&Node::from(json!({"beta": "delta:ok"})))
        .unwrap_err();
    assert!(matches!(err, AssembleError::UnknownDiscriminant { .. }), "{err:?}");
}

#[test]
fn non_string_member_cannot_go_through_stringprefix() {
    let ts = parse_schema(
        r#"
        type Alpha struct { beta Beta }
        type Beta union { | Gamma "gamma" | Delta "delta" } representation stringprefix ":"
        type Gamma string
        type Delta struct { n Int }
        "#,
    )
    .unwrap();
    let mut delta = Prototype::new(&ts, "Delta").unwrap().new_builder();
    delta.assign_node(&Node::from(json!({"n": 1}))).unwrap();
    let delta = delta.build_typed().unwrap();

    let mut beta = Prototype::new(&ts, "Beta").unwrap().new_builder();
    beta.begin_map(Some(1)).unwrap();
    beta.assemble_key("Delta").unwrap();
    beta.assign_typed(&delta).unwrap();
    beta.finish_map().unwrap();
    let beta = beta.build_typed().unwrap();

    let err = alpha_through(Prototype::new(&ts, "Alpha").unwrap().representation(), &beta).unwrap_err();
    match err {
        AssembleError::UnsupportedAssignment {
            type_name, strategy, ..
        } => {
            assert_eq!(type_name, "Beta");
            assert_eq!(strategy, "stringprefix");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
