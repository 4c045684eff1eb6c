use tree_patch_codec::{CodecError, Decoder, Encoder, JsonCodec};
use tree_patch_node::{AssembleError, Kind, Link, Node, NodeBuilder, Prototype};
use tree_patch_schema::parse_schema;

fn decode_node(codec: JsonCodec, bytes: &[u8]) -> Node {
    let mut nb = NodeBuilder::new();
    codec.decode_bytes(bytes, &mut nb).unwrap();
    nb.build().unwrap()
}

#[test]
fn dag_json_round_trips_links_and_bytes() {
    let node = Node::map([
        ("root", Node::Link(Link::new("bafyreib4pff766vhpbxbhjbqqnsh5emeznvujayjj4z2iu533cprgbz23m"))),
        ("blob", Node::Bytes(vec![0, 1, 2, 250])),
        ("plain", Node::List(vec![Node::from("x"), Node::Int(-7)])),
    ]);
    let codec = JsonCodec::dag();
    let bytes = codec.encode_to_vec(&node).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains(r#""root":{"/":"bafyreib4"#), "{text}");
    assert!(text.contains(r#""blob":{"/":{"bytes":"AAEC+g"}}"#), "{text}");
    assert_eq!(decode_node(codec, &bytes), node);
}

#[test]
fn plain_json_cannot_encode_links() {
    let node = Node::List(vec![Node::Link(Link::new("bafy"))]);
    let err = JsonCodec::plain().encode_to_vec(&node).unwrap_err();
    assert!(matches!(err, CodecError::Json(_)));
    assert!(err.to_string().contains("DAG-JSON"));
}

#[test]
fn plain_json_writes_bytes_as_base64_strings() {
    let node = Node::Bytes(b"hello".to_vec());
    let out = JsonCodec::plain().encode_to_vec(&node).unwrap();
    assert_eq!(out, br#""aGVsbG8=""#);
}

#[test]
fn non_finite_floats_are_not_encoded() {
    assert!(JsonCodec::plain().encode_to_vec(&Node::Float(f64::NAN)).is_err());
}

#[test]
fn schema_builder_errors_keep_their_type() {
    let ts = parse_schema("type Names [String]").unwrap();
    let mut builder = Prototype::new(&ts, "Names").unwrap().representation().new_builder();
    let err = JsonCodec::plain()
        .decode_bytes(br#"["a", 1]"#, &mut builder)
        .unwrap_err();
    assert_eq!(
        err.assemble_error(),
        Some(&AssembleError::WrongKind {
            type_name: "String".into(),
            expected: Kind::String,
            actual: Kind::Int,
        })
    );
}

#[test]
fn decoding_drives_representation_view() {
    let ts = parse_schema(
        r#"
        type Tag enum { | first ("1st") | second ("2nd") }
        type Entry struct { tag Tag (rename "t") }
        "#,
    )
    .unwrap();
    let mut builder = Prototype::new(&ts, "Entry").unwrap().representation().new_builder();
    JsonCodec::plain()
        .decode(&mut &br#"{"t": "2nd"}"#[..], &mut builder)
        .unwrap();
    assert_eq!(builder.build().unwrap(), Node::map([("tag", Node::from("second"))]));
}

#[test]
fn empty_input_is_an_error() {
    let mut nb = NodeBuilder::new();
    assert!(JsonCodec::plain().decode_bytes(b"   ", &mut nb).is_err());
    assert!(nb.build().is_err());
}
