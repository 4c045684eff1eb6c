//! Domain operations back to the wire form.

use std::io::Write;

use tree_patch_codec::Encoder;
use tree_patch_node::Node;

use crate::error::{EncodeError, InvalidSegment};
use crate::model::Operation;

impl Operation {
    /// The wire object for this operation. Absent fields are omitted.
    pub fn to_node(&self) -> Result<Node, InvalidSegment> {
        let mut entries = vec![
            ("op", Node::from(self.op.as_str())),
            ("path", Node::from(self.path.to_wire_string()?)),
        ];
        if let Some(value) = &self.value {
            entries.push(("value", value.clone()));
        }
        if let Some(from) = &self.from {
            entries.push(("from", Node::from(from.to_wire_string()?)));
        }
        Ok(Node::map(entries))
    }
}

/// An `OperationSequence` node.
pub fn to_wire(operations: &[Operation]) -> Result<Node, EncodeError> {
    operations
        .iter()
        .enumerate()
        .map(|(index, op)| op.to_node().map_err(|source| EncodeError::Path { index, source }))
        .collect::<Result<Vec<_>, _>>()
        .map(Node::List)
}

pub fn encode(operations: &[Operation], encoder: &dyn Encoder, writer: &mut dyn Write) -> Result<(), EncodeError> {
    encoder.encode(&to_wire(operations)?, writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Op, Path};
    use serde_json::json;
    use tree_patch_codec::JsonCodec;

    #[test]
    fn omits_absent_fields() {
        let ops = vec![
            Operation::new(Op::Remove, Path::parse("/a/0")),
            Operation::new(Op::Copy, Path::root()).with_from(Path::parse("/b")),
            Operation::new(Op::Test, Path::parse("/c")).with_value(Node::Null),
        ];
        assert_eq!(
            to_wire(&ops).unwrap(),
            Node::from(json!([
                {"op": "remove", "path": "/a/0"},
                {"op": "copy", "path": "", "from": "/b"},
                {"op": "test", "path": "/c", "value": null}
            ]))
        );
    }

    #[test]
    fn writes_through_an_encoder() {
        let ops = vec![Operation::new(Op::Add, Path::parse("/k")).with_value(1i64)];
        let mut out = Vec::new();
        encode(&ops, &JsonCodec::plain(), &mut out).unwrap();
        assert_eq!(out, br#"[{"op":"add","path":"/k","value":1}]"#);
    }

    #[test]
    fn paths_that_would_reparse_differently_are_refused() {
        let ops = vec![
            Operation::new(Op::Remove, Path::parse("/ok")),
            Operation::new(Op::Add, Path::from_iter(["a/b", ""])).with_value(1i64),
        ];
        match to_wire(&ops) {
            Err(EncodeError::Path { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source.segment, "a/b");
            }
            other => panic!("unexpected {other:?}"),
        }

        let moved = Operation::new(Op::Move, Path::parse("/to")).with_from(Path::from_iter(["x", ""]));
        let mut out = Vec::new();
        let err = encode(&[moved], &JsonCodec::plain(), &mut out).unwrap_err();
        assert!(matches!(err, EncodeError::Path { index: 0, .. }), "{err:?}");
        assert!(out.is_empty());
    }
}
