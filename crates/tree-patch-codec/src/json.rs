//! JSON and DAG-JSON.
//!
//! Plain JSON has no link kind and no bytes kind: links cannot be encoded and
//! bytes are written as padded base64 strings (they read back as strings).
//! DAG-JSON reserves single-entry maps keyed `"/"`: `{"/": "<cid>"}` is a
//! link and `{"/": {"bytes": "<base64>"}}` is a byte string.

use std::io::{BufReader, Read, Write};

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::de::DeserializeSeed;
use tracing::trace;
use tree_patch_node::{Node, NodeAssembler};

use crate::error::CodecError;
use crate::events::{Events, Sink};
use crate::view::JsonView;
use crate::{Decoder, Encoder};

/// Unpadded standard base64 on output; padding optional on input.
pub(crate) const DAG_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    dag: bool,
    pretty: bool,
}

impl JsonCodec {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn dag() -> Self {
        Self {
            dag: true,
            pretty: false,
        }
    }

    /// Indent encoded output.
    pub fn pretty(self) -> Self {
        Self {
            pretty: true,
            ..self
        }
    }

    pub fn is_dag(&self) -> bool {
        self.dag
    }
}

impl Decoder for JsonCodec {
    fn decode(&self, reader: &mut dyn Read, asm: &mut dyn NodeAssembler) -> Result<(), CodecError> {
        let mut de = serde_json::Deserializer::from_reader(BufReader::new(reader));
        let mut sink = Sink {
            asm,
            dag: self.dag,
            failure: None,
        };
        let parsed = Events(&mut sink)
            .deserialize(&mut de)
            .and_then(|()| de.end());
        match parsed {
            Ok(()) => {
                trace!(dag = self.dag, "decoded document");
                Ok(())
            }
            Err(err) => Err(match sink.failure.take() {
                Some(source) => CodecError::Assemble {
                    source,
                    line: err.line(),
                    column: err.column(),
                },
                None => CodecError::Json(err),
            }),
        }
    }
}

impl Encoder for JsonCodec {
    fn encode(&self, node: &Node, writer: &mut dyn Write) -> Result<(), CodecError> {
        let view = JsonView::new(node, self.dag);
        if self.pretty {
            serde_json::to_writer_pretty(writer, &view)?;
        } else {
            serde_json::to_writer(writer, &view)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_patch_node::{AssembleError, Link, NodeBuilder};

    fn decode(codec: JsonCodec, text: &str) -> Result<Node, CodecError> {
        let mut nb = NodeBuilder::new();
        codec.decode_bytes(text.as_bytes(), &mut nb)?;
        Ok(nb.build().unwrap())
    }

    #[test]
    fn decodes_nested_document_in_order() {
        let node = decode(JsonCodec::plain(), r#"{"z": [1, -2, 2.5, null], "a": {"b": true}}"#).unwrap();
        let keys: Vec<&str> = node.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(
            node.lookup("z"),
            Some(&Node::List(vec![Node::Int(1), Node::Int(-2), Node::Float(2.5), Node::Null]))
        );
    }

    #[test]
    fn trailing_content_is_rejected() {
        let err = decode(JsonCodec::plain(), "[1] [2]").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)), "{err:?}");
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let err = decode(JsonCodec::plain(), "[9223372036854775808]").unwrap_err();
        assert!(err.to_string().contains("does not fit in i64"), "{err}");
    }

    #[test]
    fn duplicate_keys_surface_as_assemble_errors() {
        let err = decode(JsonCodec::plain(), "{\"a\": 1,\n \"a\": 2}").unwrap_err();
        match err {
            CodecError::Assemble { source, line, .. } => {
                assert_eq!(source, AssembleError::DuplicateKey { key: "a".into() });
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dag_reads_links_and_bytes() {
        let node = decode(
            JsonCodec::dag(),
            r#"[{"/": "bafyreia"}, {"/": {"bytes": "aGVsbG8"}}]"#,
        )
        .unwrap();
        assert_eq!(
            node,
            Node::List(vec![Node::Link(Link::new("bafyreia")), Node::Bytes(b"hello".to_vec())])
        );
    }

    #[test]
    fn plain_reads_slash_maps_as_maps() {
        let node = decode(JsonCodec::plain(), r#"{"/": "bafyreia"}"#).unwrap();
        assert_eq!(node, Node::map([("/", Node::from("bafyreia"))]));
    }

    #[test]
    fn dag_rejects_slash_next_to_other_keys() {
        assert!(decode(JsonCodec::dag(), r#"{"/": "bafy", "x": 1}"#).is_err());
        assert!(decode(JsonCodec::dag(), r#"{"x": 1, "/": "bafy"}"#).is_err());
    }

    #[test]
    fn encodes_compact_and_pretty() {
        let node = Node::map([("a", Node::List(vec![Node::Int(1), Node::Float(0.5)]))]);
        let compact = JsonCodec::plain().encode_to_vec(&node).unwrap();
        assert_eq!(compact, br#"{"a":[1,0.5]}"#);
        let pretty = JsonCodec::plain().pretty().encode_to_vec(&node).unwrap();
        assert!(String::from_utf8(pretty).unwrap().contains("\n  \"a\""));
    }
}
