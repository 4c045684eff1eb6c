use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tree_patch_node::Node;

use crate::json::DAG_BASE64;

/// A node rendered for one JSON flavour.
pub(crate) struct JsonView<'a> {
    node: &'a Node,
    dag: bool,
}

impl<'a> JsonView<'a> {
    pub fn new(node: &'a Node, dag: bool) -> Self {
        Self { node, dag }
    }

    fn child(&self, node: &'a Node) -> Self {
        Self { node, dag: self.dag }
    }
}

impl Serialize for JsonView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Node::Float(f) => Err(ser::Error::custom(format!("{f} has no JSON form"))),
            Node::String(s) => serializer.serialize_str(s),
            Node::Bytes(b) if self.dag => {
                let envelope = BTreeMap::from([("bytes", DAG_BASE64.encode(b))]);
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("/", &envelope)?;
                map.end()
            }
            Node::Bytes(b) => serializer.serialize_str(&STANDARD.encode(b)),
            Node::Link(link) if self.dag => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("/", link.as_str())?;
                map.end()
            }
            Node::Link(link) => Err(ser::Error::custom(format!(
                "link {link} needs the DAG-JSON codec"
            ))),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                if self.dag && entries.contains_key("/") {
                    return Err(ser::Error::custom(r#"the "/" key is reserved in DAG-JSON"#));
                }
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, &self.child(v))?;
                }
                map.end()
            }
        }
    }
}
