//! Forwarding serde_json's parse events to a node assembler.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use tree_patch_node::{AssembleError, Link, NodeAssembler};

use crate::json::DAG_BASE64;

pub(crate) struct Sink<'a> {
    pub asm: &'a mut dyn NodeAssembler,
    pub dag: bool,
    /// The assembler error that aborted parsing, kept with its type.
    pub failure: Option<AssembleError>,
}

impl Sink<'_> {
    fn feed<E, F>(&mut self, call: F) -> Result<(), E>
    where
        E: de::Error,
        F: FnOnce(&mut dyn NodeAssembler) -> Result<(), AssembleError>,
    {
        call(&mut *self.asm).map_err(|err| {
            let wrapped = E::custom(&err);
            self.failure = Some(err);
            wrapped
        })
    }

    /// `{"/": ...}` in DAG-JSON: a link or a bytes envelope.
    fn reserved<E: de::Error>(&mut self, value: Value) -> Result<(), E> {
        match value {
            Value::String(cid) => {
                let link = Link::new(cid);
                self.feed(|asm| asm.assign_link(&link))
            }
            Value::Object(inner) => match inner.get("bytes") {
                Some(Value::String(encoded)) if inner.len() == 1 => {
                    use base64::Engine;
                    let bytes = DAG_BASE64
                        .decode(encoded)
                        .map_err(|e| E::custom(format!("invalid bytes envelope: {e}")))?;
                    self.feed(|asm| asm.assign_bytes(&bytes))
                }
                _ => Err(E::custom(r#"expected {"bytes": "<base64>"} under "/""#)),
            },
            _ => Err(E::custom(r#"expected a CID string or bytes envelope under "/""#)),
        }
    }
}

/// One value's worth of events.
pub(crate) struct Events<'s, 'a>(pub &'s mut Sink<'a>);

impl<'de> DeserializeSeed<'de> for Events<'_, '_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for Events<'_, '_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.0.feed(|asm| asm.assign_null())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.0.feed(|asm| asm.assign_bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.0.feed(|asm| asm.assign_int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("integer {v} does not fit in i64")))?;
        self.0.feed(|asm| asm.assign_int(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.0.feed(|asm| asm.assign_float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.0.feed(|asm| asm.assign_string(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let sink = self.0;
        let hint = seq.size_hint();
        sink.feed::<A::Error, _>(|asm| asm.begin_list(hint))?;
        while seq.next_element_seed(Events(&mut *sink))?.is_some() {}
        sink.feed(|asm| asm.finish_list())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let sink = self.0;
        let mut key = map.next_key::<String>()?;
        if sink.dag && key.as_deref() == Some("/") {
            let value: Value = map.next_value()?;
            if map.next_key::<String>()?.is_some() {
                return Err(de::Error::custom(r#"a "/" entry must be the only entry of its map"#));
            }
            return sink.reserved(value);
        }
        let hint = map.size_hint();
        sink.feed::<A::Error, _>(|asm| asm.begin_map(hint))?;
        while let Some(k) = key {
            if sink.dag && k == "/" {
                return Err(de::Error::custom(r#"a "/" entry must be the only entry of its map"#));
            }
            sink.feed::<A::Error, _>(|asm| asm.assemble_key(&k))?;
            map.next_value_seed(Events(&mut *sink))?;
            key = map.next_key()?;
        }
        sink.feed(|asm| asm.finish_map())
    }
}
