//! JSON text -> [`Value`], one fresh rolling cache per document.

use serde_json::Deserializer;
use tracing::debug;

use crate::cache::RollingCache;
use crate::decoder::{Decoder, Extension};
use crate::error::Result;
use crate::node::Node;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Reader {
    decoder: Decoder,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decoder(decoder: Decoder) -> Self {
        Reader { decoder }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// See [`Decoder::register`].
    pub fn register(&mut self, tag: impl Into<String>, extension: Extension) -> Result<()> {
        self.decoder.register(tag, extension)
    }

    pub fn read_node(&self, node: &Node) -> Result<Value> {
        let mut cache = RollingCache::new();
        let value = self.decoder.decode(node, &mut cache)?;
        debug!(root = node.kind(), cached = cache.len(), "read document");
        Ok(value)
    }

    pub fn read_json(&self, json: serde_json::Value) -> Result<Value> {
        self.read_node(&Node::from_json(json)?)
    }

    /// Reads exactly one document.
    pub fn read_str(&self, text: &str) -> Result<Value> {
        self.read_json(serde_json::from_str(text)?)
    }

    pub fn read_slice(&self, bytes: &[u8]) -> Result<Value> {
        self.read_json(serde_json::from_slice(bytes)?)
    }

    /// Reads a stream of concatenated or whitespace-separated documents.
    /// Each document starts with an empty cache.
    pub fn read_all(&self, text: &str) -> Result<Vec<Value>> {
        Deserializer::from_str(text)
            .into_iter::<serde_json::Value>()
            .map(|json| self.read_json(json?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransitError;

    #[test]
    fn map_as_array_form() {
        let value = Reader::new().read_str(r#"["^ ","~:a",1,"~:b",2]"#).unwrap();
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.get(&Value::keyword("a")), Some(&Value::Integer(1)));
        assert_eq!(map.get(&Value::keyword("b")), Some(&Value::Integer(2)));
    }

    #[test]
    fn cache_resets_between_documents() {
        let err = Reader::new()
            .read_all(r#"["~:long", "^0"] ["^0"]"#)
            .unwrap_err();
        assert_eq!(err, TransitError::CacheMiss("^0".to_string()));

        let docs = Reader::new()
            .read_all(r#"["~:long","^0"]  ["~:long"]"#)
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1], Value::Array(vec![Value::keyword("long")]));
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            Reader::new().read_str("{\"a\":"),
            Err(TransitError::Json(_))
        ));
        assert!(matches!(
            Reader::new().read_slice(br#"["^ ","~:a"]"#),
            Err(TransitError::Json(_))
        ));
    }
}
