//! Recursive Transit decoder.
//!
//! [`Decoder::decode`] walks a [`Node`] tree and materializes a [`Value`]:
//!
//! - arrays decode element-wise, keeping the caller's `as_map_key` flag;
//! - a one-entry map whose decoded key is a known tag is handed to that
//!   tag's decoder, every other map decodes as a generic map;
//! - strings pass through the rolling cache, then the escape rule, then
//!   directive lookup;
//! - numbers, booleans and null come back unchanged.
//!
//! Unknown tags are not errors. A one-entry map keyed by an unregistered
//! tag is ordinary data and decodes as a one-entry map.

mod builtins;
mod table;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::cache::RollingCache;
use crate::constants::{ESC, SUB, TAG};
use crate::error::{Result, TransitError};
use crate::node::Node;
use crate::value::Value;

pub use table::{assert_arity, BuiltinFn, Extension, ExtensionFn, TagDecoder, TagTable};

/// Default bound on node nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// Replaces the whole default tag table.
    pub decoders: TagTable,
    /// Deepest nesting accepted before decode fails with
    /// [`TransitError::DepthLimitExceeded`].
    pub max_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            decoders: TagTable::builtin(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Owns the tag table. Registration needs `&mut self`, decoding only
/// `&self`, so a configured decoder can be shared freely.
#[derive(Debug, Clone)]
pub struct Decoder {
    decoders: TagTable,
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Decoder {
            decoders: options.decoders,
            max_depth: options.max_depth,
        }
    }

    pub fn decoders(&self) -> &TagTable {
        &self.decoders
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Adds or replaces the decoder for `tag`.
    ///
    /// Fails with [`TransitError::ExtensionArity`] unless the extension
    /// takes exactly one payload; the table is left untouched in that case.
    pub fn register(&mut self, tag: impl Into<String>, extension: Extension) -> Result<()> {
        assert_arity(&extension)?;
        let tag = tag.into();
        let replaced = self
            .decoders
            .insert(tag.clone(), TagDecoder::Extension(extension))
            .is_some();
        debug!(tag = %tag, replaced, "registered tag decoder");
        Ok(())
    }

    /// Decodes a document root.
    pub fn decode(&self, node: &Node, cache: &mut RollingCache) -> Result<Value> {
        self.decode_as(node, cache, false)
    }

    pub fn decode_as(
        &self,
        node: &Node,
        cache: &mut RollingCache,
        as_map_key: bool,
    ) -> Result<Value> {
        DecodeCtx::new(self, cache).decode(node, as_map_key)
    }
}

/// State threaded through one decode: the decoder, the document's rolling
/// cache, and the current nesting depth.
pub struct DecodeCtx<'a> {
    decoder: &'a Decoder,
    cache: &'a mut RollingCache,
    depth: usize,
}

impl<'a> DecodeCtx<'a> {
    pub fn new(decoder: &'a Decoder, cache: &'a mut RollingCache) -> Self {
        DecodeCtx {
            decoder,
            cache,
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn decode(&mut self, node: &Node, as_map_key: bool) -> Result<Value> {
        if self.depth >= self.decoder.max_depth {
            return Err(TransitError::DepthLimitExceeded(self.decoder.max_depth));
        }
        self.depth += 1;
        let result = self.decode_node(node, as_map_key);
        self.depth -= 1;
        result
    }

    fn decode_node(&mut self, node: &Node, as_map_key: bool) -> Result<Value> {
        match node {
            Node::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.decode(item, as_map_key))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Node::Map(entries) => self.decode_map(entries, as_map_key),
            Node::String(s) => self.decode_string(s, as_map_key),
            Node::Null => Ok(Value::Null),
            Node::Bool(b) => Ok(Value::Bool(*b)),
            Node::Int(i) => Ok(Value::Integer(*i)),
            Node::Float(f) => Ok(Value::Float(*f)),
        }
    }

    fn decode_map(&mut self, entries: &[(Node, Node)], as_map_key: bool) -> Result<Value> {
        if let [(key_node, payload)] = entries {
            let key = self.decode(key_node, true)?;
            if let Some(tag) = key.as_str() {
                let decoder: &'a Decoder = self.decoder;
                if let Some(decoder) = decoder.decoders.get(tag) {
                    trace!(tag, "tagged value");
                    return self.call(decoder, payload, as_map_key);
                }
                if tag.starts_with(TAG) {
                    trace!(tag, "unknown tag, decoding as map");
                }
            }
            let value = self.decode(payload, false)?;
            return Ok(Value::Map(IndexMap::from([(key, value)])));
        }

        let mut map = IndexMap::with_capacity(entries.len());
        for (k, v) in entries {
            let key = self.decode(k, true)?;
            let value = self.decode(v, false)?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    /// Cache participation, then literal parsing.
    ///
    /// Eligibility is tested before token shape: a cacheable string is
    /// registered and parsed as written even if it starts with `^`.
    pub fn decode_string(&mut self, s: &str, as_map_key: bool) -> Result<Value> {
        if RollingCache::is_cacheable(s, as_map_key) {
            self.cache.register(s);
            self.parse_string(s, as_map_key)
        } else if RollingCache::is_cache_key(s) {
            let cached = self.cache.resolve(s)?.to_string();
            self.parse_string(&cached, as_map_key)
        } else {
            self.parse_string(s, as_map_key)
        }
    }

    /// Escaped literal, then directive, then plain string.
    pub fn parse_string(&mut self, s: &str, as_map_key: bool) -> Result<Value> {
        if let Some(literal) = unescape(s) {
            return Ok(Value::String(literal.to_string()));
        }
        if let Some((prefix, rest)) = split_directive(s) {
            let decoder: &'a Decoder = self.decoder;
            if let Some(decoder) = decoder.decoders.get(prefix) {
                trace!(directive = prefix, "directive");
                return self.call(decoder, &Node::String(rest.to_string()), as_map_key);
            }
        }
        Ok(Value::String(s.to_string()))
    }

    fn call(&mut self, decoder: &TagDecoder, payload: &Node, as_map_key: bool) -> Result<Value> {
        match decoder {
            TagDecoder::Builtin(f) => f(payload, self, as_map_key),
            TagDecoder::Extension(extension) => extension.call(payload),
        }
    }
}

/// `~~...` and `~^...` lose their first character.
fn unescape(s: &str) -> Option<&str> {
    s.strip_prefix(ESC)
        .filter(|rest| rest.starts_with(ESC) || rest.starts_with(SUB))
}

/// Splits off the first two characters. `None` for shorter strings.
fn split_directive(s: &str) -> Option<(&str, &str)> {
    let mut offsets = s.char_indices().map(|(i, _)| i);
    offsets.nth(1)?;
    let end = offsets.next().unwrap_or(s.len());
    Some(s.split_at(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(node: Node) -> Result<Value> {
        Decoder::new().decode(&node, &mut RollingCache::new())
    }

    fn map(entries: Vec<(Node, Node)>) -> Node {
        Node::Map(entries)
    }

    #[test]
    fn split_directive_counts_chars() {
        assert_eq!(split_directive("~:foo"), Some(("~:", "foo")));
        assert_eq!(split_directive("~:"), Some(("~:", "")));
        assert_eq!(split_directive("~"), None);
        assert_eq!(split_directive("é€x"), Some(("é€", "x")));
    }

    #[test]
    fn escaped_strings_drop_one_marker() {
        assert_eq!(decode(Node::from("~~:foo")).unwrap(), Value::from("~:foo"));
        assert_eq!(decode(Node::from("~^0")).unwrap(), Value::from("^0"));
        assert_eq!(decode(Node::from("~~~")).unwrap(), Value::from("~~"));
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(decode(Node::Null).unwrap(), Value::Null);
        assert_eq!(decode(Node::Bool(true)).unwrap(), Value::Bool(true));
        assert_eq!(decode(Node::Int(-3)).unwrap(), Value::Integer(-3));
        assert_eq!(decode(Node::Float(0.5)).unwrap(), Value::Float(0.5));
    }

    #[test]
    fn non_string_single_key_is_not_a_tag() {
        let node = map(vec![(Node::from("~:set"), Node::Int(1))]);
        let expected = Value::Map(IndexMap::from([(Value::keyword("set"), Value::Integer(1))]));
        assert_eq!(decode(node).unwrap(), expected);
    }

    #[test]
    fn multi_entry_map_never_dispatches() {
        let node = map(vec![
            (Node::from("~#set"), Node::Array(vec![])),
            (Node::from("b"), Node::Int(2)),
        ]);
        let Value::Map(m) = decode(node).unwrap() else {
            panic!("expected map");
        };
        assert_eq!(m.get(&Value::from("~#set")), Some(&Value::Array(vec![])));
    }

    #[test]
    fn depth_limit() {
        let mut node = Node::Int(0);
        for _ in 0..10 {
            node = Node::Array(vec![node]);
        }
        let decoder = Decoder::with_options(DecoderOptions {
            max_depth: 5,
            ..DecoderOptions::default()
        });
        let err = decoder.decode(&node, &mut RollingCache::new()).unwrap_err();
        assert_eq!(err, TransitError::DepthLimitExceeded(5));
        assert!(Decoder::new().decode(&node, &mut RollingCache::new()).is_ok());
    }

    #[test]
    fn empty_table_decodes_everything_literally() {
        let decoder = Decoder::with_options(DecoderOptions {
            decoders: TagTable::new(),
            ..DecoderOptions::default()
        });
        let node = map(vec![(Node::from("~#set"), Node::Array(vec![Node::from("~:a")]))]);
        let value = decoder.decode(&node, &mut RollingCache::new()).unwrap();
        let expected = Value::Map(IndexMap::from([(
            Value::from("~#set"),
            Value::Array(vec![Value::from("~:a")]),
        )]));
        assert_eq!(value, expected);
    }
}
