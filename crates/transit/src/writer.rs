//! Encode direction: [`Value`] -> [`Node`] -> JSON.
//!
//! Strings go through a write-side [`RollingCache`] in exactly the order
//! the decoder will visit them, so the tokens emitted here resolve on the
//! other side.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Display;

use crate::cache::RollingCache;
use crate::constants::{directives, tags, ESC, SUB};
use crate::error::Result;
use crate::node::Node;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct WriterOptions {
    /// Emit instants as `~m<millis>` instead of `~t<ISO-8601>`. Drops any
    /// sub-millisecond part.
    pub instant_as_millis: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Writer {
    options: WriterOptions,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Writer { options }
    }

    /// Encodes one document with its own cache. A root that is neither a
    /// map nor an array is wrapped in the quote tag.
    pub fn write_node(&self, value: &Value) -> Result<Node> {
        let mut cache = RollingCache::new();
        let mut emitter = Emitter {
            cache: &mut cache,
            options: &self.options,
        };
        if is_composite(value) {
            emitter.emit(value, false)
        } else {
            emitter.tagged(tags::QUOTE, |e| e.emit(value, false))
        }
    }

    pub fn write_json(&self, value: &Value) -> Result<serde_json::Value> {
        self.write_node(value)?.to_json()
    }

    pub fn write_string(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(&self.write_json(value)?)?)
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(
        value,
        Value::Map(_)
            | Value::Array(_)
            | Value::Set(_)
            | Value::List(_)
            | Value::TypedArray(_)
    )
}

/// Keys that encode to a string node and can therefore sit in a plain map.
fn is_string_key(key: &Value) -> bool {
    match key {
        Value::String(_)
        | Value::Keyword(_)
        | Value::Symbol(_)
        | Value::BigInt(_)
        | Value::BigDecimal(_)
        | Value::Char(_)
        | Value::Uri(_)
        | Value::Uuid(_)
        | Value::Instant(_)
        | Value::Bytes(_) => true,
        Value::Float(f) => !f.is_finite(),
        _ => false,
    }
}

fn directive(prefix: &str, body: impl Display) -> String {
    format!("{prefix}{body}")
}

struct Emitter<'a> {
    cache: &'a mut RollingCache,
    options: &'a WriterOptions,
}

impl Emitter<'_> {
    fn string(&mut self, s: &str, as_map_key: bool) -> Node {
        Node::String(self.cache.write(s, as_map_key))
    }

    /// One-entry map `{tag: payload}`; the tag is written first, as a key.
    fn tagged<F>(&mut self, tag: &str, payload: F) -> Result<Node>
    where
        F: FnOnce(&mut Self) -> Result<Node>,
    {
        let key = self.string(tag, true);
        let value = payload(self)?;
        Ok(Node::Map(vec![(key, value)]))
    }

    fn items<'v>(
        &mut self,
        values: impl IntoIterator<Item = &'v Value>,
        as_map_key: bool,
    ) -> Result<Node> {
        values
            .into_iter()
            .map(|v| self.emit(v, as_map_key))
            .collect::<Result<Vec<_>>>()
            .map(Node::Array)
    }

    fn emit(&mut self, value: &Value, as_map_key: bool) -> Result<Node> {
        Ok(match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Integer(i) => Node::Int(*i),
            Value::Float(f) if f.is_finite() => Node::Float(*f),
            Value::Float(f) => {
                let body = if f.is_nan() {
                    "NaN"
                } else if *f > 0.0 {
                    "INF"
                } else {
                    "-INF"
                };
                self.string(&directive(directives::SPECIAL_NUMBER, body), as_map_key)
            }
            Value::String(s) => {
                if s.starts_with(ESC) || s.starts_with(SUB) {
                    self.string(&directive(ESC.encode_utf8(&mut [0; 4]), s), as_map_key)
                } else {
                    self.string(s, as_map_key)
                }
            }
            Value::Keyword(k) => self.string(&directive(directives::KEYWORD, k.name()), as_map_key),
            Value::Symbol(s) => self.string(&directive(directives::SYMBOL, s.name()), as_map_key),
            Value::BigInt(n) => self.string(&directive(directives::BIG_INTEGER, n), as_map_key),
            Value::BigDecimal(d) => self.string(&directive(directives::BIG_DECIMAL, d), as_map_key),
            Value::Char(c) => self.string(&directive(directives::CHAR, c), as_map_key),
            Value::Uri(u) => self.string(&directive(directives::URI, u), as_map_key),
            Value::Uuid(u) => self.string(&directive(directives::UUID, u), as_map_key),
            Value::Instant(t) if self.options.instant_as_millis => {
                self.string(&directive(directives::INSTANT_MILLIS, t.as_millis()), as_map_key)
            }
            Value::Instant(t) => self.string(&directive(directives::INSTANT, t), as_map_key),
            Value::Bytes(b) => {
                self.string(&directive(directives::BYTES, STANDARD.encode(b)), as_map_key)
            }
            Value::TypedArray(a) => {
                self.tagged(a.kind.tag(), |e| e.items(&a.values, as_map_key))?
            }
            Value::Set(set) => self.tagged(tags::SET, |e| e.items(set, as_map_key))?,
            Value::List(items) => self.tagged(tags::LIST, |e| e.items(items, as_map_key))?,
            Value::Array(items) => self.items(items, as_map_key)?,
            Value::Map(map) => {
                // A lone `~`-prefixed string key could be read back as a tag.
                let tag_shaped = map.len() == 1
                    && map
                        .keys()
                        .any(|k| matches!(k, Value::String(s) if s.starts_with(ESC)));
                if map.keys().all(is_string_key) && !tag_shaped {
                    let mut entries = Vec::with_capacity(map.len());
                    for (k, v) in map {
                        let key = self.emit(k, true)?;
                        let value = self.emit(v, false)?;
                        entries.push((key, value));
                    }
                    Node::Map(entries)
                } else {
                    let flat = map.iter().flat_map(|(k, v)| [k, v]);
                    self.tagged(tags::CMAP, |e| e.items(flat, as_map_key))?
                }
            }
        })
    }
}
