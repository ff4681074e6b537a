//! Tag table: tag string -> decode function.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TransitError, DECODER_ARITY_MESSAGE};
use crate::node::Node;
use crate::value::Value;

use super::DecodeCtx;

/// Built-in decode function. Receives the payload (for a directive, a
/// string node holding everything after the two-character prefix), the
/// decode context, and the `as_map_key` flag of the enclosing node.
pub type BuiltinFn = for<'a> fn(&Node, &mut DecodeCtx<'a>, bool) -> Result<Value>;

/// User function behind an [`Extension`]. Receives its payload nodes raw.
pub type ExtensionFn = dyn Fn(&[Node]) -> Result<Value> + Send + Sync;

/// A user-supplied decoder together with the number of payload arguments
/// it consumes.
#[derive(Clone)]
pub struct Extension {
    arity: usize,
    decode_fn: Arc<ExtensionFn>,
}

impl Extension {
    pub fn new<F>(arity: usize, decode_fn: F) -> Self
    where
        F: Fn(&[Node]) -> Result<Value> + Send + Sync + 'static,
    {
        Extension {
            arity,
            decode_fn: Arc::new(decode_fn),
        }
    }

    /// Extension taking exactly one payload.
    pub fn unary<F>(decode_fn: F) -> Self
    where
        F: Fn(&Node) -> Result<Value> + Send + Sync + 'static,
    {
        Extension::new(1, move |args| decode_fn(&args[0]))
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn call(&self, payload: &Node) -> Result<Value> {
        (self.decode_fn)(std::slice::from_ref(payload))
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// Rejects extensions that do not take exactly one payload.
pub fn assert_arity(extension: &Extension) -> Result<()> {
    if extension.arity() == 1 {
        Ok(())
    } else {
        Err(TransitError::ExtensionArity(DECODER_ARITY_MESSAGE.to_string()))
    }
}

#[derive(Clone)]
pub enum TagDecoder {
    Builtin(BuiltinFn),
    Extension(Extension),
}

impl fmt::Debug for TagDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagDecoder::Builtin(_) => f.write_str("Builtin"),
            TagDecoder::Extension(ext) => ext.fmt(f),
        }
    }
}

/// Map of directive prefix or structural tag key -> decoder.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    decoders: HashMap<String, TagDecoder>,
}

impl TagTable {
    /// Empty table: every string decodes as itself and every map as a map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with every built-in directive and structural tag.
    pub fn builtin() -> Self {
        let mut table = TagTable::new();
        for (tag, f) in super::builtins::decoders() {
            table.insert(tag, TagDecoder::Builtin(f));
        }
        table
    }

    /// Adds or replaces an entry, returning the previous one.
    pub fn insert(&mut self, tag: impl Into<String>, decoder: TagDecoder) -> Option<TagDecoder> {
        self.decoders.insert(tag.into(), decoder)
    }

    pub fn get(&self, tag: &str) -> Option<&TagDecoder> {
        self.decoders.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    pub fn remove(&mut self, tag: &str) -> Option<TagDecoder> {
        self.decoders.remove(tag)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }
}
