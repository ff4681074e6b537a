//! Per-document rolling cache.
//!
//! The writer replaces the second and later occurrences of a cacheable
//! string with a short token; the reader rebuilds the same table by
//! registering cacheable strings in the order it meets them. Nothing is
//! transmitted besides the tokens, so both sides must apply the same
//! eligibility rule in the same visiting order.
//!
//! Tokens are `^` followed by one or two digits from a 44-symbol alphabet
//! starting at `'0'`. The table holds at most 44 * 44 entries; registering
//! past that clears it and numbering restarts at zero.

use std::collections::HashMap;

use tracing::trace;

use crate::constants::{MAP_AS_ARRAY, SUB};
use crate::error::{Result, TransitError};

pub const CACHE_CODE_DIGITS: usize = 44;
pub const BASE_CHAR_INDEX: u32 = 48;
pub const CACHE_SIZE: usize = CACHE_CODE_DIGITS * CACHE_CODE_DIGITS;
pub const MIN_SIZE_CACHEABLE: usize = 4;

#[derive(Debug, Default, Clone)]
pub struct RollingCache {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

impl RollingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Map keys of four or more characters are always cacheable; other
    /// strings only when they are tag, symbol or keyword shaped.
    pub fn is_cacheable(s: &str, as_map_key: bool) -> bool {
        s.chars().nth(MIN_SIZE_CACHEABLE - 1).is_some()
            && (as_map_key || s.starts_with("~#") || s.starts_with("~$") || s.starts_with("~:"))
    }

    /// Whether `s` has the shape of a cache token.
    pub fn is_cache_key(s: &str) -> bool {
        s.starts_with(SUB) && s != MAP_AS_ARRAY
    }

    /// Registers `s` and returns its token. A string already present
    /// keeps the token it was first given.
    pub fn register(&mut self, s: &str) -> String {
        if let Some(&i) = self.index.get(s) {
            return encode_token(i);
        }
        if self.entries.len() >= CACHE_SIZE {
            trace!(size = CACHE_SIZE, "rolling cache full, starting new generation");
            self.clear();
        }
        let i = self.entries.len();
        self.entries.push(s.to_string());
        self.index.insert(s.to_string(), i);
        let token = encode_token(i);
        trace!(token = %token, value = s, "rolling cache register");
        token
    }

    /// Looks up the string registered under `token`.
    pub fn resolve(&self, token: &str) -> Result<&str> {
        let value = decode_token(token)
            .and_then(|i| self.entries.get(i))
            .ok_or_else(|| TransitError::CacheMiss(token.to_string()))?;
        trace!(token, value = value.as_str(), "rolling cache hit");
        Ok(value.as_str())
    }

    /// Write-side counterpart of string decoding: a cacheable string seen
    /// before comes back as its token, a new one is registered and comes
    /// back unchanged, anything else passes through.
    pub fn write(&mut self, s: &str, as_map_key: bool) -> String {
        if !Self::is_cacheable(s, as_map_key) {
            return s.to_string();
        }
        match self.index.get(s) {
            Some(&i) => encode_token(i),
            None => {
                self.register(s);
                s.to_string()
            }
        }
    }
}

pub fn encode_token(i: usize) -> String {
    let digit = |d: usize| char::from_u32(BASE_CHAR_INDEX + d as u32).unwrap_or('?');
    let hi = i / CACHE_CODE_DIGITS;
    let lo = i % CACHE_CODE_DIGITS;
    let mut token = String::with_capacity(3);
    token.push(SUB);
    if hi != 0 {
        token.push(digit(hi));
    }
    token.push(digit(lo));
    token
}

pub fn decode_token(token: &str) -> Option<usize> {
    let digit = |c: char| {
        let d = (c as u32).checked_sub(BASE_CHAR_INDEX)? as usize;
        (d < CACHE_CODE_DIGITS).then_some(d)
    };
    let mut chars = token.strip_prefix(SUB)?.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(lo), None, None) => digit(lo),
        (Some(hi), Some(lo), None) => {
            let hi = digit(hi)?;
            (hi != 0).then_some(hi * CACHE_CODE_DIGITS + digit(lo)?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn token_encoding() {
        assert_eq!(encode_token(0), "^0");
        assert_eq!(encode_token(43), "^[");
        assert_eq!(encode_token(44), "^10");
        assert_eq!(encode_token(CACHE_SIZE - 1), "^[[");
    }

    #[test]
    fn eligibility() {
        assert!(RollingCache::is_cacheable("name", true));
        assert!(!RollingCache::is_cacheable("abc", true));
        assert!(!RollingCache::is_cacheable("name", false));
        assert!(RollingCache::is_cacheable("~:foo", false));
        assert!(RollingCache::is_cacheable("~$bar", false));
        assert!(RollingCache::is_cacheable("~#set", false));
        assert!(!RollingCache::is_cacheable("~:a", false));
        assert!(!RollingCache::is_cacheable("~~:foo", false));
    }

    #[test]
    fn token_shape() {
        assert!(RollingCache::is_cache_key("^0"));
        assert!(RollingCache::is_cache_key("^abc"));
        assert!(!RollingCache::is_cache_key("^ "));
        assert!(!RollingCache::is_cache_key("~^0"));
    }

    #[test]
    fn register_then_resolve() {
        let mut cache = RollingCache::new();
        assert_eq!(cache.register("~:foo"), "^0");
        assert_eq!(cache.register("name"), "^1");
        assert_eq!(cache.register("~:foo"), "^0");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.resolve("^1").unwrap(), "name");
        assert_eq!(
            cache.resolve("^2").unwrap_err(),
            TransitError::CacheMiss("^2".to_string())
        );
        assert!(cache.resolve("^zzz").is_err());
    }

    #[test]
    fn full_cache_starts_new_generation() {
        let mut cache = RollingCache::new();
        for i in 0..CACHE_SIZE {
            cache.register(&format!("key-{i}"));
        }
        assert_eq!(cache.len(), CACHE_SIZE);
        assert_eq!(cache.register("overflow"), "^0");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resolve("^0").unwrap(), "overflow");
    }

    #[test]
    fn write_mirrors_register() {
        let mut cache = RollingCache::new();
        assert_eq!(cache.write("~:kw", false), "~:kw");
        assert_eq!(cache.write("~:kw", false), "^0");
        assert_eq!(cache.write("plain", false), "plain");
        assert_eq!(cache.write("plain", true), "plain");
        assert_eq!(cache.write("plain", true), "^1");
    }

    proptest! {
        #[test]
        fn tokens_decode_to_their_index(i in 0..CACHE_SIZE) {
            prop_assert_eq!(decode_token(&encode_token(i)), Some(i));
        }
    }
}
