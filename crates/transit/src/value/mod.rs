//! Decoded Transit values.

mod decimal;
mod instant;

use std::fmt;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use uuid::Uuid;

use crate::error::{Result, TransitError};

pub use decimal::BigDecimal;
pub use instant::Instant;

/// A fully decoded Transit value.
///
/// Floats compare and hash by bit pattern so that every value can be a
/// set member or a map key.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Keyword(Keyword),
    Symbol(Symbol),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    Char(char),
    Uri(Uri),
    Uuid(Uuid),
    Instant(Instant),
    Bytes(Vec<u8>),
    TypedArray(TypedArray),
    Set(IndexSet<Value>),
    /// Explicit list. Never equal to an [`Value::Array`] with the same items.
    List(Vec<Value>),
    Map(IndexMap<Value, Value>),
    Array(Vec<Value>),
}

impl Value {
    pub fn keyword(name: impl Into<String>) -> Self {
        Value::Keyword(Keyword::new(name))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Symbol(_) => "symbol",
            Value::BigInt(_) => "big integer",
            Value::BigDecimal(_) => "big decimal",
            Value::Char(_) => "char",
            Value::Uri(_) => "uri",
            Value::Uuid(_) => "uuid",
            Value::Instant(_) => "instant",
            Value::Bytes(_) => "bytes",
            Value::TypedArray(_) => "typed array",
            Value::Set(_) => "set",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::BigDecimal(a), Value::BigDecimal(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Uri(a), Value::Uri(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Instant(a), Value::Instant(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::TypedArray(a), Value::TypedArray(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Keyword(k) => k.hash(state),
            Value::Symbol(s) => s.hash(state),
            Value::BigInt(n) => n.hash(state),
            Value::BigDecimal(d) => d.hash(state),
            Value::Char(c) => c.hash(state),
            Value::Uri(u) => u.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::Instant(t) => t.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::TypedArray(a) => a.hash(state),
            // Set and map equality ignores order, so entries are combined
            // with an order-independent sum.
            Value::Set(s) => {
                s.len().hash(state);
                unordered_hash(s.iter()).hash(state);
            }
            Value::Map(m) => {
                m.len().hash(state);
                unordered_hash(m.iter()).hash(state);
            }
            Value::List(items) | Value::Array(items) => items.hash(state),
        }
    }
}

fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items.fold(0u64, |acc, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    })
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Keyword(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn uri_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?(?:[A-Za-z0-9\-._~!$&'()*+,;=:@/?#\[\]]|%[0-9A-Fa-f]{2})*$",
        )
        .unwrap()
    })
}

/// A URI reference whose characters have been checked against RFC 3986.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri(String);

impl Uri {
    pub fn parse(s: &str) -> Result<Self> {
        if uri_regex().is_match(s) {
            Ok(Uri(s.to_string()))
        } else {
            Err(TransitError::format("uri", s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme without the trailing colon, if the URI is absolute.
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.0.split_once(':')?;
        let mut chars = scheme.chars();
        let first = chars.next()?;
        (first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        .then_some(scheme)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element kind of a [`TypedArray`], named after its structural tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Ints,
    Longs,
    Floats,
    Doubles,
    Bools,
}

impl ArrayKind {
    pub const ALL: [ArrayKind; 5] = [
        ArrayKind::Ints,
        ArrayKind::Longs,
        ArrayKind::Floats,
        ArrayKind::Doubles,
        ArrayKind::Bools,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArrayKind::Ints => "ints",
            ArrayKind::Longs => "longs",
            ArrayKind::Floats => "floats",
            ArrayKind::Doubles => "doubles",
            ArrayKind::Bools => "bools",
        }
    }

    pub fn tag(self) -> &'static str {
        use crate::constants::tags;
        match self {
            ArrayKind::Ints => tags::INTS,
            ArrayKind::Longs => tags::LONGS,
            ArrayKind::Floats => tags::FLOATS,
            ArrayKind::Doubles => tags::DOUBLES,
            ArrayKind::Bools => tags::BOOLS,
        }
    }
}

/// Homogeneous numeric or boolean array. Elements are kept as decoded;
/// nothing narrows or checks them against `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedArray {
    pub kind: ArrayKind,
    pub values: Vec<Value>,
}

impl TypedArray {
    pub fn new(kind: ArrayKind, values: Vec<Value>) -> Self {
        TypedArray { kind, values }
    }
}
