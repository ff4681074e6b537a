//! Transit decoder with rolling-cache replay and pluggable tag decoders.
//!
//! # Overview
//!
//! Transit layers typed values on top of JSON. Scalars travel as strings
//! with a two-character directive prefix (`"~:name"` is a keyword,
//! `"~u..."` a UUID), structural values as one-entry maps keyed by a tag
//! (`{"~#set": [...]}`), and repeated strings as short cache tokens
//! (`"^0"`) that the reader rebuilds from the order it meets them.
//!
//! [`Reader`] parses JSON text, [`Decoder`] turns the resulting [`Node`]
//! tree into [`Value`]s, and [`Writer`] goes the other way.
//!
//! # Example
//!
//! ```
//! use transit::{Reader, Value};
//!
//! let reader = Reader::new();
//! let value = reader.read_str(r#"{"~#'": "~:foo"}"#).unwrap();
//! assert_eq!(value, Value::keyword("foo"));
//!
//! let rows = reader
//!     .read_str(r#"[{"name": "a"}, {"^0": "b"}]"#)
//!     .unwrap();
//! let Value::Array(rows) = rows else { unreachable!() };
//! assert!(matches!(&rows[1], Value::Map(m) if m.contains_key(&Value::from("name"))));
//! ```

pub mod cache;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod node;
pub mod reader;
pub mod value;
pub mod writer;

pub use cache::RollingCache;
pub use decoder::{DecodeCtx, Decoder, DecoderOptions, Extension, TagDecoder, TagTable};
pub use error::{Result, TransitError};
pub use node::Node;
pub use reader::Reader;
pub use value::{
    ArrayKind, BigDecimal, Instant, Keyword, Symbol, TypedArray, Uri, Value,
};
pub use writer::{Writer, WriterOptions};
