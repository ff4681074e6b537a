//! Built-in decoders for every native Transit tag.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use uuid::Uuid;

use crate::constants::{directives, tags};
use crate::error::{Result, TransitError};
use crate::node::Node;
use crate::value::{ArrayKind, BigDecimal, Instant, TypedArray, Uri, Value};

use super::table::BuiltinFn;
use super::DecodeCtx;

pub(super) fn decoders() -> Vec<(&'static str, BuiltinFn)> {
    let decoders: [(&'static str, BuiltinFn); 22] = [
        (directives::KEYWORD, decode_keyword),
        (directives::BYTES, decode_byte_array),
        (directives::FLOAT, decode_float),
        (directives::BIG_DECIMAL, decode_big_decimal),
        (directives::BIG_INTEGER, decode_big_integer),
        (directives::CHAR, decode_char),
        (directives::SYMBOL, decode_symbol),
        (directives::INSTANT, decode_instant),
        (directives::INSTANT_MILLIS, decode_instant_millis),
        (directives::UUID, decode_uuid),
        (directives::URI, decode_uri),
        (directives::SPECIAL_NUMBER, decode_special_number),
        (tags::QUOTE, decode_quote),
        (tags::INSTANT, decode_instant),
        (tags::SET, decode_set),
        (tags::LIST, decode_list),
        (tags::CMAP, decode_cmap),
        (tags::INTS, decode_ints),
        (tags::LONGS, decode_longs),
        (tags::FLOATS, decode_floats),
        (tags::DOUBLES, decode_doubles),
        (tags::BOOLS, decode_bools),
    ];
    Vec::from(decoders)
}

fn payload_str<'n>(payload: &'n Node, kind: &'static str) -> Result<&'n str> {
    payload
        .as_str()
        .ok_or_else(|| TransitError::format(kind, format!("<{} node>", payload.kind())))
}

fn decode_keyword(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    Ok(Value::keyword(payload_str(payload, "keyword")?))
}

fn decode_symbol(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    Ok(Value::symbol(payload_str(payload, "symbol")?))
}

/// Line breaks and other whitespace inside the base64 text are ignored.
fn decode_byte_array(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    let s = payload_str(payload, "bytes")?;
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map(Value::Bytes)
        .map_err(|_| TransitError::format("bytes", s))
}

fn decode_float(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    let s = payload_str(payload, "float")?;
    let numeric = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return Err(TransitError::format("float", s));
    }
    s.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| TransitError::format("float", s))
}

fn decode_big_decimal(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    BigDecimal::parse(payload_str(payload, "big decimal")?).map(Value::BigDecimal)
}

fn decode_big_integer(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    let s = payload_str(payload, "big integer")?;
    s.parse::<BigInt>()
        .map(Value::BigInt)
        .map_err(|_| TransitError::format("big integer", s))
}

fn decode_char(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    let s = payload_str(payload, "char")?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err(TransitError::format("char", s)),
    }
}

fn decode_instant(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    Instant::parse_iso8601(payload_str(payload, "instant")?).map(Value::Instant)
}

fn decode_instant_millis(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    let s = payload_str(payload, "instant")?;
    s.trim()
        .parse::<i64>()
        .map(|ms| Value::Instant(Instant::from_millis(ms)))
        .map_err(|_| TransitError::format("instant", s))
}

fn decode_uuid(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    let s = payload_str(payload, "uuid")?;
    Uuid::parse_str(s)
        .map(Value::Uuid)
        .map_err(|_| TransitError::format("uuid", s))
}

fn decode_uri(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    Uri::parse(payload_str(payload, "uri")?).map(Value::Uri)
}

fn decode_special_number(payload: &Node, _: &mut DecodeCtx<'_>, _: bool) -> Result<Value> {
    match payload_str(payload, "special number")? {
        "NaN" => Ok(Value::Float(f64::NAN)),
        "INF" => Ok(Value::Float(f64::INFINITY)),
        "-INF" => Ok(Value::Float(f64::NEG_INFINITY)),
        other => Err(TransitError::format("special number", other)),
    }
}

fn decode_quote(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    ctx.decode(payload, as_map_key)
}

/// Decodes a payload that must come out as an array.
fn decode_items(
    payload: &Node,
    ctx: &mut DecodeCtx<'_>,
    as_map_key: bool,
    kind: &'static str,
) -> Result<Vec<Value>> {
    match ctx.decode(payload, as_map_key)? {
        Value::Array(items) => Ok(items),
        other => Err(TransitError::format(kind, format!("<{}>", other.type_name()))),
    }
}

fn decode_set(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    let items = decode_items(payload, ctx, as_map_key, "set")?;
    Ok(Value::Set(items.into_iter().collect::<IndexSet<_>>()))
}

fn decode_list(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    decode_items(payload, ctx, as_map_key, "list").map(Value::List)
}

/// Payload is `[k1, v1, k2, v2, ...]`; keys may be any value.
fn decode_cmap(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    let items = decode_items(payload, ctx, as_map_key, "cmap")?;
    if items.len() % 2 != 0 {
        return Err(TransitError::format(
            "cmap",
            format!("<{} elements>", items.len()),
        ));
    }
    let mut map = IndexMap::with_capacity(items.len() / 2);
    let mut items = items.into_iter();
    while let (Some(k), Some(v)) = (items.next(), items.next()) {
        map.insert(k, v);
    }
    Ok(Value::Map(map))
}

fn decode_typed_array(
    kind: ArrayKind,
    payload: &Node,
    ctx: &mut DecodeCtx<'_>,
    as_map_key: bool,
) -> Result<Value> {
    let values = decode_items(payload, ctx, as_map_key, kind.name())?;
    Ok(Value::TypedArray(TypedArray::new(kind, values)))
}

fn decode_ints(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    decode_typed_array(ArrayKind::Ints, payload, ctx, as_map_key)
}

fn decode_longs(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    decode_typed_array(ArrayKind::Longs, payload, ctx, as_map_key)
}

fn decode_floats(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    decode_typed_array(ArrayKind::Floats, payload, ctx, as_map_key)
}

fn decode_doubles(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    decode_typed_array(ArrayKind::Doubles, payload, ctx, as_map_key)
}

fn decode_bools(payload: &Node, ctx: &mut DecodeCtx<'_>, as_map_key: bool) -> Result<Value> {
    decode_typed_array(ArrayKind::Bools, payload, ctx, as_map_key)
}

#[cfg(test)]
mod tests {
    use crate::cache::RollingCache;
    use crate::decoder::Decoder;
    use crate::error::TransitError;
    use crate::node::Node;
    use crate::value::Value;

    fn decode_str(s: &str) -> Result<Value, TransitError> {
        Decoder::new().decode(&Node::from(s), &mut RollingCache::new())
    }

    #[test]
    fn float_directive() {
        assert_eq!(decode_str("~d1.5").unwrap(), Value::Float(1.5));
        assert_eq!(decode_str("~d-2e3").unwrap(), Value::Float(-2000.0));
        for bad in ["~dabc", "~dNaN", "~dinf", "~d"] {
            assert!(
                matches!(decode_str(bad), Err(TransitError::Format { kind: "float", .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn char_directive_needs_one_char() {
        assert_eq!(decode_str("~cx").unwrap(), Value::Char('x'));
        assert_eq!(decode_str("~cλ").unwrap(), Value::Char('λ'));
        assert!(decode_str("~cxy").is_err());
        assert!(decode_str("~c").is_err());
    }

    #[test]
    fn byte_array_ignores_line_breaks() {
        assert_eq!(decode_str("~baGVs\nbG8=").unwrap(), Value::Bytes(b"hello".to_vec()));
        assert!(decode_str("~b!!!").is_err());
    }

    #[test]
    fn special_numbers() {
        assert_eq!(decode_str("~zINF").unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(decode_str("~z-INF").unwrap(), Value::Float(f64::NEG_INFINITY));
        assert!(matches!(decode_str("~zNaN").unwrap(), Value::Float(f) if f.is_nan()));
        assert!(decode_str("~zHUGE").is_err());
    }

    #[test]
    fn instant_millis() {
        let Value::Instant(t) = decode_str("~m1393909567123").unwrap() else {
            panic!("expected instant");
        };
        assert_eq!(t.to_iso8601(), "2014-03-04T05:06:07.123Z");
    }

    #[test]
    fn cmap_rejects_odd_payload() {
        let node = Node::Map(vec![(
            Node::from("~#cmap"),
            Node::Array(vec![Node::Int(1)]),
        )]);
        let err = Decoder::new()
            .decode(&node, &mut RollingCache::new())
            .unwrap_err();
        assert!(matches!(err, TransitError::Format { kind: "cmap", .. }));
    }

    #[test]
    fn set_payload_must_be_array() {
        let node = Node::Map(vec![(Node::from("~#set"), Node::Int(1))]);
        let err = Decoder::new()
            .decode(&node, &mut RollingCache::new())
            .unwrap_err();
        assert!(matches!(err, TransitError::Format { kind: "set", .. }));
    }
}
