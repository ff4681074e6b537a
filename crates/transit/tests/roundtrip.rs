//! Writer -> reader round trips. The writer's cache must stay in step
//! with the reader's, so every value here goes through JSON text.

use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use proptest::prelude::*;
use transit::{
    ArrayKind, BigDecimal, Instant, Reader, TypedArray, Uri, Value, Writer, WriterOptions,
};
use uuid::Uuid;

fn round_trip_with(writer: &Writer, value: &Value) -> Value {
    let text = writer
        .write_string(value)
        .unwrap_or_else(|e| panic!("write({:?}) failed: {}", value, e));
    Reader::new()
        .read_str(&text)
        .unwrap_or_else(|e| panic!("read({}) failed: {}", text, e))
}

fn check(value: Value) {
    assert_eq!(round_trip_with(&Writer::new(), &value), value);
}

fn scalars() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Bool(false),
        Value::Integer(i64::MIN),
        Value::Float(1.25),
        Value::Float(f64::INFINITY),
        Value::Float(f64::NEG_INFINITY),
        Value::Float(f64::NAN),
        Value::from("plain"),
        Value::from("~:not a keyword"),
        Value::from("^0"),
        Value::from("`reserved"),
        Value::keyword("status"),
        Value::symbol("my-symbol"),
        Value::BigInt("123456789012345678901234567890".parse::<BigInt>().unwrap()),
        Value::BigDecimal(BigDecimal::parse("-3.14159265358979323846").unwrap()),
        Value::Char('λ'),
        Value::Uri(Uri::parse("https://example.com/a?b=c#d").unwrap()),
        Value::Uuid(Uuid::parse_str("5a2cbea3-e8c6-428b-b525-21239370dd55").unwrap()),
        Value::Instant(Instant::from_millis(1_393_909_567_123)),
        Value::Instant(Instant::new(-86_400, 123_456_789)),
        Value::Bytes(b"\x00\x01binary\xff".to_vec()),
    ]
}

#[test]
fn every_scalar_as_root() {
    for value in scalars() {
        check(value);
    }
}

#[test]
fn every_scalar_twice_in_one_document() {
    let mut items = scalars();
    items.extend(scalars());
    check(Value::Array(items));
}

#[test]
fn every_scalar_as_map_key() {
    let map = scalars()
        .into_iter()
        .enumerate()
        .map(|(i, k)| (k, Value::Integer(i as i64)))
        .collect::<IndexMap<_, _>>();
    check(Value::Array(vec![Value::Map(map.clone()), Value::Map(map)]));
}

#[test]
fn structural_values() {
    check(Value::Set(IndexSet::from([
        Value::keyword("a"),
        Value::keyword("b"),
    ])));
    check(Value::List(vec![Value::Integer(1), Value::from("two")]));
    for kind in ArrayKind::ALL {
        check(Value::TypedArray(TypedArray::new(
            kind,
            vec![Value::Integer(1), Value::Integer(2)],
        )));
    }
    check(Value::Map(IndexMap::from([(
        Value::Array(vec![Value::Integer(1), Value::Integer(2)]),
        Value::from("composite key"),
    )])));
    check(Value::Map(IndexMap::from([(
        Value::from("~#set"),
        Value::Integer(1),
    )])));
    check(Value::Map(IndexMap::from([(Value::from("~:"), Value::from("x"))])));
}

#[test]
fn repeated_rows_share_tokens() {
    let row = |n: i64| {
        Value::Map(IndexMap::from([
            (Value::keyword("id"), Value::Integer(n)),
            (Value::from("description"), Value::keyword("pending")),
            (Value::from("tags"), Value::Set(IndexSet::from([Value::keyword("new")]))),
        ]))
    };
    let value = Value::Array((0..10).map(row).collect());
    let text = Writer::new().write_string(&value).unwrap();
    assert!(text.contains("\"^0\""), "{text}");
    assert_eq!(Reader::new().read_str(&text).unwrap(), value);
}

#[test]
fn cache_rollover_stays_in_step() {
    let keys = (0..2500)
        .map(|i| Value::Map(IndexMap::from([(Value::from(format!("key-{i}")), Value::Integer(i))])))
        .collect::<Vec<_>>();
    let mut items = keys.clone();
    items.extend(keys);
    check(Value::Array(items));
}

#[test]
fn instants_as_millis() {
    let writer = Writer::with_options(WriterOptions {
        instant_as_millis: true,
    });
    let value = Value::Instant(Instant::from_millis(1_393_909_567_123));
    assert_eq!(
        writer.write_json(&value).unwrap(),
        serde_json::json!({"~#'": "~m1393909567123"})
    );
    assert_eq!(round_trip_with(&writer, &value), value);
}

#[test]
fn big_decimal_is_normalized() {
    let a = Value::BigDecimal(BigDecimal::parse("1.50").unwrap());
    let b = Reader::new().read_str(r#"{"~#'": "~f1.5"}"#).unwrap();
    assert_eq!(a, b);
}

fn arb_string() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[~^`#:$ a-z0-9]{0,8}").unwrap()
}

proptest! {
    #[test]
    fn any_string_survives(items in prop::collection::vec(arb_string(), 0..8)) {
        let value = Value::Array(items.into_iter().map(Value::String).collect());
        prop_assert_eq!(round_trip_with(&Writer::new(), &value), value);
    }

    #[test]
    fn any_string_key_survives(keys in prop::collection::vec(arb_string(), 1..6)) {
        let map = keys
            .into_iter()
            .map(|k| (Value::String(k), Value::Bool(true)))
            .collect::<IndexMap<_, _>>();
        let value = Value::Array(vec![Value::Map(map.clone()), Value::Map(map)]);
        prop_assert_eq!(round_trip_with(&Writer::new(), &value), value);
    }
}
