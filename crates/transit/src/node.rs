//! Generic wire tree consumed by the decoder and produced by the writer.
//!
//! A [`Node`] is what a syntax parser hands over before any Transit
//! interpretation happens: strings are still raw (directives, escapes and
//! cache tokens untouched) and map keys are still nodes.

use serde_json::{Map, Number, Value as Json};

use crate::constants::MAP_AS_ARRAY;
use crate::error::{Result, TransitError};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Node>),
    /// Entries in insertion order. Keys are not required to be unique.
    Map(Vec<(Node, Node)>),
}

impl Node {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Map(_) => "map",
        }
    }

    /// Converts parsed JSON into a node tree.
    ///
    /// Arrays of the form `["^ ", k1, v1, k2, v2, ...]` become map nodes.
    /// Integers that do not fit in `i64` become floats.
    pub fn from_json(json: Json) -> Result<Node> {
        Ok(match json {
            Json::Null => Node::Null,
            Json::Bool(b) => Node::Bool(b),
            Json::Number(n) => number_to_node(&n)?,
            Json::String(s) => Node::String(s),
            Json::Array(items) => {
                if items.first().and_then(Json::as_str) == Some(MAP_AS_ARRAY) {
                    return map_as_array_to_node(items);
                }
                Node::Array(
                    items
                        .into_iter()
                        .map(Node::from_json)
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            Json::Object(obj) => {
                let mut entries = Vec::with_capacity(obj.len());
                for (k, v) in obj {
                    entries.push((Node::String(k), Node::from_json(v)?));
                }
                Node::Map(entries)
            }
        })
    }

    /// Converts the node tree back to JSON.
    ///
    /// Maps whose keys are all strings become JSON objects; any other map
    /// uses the `["^ ", k, v, ...]` array form.
    pub fn to_json(&self) -> Result<Json> {
        Ok(match self {
            Node::Null => Json::Null,
            Node::Bool(b) => Json::Bool(*b),
            Node::Int(i) => Json::Number(Number::from(*i)),
            Node::Float(f) => Json::Number(Number::from_f64(*f).ok_or_else(|| {
                TransitError::Unencodable(format!("non-finite float {f} in node tree"))
            })?),
            Node::String(s) => Json::String(s.clone()),
            Node::Array(items) => Json::Array(
                items
                    .iter()
                    .map(Node::to_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Node::Map(entries) => {
                if entries.iter().all(|(k, _)| matches!(k, Node::String(_))) {
                    let mut obj = Map::with_capacity(entries.len());
                    for (k, v) in entries {
                        if let Node::String(k) = k {
                            obj.insert(k.clone(), v.to_json()?);
                        }
                    }
                    Json::Object(obj)
                } else {
                    let mut arr = Vec::with_capacity(entries.len() * 2 + 1);
                    arr.push(Json::String(MAP_AS_ARRAY.to_string()));
                    for (k, v) in entries {
                        arr.push(k.to_json()?);
                        arr.push(v.to_json()?);
                    }
                    Json::Array(arr)
                }
            }
        })
    }
}

fn number_to_node(n: &Number) -> Result<Node> {
    if let Some(i) = n.as_i64() {
        return Ok(Node::Int(i));
    }
    n.as_f64()
        .map(Node::Float)
        .ok_or_else(|| TransitError::Json(format!("unrepresentable number {n}")))
}

fn map_as_array_to_node(items: Vec<Json>) -> Result<Node> {
    if items.len() % 2 == 0 {
        return Err(TransitError::Json(format!(
            "map-as-array needs an even number of entries after the marker, got {}",
            items.len() - 1
        )));
    }
    let mut rest = items.into_iter().skip(1);
    let mut entries = Vec::new();
    while let (Some(k), Some(v)) = (rest.next(), rest.next()) {
        entries.push((Node::from_json(k)?, Node::from_json(v)?));
    }
    Ok(Node::Map(entries))
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Int(i)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}
