//! Raw clarification data.
//!
//! `Value` is the native side of a clarification: what a caller observed and
//! wants to pin a schema to. It mirrors `serde_json::Value` but keeps ints,
//! floats and bytes apart and adds the `Wildcard` token used when two list
//! patterns are compared against each other.
use std::fmt;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Spelling of the wildcard token in documents and messages.
pub const WILDCARD_TOKEN: &str = "...";

/// Sole key of the object that carries a byte string in JSON.
pub const BYTES_KEY: &str = "$bytes";

/// JSON conversion is lossless except for `Wildcard`: it is written as the
/// token string and read back as `Str`, so data never turns into a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(IndexMap<String, Value>),
    /// "arbitrarily many unconstrained items here"
    Wildcard,
}

/// Predicate used by list/dict traversal: does this item stand for the
/// wildcard marker rather than a concrete element?
pub trait WildcardMarker {
    fn is_wildcard(&self) -> bool;
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Value {
    pub fn float(x: f64) -> Self { Value::Float(OrderedFloat(x)) }

    pub fn str(s: impl Into<String>) -> Self { Value::Str(s.into()) }

    pub fn list(xs: impl IntoIterator<Item = Value>) -> Self {
        Value::List(xs.into_iter().collect())
    }

    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the native kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Wildcard => "wildcard",
        }
    }

    /// True when a wildcard token appears as a direct element or entry.
    pub fn contains_wildcard(&self) -> bool {
        match self {
            Value::List(xs) => xs.iter().any(Value::is_wildcard),
            Value::Dict(m) => m.values().any(Value::is_wildcard),
            _ => false,
        }
    }
}

impl WildcardMarker for Value {
    fn is_wildcard(&self) -> bool { matches!(self, Value::Wildcard) }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::None,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    // u64 beyond i64 and real floats both land here
                    Value::float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            J::String(s) => Value::Str(s),
            J::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            J::Object(m) => match bytes_of(&m) {
                Some(bs) => Value::Bytes(bs),
                None => Value::Dict(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
            },
        }
    }
}

/// `{"$bytes": [0..=255, ...]}` and nothing else.
fn bytes_of(m: &serde_json::Map<String, serde_json::Value>) -> Option<Vec<u8>> {
    if m.len() != 1 {
        return None;
    }
    m.get(BYTES_KEY)?
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect()
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        use serde_json::Value as J;
        match v {
            Value::None => J::Null,
            Value::Bool(b) => J::Bool(b),
            Value::Int(i) => J::from(i),
            // NaN / inf have no JSON spelling → null, as serde_json does
            Value::Float(f) => serde_json::Number::from_f64(f.0).map(J::Number).unwrap_or(J::Null),
            Value::Str(s) => J::String(s),
            Value::Bytes(bs) => {
                let bs = J::Array(bs.into_iter().map(J::from).collect());
                J::Object(std::iter::once((BYTES_KEY.to_string(), bs)).collect())
            }
            Value::List(xs) => J::Array(xs.into_iter().map(J::from).collect()),
            Value::Dict(m) => J::Object(m.into_iter().map(|(k, v)| (k, J::from(v))).collect()),
            Value::Wildcard => J::String(WILDCARD_TOKEN.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Wildcard => f.write_str(WILDCARD_TOKEN),
            Value::Bytes(bs) => write!(f, "b{bs:?}"),
            other => write!(f, "{}", serde_json::Value::from(other.clone())),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_keep_int_float_apart() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert_eq!(Value::from(json!(3.5)), Value::float(3.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::float(u64::MAX as f64));
    }

    #[test]
    fn json_objects_preserve_key_order() {
        let v = Value::from(json!({"z": 1, "a": [true, null]}));
        let Value::Dict(m) = &v else { panic!("expected dict") };
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(m["a"], Value::list([Value::Bool(true), Value::None]));
    }

    #[test]
    fn wildcard_detection_is_shallow() {
        assert!(Value::list([Value::Int(1), Value::Wildcard]).contains_wildcard());
        assert!(!Value::list([Value::list([Value::Wildcard])]).contains_wildcard());
        assert!(!Value::Int(1).contains_wildcard());
    }

    #[test]
    fn bytes_survive_a_json_round_trip() {
        let v = Value::dict([("raw", Value::Bytes(vec![0, 7, 255])), ("n", Value::Int(1))]);
        let j = serde_json::to_value(&v).unwrap();
        assert_eq!(j, json!({"raw": {"$bytes": [0, 7, 255]}, "n": 1}));
        assert_eq!(serde_json::from_value::<Value>(j).unwrap(), v);
    }

    #[test]
    fn bytes_key_needs_a_byte_array_of_its_own() {
        assert!(matches!(Value::from(json!({"$bytes": [256]})), Value::Dict(_)));
        assert!(matches!(Value::from(json!({"$bytes": [1], "x": 2})), Value::Dict(_)));
        assert!(matches!(Value::from(json!({"$bytes": "01"})), Value::Dict(_)));
    }

    #[test]
    fn wildcard_reads_back_as_a_string() {
        let j = serde_json::to_value(Value::list([Value::Wildcard])).unwrap();
        assert_eq!(Value::from(j), Value::list([Value::str(WILDCARD_TOKEN)]));
    }

    #[test]
    fn display_uses_json_spelling() {
        assert_eq!(Value::dict([("a", Value::Int(1))]).to_string(), r#"{"a":1}"#);
        assert_eq!(Value::Wildcard.to_string(), "...");
    }
}
