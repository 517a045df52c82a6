//! Schema model.
//!
//! A `Schema` is a closed tagged union over the supported kinds. Every kind
//! carries an immutable props record whose constraint fields are `Option`s, so
//! "unset" stays distinct from "set to a falsy value". Nodes are plain values:
//! narrowing borrows its inputs and builds a fresh node, never mutating.
pub mod num;
pub mod str;
pub mod list;
pub mod dict;

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::SubstitutionError;
use crate::value::{Value, WildcardMarker, WILDCARD_TOKEN};

pub use num::{NumProps, IntProps, FloatProps};
pub use str::StrProps;
pub use list::{ListProps, Shape};
pub use dict::{DictProps, DictKeys, Field};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Schema {
    None,
    Bool(BoolProps),
    Int(IntProps),
    Float(FloatProps),
    Str(StrProps),
    Bytes(BytesProps),
    Const(ConstProps),
    List(ListProps),
    Dict(DictProps),
    Any(AnyProps),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind { None, Bool, Int, Float, Str, Bytes, Const, List, Dict, Any }

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoolProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BytesProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<u8>>,
}

/// Pinned arbitrary value, compared by structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Disjunction. No alternatives = fully unconstrained.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnyProps {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Schema>,
}

/// One position of a list pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemRepr", into = "ItemRepr")]
pub enum Item {
    Wildcard,
    Schema(Schema),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ItemRepr {
    Token(String),
    Schema(Schema),
}

/// Length constraints shared by strings and lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lengths {
    pub len: Option<usize>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Schema {
    pub fn none() -> Self { Schema::None }
    pub fn bool() -> Self { Schema::Bool(BoolProps::default()) }
    pub fn int() -> Self { Schema::Int(IntProps::default()) }
    pub fn float() -> Self { Schema::Float(FloatProps::default()) }
    pub fn str() -> Self { Schema::Str(StrProps::default()) }
    pub fn bytes() -> Self { Schema::Bytes(BytesProps::default()) }
    pub fn constant() -> Self { Schema::Const(ConstProps::default()) }
    pub fn list() -> Self { Schema::List(ListProps::default()) }
    pub fn dict() -> Self { Schema::Dict(DictProps::default()) }
    pub fn any() -> Self { Schema::Any(AnyProps::default()) }

    pub fn any_of(types: impl IntoIterator<Item = Schema>) -> Self {
        Schema::Any(AnyProps { types: types.into_iter().collect() })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Schema::None => Kind::None,
            Schema::Bool(_) => Kind::Bool,
            Schema::Int(_) => Kind::Int,
            Schema::Float(_) => Kind::Float,
            Schema::Str(_) => Kind::Str,
            Schema::Bytes(_) => Kind::Bytes,
            Schema::Const(_) => Kind::Const,
            Schema::List(_) => Kind::List,
            Schema::Dict(_) => Kind::Dict,
            Schema::Any(_) => Kind::Any,
        }
    }

    /// `Any` without alternatives accepts every value.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Schema::Any(any) if any.types.is_empty())
    }

    /// Canonical schema of a raw value: scalars pinned, lists as `elements`,
    /// dicts as closed `keys`. A wildcard token has no canonical schema.
    pub fn from_value(value: &Value) -> Result<Schema, SubstitutionError> {
        let schema = match value {
            Value::None => Schema::None,
            Value::Bool(b) => Schema::Bool(BoolProps { value: Some(*b) }),
            Value::Int(i) => Schema::Int(IntProps::default().with_value(*i)),
            Value::Float(f) => Schema::Float(FloatProps::default().with_value(*f)),
            Value::Str(s) => Schema::Str(StrProps::default().with_value(s.clone())),
            Value::Bytes(bs) => Schema::Bytes(BytesProps { value: Some(bs.clone()) }),
            Value::List(xs) => {
                let elements = xs.iter()
                    .map(|x| Schema::from_value(x).map(Item::Schema))
                    .collect::<Result<Vec<_>, _>>()?;
                Schema::List(ListProps::from_elements(elements))
            }
            Value::Dict(m) => {
                let fields = m.iter()
                    .map(|(k, v)| Ok((k.clone(), Field::required(Schema::from_value(v)?))))
                    .collect::<Result<_, SubstitutionError>>()?;
                Schema::Dict(DictProps { keys: Some(DictKeys { fields, open: false }) })
            }
            Value::Wildcard => return Err(SubstitutionError::Unconvertible(value.to_string())),
        };
        Ok(schema)
    }
}

impl From<BoolProps> for Schema { fn from(p: BoolProps) -> Self { Schema::Bool(p) } }
impl From<IntProps> for Schema { fn from(p: IntProps) -> Self { Schema::Int(p) } }
impl From<FloatProps> for Schema { fn from(p: FloatProps) -> Self { Schema::Float(p) } }
impl From<StrProps> for Schema { fn from(p: StrProps) -> Self { Schema::Str(p) } }
impl From<BytesProps> for Schema { fn from(p: BytesProps) -> Self { Schema::Bytes(p) } }
impl From<ConstProps> for Schema { fn from(p: ConstProps) -> Self { Schema::Const(p) } }
impl From<ListProps> for Schema { fn from(p: ListProps) -> Self { Schema::List(p) } }
impl From<DictProps> for Schema { fn from(p: DictProps) -> Self { Schema::Dict(p) } }
impl From<AnyProps> for Schema { fn from(p: AnyProps) -> Self { Schema::Any(p) } }

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::None => "none",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Bytes => "bytes",
            Kind::Const => "const",
            Kind::List => "list",
            Kind::Dict => "dict",
            Kind::Any => "any",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // compact JSON form; fall back to the kind if serialization ever fails
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.kind()),
        }
    }
}

impl Item {
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Item::Wildcard => None,
            Item::Schema(s) => Some(s),
        }
    }
}

impl WildcardMarker for Item {
    fn is_wildcard(&self) -> bool { matches!(self, Item::Wildcard) }
}

impl From<Schema> for Item {
    fn from(s: Schema) -> Self { Item::Schema(s) }
}

impl TryFrom<ItemRepr> for Item {
    type Error = String;
    fn try_from(repr: ItemRepr) -> Result<Self, Self::Error> {
        match repr {
            ItemRepr::Token(t) if t == WILDCARD_TOKEN => Ok(Item::Wildcard),
            ItemRepr::Token(t) => Err(format!("unexpected list token {t:?}, expected {WILDCARD_TOKEN:?} or a schema")),
            ItemRepr::Schema(s) => Ok(Item::Schema(s)),
        }
    }
}

impl From<Item> for ItemRepr {
    fn from(item: Item) -> Self {
        match item {
            Item::Wildcard => ItemRepr::Token(WILDCARD_TOKEN.to_string()),
            Item::Schema(s) => ItemRepr::Schema(s),
        }
    }
}

impl Lengths {
    /// `other`'s set fields win.
    pub fn overlay(self, other: Lengths) -> Lengths {
        Lengths {
            len: other.len.or(self.len),
            min_len: other.min_len.or(self.min_len),
            max_len: other.max_len.or(self.max_len),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.len.is_none() && self.min_len.is_none() && self.max_len.is_none()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_schema_of_nested_value() {
        let v = Value::from(json!({"a": [1, "x"], "b": null}));
        let got = Schema::from_value(&v).unwrap();
        let want = Schema::from(DictProps::closed([
            ("a", Schema::from(ListProps::from_elements([
                Item::Schema(Schema::from(IntProps::default().with_value(1))),
                Item::Schema(Schema::from(StrProps::default().with_value("x"))),
            ]))),
            ("b", Schema::None),
        ]));
        assert_eq!(got, want);
    }

    #[test]
    fn wildcard_has_no_canonical_schema() {
        let err = Schema::from_value(&Value::list([Value::Wildcard])).unwrap_err();
        assert!(matches!(err, SubstitutionError::Unconvertible(_)));
    }

    #[test]
    fn serde_shape_uses_kind_tag_and_wildcard_token() {
        let s = Schema::from(ListProps::from_elements([
            Item::Wildcard,
            Item::Schema(Schema::from(IntProps::default().with_min(1))),
        ]));
        let j = serde_json::to_value(&s).unwrap();
        assert_eq!(j, json!({"kind": "list", "elements": ["...", {"kind": "int", "min": 1}]}));
        let back: Schema = serde_json::from_value(j).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn pinned_constants_survive_json() {
        let v = Value::dict([("blob", Value::Bytes(vec![1, 2])), ("tag", Value::str("x"))]);
        let s = Schema::Const(ConstProps { value: Some(v) });
        let src = serde_json::to_string_pretty(&s).unwrap();
        assert_eq!(serde_json::from_str::<Schema>(&src).unwrap(), s);
    }

    #[test]
    fn unknown_list_token_is_rejected() {
        let r = serde_json::from_value::<Schema>(json!({"kind": "list", "elements": ["..", {"kind": "int"}]}));
        assert!(r.is_err());
    }
}
