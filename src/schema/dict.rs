use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Schema;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DictProps {
    /// Unset = any mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<DictKeys>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DictKeys {
    #[serde(default)]
    pub fields: IndexMap<String, Field>,
    /// Open-key marker: unlisted keys of any shape are permitted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl DictProps {
    pub fn closed<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        DictProps { keys: Some(DictKeys::new(fields, false)) }
    }

    pub fn open<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        DictProps { keys: Some(DictKeys::new(fields, true)) }
    }

    /// Keys unset, or nothing declared besides the open marker.
    pub fn is_keyless(&self) -> bool {
        match &self.keys {
            None => true,
            Some(keys) => keys.open && keys.fields.is_empty(),
        }
    }
}

impl DictKeys {
    pub fn new<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>, open: bool) -> Self {
        let fields = fields.into_iter()
            .map(|(k, s)| (k.into(), Field::required(s)))
            .collect();
        DictKeys { fields, open }
    }

    pub fn with_optional(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.fields.insert(key.into(), Field { schema, optional: true });
        self
    }

    pub fn admits_key(&self, key: &str) -> bool {
        self.open || self.fields.contains_key(key)
    }
}

impl Field {
    pub fn required(schema: Schema) -> Self { Field { schema, optional: false } }
}
