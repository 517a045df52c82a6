use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Props of the ordered scalar kinds (`int`, `float`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumProps<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

pub type IntProps = NumProps<i64>;
pub type FloatProps = NumProps<OrderedFloat<f64>>;

impl<T: Copy> NumProps<T> {
    pub fn with_value(mut self, v: T) -> Self { self.value = Some(v); self }
    pub fn with_min(mut self, v: T) -> Self { self.min = Some(v); self }
    pub fn with_max(mut self, v: T) -> Self { self.max = Some(v); self }

    /// `other`'s set fields win.
    pub fn overlay(&self, other: &Self) -> Self {
        NumProps {
            value: other.value.or(self.value),
            min: other.min.or(self.min),
            max: other.max.or(self.max),
        }
    }
}

impl<T: Copy + PartialOrd> NumProps<T> {
    /// Raw-value admission under `value`/`min`/`max`.
    pub fn admits(&self, v: T) -> bool {
        self.value.is_none_or(|pinned| pinned == v)
            && self.min.is_none_or(|m| v >= m)
            && self.max.is_none_or(|m| v <= m)
    }
}
