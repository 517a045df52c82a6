use serde::{Deserialize, Serialize};

use super::{Item, Lengths, Schema};
use crate::value::WildcardMarker;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListProps {
    /// Homogeneous mode: one schema for every element.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<Box<Schema>>,
    /// Pattern mode: positional schemas, wildcards at the boundaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

/// How a pattern's wildcards are laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// No wildcard: positional.
    Exact(&'a [Item]),
    /// `[p.., ...]`
    Head(&'a [Item]),
    /// `[..., p..]`
    Tail(&'a [Item]),
    /// `[..., p.., ...]`
    Body(&'a [Item]),
    /// Wildcards away from the boundaries; needs the generalized aligner.
    Scattered(&'a [Item]),
}

impl ListProps {
    pub fn of(item_type: Schema) -> Self {
        ListProps { item_type: Some(Box::new(item_type)), ..Default::default() }
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Item>) -> Self {
        ListProps { elements: Some(elements.into_iter().collect()), ..Default::default() }
    }

    pub fn with_len(mut self, n: usize) -> Self { self.len = Some(n); self }
    pub fn with_min_len(mut self, n: usize) -> Self { self.min_len = Some(n); self }
    pub fn with_max_len(mut self, n: usize) -> Self { self.max_len = Some(n); self }

    pub fn lengths(&self) -> Lengths {
        Lengths { len: self.len, min_len: self.min_len, max_len: self.max_len }
    }

    pub fn with_lengths(mut self, l: Lengths) -> Self {
        self.len = l.len;
        self.min_len = l.min_len;
        self.max_len = l.max_len;
        self
    }

    /// Declared lengths tightened by what the `elements` pattern implies:
    /// exact count without wildcards, a lower bound with them.
    pub fn effective_lengths(&self) -> Lengths {
        let mut l = self.lengths();
        if let Some(elements) = &self.elements {
            let fixed = elements.iter().filter(|x| !x.is_wildcard()).count();
            if fixed == elements.len() {
                l.len = l.len.or(Some(fixed));
            } else {
                l.min_len = Some(l.min_len.map_or(fixed, |m| m.max(fixed)));
            }
        }
        l
    }

    /// Accepts any list regardless of content.
    pub fn is_shapeless(&self) -> bool {
        let pure_wildcards = self.elements.as_ref()
            .is_some_and(|xs| !xs.is_empty() && xs.iter().all(WildcardMarker::is_wildcard));
        let unconstrained_type = self.item_type.as_deref().is_some_and(Schema::is_unconstrained);
        (self.item_type.is_none() && self.elements.is_none()) || pure_wildcards || unconstrained_type
    }
}

/// Classify a pattern by where its wildcards sit. A lone `[...]` is a body
/// with nothing inside.
pub fn shape(elements: &[Item]) -> Shape<'_> {
    let n = elements.len();
    let lead = n > 0 && elements[0].is_wildcard();
    let trail = n > 1 && elements[n - 1].is_wildcard();
    let inner = match (lead, trail) {
        (true, true) => &elements[1..n - 1],
        (true, false) => &elements[1..],
        (false, true) => &elements[..n - 1],
        (false, false) => elements,
    };
    if inner.iter().any(WildcardMarker::is_wildcard) {
        return Shape::Scattered(elements);
    }
    match (lead, trail) {
        (true, true) => Shape::Body(inner),
        (true, false) if n == 1 => Shape::Body(inner),
        (true, false) => Shape::Tail(inner),
        (false, true) => Shape::Head(inner),
        (false, false) => Shape::Exact(inner),
    }
}
