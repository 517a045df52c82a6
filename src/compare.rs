//! Subschema comparator: "is `candidate` at least as narrow as `base`".
//!
//! Only used to filter and collapse `Any` alternatives, never to raise errors.
//! Strings and dicts have dedicated clause lists; the remaining kinds defer to
//! the compatibility check's bound logic and must also restate every
//! constraint the base sets, since a comparator can't rely on inheritance.
pub mod str;
pub mod dict;

use crate::check::check;
use crate::clarify::Clarification;
use crate::error::ViolationKind;
use crate::schema::{Lengths, NumProps, Schema};

pub fn is_narrower(base: &Schema, candidate: &Schema) -> bool {
    match (base, candidate) {
        (Schema::Any(b), _) if b.types.is_empty() => true,
        (Schema::Any(b), Schema::Any(c)) => {
            (!c.types.is_empty() && c.types.iter().all(|alt| is_narrower(base, alt)))
                || b.types.iter().any(|t| is_narrower(t, candidate))
        }
        (Schema::Any(b), _) => b.types.iter().any(|t| is_narrower(t, candidate)),
        (Schema::Str(b), Schema::Str(c)) => str::is_narrower(b, c),
        (Schema::Dict(b), Schema::Dict(c)) => dict::is_narrower(b, c),
        (b, c) if b.kind() == c.kind() => check(b, Clarification::Schema(c)).is_ok() && restates(b, c),
        _ => false,
    }
}

fn restates(base: &Schema, candidate: &Schema) -> bool {
    match (base, candidate) {
        (Schema::Bool(b), Schema::Bool(c)) => b.value.is_none() || b.value == c.value,
        (Schema::Int(b), Schema::Int(c)) => restates_bounds(b, c),
        (Schema::Float(b), Schema::Float(c)) => restates_bounds(b, c),
        (Schema::Bytes(b), Schema::Bytes(c)) => b.value.is_none() || b.value == c.value,
        (Schema::Const(b), Schema::Const(c)) => b.value.is_none() || b.value == c.value,
        (Schema::List(b), Schema::List(c)) => length_stops(b.lengths(), c.effective_lengths()).is_empty(),
        _ => true,
    }
}

/// A pinned candidate implies every bound it satisfies.
fn restates_bounds<T: Copy + PartialOrd>(b: &NumProps<T>, c: &NumProps<T>) -> bool {
    if c.value.is_some() {
        return true;
    }
    b.value.is_none()
        && b.min.is_none_or(|m| c.min.is_some_and(|x| x >= m))
        && b.max.is_none_or(|m| c.max.is_some_and(|x| x <= m))
}

/// Length clauses shared by strings and lists: `len` must be kept exactly,
/// `min_len`/`max_len` only tighten and never cross each other.
pub fn length_stops(base: Lengths, sub: Lengths) -> Vec<ViolationKind> {
    let mut stops = Vec::new();
    let mut stop = |constraint: &'static str, detail: String| {
        stops.push(ViolationKind::Narrowing { constraint, detail });
    };

    if let Some(len) = base.len {
        match sub.len {
            None => stop("len", format!("{len} is left unset")),
            Some(n) if n != len => stop("len", format!("{n} differs from {len}")),
            Some(_) => {}
        }
    }
    if let Some(min) = base.min_len {
        if sub.min_len.is_none() && sub.len.is_none() {
            stop("min_len", format!("{min} is left unset"));
        }
        if let Some(m) = sub.min_len.filter(|m| *m < min) {
            stop("min_len", format!("{m} is below {min}"));
        }
        if let Some(m) = sub.max_len.filter(|m| *m < min) {
            stop("max_len", format!("{m} is below min_len {min}"));
        }
        if let Some(n) = sub.len.filter(|n| *n < min) {
            stop("len", format!("{n} is below min_len {min}"));
        }
    }
    if let Some(max) = base.max_len {
        if sub.max_len.is_none() && sub.len.is_none() {
            stop("max_len", format!("{max} is left unset"));
        }
        if let Some(m) = sub.max_len.filter(|m| *m > max) {
            stop("max_len", format!("{m} is above {max}"));
        }
        if let Some(m) = sub.min_len.filter(|m| *m > max) {
            stop("min_len", format!("{m} is above max_len {max}"));
        }
        if let Some(n) = sub.len.filter(|n| *n > max) {
            stop("len", format!("{n} is above max_len {max}"));
        }
    }
    stops
}
