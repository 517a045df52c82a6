//! Reduced compatibility check.
//!
//! Decides whether a clarification can possibly narrow a schema, without
//! producing the narrowed schema. Violations are collected with their
//! location; composites never stop at the first one.
use std::fmt::Display;

use crate::clarify::Clarification;
use crate::compare;
use crate::error::{Violations, ViolationKind};
use crate::schema::{AnyProps, DictProps, Lengths, ListProps, NumProps, Schema, StrProps};
use crate::schema::str::{anchored, char_len};
use crate::value::{Value, WildcardMarker};

pub fn check<'a>(schema: &Schema, candidate: impl Into<Clarification<'a>>) -> Result<(), Violations> {
    let mut out = Violations::default();
    visit(schema, candidate.into(), "$", &mut out);
    out.into_result()
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

fn visit(schema: &Schema, candidate: Clarification<'_>, path: &str, out: &mut Violations) {
    use Clarification as C;
    match (schema, candidate) {
        (Schema::Any(any), c) => visit_any(any, c, path, out),
        (_, C::Schema(Schema::Any(alts))) => {
            if alts.types.is_empty() {
                out.push(path, narrowing("types", format!("unconstrained any can't narrow {}", schema.kind())));
            }
            for alt in &alts.types {
                visit(schema, C::Schema(alt), path, out);
            }
        }
        (Schema::None, C::Value(Value::None) | C::Schema(Schema::None)) => {}
        (Schema::Bool(p), C::Value(Value::Bool(b))) => {
            pin(p.value.as_ref(), Some(b), path, out);
        }
        (Schema::Bool(p), C::Schema(Schema::Bool(c))) => {
            pin(p.value.as_ref(), c.value.as_ref(), path, out);
        }
        (Schema::Int(p), C::Value(Value::Int(i))) => num_value(p, *i, path, out),
        (Schema::Int(p), C::Schema(Schema::Int(c))) => num_schema(p, c, path, out),
        (Schema::Float(p), C::Value(Value::Float(x))) => num_value(p, *x, path, out),
        (Schema::Float(p), C::Schema(Schema::Float(c))) => num_schema(p, c, path, out),
        (Schema::Str(p), C::Value(Value::Str(s))) => str_value(p, s, path, out),
        (Schema::Str(p), C::Schema(Schema::Str(c))) => match &c.value {
            Some(s) => str_value(p, s, path, out),
            None => {
                for kind in compare::str::stops(p, &p.overlay(c)) {
                    out.push(path, kind);
                }
            }
        },
        (Schema::Bytes(p), C::Value(Value::Bytes(bs))) => {
            if let Some(pinned) = p.value.as_ref().filter(|v| *v != bs) {
                out.push(path, mismatch(Value::Bytes(pinned.clone()), Value::Bytes(bs.clone())));
            }
        }
        (Schema::Bytes(p), C::Schema(Schema::Bytes(c))) => {
            if let (Some(a), Some(b)) = (&p.value, &c.value) {
                if a != b {
                    out.push(path, mismatch(Value::Bytes(a.clone()), Value::Bytes(b.clone())));
                }
            }
        }
        (Schema::Const(p), C::Value(v)) if !v.is_wildcard() => pin(p.value.as_ref(), Some(v), path, out),
        (Schema::Const(p), C::Schema(Schema::Const(c))) => pin(p.value.as_ref(), c.value.as_ref(), path, out),
        (Schema::List(p), C::Value(Value::List(xs))) => list_value(p, xs, path, out),
        (Schema::List(p), C::Schema(Schema::List(c))) => {
            let tightened = p.lengths().overlay(c.effective_lengths());
            for kind in compare::length_stops(p.lengths(), tightened) {
                out.push(path, kind);
            }
        }
        (Schema::Dict(p), C::Value(Value::Dict(m))) => dict_value(p, m, path, out),
        (Schema::Dict(_), C::Schema(Schema::Dict(_))) => {}
        (schema, c) => out.push(path, ViolationKind::Type { expected: schema.kind(), actual: c.kind_name() }),
    }
}

fn visit_any(any: &AnyProps, candidate: Clarification<'_>, path: &str, out: &mut Violations) {
    if any.types.is_empty() {
        return;
    }
    match candidate {
        Clarification::Schema(Schema::Any(alts)) => {
            if alts.types.is_empty() {
                out.push(path, narrowing("types", "unconstrained any can't narrow a disjunction".into()));
            }
            for alt in &alts.types {
                let c = Clarification::Schema(alt);
                if !any.types.iter().any(|t| passes(t, c, path)) {
                    out.push(path, ViolationKind::NoAlternative { actual: c.to_string() });
                }
            }
        }
        c => {
            if !any.types.iter().any(|t| passes(t, c, path)) {
                out.push(path, ViolationKind::NoAlternative { actual: c.to_string() });
            }
        }
    }
}

fn passes(schema: &Schema, candidate: Clarification<'_>, path: &str) -> bool {
    let mut scratch = Violations::default();
    visit(schema, candidate, path, &mut scratch);
    scratch.is_empty()
}

fn num_value<T: Copy + PartialOrd + Display>(p: &NumProps<T>, v: T, path: &str, out: &mut Violations) {
    if let Some(pinned) = p.value.filter(|pinned| *pinned != v) {
        out.push(path, mismatch(pinned, v));
    }
    if let Some(min) = p.min.filter(|min| v < *min) {
        out.push(path, ViolationKind::Min { min: min.to_string(), actual: v.to_string() });
    }
    if let Some(max) = p.max.filter(|max| v > *max) {
        out.push(path, ViolationKind::Max { max: max.to_string(), actual: v.to_string() });
    }
}

/// A pinned candidate is checked as a raw value; otherwise every bound it sets
/// must stay inside the base's.
fn num_schema<T: Copy + PartialOrd + Display>(p: &NumProps<T>, c: &NumProps<T>, path: &str, out: &mut Violations) {
    if let Some(v) = c.value {
        return num_value(p, v, path, out);
    }
    if let Some(pinned) = p.value {
        if c.min.is_some_and(|m| m > pinned) || c.max.is_some_and(|m| m < pinned) {
            out.push(path, narrowing("value", format!("bounds exclude the pinned {pinned}")));
        }
    }
    if let Some(min) = p.min {
        if let Some(m) = c.min.filter(|m| *m < min) {
            out.push(path, narrowing("min", format!("{m} is below {min}")));
        }
        if let Some(m) = c.max.filter(|m| *m < min) {
            out.push(path, narrowing("max", format!("{m} is below min {min}")));
        }
    }
    if let Some(max) = p.max {
        if let Some(m) = c.max.filter(|m| *m > max) {
            out.push(path, narrowing("max", format!("{m} is above {max}")));
        }
        if let Some(m) = c.min.filter(|m| *m > max) {
            out.push(path, narrowing("min", format!("{m} is above max {max}")));
        }
    }
}

fn str_value(p: &StrProps, s: &str, path: &str, out: &mut Violations) {
    if let Some(v) = p.value.as_ref().filter(|v| v.as_str() != s) {
        out.push(path, ViolationKind::Value { expected: format!("{v:?}"), actual: format!("{s:?}") });
    }
    count(p.lengths(), char_len(s), path, out);
    if let Some(substr) = p.substr.as_ref().filter(|sub| !s.contains(sub.as_str())) {
        out.push(path, ViolationKind::Substr { substr: substr.clone(), actual: s.to_string() });
    }
    if let Some(rx) = &p.regex {
        match regex::Regex::new(&anchored(rx)) {
            Ok(re) if re.is_match(s) => {}
            Ok(_) => out.push(path, ViolationKind::Regex { pattern: rx.clone(), actual: s.to_string() }),
            Err(e) => out.push(path, ViolationKind::InvalidRegex { pattern: rx.clone(), reason: e.to_string() }),
        }
    }
}

fn count(l: Lengths, n: usize, path: &str, out: &mut Violations) {
    if let Some(len) = l.len.filter(|len| *len != n) {
        out.push(path, ViolationKind::Length { expected: len, actual: n });
    }
    if let Some(min) = l.min_len.filter(|min| n < *min) {
        out.push(path, ViolationKind::MinLength { min, actual: n });
    }
    if let Some(max) = l.max_len.filter(|max| n > *max) {
        out.push(path, ViolationKind::MaxLength { max, actual: n });
    }
}

fn list_value(p: &ListProps, xs: &[Value], path: &str, out: &mut Violations) {
    count(p.lengths(), xs.len(), path, out);
    if let Some(item_type) = &p.item_type {
        let last = xs.len().saturating_sub(1);
        for (i, x) in xs.iter().enumerate() {
            // boundary wildcards stand for "more of the same"
            if x.is_wildcard() && (i == 0 || i == last) {
                continue;
            }
            visit(item_type, Clarification::Value(x), &format!("{path}[{i}]"), out);
        }
    }
    if let Some(elements) = &p.elements {
        let fixed = elements.iter().filter(|x| !x.is_wildcard()).count();
        if fixed == elements.len() {
            if xs.len() != fixed {
                out.push(path, ViolationKind::Length { expected: fixed, actual: xs.len() });
            }
        } else if xs.len() < fixed {
            out.push(path, ViolationKind::MinLength { min: fixed, actual: xs.len() });
        }
    }
}

fn dict_value(p: &DictProps, m: &indexmap::IndexMap<String, Value>, path: &str, out: &mut Violations) {
    let Some(keys) = &p.keys else { return };
    for (name, field) in &keys.fields {
        if let Some(v) = m.get(name) {
            visit(&field.schema, Clarification::Value(v), &format!("{path}.{name}"), out);
        }
    }
    if !keys.open {
        for key in m.keys().filter(|k| !keys.fields.contains_key(*k)) {
            out.push(path, ViolationKind::ExtraKey { key: key.clone() });
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn pin<T: PartialEq + Display>(expected: Option<&T>, actual: Option<&T>, path: &str, out: &mut Violations) {
    if let (Some(e), Some(a)) = (expected, actual) {
        if e != a {
            out.push(path, mismatch(e, a));
        }
    }
}

fn mismatch(expected: impl Display, actual: impl Display) -> ViolationKind {
    ViolationKind::Value { expected: expected.to_string(), actual: actual.to_string() }
}

fn narrowing(constraint: &'static str, detail: String) -> ViolationKind {
    ViolationKind::Narrowing { constraint, detail }
}

// ------------------------------- Tests ------------------------------------ //
