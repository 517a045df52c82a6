//! Clarifier.
//!
//! `clarify(schema, clarification)` narrows `schema` so it agrees with a raw
//! value or a more specific schema. The input is only borrowed; the narrowed
//! schema is a fresh value, and any failure leaves nothing behind.
//!
//! Scalars are checked and rebuilt here. Lists, dicts and disjunctions have
//! their own submodules and recurse back through [`visit`].
pub mod any;
pub mod dict;
pub mod list;

use std::fmt;

use crate::check::check;
use crate::error::SubstitutionError;
use crate::schema::{BoolProps, BytesProps, ConstProps, NumProps, Schema};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// What a schema is narrowed by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clarification<'a> {
    Value(&'a Value),
    Schema(&'a Schema),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

pub fn clarify<'a>(schema: &Schema, clarification: impl Into<Clarification<'a>>) -> Result<Schema, SubstitutionError> {
    let clarification = clarification.into();
    tracing::trace!(%schema, %clarification, "clarify");
    visit(schema, clarification)
}

pub(crate) fn visit(schema: &Schema, clarification: Clarification<'_>) -> Result<Schema, SubstitutionError> {
    match (schema, clarification) {
        (Schema::Any(any), c) => any::clarify_any(any, c),
        (_, Clarification::Schema(Schema::Any(alts))) => any::distribute(schema, alts),
        (Schema::List(props), c) => list::clarify_list(schema, props, c),
        (Schema::Dict(props), c) => dict::clarify_dict(schema, props, c),
        (schema, c) => scalar(schema, c),
    }
}

/// Raw value: pin it, keep the other constraints. Pinned schema: take it.
/// Unpinned schema: its set fields override the base's.
fn scalar(schema: &Schema, clarification: Clarification<'_>) -> Result<Schema, SubstitutionError> {
    use Clarification as C;
    check(schema, clarification)?;
    let narrowed = match (schema, clarification) {
        (Schema::None, _) => Schema::None,
        (Schema::Bool(_), C::Value(Value::Bool(b))) => Schema::Bool(BoolProps { value: Some(*b) }),
        (Schema::Bool(p), C::Schema(Schema::Bool(q))) => Schema::Bool(BoolProps { value: q.value.or(p.value) }),
        (Schema::Int(p), C::Value(Value::Int(i))) => Schema::Int(p.clone().with_value(*i)),
        (Schema::Int(p), C::Schema(Schema::Int(q))) => Schema::Int(num(p, q)),
        (Schema::Float(p), C::Value(Value::Float(x))) => Schema::Float(p.clone().with_value(*x)),
        (Schema::Float(p), C::Schema(Schema::Float(q))) => Schema::Float(num(p, q)),
        (Schema::Str(p), C::Value(Value::Str(s))) => Schema::Str(p.clone().with_value(s.clone())),
        (Schema::Str(p), C::Schema(Schema::Str(q))) => {
            Schema::Str(if q.value.is_some() { q.clone() } else { p.overlay(q) })
        }
        (Schema::Bytes(_), C::Value(Value::Bytes(bs))) => Schema::Bytes(BytesProps { value: Some(bs.clone()) }),
        (Schema::Bytes(p), C::Schema(Schema::Bytes(q))) => {
            Schema::Bytes(BytesProps { value: q.value.clone().or_else(|| p.value.clone()) })
        }
        (Schema::Const(_), C::Value(v)) => Schema::Const(ConstProps { value: Some(v.clone()) }),
        (Schema::Const(p), C::Schema(Schema::Const(q))) => {
            Schema::Const(ConstProps { value: q.value.clone().or_else(|| p.value.clone()) })
        }
        (schema, c) => {
            return Err(SubstitutionError::Mismatch { schema: schema.kind(), clarification: c.to_string() });
        }
    };
    Ok(narrowed)
}

fn num<T: Copy>(p: &NumProps<T>, q: &NumProps<T>) -> NumProps<T> {
    if q.value.is_some() { q.clone() } else { p.overlay(q) }
}

impl Clarification<'_> {
    /// Kind of the clarification, for messages.
    pub fn kind_name(&self) -> String {
        match self {
            Clarification::Value(v) => v.kind_name().to_string(),
            Clarification::Schema(s) => s.kind().to_string(),
        }
    }
}

impl<'a> From<&'a Value> for Clarification<'a> {
    fn from(v: &'a Value) -> Self { Clarification::Value(v) }
}

impl<'a> From<&'a Schema> for Clarification<'a> {
    fn from(s: &'a Schema) -> Self { Clarification::Schema(s) }
}

impl fmt::Display for Clarification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clarification::Value(v) => write!(f, "{v}"),
            Clarification::Schema(s) => write!(f, "{s}"),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FloatProps, IntProps, Lengths, ListProps, StrProps};
    use ordered_float::OrderedFloat;
    use proptest::option;
    use proptest::prelude::*;

    fn lengths() -> impl Strategy<Value = Lengths> {
        (option::of(0usize..6), option::of(0usize..6), option::of(0usize..6))
            .prop_map(|(len, min_len, max_len)| Lengths { len, min_len, max_len })
    }

    #[test]
    fn raw_value_pins_and_keeps_bounds() {
        let s = Schema::from(IntProps::default().with_min(1).with_max(10));
        let got = clarify(&s, &Value::Int(5)).unwrap();
        assert_eq!(got, Schema::from(IntProps::default().with_value(5).with_min(1).with_max(10)));
        assert!(clarify(&s, &Value::Int(11)).is_err());
        assert!(clarify(&s, &Value::str("5")).is_err());
    }

    #[test]
    fn min_may_only_tighten() {
        let s = Schema::from(IntProps::default().with_min(42));
        let got = clarify(&s, &Schema::from(IntProps::default().with_min(51))).unwrap();
        assert_eq!(got, Schema::from(IntProps::default().with_min(51)));
        let err = clarify(&s, &Schema::from(IntProps::default().with_min(31))).unwrap_err();
        assert!(matches!(err, SubstitutionError::Violations(_)));
    }

    #[test]
    fn unset_fields_are_inherited() {
        let s = Schema::from(IntProps::default().with_min(1).with_max(10));
        let got = clarify(&s, &Schema::from(IntProps::default().with_max(5))).unwrap();
        assert_eq!(got, Schema::from(IntProps::default().with_min(1).with_max(5)));

        let s = Schema::from(StrProps::default().with_substr("ban"));
        let got = clarify(&s, &Schema::from(StrProps::default().with_max_len(9))).unwrap();
        assert_eq!(got, Schema::from(StrProps::default().with_substr("ban").with_max_len(9)));
    }

    #[test]
    fn pinned_candidate_is_taken_as_is() {
        let s = Schema::from(FloatProps::default().with_min(OrderedFloat(0.0)));
        let pinned = Schema::from(FloatProps::default().with_value(OrderedFloat(2.5)));
        assert_eq!(clarify(&s, &pinned).unwrap(), pinned);
    }

    #[test]
    fn strings_pin_checked_values() {
        let s = Schema::from(StrProps::default().with_len(6));
        let got = clarify(&s, &Value::str("banana")).unwrap();
        assert_eq!(got, Schema::from(StrProps::default().with_len(6).with_value("banana")));
        assert!(clarify(&s, &Value::str("apple")).is_err());
    }

    #[test]
    fn const_and_none() {
        let v = Value::dict([("a", Value::Int(1))]);
        let got = clarify(&Schema::constant(), &v).unwrap();
        assert_eq!(got, Schema::Const(ConstProps { value: Some(v.clone()) }));
        assert!(clarify(&got, &Value::dict([("a", Value::Int(2))])).is_err());
        assert_eq!(clarify(&Schema::none(), &Value::None).unwrap(), Schema::None);
        assert!(clarify(&Schema::none(), &Value::Int(0)).is_err());
    }

    #[test]
    fn bool_and_bytes_pin() {
        assert_eq!(
            clarify(&Schema::bool(), &Value::Bool(false)).unwrap(),
            Schema::Bool(BoolProps { value: Some(false) }),
        );
        let pinned = Schema::Bytes(BytesProps { value: Some(vec![1, 2]) });
        assert!(clarify(&pinned, &Value::Bytes(vec![1, 2])).is_ok());
        assert!(clarify(&pinned, &Value::Bytes(vec![2])).is_err());
    }

    #[test]
    fn clarifying_with_itself_is_identity() {
        let schemas = [
            Schema::from(IntProps::default().with_min(1).with_max(3)),
            Schema::from(StrProps::default().with_substr("x").with_min_len(2)),
            Schema::Bool(BoolProps { value: Some(true) }),
            Schema::constant(),
            Schema::none(),
        ];
        for s in &schemas {
            assert_eq!(&clarify(s, s).unwrap(), s);
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let s = Schema::from(IntProps::default().with_min(1));
        let before = s.clone();
        let _ = clarify(&s, &Value::Int(3));
        let _ = clarify(&s, &Value::Int(-3));
        assert_eq!(s, before);
    }

    proptest! {
        #[test]
        fn narrowed_str_lengths_admit_no_new_strings(base in lengths(), cand in lengths()) {
            let base = Schema::Str(StrProps::default().with_lengths(base));
            let cand = Schema::Str(StrProps::default().with_lengths(cand));
            if let Ok(narrowed) = clarify(&base, &cand) {
                for n in 0..=7 {
                    let s = Value::str("a".repeat(n));
                    prop_assert!(check(&narrowed, &s).is_err() || check(&base, &s).is_ok(), "{narrowed} admits {n}");
                }
            }
        }

        #[test]
        fn narrowed_list_lengths_admit_no_new_lists(base in lengths(), cand in lengths()) {
            let base = Schema::List(ListProps::default().with_lengths(base));
            let cand = Schema::List(ListProps::default().with_lengths(cand));
            if let Ok(narrowed) = clarify(&base, &cand) {
                for n in 0..=7 {
                    let xs = Value::list(std::iter::repeat_n(Value::Int(0), n));
                    prop_assert!(check(&narrowed, &xs).is_err() || check(&base, &xs).is_ok(), "{narrowed} admits {n}");
                }
            }
        }
    }
}
