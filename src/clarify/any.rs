//! Disjunctions: on the schema side, on the clarification side, or both.
use super::{visit, Clarification};
use crate::compare;
use crate::error::SubstitutionError;
use crate::schema::{AnyProps, Schema};

/// Every alternative is tried; the ones that fail are dropped.
pub(super) fn clarify_any(any: &AnyProps, clarification: Clarification<'_>) -> Result<Schema, SubstitutionError> {
    if any.types.is_empty() {
        return match clarification {
            Clarification::Value(v) => Schema::from_value(v),
            Clarification::Schema(s) => Ok(s.clone()),
        };
    }
    if let Clarification::Schema(Schema::Any(alts)) = clarification {
        return resolve_disjunction(any, alts);
    }

    let survivors = any.types.iter()
        .filter_map(|alt| match visit(alt, clarification) {
            Ok(narrowed) => Some(narrowed),
            Err(error) => {
                tracing::debug!(alternative = %alt, %error, "alternative dropped");
                None
            }
        })
        .collect();
    settle(collapse(survivors)).ok_or_else(|| no_alternative(any, clarification))
}

/// Each clarifying alternative must be taken up by at least one base
/// alternative it is comparably narrower than.
fn resolve_disjunction(any: &AnyProps, alts: &AnyProps) -> Result<Schema, SubstitutionError> {
    if alts.types.is_empty() {
        return Err(SubstitutionError::Widening(Schema::any().to_string()));
    }
    let mut narrowed = Vec::new();
    for alt in &alts.types {
        // an alternative restated verbatim is kept as is
        if any.types.contains(alt) {
            narrowed.push(alt.clone());
            continue;
        }
        let before = narrowed.len();
        for base in any.types.iter().filter(|base| compare::is_narrower(base, alt)) {
            match visit(base, Clarification::Schema(alt)) {
                Ok(schema) => narrowed.push(schema),
                Err(error) => tracing::debug!(alternative = %base, clarification = %alt, %error, "pair dropped"),
            }
        }
        if narrowed.len() == before {
            return Err(no_alternative(any, Clarification::Schema(alt)));
        }
    }
    settle(dedup(narrowed)).ok_or_else(|| no_alternative(any, Clarification::Schema(&Schema::any())))
}

/// A plain schema clarified by a disjunction: every alternative has to narrow it.
pub(super) fn distribute(schema: &Schema, alts: &AnyProps) -> Result<Schema, SubstitutionError> {
    if alts.types.is_empty() {
        return Err(SubstitutionError::Widening(Schema::any().to_string()));
    }
    let narrowed = alts.types.iter()
        .map(|alt| visit(schema, Clarification::Schema(alt)))
        .collect::<Result<Vec<_>, _>>()?;
    settle(dedup(narrowed)).ok_or_else(|| SubstitutionError::Widening(Schema::any().to_string()))
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn dedup(schemas: Vec<Schema>) -> Vec<Schema> {
    let mut kept: Vec<Schema> = Vec::with_capacity(schemas.len());
    for schema in schemas {
        if !kept.contains(&schema) {
            kept.push(schema);
        }
    }
    kept
}

/// Drop duplicates, and strings subsumed by a wider surviving string.
/// Only for survivors of a value fold, where every survivor admits the value.
fn collapse(schemas: Vec<Schema>) -> Vec<Schema> {
    let mut kept: Vec<Schema> = Vec::with_capacity(schemas.len());
    for schema in schemas {
        if kept.contains(&schema) || kept.iter().any(|k| subsumes(k, &schema)) {
            continue;
        }
        kept.retain(|k| !subsumes(&schema, k));
        kept.push(schema);
    }
    kept
}

fn subsumes(wide: &Schema, narrow: &Schema) -> bool {
    match (wide, narrow) {
        (Schema::Str(w), Schema::Str(n)) => compare::str::is_narrower(w, n),
        _ => false,
    }
}

fn settle(mut schemas: Vec<Schema>) -> Option<Schema> {
    match schemas.len() {
        0 => None,
        1 => schemas.pop(),
        _ => Some(Schema::any_of(schemas)),
    }
}

fn no_alternative(any: &AnyProps, clarification: Clarification<'_>) -> SubstitutionError {
    SubstitutionError::NoAlternative {
        schema: Schema::Any(any.clone()).to_string(),
        clarification: clarification.to_string(),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::super::clarify;
    use super::*;
    use crate::schema::{DictProps, FloatProps, IntProps, StrProps};
    use crate::value::Value;
    use ordered_float::OrderedFloat;

    fn dict1(key: &str, schema: Schema) -> Schema {
        Schema::from(DictProps::closed([(key, schema)]))
    }

    fn float42() -> Schema {
        Schema::from(FloatProps::default().with_value(OrderedFloat(42.0)))
    }

    #[test]
    fn unconstrained_any_takes_the_canonical_schema() {
        let got = clarify(&Schema::any(), &Value::list([Value::Int(1)])).unwrap();
        assert_eq!(got, Schema::from_value(&Value::list([Value::Int(1)])).unwrap());
        let s = Schema::any_of([Schema::str(), Schema::float(), Schema::int()]);
        assert_eq!(clarify(&Schema::any(), &s).unwrap(), s);
    }

    #[test]
    fn single_survivor_is_unwrapped() {
        let s = Schema::any_of([dict1("a", Schema::int()), dict1("b", Schema::str())]);
        assert_eq!(clarify(&s, &dict1("a", Schema::int())).unwrap(), dict1("a", Schema::int()));
        assert_eq!(clarify(&s, &dict1("b", Schema::str())).unwrap(), dict1("b", Schema::str()));

        let got = clarify(&s, &Value::dict([("a", Value::Int(7))])).unwrap();
        assert_eq!(got, dict1("a", Schema::from(IntProps::default().with_value(7))));
    }

    #[test]
    fn several_survivors_stay_a_disjunction() {
        let s = Schema::any_of([Schema::from(IntProps::default().with_min(0)), Schema::from(IntProps::default().with_max(9))]);
        let got = clarify(&s, &Value::Int(5)).unwrap();
        assert_eq!(got, Schema::any_of([
            Schema::from(IntProps::default().with_min(0).with_value(5)),
            Schema::from(IntProps::default().with_max(9).with_value(5)),
        ]));
    }

    #[test]
    fn identical_survivors_collapse() {
        let s = Schema::any_of([Schema::from(DictProps::open(Vec::<(String, Schema)>::new())), dict1("a", Schema::str())]);
        assert_eq!(clarify(&s, &dict1("a", Schema::str())).unwrap(), dict1("a", Schema::str()));
    }

    #[test]
    fn no_survivor_fails() {
        let s = Schema::any_of([Schema::int(), Schema::str()]);
        let err = clarify(&s, &Value::Bool(true)).unwrap_err();
        assert!(matches!(err, SubstitutionError::NoAlternative { .. }));
    }

    #[test]
    fn disjunction_by_narrower_disjunction() {
        let wide = Schema::any_of([Schema::str(), Schema::float(), Schema::int()]);
        let narrow = Schema::any_of([Schema::str(), Schema::float()]);
        assert_eq!(clarify(&wide, &narrow).unwrap(), narrow);

        let pinned = Schema::any_of([Schema::str(), float42(), Schema::int()]);
        assert_eq!(clarify(&wide, &pinned).unwrap(), pinned);
        assert_eq!(
            clarify(&pinned, &Schema::any_of([Schema::str(), Schema::int()])).unwrap(),
            Schema::any_of([Schema::str(), Schema::int()]),
        );
    }

    #[test]
    fn disjunction_by_wider_disjunction_fails() {
        let cases = [
            (Schema::any_of([Schema::str(), Schema::float(), Schema::int()]), Schema::any()),
            (Schema::any_of([Schema::str(), Schema::float()]), Schema::any_of([Schema::str(), Schema::float(), Schema::int()])),
            (Schema::any_of([Schema::str(), float42(), Schema::int()]), Schema::any_of([Schema::str(), Schema::float(), Schema::int()])),
            (Schema::any_of([Schema::str(), Schema::int()]), Schema::any_of([Schema::str(), float42(), Schema::int()])),
        ];
        for (base, clarification) in &cases {
            let before = base.clone();
            assert!(clarify(base, clarification).is_err(), "{base} <- {clarification}");
            assert_eq!(base, &before);
        }
    }

    #[test]
    fn dict_alternatives_need_comparable_partners() {
        let s = Schema::any_of([dict1("a", Schema::int()), dict1("b", Schema::str())]);
        let c = Schema::any_of([dict1("a", Schema::int()), dict1("c", Schema::int())]);
        assert!(matches!(clarify(&s, &c).unwrap_err(), SubstitutionError::NoAlternative { .. }));
    }

    #[test]
    fn plain_schema_by_disjunction_needs_every_alternative() {
        let s = Schema::from(IntProps::default().with_min(0));
        let c = Schema::any_of([
            Schema::from(IntProps::default().with_value(1)),
            Schema::from(IntProps::default().with_value(2)),
        ]);
        assert_eq!(clarify(&s, &c).unwrap(), c);
        let bad = Schema::any_of([Schema::from(IntProps::default().with_value(1)), Schema::str()]);
        assert!(clarify(&s, &bad).is_err());
        assert!(matches!(clarify(&s, &Schema::any()).unwrap_err(), SubstitutionError::Widening(_)));
    }

    #[test]
    fn clarifying_with_itself_is_identity() {
        let len3 = || Schema::from(StrProps::default().with_len(3));
        let schemas = [
            Schema::any_of([len3(), Schema::str()]),
            Schema::any_of([Schema::str(), len3()]),
            Schema::any_of([Schema::str(), float42(), Schema::int()]),
            Schema::any_of([dict1("a", Schema::int()), dict1("b", Schema::str())]),
            Schema::any(),
        ];
        for s in &schemas {
            assert_eq!(&clarify(s, s).unwrap(), s, "{s}");
        }
    }

    #[test]
    fn disjunction_keeps_comparable_strings_apart() {
        let s = Schema::any_of([Schema::str(), Schema::int()]);
        let c = Schema::any_of([Schema::from(StrProps::default().with_len(3)), Schema::str()]);
        assert_eq!(clarify(&s, &c).unwrap(), c);

        let plain = Schema::from(StrProps::default().with_max_len(9));
        let got = clarify(&plain, &c).unwrap();
        assert_eq!(got, Schema::any_of([
            Schema::from(StrProps::default().with_len(3).with_max_len(9)),
            plain.clone(),
        ]));
    }

    #[test]
    fn narrower_strings_collapse_into_wider() {
        let got = collapse(vec![
            Schema::from(StrProps::default().with_len(3).with_substr("a")),
            Schema::from(StrProps::default().with_len(3)),
        ]);
        assert_eq!(got, vec![Schema::from(StrProps::default().with_len(3))]);
    }
}
