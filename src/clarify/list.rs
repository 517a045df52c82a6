//! Lists, by a raw sequence or by another list schema.
//!
//! Patterns with wildcards only at the ends are laid over the data in closed
//! form (body, head, tail, exact). Interior wildcards and pattern-vs-pattern
//! clarifications go through the aligner, keeping its first alignment.
use super::{visit, Clarification};
use crate::align::{align, Pair};
use crate::check::check;
use crate::error::SubstitutionError;
use crate::schema::{Item, ListProps, Schema, Shape};
use crate::schema::list::shape;
use crate::value::{Value, WildcardMarker};

pub(super) fn clarify_list(
    schema: &Schema,
    props: &ListProps,
    clarification: Clarification<'_>,
) -> Result<Schema, SubstitutionError> {
    check(schema, clarification)?;
    match clarification {
        Clarification::Value(Value::List(xs)) => by_value(props, xs),
        Clarification::Schema(Schema::List(other)) => by_schema(props, other),
        c => Err(SubstitutionError::Mismatch { schema: schema.kind(), clarification: c.to_string() }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RAW SEQUENCES
// ————————————————————————————————————————————————————————————————————————————

fn by_value(props: &ListProps, xs: &[Value]) -> Result<Schema, SubstitutionError> {
    if xs.iter().any(WildcardMarker::is_wildcard) {
        return Err(SubstitutionError::WildcardInValue);
    }
    let elements = match (&props.item_type, &props.elements) {
        (Some(item_type), _) => xs.iter()
            .map(|x| visit(item_type, Clarification::Value(x)))
            .collect::<Result<Vec<_>, _>>()?,
        (None, Some(pattern)) => by_pattern(pattern, xs)?,
        (None, None) => convert(xs)?,
    };
    let narrowed = ListProps::from_elements(elements.into_iter().map(Item::Schema))
        .with_lengths(props.lengths());
    Ok(Schema::List(narrowed))
}

fn by_pattern(pattern: &[Item], xs: &[Value]) -> Result<Vec<Schema>, SubstitutionError> {
    match shape(pattern) {
        Shape::Body([]) => convert(xs),
        Shape::Body(inner) => {
            for start in 0..xs.len() {
                match splice(inner, xs, start) {
                    Ok(elements) => return Ok(elements),
                    Err(error) => tracing::trace!(start, %error, "offset rejected"),
                }
            }
            Err(no_alignment(pattern, Value::List(xs.to_vec())))
        }
        Shape::Head(inner) | Shape::Exact(inner) => splice(inner, xs, 0),
        Shape::Tail(inner) => splice(inner, xs, xs.len().saturating_sub(inner.len())),
        Shape::Scattered(_) => scattered(pattern, xs),
    }
}

/// Clarify `xs[start..start + inner.len()]` by `inner`; everything around
/// the window is converted as is.
fn splice(inner: &[Item], xs: &[Value], start: usize) -> Result<Vec<Schema>, SubstitutionError> {
    if start + inner.len() > xs.len() {
        return Err(SubstitutionError::OutOfRange(start.max(xs.len())));
    }
    let (prefix, rest) = xs.split_at(start);
    let (window, suffix) = rest.split_at(inner.len());

    let mut out = convert(prefix)?;
    for (item, x) in inner.iter().zip(window) {
        out.push(element(item, x)?);
    }
    out.extend(convert(suffix)?);
    Ok(out)
}

fn scattered(pattern: &[Item], xs: &[Value]) -> Result<Vec<Schema>, SubstitutionError> {
    let mut alignments = align(pattern, xs, |item, x| element(item, x).is_ok());
    let Some(pairs) = alignments.next() else {
        for failure in alignments.failures() {
            tracing::trace!(%failure, "dead end");
        }
        return Err(no_alignment(pattern, Value::List(xs.to_vec())));
    };
    pairs.into_iter()
        .filter_map(|pair| match pair {
            Pair::Match(item, x) => Some(element(item, x)),
            Pair::Absorb(x) => Some(Schema::from_value(x)),
            Pair::Release => None,
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// LIST SCHEMAS
// ————————————————————————————————————————————————————————————————————————————

fn by_schema(props: &ListProps, other: &ListProps) -> Result<Schema, SubstitutionError> {
    let lengths = props.lengths().overlay(other.lengths());
    let narrowed = match (&props.item_type, &props.elements) {
        (Some(item_type), _) => typed(item_type, other)?,
        (None, _) if props.is_shapeless() => ListProps {
            item_type: other.item_type.clone(),
            elements: other.elements.clone(),
            ..ListProps::default()
        },
        (None, Some(pattern)) => match &other.elements {
            Some(items) => ListProps::from_elements(pattern_by_pattern(pattern, items)?),
            None => return Err(widening(other)),
        },
        (None, None) => ListProps::default(),
    };
    Ok(Schema::List(narrowed.with_lengths(lengths)))
}

/// Homogeneous base: a typed candidate narrows the type, an elements
/// candidate narrows each position by it.
fn typed(item_type: &Schema, other: &ListProps) -> Result<ListProps, SubstitutionError> {
    if let Some(other_type) = &other.item_type {
        return Ok(ListProps::of(visit(item_type, Clarification::Schema(other_type))?));
    }
    if let Some(items) = &other.elements {
        let items = items.iter()
            .map(|item| match item {
                Item::Schema(s) => visit(item_type, Clarification::Schema(s)).map(Item::Schema),
                // a wildcard admits anything, so only an unconstrained type survives it
                Item::Wildcard if item_type.is_unconstrained() => Ok(Item::Wildcard),
                Item::Wildcard => Err(widening(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ListProps::from_elements(items));
    }
    if item_type.is_unconstrained() {
        Ok(ListProps::default())
    } else {
        Err(widening(other))
    }
}

/// Pattern vs pattern. Candidate items absorbed by a base wildcard are kept
/// unchanged, candidate wildcards included.
fn pattern_by_pattern(pattern: &[Item], items: &[Item]) -> Result<Vec<Item>, SubstitutionError> {
    let mut alignments = align(pattern, items, |p, q| narrow_item(p, q).is_ok());
    let Some(pairs) = alignments.next() else {
        for failure in alignments.failures() {
            tracing::trace!(%failure, "dead end");
        }
        let concrete = Schema::List(ListProps::from_elements(items.to_vec()));
        return Err(SubstitutionError::NoAlignment { pattern: pattern_text(pattern), concrete: concrete.to_string() });
    };
    pairs.into_iter()
        .filter_map(|pair| match pair {
            Pair::Match(p, q) => Some(narrow_item(p, q)),
            Pair::Absorb(q) => Some(Ok(q.clone())),
            Pair::Release => None,
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn element(item: &Item, x: &Value) -> Result<Schema, SubstitutionError> {
    match item.schema() {
        Some(s) => visit(s, Clarification::Value(x)),
        None => Schema::from_value(x),
    }
}

fn narrow_item(p: &Item, q: &Item) -> Result<Item, SubstitutionError> {
    match (p.schema(), q.schema()) {
        (Some(p), Some(q)) => visit(p, Clarification::Schema(q)).map(Item::Schema),
        _ => Ok(q.clone()),
    }
}

fn convert(xs: &[Value]) -> Result<Vec<Schema>, SubstitutionError> {
    xs.iter().map(Schema::from_value).collect()
}

fn pattern_text(pattern: &[Item]) -> String {
    Schema::List(ListProps::from_elements(pattern.to_vec())).to_string()
}

fn no_alignment(pattern: &[Item], concrete: Value) -> SubstitutionError {
    SubstitutionError::NoAlignment { pattern: pattern_text(pattern), concrete: concrete.to_string() }
}

fn widening(other: &ListProps) -> SubstitutionError {
    SubstitutionError::Widening(Schema::List(other.clone()).to_string())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::super::clarify;
    use super::*;
    use crate::schema::{IntProps, StrProps};

    fn int(v: i64) -> Schema { Schema::from(IntProps::default().with_value(v)) }

    fn ints(xs: &[i64]) -> Value { Value::list(xs.iter().copied().map(Value::Int)) }

    fn pattern(items: impl IntoIterator<Item = Item>) -> Schema {
        Schema::from(ListProps::from_elements(items))
    }

    fn pinned(xs: &[i64]) -> Schema {
        pattern(xs.iter().map(|x| Item::Schema(int(*x))))
    }

    #[test]
    fn body_pattern_finds_its_window() {
        let s = pattern([Item::Wildcard, int(1).into(), int(2).into(), Item::Wildcard]);
        assert_eq!(clarify(&s, &ints(&[0, 1, 2, 3])).unwrap(), pinned(&[0, 1, 2, 3]));
        assert!(clarify(&s, &ints(&[1])).is_err());
        assert!(matches!(clarify(&s, &ints(&[2, 1, 3])).unwrap_err(), SubstitutionError::NoAlignment { .. }));
    }

    #[test]
    fn head_and_tail_patterns_convert_the_rest() {
        let head = pattern([Schema::int().into(), Item::Wildcard]);
        assert_eq!(clarify(&head, &ints(&[7, 8, 9])).unwrap(), pinned(&[7, 8, 9]));

        let tail = pattern([Item::Wildcard, int(9).into()]);
        assert_eq!(clarify(&tail, &ints(&[7, 8, 9])).unwrap(), pinned(&[7, 8, 9]));
        assert!(clarify(&tail, &ints(&[9, 8])).is_err());
    }

    #[test]
    fn lone_wildcard_accepts_anything() {
        let s = pattern([Item::Wildcard]);
        assert_eq!(clarify(&s, &ints(&[1, 2])).unwrap(), pinned(&[1, 2]));
        assert_eq!(clarify(&s, &ints(&[])).unwrap(), pinned(&[]));
    }

    #[test]
    fn exact_pattern_is_positional() {
        let s = pattern([Item::from(Schema::int()), Item::from(Schema::str())]);
        let got = clarify(&s, &Value::list([Value::Int(1), Value::str("a")])).unwrap();
        assert_eq!(got, pattern([Item::from(int(1)), Item::from(Schema::from(StrProps::default().with_value("a")))]));
        assert!(clarify(&s, &Value::list([Value::str("a"), Value::Int(1)])).is_err());
        assert!(clarify(&s, &ints(&[1])).is_err());
    }

    #[test]
    fn interior_wildcards_use_the_aligner() {
        let s = pattern([Item::Wildcard, int(1).into(), Item::Wildcard, int(3).into(), Item::Wildcard]);
        assert_eq!(clarify(&s, &ints(&[0, 1, 2, 3, 4])).unwrap(), pinned(&[0, 1, 2, 3, 4]));
        assert!(clarify(&s, &ints(&[3, 1])).is_err());
    }

    #[test]
    fn homogeneous_type_is_consumed() {
        let s = Schema::from(ListProps::of(Schema::from(IntProps::default().with_min(0))).with_max_len(3));
        let got = clarify(&s, &ints(&[1, 2])).unwrap();
        let want = ListProps::from_elements([
            Item::Schema(Schema::from(IntProps::default().with_min(0).with_value(1))),
            Item::Schema(Schema::from(IntProps::default().with_min(0).with_value(2))),
        ]).with_max_len(3);
        assert_eq!(got, Schema::from(want));
        assert!(clarify(&s, &ints(&[1, -2])).is_err());
    }

    #[test]
    fn unconstrained_list_converts_everything() {
        assert_eq!(clarify(&Schema::list(), &ints(&[4, 5])).unwrap(), pinned(&[4, 5]));
    }

    #[test]
    fn wildcards_are_not_data() {
        let err = clarify(&Schema::list(), &Value::list([Value::Int(1), Value::Wildcard])).unwrap_err();
        assert_eq!(err, SubstitutionError::WildcardInValue);
    }

    #[test]
    fn pattern_by_narrower_pattern() {
        let base = pattern([Item::Wildcard, Schema::int().into(), Item::Wildcard]);
        let candidate = pattern([Item::Wildcard, int(1).into(), Schema::str().into(), Item::Wildcard]);
        assert_eq!(clarify(&base, &candidate).unwrap(), candidate);
        let no_int = pattern([Item::Wildcard, Schema::str().into(), Item::Wildcard]);
        assert!(matches!(clarify(&base, &no_int).unwrap_err(), SubstitutionError::NoAlignment { .. }));
    }

    #[test]
    fn typed_by_elements_and_by_type() {
        let base = Schema::from(ListProps::of(Schema::int()));
        assert_eq!(clarify(&base, &pinned(&[1, 2])).unwrap(), pinned(&[1, 2]));
        let narrower = Schema::from(ListProps::of(Schema::from(IntProps::default().with_max(3))));
        assert_eq!(clarify(&base, &narrower).unwrap(), narrower);
        let open_ended = pattern([int(1).into(), Item::Wildcard]);
        assert!(matches!(clarify(&base, &open_ended).unwrap_err(), SubstitutionError::Widening(_)));
        let any_items = Schema::from(ListProps::of(Schema::any()));
        assert_eq!(clarify(&any_items, &open_ended).unwrap(), open_ended);
    }

    #[test]
    fn pattern_by_homogeneous_widens() {
        let base = pattern([Schema::any().into()]);
        let err = clarify(&base, &Schema::from(ListProps::of(Schema::any()))).unwrap_err();
        assert!(matches!(err, SubstitutionError::Widening(_)));
    }

    #[test]
    fn lengths_only_tighten() {
        let base = Schema::from(ListProps::of(Schema::int()).with_min_len(2));
        let ok = Schema::from(ListProps::of(Schema::int()).with_min_len(3));
        assert_eq!(clarify(&base, &ok).unwrap(), ok);
        assert!(clarify(&base, &Schema::from(ListProps::of(Schema::int()).with_min_len(1))).is_err());
        assert!(clarify(&base, &pinned(&[1])).is_err());
    }

    #[test]
    fn clarifying_with_itself_is_identity() {
        let schemas = [
            pattern([Item::Wildcard, Schema::int().into(), Item::Wildcard]),
            pattern([Item::Wildcard, int(1).into(), Item::Wildcard, int(2).into(), Item::Wildcard]),
            Schema::from(ListProps::of(Schema::str()).with_max_len(4)),
            pinned(&[1, 2]),
            Schema::list(),
        ];
        for s in &schemas {
            assert_eq!(&clarify(s, s).unwrap(), s);
        }
    }
}
