use crate::error::ViolationKind;
use crate::schema::StrProps;
use crate::schema::str::char_len;

pub fn is_narrower(base: &StrProps, sub: &StrProps) -> bool {
    stops(base, sub).is_empty()
}

/// Every clause of `base` that `sub` fails to keep or tighten.
pub fn stops(base: &StrProps, sub: &StrProps) -> Vec<ViolationKind> {
    let mut stops = super::length_stops(base.lengths(), sub.lengths());
    let mut stop = |constraint: &'static str, detail: String| {
        stops.push(ViolationKind::Narrowing { constraint, detail });
    };

    if let (Some(len), Some(substr)) = (base.len, &sub.substr) {
        if char_len(substr) > len {
            stop("len", format!("substring {substr:?} is longer than {len}"));
        }
    }

    if let Some(substr) = &base.substr {
        if sub.substr.is_none() && sub.value.is_none() {
            stop("substr", format!("{substr:?} is left unset"));
        }
        if let Some(s) = sub.substr.as_ref().filter(|s| !s.contains(substr.as_str())) {
            stop("substr", format!("{s:?} does not contain {substr:?}"));
        }
        if let Some(v) = sub.value.as_ref().filter(|v| !v.contains(substr.as_str())) {
            stop("substr", format!("value {v:?} does not contain {substr:?}"));
        }
        if let Some(n) = sub.len.filter(|n| char_len(substr) > *n) {
            stop("substr", format!("{substr:?} does not fit in len {n}"));
        }
    }

    // no regex subsumption: only the very same pattern is known to be as narrow
    if let Some(rx) = &base.regex {
        match &sub.regex {
            None => stop("regex", format!("/{rx}/ is left unset")),
            Some(other) if other != rx => stop("regex", format!("/{other}/ is not known to narrow /{rx}/")),
            Some(_) => {}
        }
    }

    if let Some(value) = &base.value {
        let n = char_len(value);
        match &sub.value {
            None => stop("value", format!("{value:?} is left unset")),
            Some(v) if v != value => stop("value", format!("{v:?} differs from {value:?}")),
            Some(_) => {}
        }
        if sub.len.is_some_and(|len| len != n) {
            stop("value", format!("{value:?} can't have len {}", sub.len.unwrap_or_default()));
        }
        if sub.min_len.is_some_and(|min| n < min) {
            stop("value", format!("{value:?} is shorter than min_len {}", sub.min_len.unwrap_or_default()));
        }
        if sub.max_len.is_some_and(|max| n > max) {
            stop("value", format!("{value:?} is longer than max_len {}", sub.max_len.unwrap_or_default()));
        }
    }

    stops
}
