//! Failure reporting.
//!
//! The compatibility check yields `Violation`s (one per independent cause, each
//! with the location it was found at); the clarifier wraps them, or a single
//! structural cause, into `SubstitutionError`.
use std::fmt;
use thiserror::Error;

use crate::schema::Kind;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// `$`, `$[2]`, `$.key`, …
    pub path: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("expected {expected}, got {actual}")]
    Type { expected: Kind, actual: String },
    #[error("expected value {expected}, got {actual}")]
    Value { expected: String, actual: String },
    #[error("{actual} is below the minimum {min}")]
    Min { min: String, actual: String },
    #[error("{actual} is above the maximum {max}")]
    Max { max: String, actual: String },
    #[error("expected length {expected}, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("length {actual} is below the minimum length {min}")]
    MinLength { min: usize, actual: usize },
    #[error("length {actual} is above the maximum length {max}")]
    MaxLength { max: usize, actual: usize },
    #[error("{actual:?} does not contain {substr:?}")]
    Substr { substr: String, actual: String },
    #[error("{actual:?} does not match /{pattern}/")]
    Regex { pattern: String, actual: String },
    #[error("invalid pattern /{pattern}/: {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("unexpected key {key:?}")]
    ExtraKey { key: String },
    #[error("no alternative accepts {actual}")]
    NoAlternative { actual: String },
    /// A clarifying schema relaxes or crosses a constraint instead of tightening it.
    #[error("`{constraint}` is not narrowed: {detail}")]
    Narrowing { constraint: &'static str, detail: String },
}

/// Aggregated violations of one check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Violations(pub Vec<Violation>);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubstitutionError {
    #[error("{0}")]
    Violations(Violations),
    #[error("can't substitute a wildcard inside a concrete value")]
    WildcardInValue,
    #[error("unknown key {0:?}")]
    UnknownKey(String),
    #[error("missing required key {0:?}")]
    MissingKey(String),
    #[error("key {0:?} can't become optional")]
    OptionalKey(String),
    #[error("open-key marker can't be added to a closed dict")]
    OpenKeys,
    #[error("index {0} out of range")]
    OutOfRange(usize),
    #[error("no alignment of {pattern} against {concrete}")]
    NoAlignment { pattern: String, concrete: String },
    #[error("no alternative of {schema} accepts {clarification}")]
    NoAlternative { schema: String, clarification: String },
    #[error("can't convert {0} to schema")]
    Unconvertible(String),
    #[error("{schema} can't be clarified by {clarification}")]
    Mismatch { schema: Kind, clarification: String },
    #[error("{0} would widen the schema")]
    Widening(String),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Violation { path: path.into(), kind }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.path, self.kind)
    }
}

impl Violations {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn push(&mut self, path: &str, kind: ViolationKind) {
        self.0.push(Violation::new(path, kind));
    }

    pub fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn into_result(self) -> Result<(), Violations> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<Violations> for SubstitutionError {
    fn from(v: Violations) -> Self { SubstitutionError::Violations(v) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_concatenates_every_violation() {
        let mut vs = Violations::default();
        vs.push("$[0]", ViolationKind::Type { expected: Kind::Int, actual: "str".into() });
        vs.push("$.a", ViolationKind::ExtraKey { key: "a".into() });
        let err = SubstitutionError::from(vs);
        assert_eq!(
            err.to_string(),
            r#"at $[0]: expected int, got str, at $.a: unexpected key "a""#,
        );
    }
}
