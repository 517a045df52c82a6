//! Generalized list aligner.
//!
//! Enumerates every way a pattern with wildcards can be laid over a concrete
//! sequence. Each non-wildcard pattern item consumes exactly one concrete item
//! that the comparator accepts; each wildcard absorbs zero or more concrete
//! items, and only a wildcard may absorb a concrete wildcard.
//!
//! The search is an explicit stack machine, depth first, trying to release a
//! wildcard before letting it absorb one more item. Dead ends are kept as
//! diagnostics.
use std::fmt;
use std::iter::FusedIterator;

use crate::value::WildcardMarker;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, PartialEq)]
pub enum Pair<'a, P, C> {
    /// Non-wildcard pattern item paired with one concrete item.
    Match(&'a P, &'a C),
    /// Current pattern wildcard swallows this concrete item.
    Absorb(&'a C),
    /// Current pattern wildcard is done.
    Release,
}

#[derive(Debug)]
pub struct AlignmentFailure<'a, P, C> {
    pub pairs: Vec<Pair<'a, P, C>>,
    pub cause: String,
    pub pattern_rest: &'a [P],
    pub concrete_rest: &'a [C],
}

pub struct Alignments<'a, P, C, F> {
    pattern: &'a [P],
    concrete: &'a [C],
    comparator: F,
    pending: Vec<Branch<'a, P, C>>,
    trail: Vec<Pair<'a, P, C>>,
    failures: Vec<AlignmentFailure<'a, P, C>>,
}

struct Branch<'a, P, C> {
    p: usize,
    c: usize,
    /// Trail length the step is appended at.
    depth: usize,
    step: Option<Pair<'a, P, C>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

pub fn align<'a, P, C, F>(pattern: &'a [P], concrete: &'a [C], comparator: F) -> Alignments<'a, P, C, F>
where
    P: WildcardMarker,
    C: WildcardMarker,
    F: FnMut(&P, &C) -> bool,
{
    Alignments {
        pattern,
        concrete,
        comparator,
        pending: vec![Branch { p: 0, c: 0, depth: 0, step: None }],
        trail: Vec::new(),
        failures: Vec::new(),
    }
}

impl<'a, P, C, F> Alignments<'a, P, C, F> {
    /// Dead ends met so far.
    pub fn failures(&self) -> &[AlignmentFailure<'a, P, C>] {
        &self.failures
    }

    fn fail(&mut self, cause: String, pattern_rest: &'a [P], concrete_rest: &'a [C]) {
        self.failures.push(AlignmentFailure {
            pairs: self.trail.clone(),
            cause,
            pattern_rest,
            concrete_rest,
        });
    }
}

impl<'a, P, C, F> Iterator for Alignments<'a, P, C, F>
where
    P: WildcardMarker,
    C: WildcardMarker,
    F: FnMut(&P, &C) -> bool,
{
    type Item = Vec<Pair<'a, P, C>>;

    fn next(&mut self) -> Option<Self::Item> {
        let pattern: &'a [P] = self.pattern;
        let concrete: &'a [C] = self.concrete;
        while let Some(Branch { p, c, depth, step }) = self.pending.pop() {
            self.trail.truncate(depth);
            self.trail.extend(step);
            let depth = self.trail.len();

            let Some(head) = pattern.get(p) else {
                if c == concrete.len() {
                    return Some(self.trail.clone());
                }
                self.fail("concrete items left after the pattern".into(), &pattern[p..], &concrete[c..]);
                continue;
            };

            if head.is_wildcard() {
                // pushed last = popped first: release before absorb
                if let Some(item) = concrete.get(c) {
                    self.pending.push(Branch { p, c: c + 1, depth, step: Some(Pair::Absorb(item)) });
                }
                self.pending.push(Branch { p: p + 1, c, depth, step: Some(Pair::Release) });
                continue;
            }

            match concrete.get(c) {
                None => {
                    self.fail("concrete exhausted while the pattern is not".into(), &pattern[p..], &concrete[c..]);
                }
                Some(item) if item.is_wildcard() => {
                    let cause = format!("wildcard at {c} can only be absorbed by a wildcard");
                    self.fail(cause, &pattern[p..], &concrete[c..]);
                }
                Some(item) if !(self.comparator)(head, item) => {
                    let cause = format!("item {c} does not fit pattern position {p}");
                    self.fail(cause, &pattern[p..], &concrete[c..]);
                }
                Some(item) => {
                    self.pending.push(Branch { p: p + 1, c: c + 1, depth, step: Some(Pair::Match(head, item)) });
                }
            }
        }
        None
    }
}

impl<P, C, F> FusedIterator for Alignments<'_, P, C, F>
where
    P: WildcardMarker,
    C: WildcardMarker,
    F: FnMut(&P, &C) -> bool,
{
}

impl<P, C> Clone for Pair<'_, P, C> {
    fn clone(&self) -> Self { *self }
}

impl<P, C> Copy for Pair<'_, P, C> {}

impl<P, C> fmt::Display for AlignmentFailure<'_, P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (after {} pairs, {} pattern / {} concrete items left)",
            self.cause,
            self.pairs.len(),
            self.pattern_rest.len(),
            self.concrete_rest.len(),
        )
    }
}

// ------------------------------- Tests ------------------------------------ //
