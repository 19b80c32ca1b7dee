//! Imperative, null-safe condition builder.

use super::field::Field;
use super::predicate::{CmpOp, Predicate, Term, compare_term, equals_term};
use crate::error::TermError;

/// Accumulates the present filters of a search into a [`Predicate`].
///
/// Absent values (and blank strings) are skipped. A filter whose term cannot be
/// constructed is dropped, logged, and kept in [`dropped`](Self::dropped); it never
/// aborts the rest of the predicate, so [`build`](Self::build) always succeeds.
///
/// # Example
/// ```ignore
/// use pgfilter::{ConditionBuilder, schema::{member, team}};
///
/// let mut b = ConditionBuilder::new();
/// b.add_equals(team::NAME, Some("teamB"))
///     .add_at_least(member::AGE, Some(35))
///     .add_at_most(member::AGE, None);
/// assert_eq!(b.build().to_sql(), "t.name = $1 AND m.age >= $2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConditionBuilder {
    predicate: Predicate,
    dropped: Vec<TermError>,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conjoin `field = value` unless `value` is `None` or blank.
    pub fn add_equals(&mut self, field: Field, value: Option<&str>) -> &mut Self {
        self.push(equals_term(field, value))
    }

    /// Conjoin `field >= value` unless `value` is `None`.
    pub fn add_at_least(&mut self, field: Field, value: Option<i32>) -> &mut Self {
        self.push(compare_term(field, CmpOp::Gte, value))
    }

    /// Conjoin `field <= value` unless `value` is `None`.
    pub fn add_at_most(&mut self, field: Field, value: Option<i32>) -> &mut Self {
        self.push(compare_term(field, CmpOp::Lte, value))
    }

    fn push(&mut self, term: Option<Result<Term, TermError>>) -> &mut Self {
        match term {
            None => {}
            Some(Ok(term)) => self.predicate.and_term(term),
            Some(Err(err)) => {
                log_dropped(&err);
                self.dropped.push(err);
            }
        }
        self
    }

    /// The conjunction of everything added so far.
    pub fn build(&self) -> Predicate {
        self.predicate.clone()
    }

    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }

    /// Filters that were present but could not be turned into a term.
    pub fn dropped(&self) -> &[TermError] {
        &self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.predicate.is_neutral()
    }
}

pub(crate) fn log_dropped(err: &TermError) {
    tracing::warn!(target: "pgfilter.condition", error = %err, "dropping filter term");
}
