//! Member/Team search conditions and their per-field filter mappers.

use super::builder::{ConditionBuilder, log_dropped};
use super::predicate::{CmpOp, Predicate, Term, compare_term, equals_term};
use crate::error::{DbError, DbResult, TermError};
use crate::schema::{member, team};
use serde::{Deserialize, Serialize};

/// Optional search fields for the member/team listing.
///
/// Every field is independently optional; `None` means no constraint.
/// Blank strings are treated as `None` when building predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCondition {
    pub username_eq: Option<String>,
    pub team_name_eq: Option<String>,
    pub age_goe: Option<i32>,
    pub age_loe: Option<i32>,
}

impl SearchCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username_eq = Some(username.into());
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name_eq = Some(team_name.into());
        self
    }

    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }

    /// Strict check for callers that must reject questionable input instead of
    /// letting predicate construction skip it.
    pub fn validate(&self) -> DbResult<()> {
        for (name, age) in [("ageGoe", self.age_goe), ("ageLoe", self.age_loe)] {
            if let Some(age) = age.filter(|a| *a < 0) {
                return Err(DbError::validation(format!("{name} must be >= 0, got {age}")));
            }
        }
        if let (Some(goe), Some(loe)) = (self.age_goe, self.age_loe) {
            if goe > loe {
                return Err(DbError::validation(format!(
                    "ageGoe ({goe}) is greater than ageLoe ({loe})"
                )));
            }
        }
        Ok(())
    }

    /// Predicate via the fold over [`MEMBER_TEAM_FILTERS`].
    pub fn to_predicate(&self) -> Predicate {
        conjoin_all(MEMBER_TEAM_FILTERS.iter().map(|filter| filter(self)))
    }

    /// Predicate via [`ConditionBuilder`]; equivalent to [`to_predicate`](Self::to_predicate).
    pub fn to_predicate_with_builder(&self) -> Predicate {
        let mut builder = ConditionBuilder::new();
        builder
            .add_equals(member::USERNAME, self.username_eq.as_deref())
            .add_equals(team::NAME, self.team_name_eq.as_deref())
            .add_at_least(member::AGE, self.age_goe)
            .add_at_most(member::AGE, self.age_loe);
        builder.into_predicate()
    }
}

/// A per-field mapper: the constraint one search field contributes, if any.
pub type FilterFn = fn(&SearchCondition) -> Option<Predicate>;

/// The filters applied by member/team searches.
pub const MEMBER_TEAM_FILTERS: [FilterFn; 4] = [username_eq, team_name_eq, age_goe, age_loe];

pub fn username_eq(cond: &SearchCondition) -> Option<Predicate> {
    settle(equals_term(member::USERNAME, cond.username_eq.as_deref()))
}

pub fn team_name_eq(cond: &SearchCondition) -> Option<Predicate> {
    settle(equals_term(team::NAME, cond.team_name_eq.as_deref()))
}

pub fn age_goe(cond: &SearchCondition) -> Option<Predicate> {
    settle(compare_term(member::AGE, CmpOp::Gte, cond.age_goe))
}

pub fn age_loe(cond: &SearchCondition) -> Option<Predicate> {
    settle(compare_term(member::AGE, CmpOp::Lte, cond.age_loe))
}

fn settle(term: Option<Result<Term, TermError>>) -> Option<Predicate> {
    term?.inspect_err(log_dropped).ok().map(Predicate::from_term)
}

/// AND together every present predicate; no input yields the neutral predicate.
pub fn conjoin_all<I>(parts: I) -> Predicate
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    parts
        .into_iter()
        .flatten()
        .fold(Predicate::always(), Predicate::and)
}
