//! Null-safe dynamic predicate composition.
//!
//! Search screens hand over a sparse set of optional filters. This module turns the
//! present ones into a single conjunctive [`Predicate`] and ignores the rest:
//!
//! - `None` and blank strings contribute nothing
//! - a filter whose term cannot be built (bad identifier, type mismatch) is dropped
//!   and reported through `tracing`, the rest of the predicate survives
//! - no filters at all gives the neutral predicate, which matches every row
//!
//! Two equivalent styles are provided:
//!
//! ```ignore
//! use pgfilter::{ConditionBuilder, SearchCondition, schema::{member, team}};
//!
//! let cond = SearchCondition::new().with_team_name("teamB").with_age_goe(35);
//!
//! // Imperative
//! let mut b = ConditionBuilder::new();
//! b.add_equals(member::USERNAME, cond.username_eq.as_deref())
//!     .add_equals(team::NAME, cond.team_name_eq.as_deref())
//!     .add_at_least(member::AGE, cond.age_goe)
//!     .add_at_most(member::AGE, cond.age_loe);
//! let p1 = b.build();
//!
//! // Fold over per-field mappers
//! let p2 = cond.to_predicate();
//!
//! assert!(p1.is_equivalent(&p2));
//! ```

mod builder;
mod field;
mod predicate;
mod search;
mod subquery;
mod value;

pub use builder::ConditionBuilder;
pub use field::Field;
pub use predicate::{CmpOp, Operand, Predicate, Record, Term, has_text};
pub use search::{
    FilterFn, MEMBER_TEAM_FILTERS, SearchCondition, age_goe, age_loe, conjoin_all, team_name_eq,
    username_eq,
};
pub use subquery::Subquery;
pub use value::{FieldKind, Value};
