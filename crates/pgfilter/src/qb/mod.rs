//! Query builders driven by [`Predicate`](crate::condition::Predicate) filters.
//!
//! Every builder renders parameterized SQL (`$1, $2, ...`) and executes through any
//! [`GenericClient`](crate::client::GenericClient).
//!
//! ```ignore
//! use pgfilter::{qb, SearchCondition, MemberTeamDto, SqlQb};
//! use pgfilter::schema::{member, team, MEMBER_TEAM_ON};
//!
//! let cond = SearchCondition::new().with_team_name("teamB");
//! let rows: Vec<MemberTeamDto> = qb::select(member::FROM)
//!     .select_cols(&MemberTeamDto::COLUMNS)
//!     .left_join(team::FROM, MEMBER_TEAM_ON)
//!     .filter(cond.to_predicate())
//!     .fetch_all(&client)
//!     .await?;
//! ```

mod delete;
mod insert;
mod param;
mod select;
mod traits;
mod update;

pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use param::{Param, ParamList};
pub use select::SelectQb;
pub use traits::{MutationQb, SqlQb};
pub use update::UpdateQb;

/// Start a SELECT over a table or `table alias` expression.
pub fn select(from_expr: &str) -> SelectQb {
    SelectQb::new(from_expr)
}

/// Start an INSERT into a table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Start an UPDATE of a table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Start a DELETE from a table.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}
