//! # pgfilter
//!
//! Null-safe dynamic search over Postgres for the Member/Team schema.
//!
//! ## Features
//!
//! - **Sparse filters**: absent or blank filters contribute nothing, no filters match every row
//! - **Two composition styles**: an imperative [`ConditionBuilder`] and a fold over per-field
//!   mappers ([`SearchCondition::to_predicate`]), producing equivalent predicates
//! - **Fault containment**: a filter whose term cannot be built is dropped and logged, never fatal
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Paging**: offset pages with a count query that is skipped when the total is known
//!
//! ## Example
//!
//! ```ignore
//! use pgfilter::{MemberRepository, PageRequest, SearchCondition};
//!
//! let repo = MemberRepository::new(&client);
//! let cond = SearchCondition::new()
//!     .with_team_name("teamB")
//!     .with_age_goe(35)
//!     .with_age_loe(40);
//!
//! let rows = repo.search(&cond).await?;
//! let page = repo.search_page_complex(&cond, PageRequest::of(0, 3)?).await?;
//! ```

pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod page;
#[cfg(feature = "pool")]
pub mod pool;
pub mod qb;
pub mod repository;
pub mod row;
pub mod schema;

pub use client::GenericClient;
pub use condition::{
    CmpOp, ConditionBuilder, Field, FieldKind, Operand, Predicate, Record, SearchCondition,
    Subquery, Term, Value,
};
pub use config::{DbConfig, Recycling, connect};
pub use error::{DbError, DbResult, TermError};
pub use page::{Page, PageRequest};
pub use qb::{MutationQb, SqlQb};
pub use repository::MemberRepository;
pub use row::{
    AgeStats, FromRow, Member, MemberAverageAge, MemberTeamDto, RowExt, Team, TeamAverageAge,
};

#[cfg(feature = "pool")]
pub use deadpool_postgres::{Pool, PoolError};
#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
