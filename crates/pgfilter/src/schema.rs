//! Member/Team schema: table names, aliases, filterable fields and DDL.
//!
//! Queries reach members as `member m` and teams as `team t`; the field constants
//! below are qualified with those aliases.

use crate::condition::{Field, FieldKind};

pub mod member {
    use super::*;

    pub const TABLE: &str = "member";
    pub const ALIAS: &str = "m";
    /// `member m`, for FROM clauses.
    pub const FROM: &str = "member m";

    pub const ID: Field = Field::new(ALIAS, "member_id", FieldKind::BigInt);
    pub const USERNAME: Field = Field::new(ALIAS, "username", FieldKind::Text);
    pub const AGE: Field = Field::new(ALIAS, "age", FieldKind::Int);
    pub const TEAM_ID: Field = Field::new(ALIAS, "team_id", FieldKind::BigInt);

    /// Second alias for members inside subqueries over the same table.
    pub const SUB_ALIAS: &str = "ms";
    pub const SUB_FROM: &str = "member ms";
    pub const SUB_AGE: Field = AGE.with_table(SUB_ALIAS);
}

pub mod team {
    use super::*;

    pub const TABLE: &str = "team";
    pub const ALIAS: &str = "t";
    pub const FROM: &str = "team t";

    pub const ID: Field = Field::new(ALIAS, "team_id", FieldKind::BigInt);
    pub const NAME: Field = Field::new(ALIAS, "name", FieldKind::Text);
}

/// Join condition between members and their (optional) team.
pub const MEMBER_TEAM_ON: &str = "m.team_id = t.team_id";

/// Idempotent DDL for both tables.
pub const CREATE_TABLES: &str = "\
CREATE TABLE IF NOT EXISTS team (
    team_id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS member (
    member_id BIGSERIAL PRIMARY KEY,
    username TEXT NOT NULL,
    age INTEGER NOT NULL,
    team_id BIGINT REFERENCES team (team_id)
);";
