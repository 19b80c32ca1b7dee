//! Row mapping traits and the Member/Team row types.

use crate::condition::{Field, Record, Value};
use crate::error::{DbError, DbResult};
use crate::schema::{member, team};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Trait for converting a database row into a Rust struct.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> DbResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning DbError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> DbResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> DbResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| DbError::decode(column, e.to_string()))
    }
}

macro_rules! scalar_from_row {
    ($($t:ty),*) => {
        $(
            impl FromRow for $t {
                fn from_row(row: &Row) -> DbResult<Self> {
                    row.try_get(0).map_err(|e| DbError::decode("0", e.to_string()))
                }
            }
        )*
    };
}

scalar_from_row!(i32, i64, String);

/// A team row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

impl FromRow for Team {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("team_id")?,
            name: row.try_get_column("name")?,
        })
    }
}

/// A member row. Members may not belong to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub age: i32,
    pub team_id: Option<i64>,
}

impl FromRow for Member {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("member_id")?,
            username: row.try_get_column("username")?,
            age: row.try_get_column("age")?,
            team_id: row.try_get_column("team_id")?,
        })
    }
}

impl Record for Member {
    fn field_value(&self, field: &Field) -> Option<Value> {
        match *field {
            member::ID => Some(Value::BigInt(self.id)),
            member::USERNAME => Some(Value::Text(self.username.clone())),
            member::AGE => Some(Value::Int(self.age)),
            member::TEAM_ID => self.team_id.map(Value::BigInt),
            _ => None,
        }
    }
}

/// Projection of a member joined with its team.
///
/// Produced by `member m LEFT JOIN team t`, so the team columns are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamDto {
    pub member_id: i64,
    pub username: String,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

impl MemberTeamDto {
    /// SELECT list producing the columns [`FromRow`] expects.
    pub const COLUMNS: [&'static str; 5] = [
        "m.member_id",
        "m.username",
        "m.age",
        "t.team_id",
        "t.name AS team_name",
    ];
}

impl FromRow for MemberTeamDto {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            member_id: row.try_get_column("member_id")?,
            username: row.try_get_column("username")?,
            age: row.try_get_column("age")?,
            team_id: row.try_get_column("team_id")?,
            team_name: row.try_get_column("team_name")?,
        })
    }
}

impl Record for MemberTeamDto {
    fn field_value(&self, field: &Field) -> Option<Value> {
        match *field {
            member::ID => Some(Value::BigInt(self.member_id)),
            member::USERNAME => Some(Value::Text(self.username.clone())),
            member::AGE => Some(Value::Int(self.age)),
            member::TEAM_ID | team::ID => self.team_id.map(Value::BigInt),
            team::NAME => self.team_name.clone().map(Value::Text),
            _ => None,
        }
    }
}

/// Aggregates over member ages. Every aggregate but the count is NULL without members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeStats {
    pub member_count: i64,
    pub age_sum: Option<i64>,
    pub age_avg: Option<f64>,
    pub age_max: Option<i32>,
    pub age_min: Option<i32>,
}

impl AgeStats {
    pub const COLUMNS: [&'static str; 5] = [
        "COUNT(*) AS member_count",
        "SUM(m.age) AS age_sum",
        "AVG(m.age)::float8 AS age_avg",
        "MAX(m.age) AS age_max",
        "MIN(m.age) AS age_min",
    ];
}

impl FromRow for AgeStats {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            member_count: row.try_get_column("member_count")?,
            age_sum: row.try_get_column("age_sum")?,
            age_avg: row.try_get_column("age_avg")?,
            age_max: row.try_get_column("age_max")?,
            age_min: row.try_get_column("age_min")?,
        })
    }
}

/// Average member age per team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAverageAge {
    pub team_name: String,
    pub average_age: f64,
}

impl TeamAverageAge {
    /// Aggregate expression grouped by team name.
    pub const AVERAGE_AGE: &'static str = "AVG(m.age)::float8";
    pub const COLUMNS: [&'static str; 2] =
        ["t.name AS team_name", "AVG(m.age)::float8 AS average_age"];
}

impl FromRow for TeamAverageAge {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            team_name: row.try_get_column("team_name")?,
            average_age: row.try_get_column("average_age")?,
        })
    }
}

/// A member's username next to the average age of all members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAverageAge {
    pub username: String,
    pub average_age: Option<f64>,
}

impl FromRow for MemberAverageAge {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            average_age: row.try_get_column("average_age")?,
        })
    }
}
