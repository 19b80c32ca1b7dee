//! INSERT query builder.

use crate::error::{DbError, DbResult};
use crate::qb::param::{Param, ParamList};
use crate::qb::traits::{MutationQb, SqlQb};
use tokio_postgres::types::ToSql;

/// INSERT query builder for a single row.
#[derive(Clone, Debug)]
pub struct InsertQb {
    /// Table name
    table: String,
    /// Column names and their values
    values: Vec<(String, Param)>,
    /// RETURNING columns
    returning_cols: Vec<String>,
}

impl InsertQb {
    /// Create a new INSERT query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: Vec::new(),
            returning_cols: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.values.push((column.to_string(), Param::new(value)));
        self
    }

    /// Set RETURNING columns (string form).
    pub fn returning(mut self, cols: &str) -> Self {
        self.returning_cols = vec![cols.to_string()];
        self
    }

    fn build_insert(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        for (col, param) in &self.values {
            let idx = params.push_param(param.clone());
            columns.push(col.as_str());
            placeholders.push(format!("${idx}"));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        (sql, params)
    }
}

impl SqlQb for InsertQb {
    fn build(&self) -> (String, ParamList) {
        self.build_insert()
    }

    fn tag(&self) -> &'static str {
        "insert"
    }

    fn validate(&self) -> DbResult<()> {
        if self.values.is_empty() {
            return Err(DbError::Validation(format!(
                "INSERT INTO {} has no values",
                self.table
            )));
        }
        Ok(())
    }
}

impl MutationQb for InsertQb {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_returning() {
        let qb = InsertQb::new("member")
            .set("username", "member1")
            .set("age", 10i32)
            .returning("member_id");
        assert_eq!(
            qb.to_sql(),
            "INSERT INTO member (username, age) VALUES ($1, $2) RETURNING member_id"
        );
    }

    #[test]
    fn test_insert_without_values_fails_validation() {
        assert!(InsertQb::new("team").validate().is_err());
    }
}
