//! UPDATE query builder filtered by a [`Predicate`].

use crate::condition::Predicate;
use crate::error::{DbError, DbResult};
use crate::qb::param::{Param, ParamList};
use crate::qb::traits::{MutationQb, SqlQb};
use tokio_postgres::types::ToSql;

/// SET field value type.
#[derive(Clone, Debug)]
enum SetField {
    /// Parameterized value
    Value(Param),
    /// Raw SQL expression
    Raw(String),
}

/// UPDATE query builder for bulk updates.
///
/// Without a filter every row is updated, matching what the statement says.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    /// Table name, optionally with an alias (`member m`)
    table: String,
    /// SET clauses
    set_fields: Vec<(String, SetField)>,
    /// WHERE conjunction
    filter: Predicate,
}

impl UpdateQb {
    /// Create a new UPDATE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            set_fields: Vec::new(),
            filter: Predicate::always(),
        }
    }

    /// Set a column value.
    pub fn set<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.set_fields
            .push((column.to_string(), SetField::Value(Param::new(value))));
        self
    }

    /// Set a raw SQL expression (e.g. `age + 1`).
    pub fn set_raw(mut self, column: &str, expr: &str) -> Self {
        self.set_fields
            .push((column.to_string(), SetField::Raw(expr.to_string())));
        self
    }

    /// AND a predicate into the WHERE clause.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = std::mem::take(&mut self.filter).and(predicate);
        self
    }

    fn build_update(&self) -> (String, ParamList) {
        let mut params = ParamList::new();

        let mut set_parts = Vec::new();
        for (col, field) in &self.set_fields {
            match field {
                SetField::Value(param) => {
                    let idx = params.push_param(param.clone());
                    set_parts.push(format!("{col} = ${idx}"));
                }
                SetField::Raw(expr) => {
                    set_parts.push(format!("{col} = {expr}"));
                }
            }
        }

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));

        // WHERE placeholders continue after the SET values
        let where_sql = self.filter.build(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        (sql, params)
    }
}

impl SqlQb for UpdateQb {
    fn build(&self) -> (String, ParamList) {
        self.build_update()
    }

    fn tag(&self) -> &'static str {
        "update"
    }

    fn validate(&self) -> DbResult<()> {
        if self.set_fields.is_empty() {
            return Err(DbError::Validation(format!(
                "UPDATE {} has no SET clause",
                self.table
            )));
        }
        Ok(())
    }
}

impl MutationQb for UpdateQb {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenericClient;
    use crate::condition::{CmpOp, Term};
    use crate::schema::member;
    use tokio_postgres::Row;

    #[test]
    fn test_update_numbers_where_after_set() {
        let qb = UpdateQb::new(member::FROM)
            .set("username", "junior")
            .filter(Term::new(member::AGE, CmpOp::Lt, 28).unwrap().into());
        assert_eq!(qb.to_sql(), "UPDATE member m SET username = $1 WHERE m.age < $2");
        assert_eq!(qb.build().1.len(), 2);
    }

    #[test]
    fn test_update_raw_without_filter() {
        let qb = UpdateQb::new(member::FROM).set_raw("age", "m.age + 1");
        assert_eq!(qb.to_sql(), "UPDATE member m SET age = m.age + 1");
    }

    #[test]
    fn test_update_without_set_fails_validation() {
        let qb = UpdateQb::new(member::FROM)
            .filter(Term::new(member::AGE, CmpOp::Lt, 28).unwrap().into());
        assert!(matches!(qb.validate(), Err(DbError::Validation(_))));
        assert_eq!(qb.to_sql(), "UPDATE member m SET  WHERE m.age < $1");
    }

    /// Client that fails the test if any statement reaches it.
    struct Unreachable;

    impl GenericClient for Unreachable {
        async fn query(&self, sql: &str, _: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
            panic!("unexpected query: {sql}")
        }

        async fn execute(&self, sql: &str, _: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
            panic!("unexpected execute: {sql}")
        }

        async fn batch_execute(&self, sql: &str) -> DbResult<()> {
            panic!("unexpected batch: {sql}")
        }
    }

    #[tokio::test]
    async fn test_execute_without_set_is_rejected_before_sending() {
        let err = UpdateQb::new(member::FROM).execute(&Unreachable).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
