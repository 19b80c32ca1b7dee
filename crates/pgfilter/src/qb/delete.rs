//! DELETE query builder filtered by a [`Predicate`].

use crate::condition::Predicate;
use crate::qb::param::ParamList;
use crate::qb::traits::{MutationQb, SqlQb};

/// DELETE query builder.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    /// Table name, optionally with an alias (`member m`)
    table: String,
    /// WHERE conjunction
    filter: Predicate,
    /// Whether to allow DELETE without WHERE (dangerous!)
    allow_delete_all: bool,
}

impl DeleteQb {
    /// Create a new DELETE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: Predicate::always(),
            allow_delete_all: false,
        }
    }

    /// Allow DELETE without WHERE conditions (dangerous!).
    ///
    /// By default, a neutral filter generates `WHERE 1=0` (no-op).
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }

    /// AND a predicate into the WHERE clause.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = std::mem::take(&mut self.filter).and(predicate);
        self
    }

    fn build_delete(&self) -> (String, ParamList) {
        let mut params = ParamList::new();

        if self.filter.is_neutral() && !self.allow_delete_all {
            return (format!("DELETE FROM {} WHERE 1=0", self.table), params);
        }

        let mut sql = format!("DELETE FROM {}", self.table);
        let where_sql = self.filter.build(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        (sql, params)
    }
}

impl SqlQb for DeleteQb {
    fn build(&self) -> (String, ParamList) {
        self.build_delete()
    }

    fn tag(&self) -> &'static str {
        "delete"
    }
}

impl MutationQb for DeleteQb {}
