//! SELECT query builder filtered by a [`Predicate`].

use crate::client::GenericClient;
use crate::condition::{CmpOp, Predicate, Subquery};
use crate::error::DbResult;
use crate::page::PageRequest;
use crate::qb::param::{Param, ParamList};
use crate::qb::traits::{SqlQb, log_sql};
use tokio_postgres::types::ToSql;

/// SELECT query builder.
#[derive(Clone, Debug)]
pub struct SelectQb {
    /// Table or FROM expression
    from_expr: String,
    /// SELECT columns (default ["*"])
    select_cols: Vec<String>,
    /// Scalar subqueries appended to the SELECT list, with their aliases
    select_subqueries: Vec<(Subquery, String)>,
    /// JOIN clauses
    join_clauses: Vec<String>,
    /// WHERE conjunction
    filter: Predicate,
    /// GROUP BY clause
    group_by: Option<String>,
    /// HAVING conditions over aggregate expressions
    having: Vec<(String, CmpOp, Param)>,
    /// ORDER BY clauses
    order_clauses: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table or `table alias` expression.
    pub fn new(from_expr: &str) -> Self {
        Self {
            from_expr: from_expr.to_string(),
            select_cols: vec!["*".to_string()],
            select_subqueries: Vec::new(),
            join_clauses: Vec::new(),
            filter: Predicate::always(),
            group_by: None,
            having: Vec::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns (string form, supports complex expressions).
    pub fn select(mut self, cols: &str) -> Self {
        self.select_cols = vec![cols.to_string()];
        self
    }

    /// Set SELECT columns (array form).
    pub fn select_cols(mut self, cols: &[&str]) -> Self {
        self.select_cols = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append `(query) AS alias` to the SELECT list.
    pub fn select_subquery(mut self, query: impl Into<Subquery>, alias: &str) -> Self {
        self.select_subqueries.push((query.into(), alias.to_string()));
        self
    }

    // ==================== JOIN ====================

    /// Add INNER JOIN.
    pub fn inner_join(mut self, table: &str, on: &str) -> Self {
        self.join_clauses.push(format!("INNER JOIN {table} ON {on}"));
        self
    }

    /// Add LEFT JOIN.
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.join_clauses.push(format!("LEFT JOIN {table} ON {on}"));
        self
    }

    // ==================== WHERE ====================

    /// AND a predicate into the WHERE clause. The neutral predicate adds nothing.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = std::mem::take(&mut self.filter).and(predicate);
        self
    }

    // ==================== GROUP BY / HAVING ====================

    /// Set GROUP BY clause.
    pub fn group_by(mut self, clause: &str) -> Self {
        self.group_by = Some(clause.to_string());
        self
    }

    /// Add HAVING condition: expr = value
    pub fn having_eq<T: ToSql + Send + Sync + 'static>(self, expr: &str, value: T) -> Self {
        self.having(expr, CmpOp::Eq, value)
    }

    /// Add HAVING condition: expr > value
    pub fn having_gt<T: ToSql + Send + Sync + 'static>(self, expr: &str, value: T) -> Self {
        self.having(expr, CmpOp::Gt, value)
    }

    /// Add HAVING condition: expr >= value
    pub fn having_gte<T: ToSql + Send + Sync + 'static>(self, expr: &str, value: T) -> Self {
        self.having(expr, CmpOp::Gte, value)
    }

    /// Add HAVING condition: expr < value
    pub fn having_lt<T: ToSql + Send + Sync + 'static>(self, expr: &str, value: T) -> Self {
        self.having(expr, CmpOp::Lt, value)
    }

    /// Add HAVING condition: expr <= value
    pub fn having_lte<T: ToSql + Send + Sync + 'static>(self, expr: &str, value: T) -> Self {
        self.having(expr, CmpOp::Lte, value)
    }

    /// Add HAVING condition over an aggregate expression such as `AVG(m.age)::float8`.
    pub fn having<T: ToSql + Send + Sync + 'static>(
        mut self,
        expr: &str,
        op: CmpOp,
        value: T,
    ) -> Self {
        self.having.push((expr.to_string(), op, Param::new(value)));
        self
    }

    // ==================== Ordering & pagination ====================

    /// Add ORDER BY clause.
    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_clauses.push(clause.to_string());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Apply LIMIT/OFFSET for a page.
    pub fn paginate(self, request: PageRequest) -> Self {
        self.limit(request.size()).offset(request.offset())
    }

    // ==================== Build helpers ====================

    fn render_select_list(&self, params: &mut ParamList) -> String {
        let mut items = self.select_cols.clone();
        for (query, alias) in &self.select_subqueries {
            items.push(format!("({}) AS {alias}", query.build(params)));
        }
        items.join(", ")
    }

    /// ` FROM ... [JOIN ...] [WHERE ...] [GROUP BY ...] [HAVING ...]`
    fn render_body(&self, params: &mut ParamList) -> String {
        let mut sql = format!(" FROM {}", self.from_expr);

        for join in &self.join_clauses {
            sql.push(' ');
            sql.push_str(join);
        }

        let where_sql = self.filter.build(params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if let Some(group_by) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group_by);
        }

        if !self.having.is_empty() {
            let parts: Vec<String> = self
                .having
                .iter()
                .map(|(expr, op, value)| {
                    let idx = params.push_param(value.clone());
                    format!("{expr} {} ${idx}", op.as_sql())
                })
                .collect();
            sql.push_str(" HAVING ");
            sql.push_str(&parts.join(" AND "));
        }

        sql
    }

    fn render_rows(&self, params: &mut ParamList) -> String {
        let mut sql = format!("SELECT {}", self.render_select_list(params));
        sql.push_str(&self.render_body(params));

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    /// COUNT companion: same FROM/JOIN/WHERE, no ordering or paging.
    /// Grouped queries count their groups.
    fn render_count(&self, params: &mut ParamList) -> String {
        if self.group_by.is_some() {
            format!("SELECT COUNT(*) FROM (SELECT 1{}) AS grouped", self.render_body(params))
        } else {
            format!("SELECT COUNT(*){}", self.render_body(params))
        }
    }

    /// Render as a nested query, continuing the outer statement's placeholders.
    pub(crate) fn build_into(&self, params: &mut ParamList) -> String {
        self.render_rows(params)
    }

    /// Get the COUNT SQL string (for debugging).
    pub fn to_count_sql(&self) -> String {
        self.render_count(&mut ParamList::new())
    }

    // ==================== Execution ====================

    /// Execute the COUNT companion query.
    pub async fn count(&self, conn: &impl GenericClient) -> DbResult<i64> {
        self.validate()?;
        let mut params = ParamList::new();
        let sql = self.render_count(&mut params);
        log_sql("select.count", &sql, params.len());
        let row = conn.query_one(&sql, &params.as_refs()).await?;
        row.try_get(0).map_err(|e| crate::DbError::decode("count", e.to_string()))
    }
}

impl SqlQb for SelectQb {
    fn build(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let sql = self.render_rows(&mut params);
        (sql, params)
    }

    fn tag(&self) -> &'static str {
        "select"
    }
}
