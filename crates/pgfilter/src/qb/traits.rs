//! Trait definitions for query builders.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::qb::param::ParamList;
use crate::row::FromRow;
use tokio_postgres::Row;

/// Base trait for all query builders.
pub trait SqlQb: Sync {
    /// Build the SQL string together with its bind parameters.
    fn build(&self) -> (String, ParamList);

    /// Tag attached to the SQL debug log.
    fn tag(&self) -> &'static str;

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> String {
        self.build().0
    }

    /// Validate builder state before execution.
    fn validate(&self) -> DbResult<()> {
        Ok(())
    }

    /// Execute query and return all rows.
    fn query(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send {
        async move {
            self.validate()?;
            let (sql, params) = self.build();
            log_sql(self.tag(), &sql, params.len());
            conn.query(&sql, &params.as_refs()).await
        }
    }

    /// Execute query and return exactly one row.
    fn query_one(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = DbResult<Row>> + Send {
        async move {
            self.validate()?;
            let (sql, params) = self.build();
            log_sql(self.tag(), &sql, params.len());
            conn.query_one(&sql, &params.as_refs()).await
        }
    }

    /// Execute query and map all rows to `T`.
    fn fetch_all<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = DbResult<Vec<T>>> + Send {
        async move {
            let rows = self.query(conn).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Execute query and map exactly one row to `T`.
    fn fetch_one<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = DbResult<T>> + Send {
        async move {
            let row = self.query_one(conn).await?;
            T::from_row(&row)
        }
    }
}

/// Trait for mutation builders (INSERT/UPDATE/DELETE).
pub trait MutationQb: SqlQb {
    /// Execute and return affected row count.
    fn execute(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = DbResult<u64>> + Send {
        async move {
            self.validate()?;
            let (sql, params) = self.build();
            log_sql(self.tag(), &sql, params.len());
            conn.execute(&sql, &params.as_refs()).await
        }
    }
}

pub(crate) fn log_sql(tag: &str, sql: &str, param_count: usize) {
    tracing::debug!(target: "pgfilter.sql", tag, param_count, sql = %sql);
}
