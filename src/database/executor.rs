use async_trait::async_trait;
use serde_json::Value;
use sqlx::{self, postgres::{PgArguments, PgRow}, FromRow, PgPool};

use super::manager::DatabaseError;
use super::types::SqlStatement;

/// Runs rendered statements against a data source.
#[async_trait]
pub trait Executor<T>: Send + Sync {
    /// All rows, in the order the statement produces them.
    async fn fetch_all(&self, statement: &SqlStatement) -> Result<Vec<T>, DatabaseError>;

    /// First column of the first row, or `None` when the statement yields no row.
    async fn fetch_scalar(&self, statement: &SqlStatement) -> Result<Option<i64>, DatabaseError>;
}

#[async_trait]
impl<T> Executor<T> for PgPool
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    async fn fetch_all(&self, statement: &SqlStatement) -> Result<Vec<T>, DatabaseError> {
        tracing::debug!(sql = %statement.query, "fetch");
        let mut q = sqlx::query_as::<_, T>(&statement.query);
        for p in statement.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(self).await?;
        Ok(rows)
    }

    async fn fetch_scalar(&self, statement: &SqlStatement) -> Result<Option<i64>, DatabaseError> {
        tracing::debug!(sql = %statement.query, "fetch scalar");
        let mut q = sqlx::query_scalar::<_, i64>(&statement.query);
        for p in statement.params.iter() {
            q = bind_param_query_scalar(q, p);
        }
        let value = q.fetch_optional(self).await?;
        Ok(value)
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                // Postgres doesn't have u64; cast down if safe
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}

fn bind_param_query_scalar<'q, O>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
