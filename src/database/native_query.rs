use serde_json::Value;

use super::query_builder::limit_clause;
use super::types::SqlStatement;

/// Hand-written SQL whose bounds are applied at render time.
///
/// The SQL must not carry its own LIMIT/OFFSET; `$n` placeholders refer to
/// the values added with [`NativeQuery::bind`] in order.
#[derive(Debug, Clone)]
pub struct NativeQuery {
    sql: String,
    params: Vec<Value>,
    first_result: Option<u64>,
    max_results: Option<u64>,
}

impl NativeQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql: String = sql.into();
        let sql = sql.trim().trim_end_matches(';').trim_end().to_string();
        Self {
            sql,
            params: vec![],
            first_result: None,
            max_results: None,
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn set_first_result(&mut self, offset: Option<u64>) -> &mut Self {
        self.first_result = offset;
        self
    }

    pub fn set_max_results(&mut self, limit: Option<u64>) -> &mut Self {
        self.max_results = limit;
        self
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    pub fn to_sql(&self) -> SqlStatement {
        let bounds = limit_clause(self.max_results, self.first_result);
        let query = if bounds.is_empty() {
            self.sql.clone()
        } else {
            format!("{} {}", self.sql, bounds)
        };
        SqlStatement { query, params: self.params.clone() }
    }
}
