use serde_json::Value;

use super::manager::DatabaseError;
use super::types::{validate_identifier, SortDirection, SqlStatement};

/// SELECT builder rooted at one table.
///
/// Expressions passed to `select`, `and_where`, `group_by` and `order_by` are
/// written by the repositories and interpolated as-is; values always travel
/// as bound parameters. Table names and aliases are validated.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table_name: String,
    root_alias: String,
    identity: String,
    select_columns: Vec<String>,
    joins: Vec<String>,
    conditions: Vec<String>,
    params: Vec<Value>,
    group_by: Vec<String>,
    order_by: Vec<(String, SortDirection)>,
    first_result: Option<u64>,
    max_results: Option<u64>,
}

impl QueryBuilder {
    pub fn new(table_name: impl Into<String>, root_alias: impl Into<String>) -> Result<Self, DatabaseError> {
        let table_name = table_name.into();
        let root_alias = root_alias.into();
        validate_identifier(&table_name)?;
        validate_identifier(&root_alias)?;

        Ok(Self {
            table_name,
            root_alias,
            identity: "id".to_string(),
            select_columns: vec![],
            joins: vec![],
            conditions: vec![],
            params: vec![],
            group_by: vec![],
            order_by: vec![],
            first_result: None,
            max_results: None,
        })
    }

    /// Column that identifies one root row; defaults to `id`.
    pub fn identity(mut self, column: impl Into<String>) -> Result<Self, DatabaseError> {
        let column = column.into();
        validate_identifier(&column)?;
        self.identity = column;
        Ok(self)
    }

    pub fn select(mut self, expression: impl Into<String>) -> Self {
        self.select_columns.push(expression.into());
        self
    }

    pub fn left_join(
        mut self,
        table_name: &str,
        alias: &str,
        on: impl Into<String>,
    ) -> Result<Self, DatabaseError> {
        validate_identifier(table_name)?;
        validate_identifier(alias)?;
        self.joins
            .push(format!("LEFT JOIN \"{}\" {} ON {}", table_name, alias, on.into()));
        Ok(self)
    }

    /// `expression operator $n` with `value` bound to the next placeholder.
    pub fn and_where(mut self, expression: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self.conditions
            .push(format!("{} {} ${}", expression, operator, self.params.len()));
        self
    }

    /// Condition without parameters, e.g. `u.is_active = TRUE`.
    pub fn and_where_raw(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn group_by(mut self, expression: impl Into<String>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    pub fn order_by(mut self, expression: impl Into<String>, sort: SortDirection) -> Self {
        self.order_by.push((expression.into(), sort));
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

    pub fn reset_order_by(&mut self) -> &mut Self {
        self.order_by.clear();
        self
    }

    pub fn reset_group_by(&mut self) -> &mut Self {
        self.group_by.clear();
        self
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    pub fn first_result(&self) -> Option<u64> {
        self.first_result
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    /// Independent copy that counts distinct root rows.
    ///
    /// Joins can repeat a root row, GROUP BY would yield one count per group
    /// and ORDER BY on non-aggregated columns is rejected by Postgres, so the
    /// copy drops ordering, grouping and pagination and keeps only the joins
    /// and conditions.
    pub fn count_distinct_root(&self) -> QueryBuilder {
        let mut count = self.clone();
        count.select_columns = vec![format!(
            "COUNT(DISTINCT {}.{})",
            self.root_alias, self.identity
        )];
        count
            .reset_order_by()
            .reset_group_by()
            .set_first_result(None)
            .set_max_results(None);
        count
    }

    pub fn to_sql(&self) -> SqlStatement {
        let select_clause = if self.select_columns.is_empty() {
            format!("{}.*", self.root_alias)
        } else {
            self.select_columns.join(", ")
        };

        let where_clause = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };

        let group_clause = if self.group_by.is_empty() {
            String::new()
        } else {
            format!("GROUP BY {}", self.group_by.join(", "))
        };

        let order_clause = if self.order_by.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = self
                .order_by
                .iter()
                .map(|(expression, sort)| format!("{} {}", expression, sort.to_sql()))
                .collect();
            format!("ORDER BY {}", parts.join(", "))
        };

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\" {}", self.table_name, self.root_alias),
            self.joins.join(" "),
            where_clause,
            group_clause,
            order_clause,
            limit_clause(self.max_results, self.first_result),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlStatement { query, params: self.params.clone() }
    }
}

pub(crate) fn limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
        (Some(l), None) => format!("LIMIT {}", l),
        (None, Some(o)) => format!("OFFSET {}", o),
        (None, None) => String::new(),
    }
}
