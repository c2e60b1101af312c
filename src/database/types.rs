use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::manager::DatabaseError;

/// Rendered SQL with its positional (`$n`) parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub query: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Table names, aliases and column names must be `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<(), DatabaseError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("_tmp").is_ok());
        assert!(validate_identifier("refresh_tokens2").is_ok());
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1users").is_err());
        assert!(validate_identifier("users; DROP TABLE users").is_err());
        assert!(validate_identifier("u.id").is_err());
    }
}
