// Copyright 2025
// Licensed under the Elastic License v2.0

//! Utility functions for cassink
//!
//! CQL identifier validation. Keyspace, table and column names end up in
//! statement text (values never do), so every name is checked here before it
//! is formatted into a statement.

use crate::core::SinkError;

/// Longest keyspace or table name Cassandra accepts.
pub const MAX_SCHEMA_NAME_LEN: usize = 48;

/// Validates an unquoted CQL identifier.
///
/// Accepts `[A-Za-z][A-Za-z0-9_]*`, which is exactly what Cassandra accepts
/// without double quotes. Unquoted names are case-insensitive on the server.
///
/// # Examples
///
/// ```
/// use cassink::utils::validate_cql_identifier;
///
/// assert!(validate_cql_identifier("column1").is_ok());
/// assert!(validate_cql_identifier("id1; DROP TABLE t").is_err());
/// assert!(validate_cql_identifier("").is_err());
/// ```
pub fn validate_cql_identifier(name: &str) -> Result<&str, SinkError> {
    let invalid = |reason: String| SinkError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Err(invalid("identifier cannot be empty".to_string())),
    };

    if !first.is_ascii_alphabetic() {
        return Err(invalid(format!("must start with a letter, got '{}'", first)));
    }

    if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(invalid(format!("contains unsafe character '{}'", bad.escape_debug())));
    }

    Ok(name)
}

/// Validates a keyspace or table name, which also has a length limit.
pub fn validate_schema_name(name: &str) -> Result<&str, SinkError> {
    validate_cql_identifier(name)?;
    if name.len() > MAX_SCHEMA_NAME_LEN {
        return Err(SinkError::InvalidIdentifier {
            name: name.to_string(),
            reason: format!(
                "exceeds maximum length of {} characters (got {})",
                MAX_SCHEMA_NAME_LEN,
                name.len()
            ),
        });
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_cql_identifier("users").is_ok());
        assert!(validate_cql_identifier("order_items").is_ok());
        assert!(validate_cql_identifier("column3").is_ok());
        assert!(validate_cql_identifier("TABLE_ABC_123").is_ok());
        assert!(validate_cql_identifier("a").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        // Injection attempts
        assert!(validate_cql_identifier("users; DROP TABLE users--").is_err());
        assert!(validate_cql_identifier("id1) VALUES (1); --").is_err());
        assert!(validate_cql_identifier("users'OR'1'='1").is_err());
        assert!(validate_cql_identifier("\"quoted\"").is_err());

        // Names Cassandra would need quoting for
        assert!(validate_cql_identifier("_leading").is_err());
        assert!(validate_cql_identifier("1abc").is_err());
        assert!(validate_cql_identifier("my-table").is_err());
        assert!(validate_cql_identifier("ks.table").is_err());
        assert!(validate_cql_identifier("my table").is_err());
        assert!(validate_cql_identifier("table\nname").is_err());
        assert!(validate_cql_identifier("").is_err());
    }

    #[test]
    fn test_schema_name_length() {
        let max = "t".repeat(MAX_SCHEMA_NAME_LEN);
        assert!(validate_schema_name(&max).is_ok());

        let too_long = "t".repeat(MAX_SCHEMA_NAME_LEN + 1);
        let err = validate_schema_name(&too_long).unwrap_err().to_string();
        assert!(err.contains("maximum length"));
    }

    #[test]
    fn test_error_messages() {
        let err = validate_cql_identifier("").unwrap_err().to_string();
        assert!(err.contains("cannot be empty"));

        let err = validate_cql_identifier("users;").unwrap_err().to_string();
        assert!(err.contains("invalid identifier 'users;'"));
        assert!(err.contains("unsafe character ';'"));
    }
}
