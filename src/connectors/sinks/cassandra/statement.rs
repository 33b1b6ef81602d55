// Copyright 2025
// Licensed under the Elastic License v2.0

//! Record to CQL statement translation.
//!
//! Every record becomes exactly one parameterized statement:
//!
//! | Operation | Statement |
//! |-----------|-----------|
//! | create, update, snapshot | `INSERT INTO ks.t (k.., c..) VALUES (?, ..)` |
//! | delete | `DELETE FROM ks.t WHERE k1 = ? AND k2 = ?` |
//!
//! `INSERT` in CQL overwrites an existing row with the same primary key, so
//! it serves as the upsert for all three write operations. Only identifiers
//! are formatted into the statement text; values are always bound.

use std::fmt::Write as _;

use chrono::{DateTime, Timelike, Utc};

use crate::core::{Record, SinkError, SinkResult, TableRef, Value};
use crate::utils::{validate_cql_identifier, validate_schema_name};

use super::validate::{structured_after, structured_key};

/// Shape of a row write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Upsert,
    Delete,
}

/// A parameterized row write with its bind values.
///
/// The first `key_len` columns are the row key. For deletes those are the
/// only columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    table: TableRef,
    columns: Vec<String>,
    values: Vec<Value>,
    key_len: usize,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Column names in bind order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Bind values, one per column.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn key_columns(&self) -> &[String] {
        &self.columns[..self.key_len]
    }

    /// `(column, value)` pairs in bind order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// CQL text with one `?` marker per bind value.
    pub fn cql(&self) -> String {
        let mut cql = String::with_capacity(64 + self.columns.len() * 16);
        match self.kind {
            StatementKind::Upsert => {
                let _ = write!(
                    cql,
                    "INSERT INTO {} ({}) VALUES ({})",
                    self.table.qualified_name(),
                    self.columns.join(", "),
                    vec!["?"; self.columns.len()].join(", ")
                );
            }
            StatementKind::Delete => {
                let predicate = self
                    .columns
                    .iter()
                    .map(|c| format!("{} = ?", c))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                let _ = write!(
                    cql,
                    "DELETE FROM {} WHERE {}",
                    self.table.qualified_name(),
                    predicate
                );
            }
        }
        cql
    }
}

/// Builds the statement for a validated record.
///
/// Upserts bind the key columns followed by the payload columns. A payload
/// field that repeats a key column is bound once, through the key; if the two
/// values disagree the record is rejected. Deletes bind the key columns only.
pub fn build_statement(record: &Record, table: &TableRef) -> SinkResult<Statement> {
    validate_schema_name(&table.keyspace)?;
    validate_schema_name(&table.name)?;

    let key = structured_key(record)?;
    if key.is_empty() {
        return Err(SinkError::EmptyKey);
    }

    let mut columns = Vec::with_capacity(key.len());
    let mut values = Vec::with_capacity(key.len());
    for (name, value) in key {
        columns.push(validate_cql_identifier(name)?.to_string());
        values.push(adapt_value(value));
    }
    let key_len = columns.len();

    let kind = if record.operation.is_upsert() {
        let after = structured_after(record)?;
        columns.reserve(after.len());
        values.reserve(after.len());
        for (name, value) in after {
            if let Some(key_value) = key.get(name) {
                if key_value != value {
                    return Err(SinkError::ConflictingKeyColumn(name.clone()));
                }
                continue;
            }
            columns.push(validate_cql_identifier(name)?.to_string());
            values.push(adapt_value(value));
        }
        StatementKind::Upsert
    } else {
        StatementKind::Delete
    };

    Ok(Statement {
        kind,
        table: table.clone(),
        columns,
        values,
        key_len,
    })
}

/// Forwards the record's value, trimming timestamps to the store's
/// millisecond precision.
fn adapt_value(value: &Value) -> Value {
    match value {
        Value::Timestamp(ts) => Value::Timestamp(truncate_to_millis(*ts)),
        other => other.clone(),
    }
}

pub(crate) fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.nanosecond();
    ts.with_nanosecond(nanos - nanos % 1_000_000).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Data, Operation, StructuredData};
    use chrono::TimeZone;

    fn table() -> TableRef {
        TableRef::new("conduit_test", "orders")
    }

    fn key() -> Data {
        Data::Structured(
            [("id1", Value::from("6")), ("id2", Value::from(6))]
                .into_iter()
                .collect(),
        )
    }

    fn payload() -> Data {
        Data::Structured(
            [("column1", Value::from(22)), ("column2", Value::from(false))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_upsert_statement() {
        for op in [Operation::Create, Operation::Update, Operation::Snapshot] {
            let stmt = build_statement(&Record::new(op, key(), payload()), &table()).unwrap();

            assert_eq!(stmt.kind(), StatementKind::Upsert);
            assert_eq!(
                stmt.cql(),
                "INSERT INTO conduit_test.orders (id1, id2, column1, column2) VALUES (?, ?, ?, ?)"
            );
            assert_eq!(stmt.key_columns(), ["id1", "id2"]);
            assert_eq!(
                stmt.values(),
                [
                    Value::from("6"),
                    Value::from(6),
                    Value::from(22),
                    Value::from(false)
                ]
            );
        }
    }

    #[test]
    fn test_delete_statement_uses_key_only() {
        let stmt = build_statement(
            &Record::new(Operation::Delete, key(), payload()),
            &table(),
        )
        .unwrap();

        assert_eq!(stmt.kind(), StatementKind::Delete);
        assert_eq!(
            stmt.cql(),
            "DELETE FROM conduit_test.orders WHERE id1 = ? AND id2 = ?"
        );
        assert_eq!(stmt.columns(), stmt.key_columns());
        assert_eq!(stmt.values(), [Value::from("6"), Value::from(6)]);
    }

    #[test]
    fn test_delete_with_raw_payload() {
        let stmt = build_statement(
            &Record::new(Operation::Delete, key(), Data::Raw(vec![])),
            &table(),
        )
        .unwrap();
        assert_eq!(stmt.columns().len(), 2);
    }

    #[test]
    fn test_upsert_with_empty_payload_writes_key_only() {
        let stmt = build_statement(
            &Record::new(Operation::Create, key(), Data::Structured(StructuredData::new())),
            &table(),
        )
        .unwrap();
        assert_eq!(
            stmt.cql(),
            "INSERT INTO conduit_test.orders (id1, id2) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_empty_key_never_builds() {
        let record = Record::new(
            Operation::Delete,
            Data::Structured(StructuredData::new()),
            Data::Raw(vec![]),
        );
        assert!(matches!(
            build_statement(&record, &table()),
            Err(SinkError::EmptyKey)
        ));
    }

    #[test]
    fn test_timestamp_truncated_to_millis() {
        let ts = Utc.with_ymd_and_hms(2023, 5, 1, 12, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let mut after = StructuredData::new();
        after.insert("column3", ts);

        let stmt = build_statement(
            &Record::new(Operation::Create, key(), Data::Structured(after)),
            &table(),
        )
        .unwrap();

        let expected = Utc.with_ymd_and_hms(2023, 5, 1, 12, 30, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(stmt.values()[2], Value::Timestamp(expected));
    }

    #[test]
    fn test_payload_repeating_key_column() {
        let mut after = StructuredData::new();
        after.insert("id2", 6);
        after.insert("column1", 1);
        let stmt = build_statement(
            &Record::new(Operation::Update, key(), Data::Structured(after)),
            &table(),
        )
        .unwrap();
        assert_eq!(stmt.columns(), ["id1", "id2", "column1"]);

        let mut conflicting = StructuredData::new();
        conflicting.insert("id2", 7);
        let err = build_statement(
            &Record::new(Operation::Update, key(), Data::Structured(conflicting)),
            &table(),
        )
        .unwrap_err();
        assert!(matches!(err, SinkError::ConflictingKeyColumn(c) if c == "id2"));
    }

    #[test]
    fn test_unsafe_column_name_rejected() {
        let mut after = StructuredData::new();
        after.insert("column1) VALUES (1); --", 1);
        let err = build_statement(
            &Record::new(Operation::Create, key(), Data::Structured(after)),
            &table(),
        )
        .unwrap_err();
        assert!(matches!(err, SinkError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_unsafe_table_rejected() {
        let bad = TableRef::new("ks", "orders; DROP TABLE x");
        let err = build_statement(&Record::new(Operation::Create, key(), payload()), &bad)
            .unwrap_err();
        assert!(matches!(err, SinkError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_bindings_pair_columns_with_values() {
        let stmt = build_statement(
            &Record::new(Operation::Snapshot, key(), payload()),
            &table(),
        )
        .unwrap();
        let pairs: Vec<_> = stmt.bindings().collect();
        assert_eq!(pairs[0], ("id1", &Value::from("6")));
        assert_eq!(pairs[3], ("column2", &Value::from(false)));
    }
}
