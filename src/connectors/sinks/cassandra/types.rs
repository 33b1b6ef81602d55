// Copyright 2025
// Licensed under the Elastic License v2.0

//! Cassandra Type Mappings
//!
//! Conversions between `core::Value` and the driver's `CqlValue`.
//!
//! Records carry a small set of dynamic value kinds (a single 64-bit integer,
//! a single float, ...) while CQL columns are declared with exact widths. The
//! prepared statement tells us each bind marker's declared type, and values
//! are encoded against it:
//!
//! | Value | Accepted column types |
//! |-------|-----------------------|
//! | Bool | boolean |
//! | Int64 | bigint, int, smallint, tinyint (range checked), double, float (exact only), timestamp (epoch ms) |
//! | Float64 | double, float (exact only) |
//! | String | text, varchar, ascii (ascii only), uuid (parsed) |
//! | Json | text, varchar |
//! | Bytes | blob |
//! | Timestamp | timestamp |
//! | Uuid | uuid, text |
//! | Decimal | unsupported |
//!
//! `Null` binds as an unset-to-null value for any column type.

use chrono::{DateTime, TimeZone, Utc};
use scylla::frame::response::result::{ColumnType, CqlValue};
use scylla::frame::value::CqlTimestamp;

use crate::core::{SinkError, SinkResult, Value};

/// Encodes `value` for a bind marker declared as `column_type`.
pub fn bind_value(column: &str, value: &Value, column_type: &ColumnType) -> SinkResult<Option<CqlValue>> {
    let mismatch = |reason: &str| SinkError::TypeMismatch {
        column: column.to_string(),
        kind: value.kind(),
        column_type: format!("{:?}", column_type),
        reason: reason.to_string(),
    };

    if value.is_null() {
        return Ok(None);
    }

    let cql = match (value, column_type) {
        (Value::Bool(b), ColumnType::Boolean) => CqlValue::Boolean(*b),

        (Value::Int64(n), ColumnType::BigInt) => CqlValue::BigInt(*n),
        (Value::Int64(n), ColumnType::Int) => {
            CqlValue::Int(i32::try_from(*n).map_err(|_| mismatch("out of range"))?)
        }
        (Value::Int64(n), ColumnType::SmallInt) => {
            CqlValue::SmallInt(i16::try_from(*n).map_err(|_| mismatch("out of range"))?)
        }
        (Value::Int64(n), ColumnType::TinyInt) => {
            CqlValue::TinyInt(i8::try_from(*n).map_err(|_| mismatch("out of range"))?)
        }
        (Value::Int64(n), ColumnType::Double) => {
            CqlValue::Double(int_to_double(*n).ok_or_else(|| mismatch(NOT_EXACT))?)
        }
        (Value::Int64(n), ColumnType::Float) => {
            CqlValue::Float(int_to_float(*n).ok_or_else(|| mismatch(NOT_EXACT))?)
        }
        (Value::Int64(n), ColumnType::Timestamp) => CqlValue::Timestamp(CqlTimestamp(*n)),

        (Value::Float64(f), ColumnType::Double) => CqlValue::Double(*f),
        (Value::Float64(f), ColumnType::Float) => {
            CqlValue::Float(double_to_float(*f).ok_or_else(|| mismatch(NOT_EXACT))?)
        }

        (Value::String(s) | Value::Json(s) | Value::Uuid(s), ColumnType::Text) => {
            CqlValue::Text(s.clone())
        }
        (Value::String(s) | Value::Json(s), ColumnType::Ascii) => {
            if !s.is_ascii() {
                return Err(mismatch("contains non-ascii characters"));
            }
            CqlValue::Ascii(s.clone())
        }
        (Value::String(s) | Value::Uuid(s), ColumnType::Uuid) => CqlValue::Uuid(
            uuid::Uuid::parse_str(s).map_err(|e| mismatch(&e.to_string()))?,
        ),

        (Value::Bytes(b), ColumnType::Blob) => CqlValue::Blob(b.clone()),

        (Value::Timestamp(ts), ColumnType::Timestamp) => {
            CqlValue::Timestamp(CqlTimestamp(ts.timestamp_millis()))
        }

        (Value::Decimal(_), _) => {
            return Err(SinkError::UnsupportedValue {
                column: column.to_string(),
                kind: value.kind(),
            })
        }

        _ => return Err(mismatch("incompatible column type")),
    };

    Ok(Some(cql))
}

const NOT_EXACT: &str = "not exactly representable";

// Float targets only take values that survive the round trip unchanged.

fn int_to_double(n: i64) -> Option<f64> {
    let f = n as f64;
    // i64::MAX rounds up to 2^63, which saturates back to i64::MAX
    (f < 9_223_372_036_854_775_808.0 && f as i64 == n).then_some(f)
}

fn int_to_float(n: i64) -> Option<f32> {
    let f = n as f32;
    (f < 9_223_372_036_854_775_808.0 && f as i64 == n).then_some(f)
}

fn double_to_float(f: f64) -> Option<f32> {
    let narrowed = f as f32;
    if f.is_nan() {
        return Some(f32::NAN);
    }
    (narrowed as f64 == f).then_some(narrowed)
}

/// Decodes a column read back from the store.
pub fn decode_value(column: &str, value: Option<CqlValue>) -> SinkResult<Value> {
    let value = match value {
        None | Some(CqlValue::Empty) => Value::Null,
        Some(CqlValue::Boolean(b)) => Value::Bool(b),
        Some(CqlValue::TinyInt(n)) => Value::Int64(n as i64),
        Some(CqlValue::SmallInt(n)) => Value::Int64(n as i64),
        Some(CqlValue::Int(n)) => Value::Int64(n as i64),
        Some(CqlValue::BigInt(n)) => Value::Int64(n),
        Some(CqlValue::Float(f)) => Value::Float64(f as f64),
        Some(CqlValue::Double(f)) => Value::Float64(f),
        Some(CqlValue::Text(s)) | Some(CqlValue::Ascii(s)) => Value::String(s),
        Some(CqlValue::Blob(b)) => Value::Bytes(b),
        Some(CqlValue::Uuid(u)) => Value::Uuid(u.to_string()),
        Some(CqlValue::Timestamp(CqlTimestamp(ms))) => Value::Timestamp(millis_to_datetime(column, ms)?),
        Some(_) => {
            return Err(SinkError::UnsupportedValue {
                column: column.to_string(),
                kind: "cql collection or exotic",
            })
        }
    };
    Ok(value)
}

fn millis_to_datetime(column: &str, ms: i64) -> SinkResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| SinkError::TypeMismatch {
            column: column.to_string(),
            kind: "timestamp",
            column_type: "Timestamp".to_string(),
            reason: format!("{} ms is out of range", ms),
        })
}
