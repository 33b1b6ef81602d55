// Copyright 2025
// Licensed under the Elastic License v2.0

//! Record shape checks.
//!
//! The store needs named, typed column values. A key or payload that arrives
//! as an opaque byte blob cannot be split into columns, so it is rejected
//! before any statement is built.

use crate::core::{Data, Record, SinkError, SinkResult, StructuredData};

/// Checks that `record` can be addressed and decomposed into columns.
///
/// - the key must be structured and non-empty, for every operation
/// - upserts must carry a structured `payload.after`
/// - deletes place no requirement on the payload
pub fn validate_record(record: &Record) -> SinkResult<()> {
    let key = structured_key(record)?;
    if key.is_empty() {
        return Err(SinkError::EmptyKey);
    }

    if record.operation.is_upsert() {
        structured_after(record)?;
    }

    Ok(())
}

pub(crate) fn structured_key(record: &Record) -> SinkResult<&StructuredData> {
    match &record.key {
        Data::Structured(fields) => Ok(fields),
        Data::Raw(_) => Err(SinkError::KeyNotStructured),
    }
}

pub(crate) fn structured_after(record: &Record) -> SinkResult<&StructuredData> {
    match &record.payload.after {
        Some(Data::Structured(fields)) => Ok(fields),
        Some(Data::Raw(_)) | None => Err(SinkError::PayloadNotStructured(record.operation)),
    }
}
