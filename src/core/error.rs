// Copyright 2025
// Licensed under the Elastic License v2.0

use thiserror::Error;

use crate::core::position::Position;
use crate::core::record::Operation;

/// Errors produced while turning one record into a store write
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("key should be structured data")]
    KeyNotStructured,

    #[error("key should contain at least one column, row cannot be addressed")]
    EmptyKey,

    #[error("payload should be structured data for {0} operations")]
    PayloadNotStructured(Operation),

    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("column '{0}' appears in both key and payload with different values")]
    ConflictingKeyColumn(String),

    #[error("column '{column}': {kind} values are not supported by the store binding")]
    UnsupportedValue { column: String, kind: &'static str },

    #[error("column '{column}': cannot encode {kind} value as {column_type}: {reason}")]
    TypeMismatch {
        column: String,
        kind: &'static str,
        column_type: String,
        reason: String,
    },

    /// Read-side signal only; the write path never produces it.
    #[error("row not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SinkError {
    pub fn store(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(cause))
    }
}

/// A batch write that stopped at the record at `index`.
///
/// Every record before `index` was applied; nothing at or after it was
/// submitted.
#[derive(Debug, Error)]
#[error("record {index} ({operation}, position '{position}') failed after {index} applied: {source}")]
pub struct WriteError {
    pub index: usize,
    pub operation: Operation,
    pub position: Position,
    #[source]
    pub source: SinkError,
}

impl WriteError {
    pub fn new(index: usize, operation: Operation, position: Position, source: SinkError) -> Self {
        Self {
            index,
            operation,
            position,
            source,
        }
    }

    /// Number of records durably applied before the failure.
    pub fn applied(&self) -> usize {
        self.index
    }
}

/// Result type alias using SinkError
pub type SinkResult<T> = Result<T, SinkError>;
