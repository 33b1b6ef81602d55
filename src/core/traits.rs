// Copyright 2025
// Licensed under the Elastic License v2.0

use crate::core::error::WriteError;
use crate::core::record::Record;
use async_trait::async_trait;

#[async_trait]
pub trait Sink: Send + Sync {
    /// Returns the name of the sink implementation
    fn name(&self) -> &'static str;

    /// Applies `records` in order, one store write per record.
    ///
    /// Returns `records.len()` when every record was applied. On failure the
    /// error reports how many records were applied before it, and nothing
    /// after the failing record is submitted.
    async fn write(&self, records: &[Record]) -> Result<usize, WriteError>;
}
