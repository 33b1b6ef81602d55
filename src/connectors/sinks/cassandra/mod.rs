// Copyright 2025
// Licensed under the Elastic License v2.0

//! # Cassandra Sink Connector
//!
//! Applies CDC records to a single Apache Cassandra / ScyllaDB table, one
//! row write per record.
//!
//! ## Architecture
//!
//! ```text
//! Record ---> validate.rs ---> statement.rs ---> StoreSession ---> Cassandra
//!              (shape)        (INSERT/DELETE)    (session.rs)       9042
//!                                                     |
//!                                                     v
//!                                                 types.rs
//!                                              (Value -> CqlValue)
//! ```
//!
//! ## Write contract
//!
//! Records are applied strictly in order. The first record that fails shape
//! validation, statement building or execution stops the batch, and the error
//! reports how many records were applied before it. Already applied rows
//! stay applied; there is no retry and no rollback. The caller resumes from
//! the failing record's position.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cassink::connectors::sinks::cassandra::CassandraSink;
//!
//! let sink = CassandraSink::connect(&config).await?;
//! match sink.write(&records).await {
//!     Ok(n) => info!("Wrote {} records", n),
//!     Err(e) => error!("Stopped after {} records: {}", e.applied(), e),
//! }
//! ```

pub mod config;
#[cfg(test)]
mod memory;
pub mod session;
pub mod statement;
pub mod types;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::SinkConfig;
use crate::core::{Record, Sink, SinkError, SinkResult, TableRef, WriteError};

pub use self::config::CassandraSinkConfig;
use self::session::{ScyllaSession, StoreSession};
use self::statement::{build_statement, Statement};
use self::validate::validate_record;

/// Cassandra sink connector implementing the Sink trait.
pub struct CassandraSink {
    table: TableRef,
    session: Arc<dyn StoreSession>,
}

impl CassandraSink {
    /// Connects a driver session and creates the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no node can be
    /// reached
    pub async fn connect(config: &SinkConfig) -> Result<Self> {
        let cs_config = CassandraSinkConfig::from_sink_config(config)?;
        let session = ScyllaSession::connect(&cs_config).await?;

        info!("CassandraSink initialized:");
        info!("  Target: {}", cs_config.table.qualified_name());

        Ok(Self::with_session(cs_config.table, Arc::new(session)))
    }

    /// Creates a sink writing to `table` through an existing session.
    pub fn with_session(table: TableRef, session: Arc<dyn StoreSession>) -> Self {
        Self { table, session }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn session(&self) -> &Arc<dyn StoreSession> {
        &self.session
    }

    fn prepare_record(&self, record: &Record) -> SinkResult<Statement> {
        validate_record(record)?;
        build_statement(record, &self.table)
    }
}

#[async_trait]
impl Sink for CassandraSink {
    fn name(&self) -> &'static str {
        "cassandra"
    }

    async fn write(&self, records: &[Record]) -> Result<usize, WriteError> {
        for (index, record) in records.iter().enumerate() {
            let fail = |source: SinkError| {
                error!(
                    "Record {} ({}) failed after {} applied: {}",
                    index, record.operation, index, source
                );
                WriteError::new(index, record.operation, record.position.clone(), source)
            };

            let statement = self.prepare_record(record).map_err(fail)?;
            self.session.execute(&statement).await.map_err(fail)?;

            debug!(
                "Applied record {} ({}) to {}",
                index,
                record.operation,
                self.table.qualified_name()
            );
        }

        Ok(records.len())
    }
}
