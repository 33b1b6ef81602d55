// Copyright 2025
// Licensed under the Elastic License v2.0

//! Store session used by the Cassandra sink.
//!
//! `StoreSession` is the seam between the write executor and the driver. The
//! production implementation wraps a `scylla::Session`, which speaks the
//! native protocol to both Apache Cassandra and ScyllaDB.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use scylla::prepared_statement::PreparedStatement;
use scylla::{Session, SessionBuilder};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::core::{SinkError, SinkResult, StructuredData, TableRef};
use crate::utils::{validate_cql_identifier, validate_schema_name};

use super::config::CassandraSinkConfig;
use super::statement::Statement;
use super::types::{bind_value, decode_value};

#[async_trait]
pub trait StoreSession: Send + Sync {
    /// Executes one parameterized row write.
    async fn execute(&self, statement: &Statement) -> SinkResult<()>;

    /// Reads the non-key columns of the row addressed by `key`.
    ///
    /// Returns `SinkError::NotFound` when no such row exists. Used for
    /// verification only.
    async fn read_row(&self, table: &TableRef, key: &StructuredData) -> SinkResult<StructuredData>;
}

/// Most prepared statements kept per session.
///
/// One entry exists per distinct column set written to the table, plus one
/// per read shape. Sources whose records carry sparse payloads can produce
/// many column sets, so the cache is reset once it reaches this size.
pub const MAX_PREPARED_STATEMENTS: usize = 1024;

/// Prepared statements keyed by CQL text, holding at most `capacity` entries.
///
/// When full, inserting a new statement drops every cached one. Statements
/// are re-prepared on next use, which only costs one extra round trip.
pub(crate) struct StatementCache<T> {
    entries: Mutex<HashMap<String, T>>,
    capacity: usize,
}

impl<T: Clone> StatementCache<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub(crate) fn get(&self, cql: &str) -> Option<T> {
        self.entries.lock().get(cql).cloned()
    }

    pub(crate) fn insert(&self, cql: &str, statement: T) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(cql) {
            debug!("Prepared statement cache full ({} entries), resetting", entries.len());
            entries.clear();
        }
        entries.insert(cql.to_string(), statement);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// `StoreSession` backed by the scylla driver.
///
/// Prepared statements are kept per CQL text. A batch of records with the same
/// column set prepares once and then costs one round trip per row.
pub struct ScyllaSession {
    session: Session,
    prepared: StatementCache<PreparedStatement>,
}

impl ScyllaSession {
    /// Opens a session against the configured contact points.
    pub async fn connect(config: &CassandraSinkConfig) -> SinkResult<Self> {
        let mut builder = SessionBuilder::new().known_nodes(&config.contact_points);
        if let AuthConfig::Basic { username, password } = &config.auth {
            builder = builder.user(username, password);
        }

        let session = builder.build().await.map_err(SinkError::store)?;

        info!("Cassandra session established:");
        info!("  Nodes: {:?}", config.contact_points);
        info!("  Table: {}", config.table.qualified_name());

        Ok(Self {
            session,
            prepared: StatementCache::new(MAX_PREPARED_STATEMENTS),
        })
    }

    async fn prepare(&self, cql: &str) -> SinkResult<PreparedStatement> {
        if let Some(prepared) = self.prepared.get(cql) {
            return Ok(prepared);
        }

        debug!("Preparing: {}", cql);
        let prepared = self.session.prepare(cql).await.map_err(SinkError::store)?;
        self.prepared.insert(cql, prepared.clone());
        Ok(prepared)
    }
}

#[async_trait]
impl StoreSession for ScyllaSession {
    async fn execute(&self, statement: &Statement) -> SinkResult<()> {
        let prepared = self.prepare(&statement.cql()).await?;

        let values = statement
            .bindings()
            .zip(prepared.get_variable_col_specs())
            .map(|((column, value), spec)| bind_value(column, value, &spec.typ))
            .collect::<SinkResult<Vec<_>>>()?;

        self.session
            .execute(&prepared, values)
            .await
            .map_err(SinkError::store)?;
        Ok(())
    }

    async fn read_row(&self, table: &TableRef, key: &StructuredData) -> SinkResult<StructuredData> {
        validate_schema_name(&table.keyspace)?;
        validate_schema_name(&table.name)?;
        if key.is_empty() {
            return Err(SinkError::EmptyKey);
        }

        let mut predicate = Vec::with_capacity(key.len());
        for (name, _) in key {
            predicate.push(format!("{} = ?", validate_cql_identifier(name)?));
        }
        let cql = format!(
            "SELECT * FROM {} WHERE {}",
            table.qualified_name(),
            predicate.join(" AND ")
        );

        let prepared = self.prepare(&cql).await?;
        let values = key
            .iter()
            .zip(prepared.get_variable_col_specs())
            .map(|((column, value), spec)| bind_value(column, value, &spec.typ))
            .collect::<SinkResult<Vec<_>>>()?;

        let result = self
            .session
            .execute(&prepared, values)
            .await
            .map_err(SinkError::store)?;

        let row = result
            .rows
            .and_then(|rows| rows.into_iter().next())
            .ok_or(SinkError::NotFound)?;

        let mut fields = StructuredData::new();
        for (spec, column) in result.col_specs.iter().zip(row.columns) {
            if key.contains(&spec.name) {
                continue;
            }
            fields.insert(spec.name.clone(), decode_value(&spec.name, column)?);
        }
        Ok(fields)
    }
}
