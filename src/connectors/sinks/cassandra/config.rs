// Copyright 2025
// Licensed under the Elastic License v2.0

//! Cassandra Sink Configuration
//!
//! Turns the generic `SinkConfig` into what the driver and the statement
//! builder need: contact points with explicit ports and a validated target
//! table.

use anyhow::{anyhow, Result};

use crate::config::{AuthConfig, SinkConfig};
use crate::core::TableRef;
use crate::utils::validate_schema_name;

/// Cassandra-specific sink configuration.
#[derive(Clone)]
pub struct CassandraSinkConfig {
    /// Contact points as `host:port`
    pub contact_points: Vec<String>,

    /// Target keyspace and table
    pub table: TableRef,

    /// Session authentication
    pub auth: AuthConfig,
}

impl std::fmt::Debug for CassandraSinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // AuthConfig's Debug redacts the password
        f.debug_struct("CassandraSinkConfig")
            .field("contact_points", &self.contact_points)
            .field("table", &self.table.qualified_name())
            .field("auth", &self.auth)
            .finish()
    }
}

impl CassandraSinkConfig {
    /// Creates a Cassandra configuration from the generic SinkConfig.
    ///
    /// # Errors
    ///
    /// Returns an error if no node is given, a node is malformed, or the
    /// keyspace/table are not plain CQL identifiers
    pub fn from_sink_config(config: &SinkConfig) -> Result<Self> {
        let contact_points = config
            .nodes
            .iter()
            .map(|node| Self::normalize_node(node, config.port))
            .collect::<Result<Vec<_>>>()?;

        let sink_config = Self {
            contact_points,
            table: TableRef::new(config.keyspace.trim(), config.table.trim()),
            auth: config.auth.clone(),
        };
        sink_config.validate()?;
        Ok(sink_config)
    }

    /// Normalizes a contact point to `host:port`.
    ///
    /// - Adds `port` if the node has none
    /// - Keeps bracketed IPv6 literals intact (`[::1]:9042`)
    fn normalize_node(node: &str, port: u16) -> Result<String> {
        let node = node.trim();
        if node.is_empty() {
            return Err(anyhow!("Empty node address"));
        }

        if let Some(rest) = node.strip_prefix('[') {
            return match rest.split_once(']') {
                Some((_, "")) => Ok(format!("{}:{}", node, port)),
                Some((_, tail)) if tail.starts_with(':') => Ok(node.to_string()),
                _ => Err(anyhow!("Invalid node address: {}", node)),
            };
        }

        match node.split(':').collect::<Vec<_>>().as_slice() {
            [host] => Ok(format!("{}:{}", host, port)),
            [host, p] if !host.is_empty() && p.parse::<u16>().is_ok() => Ok(node.to_string()),
            _ => Err(anyhow!("Invalid node address: {}", node)),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.contact_points.is_empty() {
            return Err(anyhow!("At least one Cassandra node is required"));
        }

        validate_schema_name(&self.table.keyspace)
            .map_err(|e| anyhow!("Invalid keyspace: {}", e))?;
        validate_schema_name(&self.table.name).map_err(|e| anyhow!("Invalid table: {}", e))?;

        if let AuthConfig::Basic { username, .. } = &self.auth {
            if username.is_empty() {
                return Err(anyhow!("Username is required for basic auth"));
            }
        }

        Ok(())
    }
}
