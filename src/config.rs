// Copyright 2025
// Licensed under the Elastic License v2.0

use anyhow::{Context, Result};
use std::env;
use tracing::warn;

/// Default native protocol port
pub const DEFAULT_PORT: u16 = 9042;

/// Default number of records handed to one `write` call by the binary
pub const DEFAULT_BATCH_SIZE: usize = 500;

// =============================================================================
// Sink Configuration
// =============================================================================

/// Supported sink database types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkType {
    Cassandra,
    // Future: Bigtable, DynamoDB, etc.
}

impl SinkType {
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cassandra" | "scylla" | "scylladb" => Ok(SinkType::Cassandra),
            other => anyhow::bail!("Unsupported sink type: '{}'. Supported: cassandra", other),
        }
    }
}

impl std::fmt::Display for SinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkType::Cassandra => write!(f, "cassandra"),
        }
    }
}

/// Authentication used when opening the session
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    None,
    Basic { username: String, password: String },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => write!(f, "None"),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Generic sink configuration
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub sink_type: SinkType,
    /// Contact points, each `host` or `host:port`
    pub nodes: Vec<String>,
    /// Port applied to nodes given without one
    pub port: u16,
    pub keyspace: String,
    pub table: String,
    pub auth: AuthConfig,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Central configuration for cassink loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub sink: SinkConfig,

    // Pipeline
    pub batch_size: usize,
}

// =============================================================================
// Config Implementation
// =============================================================================

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Variables
    /// - SINK_TYPE (default `cassandra`)
    /// - CASSANDRA_HOST (required, comma separated), CASSANDRA_PORT (default 9042)
    /// - CASSANDRA_KEYSPACE, CASSANDRA_TABLE (required)
    /// - CASSANDRA_AUTH_MECHANISM (`none` or `basic`), CASSANDRA_USERNAME, CASSANDRA_PASSWORD
    /// - BATCH_SIZE (default 500)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} must be set", name))
        };
        let optional =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let sink_type = SinkType::from_str(&optional("SINK_TYPE", "cassandra"))?;

        let nodes: Vec<String> = required("CASSANDRA_HOST")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let port_str = optional("CASSANDRA_PORT", &DEFAULT_PORT.to_string());
        let port: u16 = port_str
            .trim()
            .parse()
            .with_context(|| format!("CASSANDRA_PORT '{}' is not a valid port", port_str))?;

        let keyspace = required("CASSANDRA_KEYSPACE")?;
        let table = required("CASSANDRA_TABLE")?;

        let auth = match optional("CASSANDRA_AUTH_MECHANISM", "none")
            .to_lowercase()
            .as_str()
        {
            "none" => {
                if lookup("CASSANDRA_USERNAME").is_some() {
                    warn!("CASSANDRA_USERNAME is set but auth mechanism is 'none', ignoring credentials");
                }
                AuthConfig::None
            }
            "basic" => AuthConfig::Basic {
                username: required("CASSANDRA_USERNAME")
                    .context("basic auth requires a username")?,
                password: optional("CASSANDRA_PASSWORD", ""),
            },
            other => anyhow::bail!(
                "Unsupported auth mechanism: '{}'. Supported: none, basic",
                other
            ),
        };

        let batch_size: usize = optional("BATCH_SIZE", &DEFAULT_BATCH_SIZE.to_string())
            .trim()
            .parse()
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            anyhow::bail!("BATCH_SIZE must be greater than 0");
        }

        Ok(Self {
            sink: SinkConfig {
                sink_type,
                nodes,
                port,
                keyspace,
                table,
                auth,
            },
            batch_size,
        })
    }

    /// Log the effective configuration
    pub fn print_banner(&self) {
        tracing::info!("Starting cassink...");

        match &self.sink.sink_type {
            SinkType::Cassandra => {
                tracing::info!(
                    "Sink: Cassandra ({}.{})",
                    self.sink.keyspace,
                    self.sink.table
                );
            }
        }

        tracing::info!("Nodes: {:?} (default port {})", self.sink.nodes, self.sink.port);
        tracing::info!(
            "Auth: {}",
            match &self.sink.auth {
                AuthConfig::None => "none",
                AuthConfig::Basic { .. } => "basic",
            }
        );
        tracing::info!("Batch size: {} records", self.batch_size);
    }
}

// =============================================================================
// Tests
// =============================================================================
