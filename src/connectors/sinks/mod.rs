// Copyright 2025
// Licensed under the Elastic License v2.0

//! # Sink Connectors
//!
//! This module contains sink connector implementations that write CDC records
//! to target systems. Each sink implements the `Sink` trait from
//! `crate::core::traits`.
//!
//! ## Available Sinks
//!
//! - **Cassandra**: Apache Cassandra / ScyllaDB, one row write per record
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cassink::connectors::sinks::create_sink;
//!
//! let sink = create_sink(&config.sink).await?;
//! let applied = sink.write(&records).await?;
//! ```

pub mod cassandra;

use anyhow::Result;

use crate::config::{SinkConfig, SinkType};
use crate::core::Sink;
use self::cassandra::CassandraSink;

/// Creates a sink connector based on the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The sink configuration is invalid
/// - The sink cannot reach the target system
pub async fn create_sink(config: &SinkConfig) -> Result<Box<dyn Sink>> {
    match config.sink_type {
        SinkType::Cassandra => {
            let sink = CassandraSink::connect(config).await?;
            Ok(Box::new(sink))
        }
    }
}
