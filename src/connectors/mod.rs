// Copyright 2025
// Licensed under the Elastic License v2.0

//! Connectors module for cassink
//!
//! Each connector is self-contained in its own submodule with:
//! - Configuration and validation
//! - Connection handling
//! - Data type mappings
//! - Protocol-specific logic
//!
//! # Sinks
//! - `cassandra` - Apache Cassandra / ScyllaDB via the native protocol

pub mod sinks;
