// Copyright 2025
// Licensed under the Elastic License v2.0

//! cassink - CDC sink that writes change records into Apache Cassandra.
//!
//! Records are validated, turned into one parameterized CQL statement each
//! (`INSERT` for create/update/snapshot, `DELETE` for delete) and applied in
//! order. A failed batch reports how many records were applied before it.

#![warn(clippy::all)]

pub mod config;
pub mod connectors;
pub mod core;
pub mod utils;
