// Copyright 2025
// Licensed under the Elastic License v2.0

//! In-memory `StoreSession` for tests.
//!
//! Applies statements with Cassandra row semantics: an upsert overwrites the
//! columns it names and leaves the others, a delete removes the whole row.
//! Every executed statement is recorded, and a store failure can be injected
//! at a chosen call.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{SinkError, SinkResult, StructuredData, TableRef};

use super::session::StoreSession;
use super::statement::{Statement, StatementKind};

type Rows = Vec<(StructuredData, StructuredData)>;

#[derive(Default)]
struct State {
    tables: HashMap<TableRef, Rows>,
    executed: Vec<Statement>,
    calls: usize,
    fail_at_call: Option<usize>,
}

#[derive(Default)]
pub struct MemorySession {
    state: Mutex<State>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `call`-th `execute` (0-based) fail with a store error.
    pub fn fail_at_call(self, call: usize) -> Self {
        self.state.lock().fail_at_call = Some(call);
        self
    }

    /// Statements applied so far, in order.
    pub fn executed(&self) -> Vec<Statement> {
        self.state.lock().executed.clone()
    }

    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn execute(&self, statement: &Statement) -> SinkResult<()> {
        let mut state = self.state.lock();
        let call = state.calls;
        state.calls += 1;

        if state.fail_at_call == Some(call) {
            return Err(SinkError::store(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "injected store failure",
            )));
        }

        let mut key = StructuredData::new();
        let mut columns = StructuredData::new();
        let key_len = statement.key_columns().len();
        for (i, (name, value)) in statement.bindings().enumerate() {
            if i < key_len {
                key.insert(name, value.clone());
            } else {
                columns.insert(name, value.clone());
            }
        }

        let rows = state.tables.entry(statement.table().clone()).or_default();
        let existing = rows.iter().position(|(k, _)| *k == key);
        match (statement.kind(), existing) {
            (StatementKind::Upsert, Some(idx)) => {
                for (name, value) in &columns {
                    rows[idx].1.insert(name.clone(), value.clone());
                }
            }
            (StatementKind::Upsert, None) => rows.push((key, columns)),
            (StatementKind::Delete, Some(idx)) => {
                rows.remove(idx);
            }
            (StatementKind::Delete, None) => {}
        }

        state.executed.push(statement.clone());
        Ok(())
    }

    async fn read_row(&self, table: &TableRef, key: &StructuredData) -> SinkResult<StructuredData> {
        let state = self.state.lock();
        state
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|(k, _)| k == key))
            .map(|(_, columns)| columns.clone())
            .ok_or(SinkError::NotFound)
    }
}
