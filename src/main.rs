// Copyright 2025
// Licensed under the Elastic License v2.0

#![warn(clippy::all)]

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use cassink::config::Config;
use cassink::connectors::sinks::create_sink;
use cassink::core::{Record, Sink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenv().ok();

    let config = Config::from_env()?;
    config.print_banner();

    let sink = create_sink(&config.sink).await?;
    let total = run(sink.as_ref(), config.batch_size).await?;

    info!("Done: {} records applied", total);
    Ok(())
}

/// Reads newline-delimited JSON records from stdin and writes them in batches.
///
/// Stops at the first failed batch; everything before the failing record has
/// been applied.
async fn run(sink: &dyn Sink, batch_size: usize) -> Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut batch: Vec<Record> = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record on line {}", line_no))?;
        batch.push(record);

        if batch.len() >= batch_size {
            total += flush(sink, &mut batch, total).await?;
        }
    }

    if !batch.is_empty() {
        total += flush(sink, &mut batch, total).await?;
    }

    if total == 0 {
        warn!("No records read from stdin");
    }
    Ok(total)
}

async fn flush(sink: &dyn Sink, batch: &mut Vec<Record>, already_applied: usize) -> Result<usize> {
    match sink.write(batch.as_slice()).await {
        Ok(applied) => {
            info!("[{}] applied {} records", sink.name(), applied);
            batch.clear();
            Ok(applied)
        }
        Err(e) => {
            error!(
                "[{}] batch failed: {} applied in batch, {} total, stopped at position '{}'",
                sink.name(),
                e.applied(),
                already_applied + e.applied(),
                e.position
            );
            Err(anyhow!(e))
        }
    }
}
