//! Pipeline driver.
//!
//! Runs the batch end to end: read, transform, ensure schema, append,
//! verify. Stages run strictly in sequence and each logs its own
//! diagnostic on failure; the Delta commit is the single commit point, so
//! a failure in any earlier stage leaves the table untouched.

use std::time::Instant;

use serde_json::Value;
use snafu::prelude::*;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{PipelineError, TaskJoinSnafu};
use crate::model::NormalizedPolicyRecord;
use crate::sink::{TableWriter, parquet, verify};
use crate::source;
use crate::transform;

/// Row and partition counts from one pipeline run.
#[derive(Debug)]
pub struct PipelineStats {
    /// Valid records read from the input file.
    pub rows_read: usize,
    /// Input lines skipped as unparsable.
    pub skipped_lines: usize,
    /// Exact-duplicate rows collapsed before the append.
    pub duplicates_dropped: usize,
    /// Rows committed by this run.
    pub rows_written: usize,
    /// Distinct country codes in this run's batch.
    pub partitions: usize,
    /// Table version created by the commit.
    pub table_version: i64,
    /// Total rows in the table after the commit, across all runs.
    pub total_rows: usize,
}

/// Run the batch once.
pub async fn run_pipeline(config: &Config) -> Result<PipelineStats, PipelineError> {
    let run_start = Instant::now();

    let stage_start = Instant::now();
    let input = source::read_records(&config.input)
        .await
        .inspect_err(|e| error!("Ingestion failed: {e}"))?;
    let rows_read = input.records.len();
    info!(
        records = rows_read,
        skipped = input.skipped_lines,
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Read input file"
    );

    let stage_start = Instant::now();
    let normalized = transform_records(input.records, config.batch_size)
        .await
        .inspect_err(|e| error!("Transform failed: {e}"))?;
    info!(
        records = normalized.len(),
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Transformed records"
    );
    info!(schema = ?parquet::table_schema(), "Output schema");
    preview(&normalized, config.preview_rows);

    let stage_start = Instant::now();
    let mut writer = TableWriter::new(&config.table)
        .await
        .inspect_err(|e| error!("Table initialization failed: {e}"))?;
    let outcome = writer
        .append_distinct(normalized)
        .await
        .inspect_err(|e| error!("Table write failed: {e}"))?;
    info!(
        rows = outcome.rows_written,
        partitions = outcome.partitions,
        duplicates_dropped = outcome.duplicates_dropped,
        version = outcome.version,
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Committed append"
    );

    let stage_start = Instant::now();
    let report = verify::build_report(writer.sink(), writer.table_path(), config.preview_rows)
        .await
        .inspect_err(|e| error!("Verification failed: {e}"))?;
    verify::log_report(&report);
    info!(
        elapsed_ms = stage_start.elapsed().as_millis() as u64,
        "Verified table"
    );

    info!(
        elapsed_ms = run_start.elapsed().as_millis() as u64,
        "Pipeline complete"
    );

    Ok(PipelineStats {
        rows_read,
        skipped_lines: input.skipped_lines,
        duplicates_dropped: outcome.duplicates_dropped,
        rows_written: outcome.rows_written,
        partitions: outcome.partitions,
        table_version: outcome.version,
        total_rows: report.total_rows,
    })
}

/// Normalize records in chunks on blocking workers.
///
/// The transformer is pure and records carry no cross-record state, so
/// chunks run concurrently; results are reassembled in input order.
async fn transform_records(
    values: Vec<Value>,
    batch_size: usize,
) -> Result<Vec<NormalizedPolicyRecord>, PipelineError> {
    let total = values.len();

    let mut chunks = Vec::new();
    let mut remaining = values;
    while !remaining.is_empty() {
        let tail = remaining.split_off(remaining.len().min(batch_size));
        chunks.push(remaining);
        remaining = tail;
    }

    let mut handles = Vec::with_capacity(chunks.len());
    let mut offset = 0;
    for chunk in chunks {
        let chunk_offset = offset;
        offset += chunk.len();
        handles.push(tokio::task::spawn_blocking(move || {
            transform::transform_chunk(chunk, chunk_offset)
        }));
    }

    let mut records = Vec::with_capacity(total);
    for handle in handles {
        records.extend(handle.await.context(TaskJoinSnafu)??);
    }

    Ok(records)
}

/// Log the first few normalized rows.
fn preview(records: &[NormalizedPolicyRecord], limit: usize) {
    for record in records.iter().take(limit) {
        info!(
            check_in = %record.check_in,
            check_out = %record.check_out,
            pet_policy = %record.policy.pet_policy,
            child_policy = %record.policy.child_policy,
            country_code = %record.country_code,
            "Normalized record"
        );
    }
}
