//! Line-delimited JSON ingestion.
//!
//! Loads the raw feed file and parses each line into a JSON record. The
//! feed is schema-on-read: an individually unparsable line is skipped with
//! a warning rather than failing the run, but an unreadable or empty file,
//! or a file with no parsable line at all, is fatal.

use serde_json::Value;
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::error::{EmptyInputSnafu, IngestError, NoValidRecordsSnafu, ReadInputSnafu};

/// Result of reading the input file.
#[derive(Debug)]
pub struct ReadResult {
    /// Parsed records, one per valid input line.
    pub records: Vec<Value>,
    /// Lines that did not parse as a JSON object.
    pub skipped_lines: usize,
}

/// Read and parse the input file.
pub async fn read_records(path: &str) -> Result<ReadResult, IngestError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .context(ReadInputSnafu { path })?;

    if contents.trim().is_empty() {
        return EmptyInputSnafu { path }.fail();
    }

    let mut records = Vec::new();
    let mut skipped_lines = 0;

    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) if value.is_object() => records.push(value),
            Ok(_) => {
                warn!(line = index + 1, "Skipping non-object JSON line");
                skipped_lines += 1;
            }
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping unparsable line");
                skipped_lines += 1;
            }
        }
    }

    if records.is_empty() {
        return NoValidRecordsSnafu { path }.fail();
    }

    debug!(
        records = records.len(),
        skipped = skipped_lines,
        "Parsed input file {path}"
    );

    Ok(ReadResult {
        records,
        skipped_lines,
    })
}
