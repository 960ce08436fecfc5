//! Post-commit verification report.
//!
//! Reads the just-committed snapshot back from the table: row counts per
//! partition, a sample of rows ordered by country code, the partition
//! listing, and the total row count. Partition values are reconstructed
//! from the `country_code=<value>` path segment of each data file.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use deltalake::arrow::array::{RecordBatch, StringArray, StructArray};
use deltalake::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use snafu::prelude::*;
use tracing::info;

use super::DeltaSink;
use super::parquet::PARTITION_COLUMN;
use crate::error::{DecodeRowsSnafu, ParquetSnafu, ReadDataFileSnafu, WriteError};
use crate::model::{NormalizedPolicyRecord, PolicyText};

/// One partition's footprint in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStats {
    pub country_code: String,
    pub file_count: usize,
    pub record_count: usize,
}

/// Aggregated view of the table contents after a commit.
#[derive(Debug)]
pub struct TableReport {
    /// Per-partition stats, ordered by country code.
    pub partitions: Vec<PartitionStats>,
    /// Total rows across all partitions.
    pub total_rows: usize,
    /// First rows of a full scan ordered by country code.
    pub sample: Vec<NormalizedPolicyRecord>,
}

/// Extract the partition value from a data file path.
fn extract_partition_value(path: &str) -> Option<String> {
    let pattern = format!("{PARTITION_COLUMN}=");
    let start = path.find(&pattern)? + pattern.len();
    let rest = &path[start..];
    let end = rest.find('/').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Path of a data file relative to the table root.
///
/// Snapshot file URIs may be absolute; the partition segment marks where
/// the table-relative part starts.
fn relative_file_path(uri: &str) -> &str {
    let pattern = format!("{PARTITION_COLUMN}=");
    match uri.find(&pattern) {
        Some(start) => &uri[start..],
        None => uri.rsplit('/').next().unwrap_or(uri),
    }
}

/// Scan the committed snapshot and build the report.
pub async fn build_report(
    sink: &DeltaSink,
    table_path: &Path,
    sample_limit: usize,
) -> Result<TableReport, WriteError> {
    // Group data files by partition value, ordered by country code.
    let mut files_by_partition: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for uri in sink.file_uris()? {
        let relative = relative_file_path(&uri).to_string();
        let country_code = extract_partition_value(&relative).unwrap_or_default();
        files_by_partition
            .entry(country_code)
            .or_default()
            .push(relative);
    }

    let mut partitions = Vec::with_capacity(files_by_partition.len());
    let mut total_rows = 0;
    let mut sample = Vec::new();

    for (country_code, files) in &files_by_partition {
        let mut record_count = 0;

        for relative in files {
            let data = tokio::fs::read(table_path.join(relative))
                .await
                .context(ReadDataFileSnafu { path: relative })?;

            let builder =
                ParquetRecordBatchReaderBuilder::try_new(Bytes::from(data)).context(ParquetSnafu)?;
            record_count += builder.metadata().file_metadata().num_rows() as usize;

            if sample.len() < sample_limit {
                let reader = builder.build().context(ParquetSnafu)?;
                for batch in reader {
                    let batch = batch.context(DecodeRowsSnafu { path: relative })?;
                    collect_sample(&batch, country_code, sample_limit, &mut sample, relative)?;
                    if sample.len() >= sample_limit {
                        break;
                    }
                }
            }
        }

        total_rows += record_count;
        partitions.push(PartitionStats {
            country_code: country_code.clone(),
            file_count: files.len(),
            record_count,
        });
    }

    Ok(TableReport {
        partitions,
        total_rows,
        sample,
    })
}

/// Decode rows from a batch into the sample, up to the limit.
fn collect_sample(
    batch: &RecordBatch,
    country_code: &str,
    limit: usize,
    sample: &mut Vec<NormalizedPolicyRecord>,
    path: &str,
) -> Result<(), WriteError> {
    let check_in = string_column(batch, "check_in", path)?;
    let check_out = string_column(batch, "check_out", path)?;

    let policy = batch
        .column_by_name("policy")
        .and_then(|c| c.as_any().downcast_ref::<StructArray>())
        .ok_or_else(|| WriteError::FileSchema {
            path: path.to_string(),
            message: "missing policy struct column".to_string(),
        })?;
    let pet_policy = struct_string_field(policy, "pet_policy", path)?;
    let child_policy = struct_string_field(policy, "child_policy", path)?;

    for row in 0..batch.num_rows() {
        if sample.len() >= limit {
            break;
        }
        sample.push(NormalizedPolicyRecord {
            check_in: check_in.value(row).to_string(),
            check_out: check_out.value(row).to_string(),
            policy: PolicyText {
                pet_policy: pet_policy.value(row).to_string(),
                child_policy: child_policy.value(row).to_string(),
            },
            country_code: country_code.to_string(),
        });
    }

    Ok(())
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
    path: &str,
) -> Result<&'a StringArray, WriteError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| WriteError::FileSchema {
            path: path.to_string(),
            message: format!("missing string column {name}"),
        })
}

fn struct_string_field<'a>(
    array: &'a StructArray,
    name: &str,
    path: &str,
) -> Result<&'a StringArray, WriteError> {
    array
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| WriteError::FileSchema {
            path: path.to_string(),
            message: format!("missing policy field {name}"),
        })
}

/// Log the report the way the original job surfaced its check queries:
/// counts by partition (descending), a sample scan, the partition listing,
/// and the total row count.
pub fn log_report(report: &TableReport) {
    let mut by_count = report.partitions.clone();
    by_count.sort_by(|a, b| {
        b.record_count
            .cmp(&a.record_count)
            .then_with(|| a.country_code.cmp(&b.country_code))
    });
    for partition in &by_count {
        info!(
            country_code = %partition.country_code,
            total_records = partition.record_count,
            "Row count by country code"
        );
    }

    for record in &report.sample {
        info!(
            check_in = %record.check_in,
            check_out = %record.check_out,
            pet_policy = %record.policy.pet_policy,
            child_policy = %record.policy.child_policy,
            country_code = %record.country_code,
            "Table row"
        );
    }

    for partition in &report.partitions {
        info!(
            partition = %format!("{PARTITION_COLUMN}={}", partition.country_code),
            files = partition.file_count,
            record_count = partition.record_count,
            "Partition"
        );
    }

    info!(total_rows = report.total_rows, "Total rows");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_partition_value_from_path() {
        assert_eq!(
            extract_partition_value("country_code=FR/abc.parquet").as_deref(),
            Some("FR")
        );
        assert_eq!(
            extract_partition_value("/tmp/table/country_code=JP/abc.parquet").as_deref(),
            Some("JP")
        );
        assert_eq!(
            extract_partition_value("country_code=/abc.parquet").as_deref(),
            Some("")
        );
        assert_eq!(extract_partition_value("abc.parquet"), None);
    }

    #[test]
    fn relative_path_starts_at_partition_segment() {
        assert_eq!(
            relative_file_path("file:///tmp/table/country_code=FR/abc.parquet"),
            "country_code=FR/abc.parquet"
        );
        assert_eq!(
            relative_file_path("country_code=FR/abc.parquet"),
            "country_code=FR/abc.parquet"
        );
        assert_eq!(relative_file_path("/tmp/table/abc.parquet"), "abc.parquet");
    }
}
