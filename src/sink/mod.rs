//! Table writing: dedup, partition grouping, file staging, atomic commit.

pub mod delta;
pub mod parquet;
pub mod verify;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::{ObjectStore, PutPayload};
use snafu::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::error::{StageFileSnafu, TableStoreSnafu, WriteError};
use crate::model::NormalizedPolicyRecord;

pub use delta::DeltaSink;

/// A finished Parquet file staged for commit.
#[derive(Debug, Clone)]
pub struct FinishedFile {
    /// Path relative to the table root, e.g. `country_code=FR/<uuid>.parquet`.
    pub filename: String,
    /// Encoded size in bytes.
    pub size: usize,
    /// Rows in the file.
    pub record_count: usize,
    /// Partition value the file belongs to.
    pub country_code: String,
    /// Encoded payload; dropped once the file is staged.
    pub bytes: Option<Bytes>,
}

/// Result of one committed append.
#[derive(Debug)]
pub struct WriteOutcome {
    /// Table version created by the commit.
    pub version: i64,
    /// Rows appended after dedup.
    pub rows_written: usize,
    /// Distinct country codes in the batch.
    pub partitions: usize,
    /// Exact-duplicate rows collapsed before the append.
    pub duplicates_dropped: usize,
}

/// Drop exact-duplicate rows, keeping first-occurrence order.
///
/// Dedup is scoped to this batch only; rows already in the table from
/// earlier runs are never compared against.
pub fn dedup_records(records: Vec<NormalizedPolicyRecord>) -> (Vec<NormalizedPolicyRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    let mut kept = Vec::with_capacity(before);

    for record in records {
        if seen.insert(record.clone()) {
            kept.push(record);
        }
    }

    let dropped = before - kept.len();
    (kept, dropped)
}

/// Group rows by country code, ordered by code.
pub fn group_by_country(
    records: Vec<NormalizedPolicyRecord>,
) -> BTreeMap<String, Vec<NormalizedPolicyRecord>> {
    let mut groups: BTreeMap<String, Vec<NormalizedPolicyRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.country_code.clone())
            .or_default()
            .push(record);
    }
    groups
}

/// Writer that turns normalized records into committed table state.
///
/// Composes Parquet encoding, file staging into the table directory, and
/// the Delta append commit.
pub struct TableWriter {
    sink: DeltaSink,
    store: Arc<dyn ObjectStore>,
    table_path: PathBuf,
}

impl TableWriter {
    /// Open the table, creating it with the fixed schema if needed.
    pub async fn new(table_path: &Path) -> Result<Self, WriteError> {
        let sink = DeltaSink::new(table_path).await?;
        let store: Arc<dyn ObjectStore> =
            Arc::new(LocalFileSystem::new_with_prefix(table_path).context(TableStoreSnafu)?);

        Ok(Self {
            sink,
            store,
            table_path: table_path.to_path_buf(),
        })
    }

    /// Deduplicate the batch and append it in a single transaction.
    ///
    /// One Parquet file is written per country code present in the batch;
    /// all files are committed together, so either the whole batch lands
    /// or none of it does.
    pub async fn append_distinct(
        &mut self,
        records: Vec<NormalizedPolicyRecord>,
    ) -> Result<WriteOutcome, WriteError> {
        let (records, duplicates_dropped) = dedup_records(records);
        let groups = group_by_country(records);

        let mut files = Vec::with_capacity(groups.len());
        for (country_code, rows) in &groups {
            let batch = parquet::build_batch(rows)?;
            let bytes = parquet::encode_batch(&batch)?;
            files.push(FinishedFile {
                filename: format!("country_code={country_code}/{}.parquet", Uuid::now_v7()),
                size: bytes.len(),
                record_count: rows.len(),
                country_code: country_code.clone(),
                bytes: Some(bytes),
            });
        }

        self.stage_files(&files).await?;
        let committed = self.sink.commit_files(&files).await?;
        let version = committed.unwrap_or_else(|| self.sink.version());

        Ok(WriteOutcome {
            version,
            rows_written: files.iter().map(|f| f.record_count).sum(),
            partitions: files.len(),
            duplicates_dropped,
        })
    }

    /// Write staged files into the table directory.
    async fn stage_files(&self, files: &[FinishedFile]) -> Result<(), WriteError> {
        for file in files {
            if let Some(bytes) = &file.bytes {
                self.store
                    .put(
                        &object_store::path::Path::from(file.filename.as_str()),
                        PutPayload::from(bytes.clone()),
                    )
                    .await
                    .context(StageFileSnafu {
                        path: &file.filename,
                    })?;

                info!(
                    path = %file.filename,
                    size = file.size,
                    records = file.record_count,
                    "Staged parquet file"
                );
            }
        }
        Ok(())
    }

    /// The underlying Delta sink.
    pub fn sink(&self) -> &DeltaSink {
        &self.sink
    }

    /// Root directory of the table.
    pub fn table_path(&self) -> &Path {
        &self.table_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolicyText;
    use tempfile::TempDir;

    fn record(country_code: &str, check_in: &str) -> NormalizedPolicyRecord {
        NormalizedPolicyRecord {
            check_in: check_in.into(),
            check_out: String::new(),
            policy: PolicyText {
                pet_policy: String::new(),
                child_policy: String::new(),
            },
            country_code: country_code.into(),
        }
    }

    #[test]
    fn dedup_collapses_exact_duplicates_only() {
        let records = vec![
            record("FR", "2:00 PM"),
            record("FR", "2:00 PM"),
            record("FR", "3:00 PM"),
        ];

        let (kept, dropped) = dedup_records(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
        // First occurrence order is preserved.
        assert_eq!(kept[0].check_in, "2:00 PM");
        assert_eq!(kept[1].check_in, "3:00 PM");
    }

    #[test]
    fn grouping_is_ordered_by_country_code() {
        let records = vec![record("JP", "a"), record("FR", "b"), record("JP", "c")];

        let groups = group_by_country(records);
        let codes: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(codes, vec!["FR", "JP"]);
        assert_eq!(groups["JP"].len(), 2);
    }

    #[tokio::test]
    async fn append_distinct_writes_one_file_per_partition() {
        let temp_dir = TempDir::new().unwrap();
        let table_path = temp_dir.path().join("policies");

        let mut writer = TableWriter::new(&table_path).await.unwrap();
        let outcome = writer
            .append_distinct(vec![
                record("FR", "2:00 PM"),
                record("FR", "2:00 PM"),
                record("JP", "1:00 PM"),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.version, 1);
        assert_eq!(outcome.rows_written, 2);
        assert_eq!(outcome.partitions, 2);
        assert_eq!(outcome.duplicates_dropped, 1);

        let uris = writer.sink().file_uris().unwrap();
        assert_eq!(uris.len(), 2);
        assert!(uris.iter().any(|u| u.contains("country_code=FR")));
        assert!(uris.iter().any(|u| u.contains("country_code=JP")));
    }
}
