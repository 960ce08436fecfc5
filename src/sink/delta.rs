//! Delta Lake table management and commit logic.
//!
//! Handles opening or creating the partitioned table and committing staged
//! Parquet files as a single append transaction.

use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use deltalake::kernel::engine::arrow_conversion::TryIntoKernel;
use deltalake::kernel::transaction::CommitBuilder;
use deltalake::kernel::{Action, Add, DataType as DeltaType, StructField, StructType};
use deltalake::operations::create::CreateBuilder;
use deltalake::protocol::{DeltaOperation, SaveMode};
use deltalake::{DeltaTable, open_table_with_storage_options};
use snafu::prelude::*;
use tracing::{debug, info};
use url::Url;

use super::FinishedFile;
use super::parquet::{PARTITION_COLUMN, table_schema};
use crate::error::{DeltaOperationSnafu, TableIoSnafu, WriteError};

/// Delta sink for committing staged Parquet files.
pub struct DeltaSink {
    table: DeltaTable,
    last_version: i64,
}

impl DeltaSink {
    /// Open the table at `table_path`, creating it with the fixed schema
    /// and `country_code` partitioning if it does not exist.
    ///
    /// Idempotent: an existing table is opened as-is; its schema is never
    /// migrated.
    pub async fn new(table_path: &Path) -> Result<Self, WriteError> {
        let table = load_or_create_table(table_path).await?;
        let last_version = table.version().unwrap_or(-1);

        Ok(Self {
            table,
            last_version,
        })
    }

    /// Commit staged files to the table in one atomic append transaction.
    ///
    /// Returns the new version number if a commit was made.
    pub async fn commit_files(&mut self, files: &[FinishedFile]) -> Result<Option<i64>, WriteError> {
        if files.is_empty() {
            return Ok(None);
        }

        let add_actions: Vec<Action> = files.iter().map(create_add_action).collect();

        let version = CommitBuilder::default()
            .with_actions(add_actions)
            .build(
                Some(self.table.snapshot().context(DeltaOperationSnafu)?),
                self.table.log_store(),
                DeltaOperation::Write {
                    mode: SaveMode::Append,
                    partition_by: Some(vec![PARTITION_COLUMN.to_string()]),
                    predicate: None,
                },
            )
            .await
            .context(DeltaOperationSnafu)?
            .version;

        // Reload table to get the new state
        self.table.load().await.context(DeltaOperationSnafu)?;
        self.last_version = version;

        info!(
            "Committed {} files to Delta table, version {}",
            files.len(),
            version
        );

        Ok(Some(version))
    }

    /// Get the current table version.
    pub fn version(&self) -> i64 {
        self.last_version
    }

    /// Data file paths recorded in the current snapshot.
    pub fn file_uris(&self) -> Result<Vec<String>, WriteError> {
        Ok(self
            .table
            .get_file_uris()
            .context(DeltaOperationSnafu)?
            .map(|p| p.to_string())
            .collect())
    }
}

/// Create a Delta Add action for a staged file.
///
/// The action carries the file's partition value and a `numRecords` stats
/// payload so partition record counts are introspectable from snapshot
/// metadata.
fn create_add_action(file: &FinishedFile) -> Action {
    debug!("Creating add action for file {:?}", file.filename);

    let partition_values = HashMap::from([(
        PARTITION_COLUMN.to_string(),
        Some(file.country_code.clone()),
    )]);

    let stats = serde_json::json!({ "numRecords": file.record_count }).to_string();

    Action::Add(Add {
        path: file.filename.trim_start_matches('/').to_string(),
        size: i64::try_from(file.size).expect("file size should fit in i64"),
        partition_values,
        modification_time: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| {
                i64::try_from(d.as_millis()).expect("modification time in millis should fit in i64")
            })
            .unwrap_or(0),
        data_change: true,
        stats: Some(stats),
        ..Default::default()
    })
}

/// Convert the Arrow table schema to a Delta schema.
fn arrow_schema_to_delta(
    schema: &deltalake::arrow::datatypes::Schema,
) -> Result<StructType, WriteError> {
    let fields: Vec<StructField> = schema
        .fields()
        .iter()
        .map(|field| {
            let delta_type: DeltaType = field
                .data_type()
                .try_into_kernel()
                .map_err(|source| WriteError::SchemaConversion { source })?;
            Ok(StructField::new(
                field.name(),
                delta_type,
                field.is_nullable(),
            ))
        })
        .collect::<Result<Vec<_>, WriteError>>()?;

    StructType::try_new(fields).map_err(|e| WriteError::StructType {
        message: e.to_string(),
    })
}

/// Load or create the Delta table at the given directory.
async fn load_or_create_table(table_path: &Path) -> Result<DeltaTable, WriteError> {
    tokio::fs::create_dir_all(table_path)
        .await
        .context(TableIoSnafu {
            path: table_path.display().to_string(),
        })?;
    let canonical = tokio::fs::canonicalize(table_path)
        .await
        .context(TableIoSnafu {
            path: table_path.display().to_string(),
        })?;

    let table_url = format!("file://{}", canonical.display());
    let parsed_url = Url::parse(&table_url).map_err(|_| WriteError::UrlParse {
        url: table_url.clone(),
    })?;

    // Try to open existing table
    match open_table_with_storage_options(parsed_url, HashMap::new()).await {
        Ok(table) => {
            info!(
                "Loaded existing Delta table at version {}",
                table.version().unwrap_or(-1)
            );
            Ok(table)
        }
        Err(_) => {
            // Table doesn't exist, create it
            info!("Creating new Delta table at {table_url}");

            let delta_schema = arrow_schema_to_delta(&table_schema())?;

            let table = CreateBuilder::new()
                .with_location(&table_url)
                .with_columns(delta_schema.fields().cloned())
                .with_partition_columns([PARTITION_COLUMN])
                .await
                .context(DeltaOperationSnafu)?;

            Ok(table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staged_file(country_code: &str, records: usize) -> FinishedFile {
        FinishedFile {
            filename: format!("country_code={country_code}/data.parquet"),
            size: 1024,
            record_count: records,
            country_code: country_code.to_string(),
            bytes: None,
        }
    }

    #[test]
    fn add_action_carries_partition_value_and_stats() {
        let action = create_add_action(&staged_file("FR", 42));

        match action {
            Action::Add(add) => {
                assert_eq!(add.path, "country_code=FR/data.parquet");
                assert_eq!(add.size, 1024);
                assert!(add.data_change);
                assert_eq!(
                    add.partition_values.get(PARTITION_COLUMN),
                    Some(&Some("FR".to_string()))
                );
                let stats: serde_json::Value =
                    serde_json::from_str(add.stats.as_deref().unwrap()).unwrap();
                assert_eq!(stats["numRecords"], 42);
            }
            _ => panic!("Expected Add action"),
        }
    }

    #[test]
    fn add_action_keeps_empty_partition_value() {
        let action = create_add_action(&staged_file("", 1));

        match action {
            Action::Add(add) => {
                assert_eq!(
                    add.partition_values.get(PARTITION_COLUMN),
                    Some(&Some(String::new()))
                );
            }
            _ => panic!("Expected Add action"),
        }
    }

    #[test]
    fn table_schema_converts_to_delta() {
        let delta_schema = arrow_schema_to_delta(&table_schema()).unwrap();
        assert_eq!(delta_schema.fields().count(), 4);
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let table_path = temp_dir.path().join("policies");

        let first = DeltaSink::new(&table_path).await.unwrap();
        assert_eq!(first.version(), 0);

        // Second open finds the existing table instead of recreating it.
        let second = DeltaSink::new(&table_path).await.unwrap();
        assert_eq!(second.version(), 0);
    }

    #[tokio::test]
    async fn commit_advances_version_and_lists_files() {
        let temp_dir = TempDir::new().unwrap();
        let table_path = temp_dir.path().join("policies");

        let mut sink = DeltaSink::new(&table_path).await.unwrap();
        let version = sink
            .commit_files(&[staged_file("FR", 10)])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(version, 1);
        assert_eq!(sink.version(), 1);

        let uris = sink.file_uris().unwrap();
        assert_eq!(uris.len(), 1);
        assert!(uris[0].contains("country_code=FR"));
    }

    #[tokio::test]
    async fn empty_commit_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let table_path = temp_dir.path().join("policies");

        let mut sink = DeltaSink::new(&table_path).await.unwrap();
        assert_eq!(sink.commit_files(&[]).await.unwrap(), None);
        assert_eq!(sink.version(), 0);
    }
}
