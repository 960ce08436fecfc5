//! Parquet serialization of normalized records.
//!
//! The table schema is fixed: three data columns (one of them a nested
//! `policy` struct) plus the `country_code` partition column. Data files
//! carry only the data columns; the partition value lives in the Delta
//! log, per the Delta protocol.

use std::sync::Arc;

use bytes::Bytes;
use deltalake::arrow::array::{ArrayRef, RecordBatch, StringArray, StructArray};
use deltalake::arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef};
use deltalake::parquet::arrow::ArrowWriter;
use deltalake::parquet::basic::Compression;
use deltalake::parquet::file::properties::WriterProperties;
use snafu::prelude::*;

use crate::error::{BatchBuildSnafu, ParquetSnafu, WriteError};
use crate::model::NormalizedPolicyRecord;

/// Partition column name.
pub const PARTITION_COLUMN: &str = "country_code";

fn policy_fields() -> Fields {
    Fields::from(vec![
        Field::new("pet_policy", DataType::Utf8, false),
        Field::new("child_policy", DataType::Utf8, false),
    ])
}

/// Logical schema of the table, including the partition column.
pub fn table_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("check_in", DataType::Utf8, false),
        Field::new("check_out", DataType::Utf8, false),
        Field::new("policy", DataType::Struct(policy_fields()), false),
        Field::new(PARTITION_COLUMN, DataType::Utf8, false),
    ]))
}

/// Schema of the data files: the table schema minus the partition column.
pub fn file_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("check_in", DataType::Utf8, false),
        Field::new("check_out", DataType::Utf8, false),
        Field::new("policy", DataType::Struct(policy_fields()), false),
    ]))
}

/// Build a record batch from one partition's rows.
pub fn build_batch(records: &[NormalizedPolicyRecord]) -> Result<RecordBatch, WriteError> {
    let check_in: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.check_in.as_str()),
    ));
    let check_out: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.check_out.as_str()),
    ));
    let pet_policy: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.policy.pet_policy.as_str()),
    ));
    let child_policy: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.policy.child_policy.as_str()),
    ));

    let fields = policy_fields();
    let policy: ArrayRef = Arc::new(StructArray::from(vec![
        (fields[0].clone(), pet_policy),
        (fields[1].clone(), child_policy),
    ]));

    RecordBatch::try_new(file_schema(), vec![check_in, check_out, policy])
        .context(BatchBuildSnafu)
}

/// Encode a batch as a single snappy-compressed Parquet file.
pub fn encode_batch(batch: &RecordBatch) -> Result<Bytes, WriteError> {
    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buffer = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buffer, batch.schema(), Some(properties)).context(ParquetSnafu)?;
    writer.write(batch).context(ParquetSnafu)?;
    writer.close().context(ParquetSnafu)?;

    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolicyText;
    use deltalake::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn record(country_code: &str, pet: &str) -> NormalizedPolicyRecord {
        NormalizedPolicyRecord {
            check_in: "3:00 PM".into(),
            check_out: "11:00 AM".into(),
            policy: PolicyText {
                pet_policy: pet.into(),
                child_policy: String::new(),
            },
            country_code: country_code.into(),
        }
    }

    #[test]
    fn table_schema_has_partition_column_last() {
        let schema = table_schema();
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.field(3).name(), PARTITION_COLUMN);
        assert!(matches!(schema.field(2).data_type(), DataType::Struct(_)));
    }

    #[test]
    fn file_schema_excludes_partition_column() {
        let schema = file_schema();
        assert_eq!(schema.fields().len(), 3);
        assert!(schema.field_with_name(PARTITION_COLUMN).is_err());
    }

    #[test]
    fn builds_batch_with_nested_policy() {
        let records = vec![record("FR", "Pets allowed"), record("FR", "No pets")];
        let batch = build_batch(&records).unwrap();

        assert_eq!(batch.num_rows(), 2);
        let policy = batch
            .column_by_name("policy")
            .unwrap()
            .as_any()
            .downcast_ref::<StructArray>()
            .unwrap();
        let pet = policy
            .column_by_name("pet_policy")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(pet.value(0), "Pets allowed");
        assert_eq!(pet.value(1), "No pets");
    }

    #[test]
    fn encoded_file_reports_row_count() {
        let records = vec![record("JP", "a"), record("JP", "b"), record("JP", "c")];
        let bytes = encode_batch(&build_batch(&records).unwrap()).unwrap();

        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
        assert_eq!(builder.metadata().file_metadata().num_rows(), 3);
    }
}
