//! Error types for the chalet loader.

use snafu::prelude::*;

/// Errors that can occur while validating configuration.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Input path is empty.
    #[snafu(display("Input path cannot be empty"))]
    EmptyInputPath,

    /// Table path is empty.
    #[snafu(display("Table path cannot be empty"))]
    EmptyTablePath,

    /// Batch size is zero.
    #[snafu(display("Batch size must be greater than zero"))]
    ZeroBatchSize,
}

/// Errors that can occur while reading the input file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestError {
    /// Failed to read the input file.
    #[snafu(display("Failed to read input file {path}: {source}"))]
    ReadInput {
        path: String,
        source: std::io::Error,
    },

    /// Input file contains no data.
    #[snafu(display("Input file {path} is empty"))]
    EmptyInput { path: String },

    /// No line in the input parsed as a JSON record.
    #[snafu(display("No valid JSON records found in {path}"))]
    NoValidRecords { path: String },
}

/// Errors that can occur while normalizing records.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransformError {
    /// A record's fields did not match the expected types.
    #[snafu(display("Failed to decode record {record}: {source}"))]
    Decode {
        record: usize,
        source: serde_json::Error,
    },
}

/// Errors that can occur while writing to or reading back the table.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum WriteError {
    /// Failed to parse the Delta table URL.
    #[snafu(display("Failed to parse Delta table URL: {url}"))]
    UrlParse { url: String },

    /// Delta Lake operation failed.
    #[snafu(display("Delta Lake operation failed: {source}"))]
    DeltaOperation { source: deltalake::DeltaTableError },

    /// Failed to convert the Arrow schema to a Delta schema.
    #[snafu(display("Failed to convert schema: {source}"))]
    SchemaConversion {
        source: deltalake::arrow::error::ArrowError,
    },

    /// Failed to extract struct type from schema.
    #[snafu(display("Failed to extract struct type from schema: {message}"))]
    StructType { message: String },

    /// Failed to build a record batch.
    #[snafu(display("Failed to build record batch: {source}"))]
    BatchBuild {
        source: deltalake::arrow::error::ArrowError,
    },

    /// Failed to encode or decode Parquet data.
    #[snafu(display("Parquet error: {source}"))]
    Parquet {
        source: deltalake::parquet::errors::ParquetError,
    },

    /// Failed to open the table's object store.
    #[snafu(display("Failed to open table storage: {source}"))]
    TableStore { source: object_store::Error },

    /// Failed to stage a file into the table directory.
    #[snafu(display("Failed to stage file {path}: {source}"))]
    StageFile {
        path: String,
        source: object_store::Error,
    },

    /// IO error while preparing the table directory.
    #[snafu(display("IO error for table path {path}: {source}"))]
    TableIo {
        path: String,
        source: std::io::Error,
    },

    /// Failed to read a data file back during verification.
    #[snafu(display("Failed to read data file {path}: {source}"))]
    ReadDataFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to decode rows from a data file.
    #[snafu(display("Failed to decode rows from {path}: {source}"))]
    DecodeRows {
        path: String,
        source: deltalake::arrow::error::ArrowError,
    },

    /// Data file layout did not match the fixed table schema.
    #[snafu(display("Unexpected layout in data file {path}: {message}"))]
    FileSchema { path: String, message: String },
}

/// Top-level pipeline errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error.
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    /// Ingestion error.
    #[snafu(display("Ingestion error: {source}"))]
    Ingest { source: IngestError },

    /// Transform error.
    #[snafu(display("Transform error: {source}"))]
    Transform { source: TransformError },

    /// Table write error.
    #[snafu(display("Table write error: {source}"))]
    Write { source: WriteError },

    /// Task join error.
    #[snafu(display("Task join error: {source}"))]
    TaskJoin { source: tokio::task::JoinError },
}

impl From<ConfigError> for PipelineError {
    fn from(source: ConfigError) -> Self {
        PipelineError::Config { source }
    }
}

impl From<IngestError> for PipelineError {
    fn from(source: IngestError) -> Self {
        PipelineError::Ingest { source }
    }
}

impl From<TransformError> for PipelineError {
    fn from(source: TransformError) -> Self {
        PipelineError::Transform { source }
    }
}

impl From<WriteError> for PipelineError {
    fn from(source: WriteError) -> Self {
        PipelineError::Write { source }
    }
}
