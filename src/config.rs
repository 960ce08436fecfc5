//! Configuration for the chalet loader.

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;

/// Default input file, matching the feed drop location.
pub const DEFAULT_INPUT_PATH: &str = "input/expedia-lodging-policies-en_us-1-all.jsonl";

/// Default table directory under the local warehouse.
pub const DEFAULT_TABLE_PATH: &str = "warehouse/lodging_policies";

/// Records per transform chunk.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Normalized rows shown after the transform stage.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "chalet",
    about = "Load lodging policy records into a partitioned Delta table"
)]
pub struct CliArgs {
    /// Path to the line-delimited JSON input file.
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input: String,

    /// Directory of the target Delta table.
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    pub table: String,

    /// Number of records per transform chunk.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Number of normalized rows to log after the transform stage.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the line-delimited JSON input file.
    pub input: String,
    /// Directory of the target Delta table.
    pub table: PathBuf,
    /// Records per transform chunk.
    pub batch_size: usize,
    /// Normalized rows to log after the transform stage.
    pub preview_rows: usize,
}

impl Config {
    /// Build a validated configuration from parsed arguments.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let config = Self {
            input: args.input,
            table: PathBuf::from(args.table),
            batch_size: args.batch_size,
            preview_rows: args.preview_rows,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.is_empty() {
            return Err(ConfigError::EmptyInputPath);
        }
        if self.table.as_os_str().is_empty() {
            return Err(ConfigError::EmptyTablePath);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let args = CliArgs::parse_from(["chalet"]);
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.input, DEFAULT_INPUT_PATH);
        assert_eq!(config.table, PathBuf::from(DEFAULT_TABLE_PATH));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn rejects_empty_paths_and_zero_batch() {
        let args = CliArgs::parse_from(["chalet", "--input", ""]);
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::EmptyInputPath)
        ));

        let args = CliArgs::parse_from(["chalet", "--table", ""]);
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::EmptyTablePath)
        ));

        let args = CliArgs::parse_from(["chalet", "--batch-size", "0"]);
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::ZeroBatchSize)
        ));
    }
}
