//! Chalet CLI: load lodging policy records into a partitioned Delta table.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use chalet::{CliArgs, Config, init_tracing, run_pipeline};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();
    let config = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        input = %config.input,
        table = %config.table.display(),
        "Starting chalet loader"
    );

    match run_pipeline(&config).await {
        Ok(stats) => {
            info!(
                rows_written = stats.rows_written,
                partitions = stats.partitions,
                total_rows = stats.total_rows,
                version = stats.table_version,
                "Load complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Pipeline failed: {e}");
            ExitCode::FAILURE
        }
    }
}
