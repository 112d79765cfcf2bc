//! fxload - forex tick archive loader

use anyhow::Result;
use clap::Parser;
use fxload_common::logging::{init_logging, LogConfig, LogLevel};
use fxload_ingest::config::ImportConfig;
use fxload_ingest::pipeline::ImportPipeline;
use fxload_ingest::store::TickStore;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fxload")]
#[command(author, version, about = "Import forex tick archives into MySQL")]
struct Cli {
    /// MySQL host
    #[arg(long, env = "FXLOAD_HOST", default_value = "localhost")]
    host: String,

    /// MySQL port
    #[arg(long, env = "FXLOAD_PORT", default_value_t = 3306)]
    port: u16,

    /// MySQL username
    #[arg(long, env = "FXLOAD_USER", default_value = "root")]
    user: String,

    /// MySQL password
    #[arg(long, env = "FXLOAD_PASSWORD", default_value = "")]
    password: String,

    /// MySQL database name (created if absent)
    #[arg(long, env = "FXLOAD_DATABASE", default_value = "forex_data")]
    database: String,

    /// Directory containing the tick archives
    #[arg(long, env = "FXLOAD_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Rows per insert batch
    #[arg(long, env = "FXLOAD_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; environment variables take precedence over the
    // verbose flag
    let mut log_config = LogConfig::from_env()?;
    log_config.log_file_prefix = "fxload".to_string();
    if cli.verbose && std::env::var("LOG_LEVEL").is_err() {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    // The data root gate runs before any store connection is attempted
    if !cli.data_dir.exists() {
        anyhow::bail!("Data directory {} does not exist", cli.data_dir.display());
    }

    let mut config = ImportConfig::new()
        .with_host(cli.host)
        .with_port(cli.port)
        .with_credentials(cli.user, cli.password)
        .with_database(cli.database)
        .with_data_dir(cli.data_dir);
    if let Some(batch_size) = cli.batch_size {
        config = config.with_batch_size(batch_size);
    }

    let store = TickStore::connect(&config).await?;
    let tables = ImportPipeline::new(config, store).run().await?;

    info!("Import completed. Processed {} tables:", tables.len());
    for table in &tables {
        info!("- {}", table);
    }

    Ok(())
}
