mod app;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::FieldupConfig;

/// Upload media files to the assembly service in resumable chunks
#[derive(Debug, Parser)]
#[command(name = "fieldup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.config/fieldup/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API base URL, overrides the config file and FIELDUP_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// File holding the bearer token, re-read before every request
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Chunk size in bytes
    #[arg(long)]
    pub chunk_size: Option<u64>,

    /// Files to upload, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match FieldupConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_overrides(&cli),
        Err(e) => {
            tracing::error!("failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&cli.files, config).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            tracing::warn!(failed, "some uploads did not complete");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
