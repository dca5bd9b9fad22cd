//! Patient Records HTTP Server
//!
//! Usage:
//!     patient-records-server --port 8000 --data-dir ./data --backend sqlite

use anyhow::Context;
use clap::Parser;
use patient_records_server::logging::init_logging;
use patient_records_server::{AppState, ConfigArgs, PatientServer};

#[derive(Parser, Debug)]
#[command(name = "patient-records-server", about = "Patient records HTTP API")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("Failed to initialize logging")?;

    let cli = Cli::parse();
    let config = cli.config.resolve().context("Failed to load configuration")?;

    tracing::info!("Starting patient records server");
    tracing::info!("  Data dir: {}", config.data_dir.display());
    tracing::info!("  Backend: {:?}", config.backend);

    let registry = config
        .open_registry()
        .context("Failed to open patient registry")?;
    let server = PatientServer::new(config, AppState::with_rule_model(registry));

    server.start().await.context("Server stopped with an error")?;
    Ok(())
}
