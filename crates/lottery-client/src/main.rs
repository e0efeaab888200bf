//! Lottery agency client entry point.
//!
//! Wires together configuration, the agency record file, the TCP socket
//! bootstrap, and the session controller:
//!
//! ```text
//! main()
//!  └─ ClientConfig::load()        -- TOML file + env overrides
//!  └─ CsvRecordSource::open()     -- data/agency-<id>.csv
//!  └─ TcpStream::connect()        -- the Connecting state; failure exits(1)
//!  └─ SessionController::run()    -- batches → finished notice → winners
//! ```
//!
//! SIGINT sets the cancellation token; the session observes it at its
//! cooperative checkpoints and closes the connection cleanly.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tokio::net::TcpStream;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lottery_client::application::{CancelToken, SessionController, SessionOutcome, SessionSettings};
use lottery_client::infrastructure::config::ClientConfig;
use lottery_client::infrastructure::record_source::CsvRecordSource;

const CONFIG_PATH_ENV: &str = "CLIENT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = ClientConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    // Initialise structured logging; RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!(
        agency_id = config.agency_id,
        server = %config.server_address,
        max_batch_size = config.max_batch_size,
        "lottery client starting"
    );

    // ── Shutdown signal ───────────────────────────────────────────────────────
    let cancel = CancelToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    // ── Record source ─────────────────────────────────────────────────────────
    let records_path = config.records_path();
    let mut source = CsvRecordSource::open(&records_path, config.agency_id)
        .with_context(|| format!("opening record file {}", records_path.display()))?;

    // ── Socket bootstrap (Connecting) ─────────────────────────────────────────
    let stream = match TcpStream::connect(&config.server_address).await {
        Ok(stream) => stream,
        Err(e) => {
            error!(server = %config.server_address, error = %e, "connection failed");
            return Ok(ExitCode::FAILURE);
        }
    };

    // ── Session ───────────────────────────────────────────────────────────────
    let settings = SessionSettings {
        agency_id: config.agency_id,
        max_batch_size: config.max_batch_size,
        retry_delay: config.retry_delay(),
    };
    let controller = SessionController::new(stream, settings, cancel);

    match controller.run(&mut source).await {
        SessionOutcome::Done(winners) => {
            info!(count = winners.len(), "winners received");
            for document in &winners {
                println!("{document}");
            }
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Failed => {
            error!("session failed");
            Ok(ExitCode::FAILURE)
        }
        SessionOutcome::Cancelled => {
            info!("session cancelled");
            Ok(ExitCode::SUCCESS)
        }
    }
}
