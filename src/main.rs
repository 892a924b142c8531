//! # Nunchuk Receiver
//!
//! Receives Nunchuk controller updates over UDP and turns them into mouse
//! pointer motion and button clicks.
//!
//! The process takes no arguments. Configuration is read from
//! `config/default.toml`, or from the path in `NUNCHUK_RECEIVER_CONFIG`, and
//! built-in defaults are used when that file does not exist.
//!
//! # Exit Status
//!
//! - `0` after SIGINT/SIGTERM and a full drain of every worker
//! - `1` when a worker failed, or on a startup error
//!
//! Expected output:
//! ```text
//! INFO nunchuk_receiver: Nunchuk Receiver v0.1.0 starting...
//! INFO nunchuk_receiver::workers::ingest: Listening for controller updates on 0.0.0.0:8888
//! INFO nunchuk_receiver::workers::heartbeat: Heartbeat beats=1
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use nunchuk_receiver::config::{Config, LoggingConfig};
use nunchuk_receiver::hid;
use nunchuk_receiver::supervisor::{ShutdownReason, Supervisor};
use nunchuk_receiver::workers::standard_workers;

/// Environment variable overriding the configuration path
const CONFIG_ENV: &str = "NUNCHUK_RECEIVER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the daily rolling log
const LOG_FILE_NAME: &str = "receiver.log";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config_path = config_path(std::env::var_os(CONFIG_ENV));
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config.logging);

    info!("Nunchuk Receiver v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config_path.display());

    let injector = hid::from_config(&config).context("Failed to create HID injector")?;
    let workers = standard_workers(&config, injector);

    info!("Press Ctrl+C to exit");
    let report = Supervisor::new(config.supervisor.drain_timeout())
        .run(workers, shutdown_signal())
        .await;

    match &report.reason {
        ShutdownReason::OperatorRequested => {
            info!("Clean shutdown ({} workers stopped)", report.completed.len());
        }
        ShutdownReason::WorkerFailure { worker, cause } => {
            error!("Shutdown after failure of worker {}: {}", worker, cause);
            for (id, name) in &report.abandoned {
                error!(worker = *name, id = %id, "Worker did not stop in time");
            }
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn config_path(from_env: Option<OsString>) -> PathBuf {
    match from_env {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Console logging, plus a daily rolling file when a directory is configured.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
