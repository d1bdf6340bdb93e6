use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOGS_DIRECTORY: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "floorplan.log";

/// Logs to stderr and to a daily file under `<data dir>/logs`.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Keep the returned
/// guard alive until exit, dropping it flushes the file.
pub fn install_tracing(data_dir: &Path) -> Result<WorkerGuard> {
    let logs_dir = data_dir.join(LOGS_DIRECTORY);
    std::fs::create_dir_all(&logs_dir)
        .into_diagnostic()
        .wrap_err("failed to create logs directory")?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .into_diagnostic()
        .wrap_err("failed to install tracing subscriber")?;
    Ok(guard)
}
