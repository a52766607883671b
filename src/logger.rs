use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, TaskError};
use crate::settings::Settings;

/// Sends `tracing` output to the log file, since the terminal UI owns
/// stdout. `RUST_LOG` overrides the configured level.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging(settings: &Settings) -> Result<WorkerGuard> {
    let path = settings.log_path();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let file_name = path
        .file_name()
        .ok_or_else(|| TaskError::Config(format!("invalid log file {}", path.display())))?;
    fs::create_dir_all(&dir)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .map_err(|e| TaskError::Config(format!("log_level: {e}")))?,
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| TaskError::Config(format!("logging: {e}")))?;
    Ok(guard)
}
