use anyhow::{anyhow, Result};
use journal_config::LogConfig;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log files larger than this are truncated on startup.
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Installs the global subscriber.
///
/// Logs go to a file when one is given by `--log`, `JOURNAL_LOG_PATH` or the
/// config, in that order. Otherwise they go to stderr filtered by `RUST_LOG`,
/// leaving stdout to the command output. The returned guard flushes the file
/// writer on drop.
pub fn init(log: Option<PathBuf>, config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let maybe_log = if let Some(log_path) = log {
        Some(log_path)
    } else if let Ok(log_path) = std::env::var("JOURNAL_LOG_PATH").map(PathBuf::from) {
        Some(log_path)
    } else {
        config.log_file.as_ref().map(PathBuf::from)
    };

    if let Some(log_path) = maybe_log {
        if let Ok(metadata) = std::fs::metadata(&log_path) {
            if log_path.is_file() && metadata.len() > MAX_LOG_FILE_SIZE {
                std::fs::remove_file(&log_path)?;
            }
        }

        let file_name = log_path
            .file_name()
            .ok_or_else(|| anyhow!("no file name in {log_path:?}"))?;

        let directory = log_path
            .parent()
            .ok_or_else(|| anyhow!("{log_path:?} has no parent"))?;

        let file_appender = tracing_appender::rolling::never(directory, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let max_level = config.max_level.parse().unwrap_or(tracing::Level::DEBUG);

        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(max_level)
            .with_line_number(true)
            .with_writer(non_blocking)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init()
            .map_err(|err| anyhow!("failed to install the logger: {err}"))?;

        Ok(None)
    }
}
