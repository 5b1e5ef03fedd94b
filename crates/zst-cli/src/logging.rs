//! Logging initialization

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use crate::args::{Args, LogFormat};

/// Target of rendered table lines; written to the session log only
pub const REPORT_TARGET: &str = "session_report";

/// Keeps the session log writer alive
pub struct LogGuard {
    _writer: Option<WorkerGuard>,
    /// Session log location, if one was opened
    pub path: Option<PathBuf>,
}

/// Session log file name for the current time
pub fn session_log_name() -> String {
    format!(
        "zapret_test_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Initialize logging based on CLI arguments
///
/// With `session_log_dir` set, every event (and every report line) is also
/// written as plain text to a fresh session log in that directory.
pub fn init(args: &Args, session_log_dir: Option<&Path>) -> Result<LogGuard> {
    // Determine log level
    let level = if args.quiet {
        Level::ERROR
    } else {
        match args.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    // Build env filter; report lines reach the console as colored tables instead
    let console_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive(format!("{REPORT_TARGET}=off").parse()?);

    let console: Box<dyn Layer<Registry> + Send + Sync> = match args.log_format {
        LogFormat::Text => fmt::layer()
            .with_target(args.verbose >= 2)
            .with_thread_ids(args.verbose >= 3)
            .with_file(args.verbose >= 3)
            .with_line_number(args.verbose >= 3)
            .boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    let mut guard = LogGuard {
        _writer: None,
        path: None,
    };

    let file_layer = match session_log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let path = dir.join(session_log_name());
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, worker) = tracing_appender::non_blocking(file);

            guard._writer = Some(worker);
            guard.path = Some(path);

            let file_level = level.max(Level::INFO);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(writer)
                    .with_filter(LevelFilter::from_level(file_level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_log_name() {
        let name = session_log_name();
        assert!(name.starts_with("zapret_test_"));
        assert!(name.ends_with(".log"));
        // zapret_test_YYYYmmdd_HHMMSS.log
        assert_eq!(name.len(), "zapret_test_".len() + 15 + ".log".len());
    }
}
