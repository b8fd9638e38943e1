//! Logging initialization.
//!
//! Logs go to a per-run file under a `logs/` directory next to the
//! executable, so they never mix with command output on the terminal.
//! The level is controlled by `RUST_LOG`, defaulting to `info`.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize file-based logging. Returns the guard that keeps the
/// non-blocking writer flushing; drop it only at process exit. Returns
/// `None` (and logs nowhere) if the log file cannot be created.
pub fn init_logging(app_name: &str) -> Option<WorkerGuard> {
    let log_dir = match std::env::current_exe() {
        Ok(exe_path) => exe_path
            .parent()
            .map(|p| p.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs")),
        Err(_) => PathBuf::from("logs"),
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: failed to create logs directory: {e}");
        return None;
    }

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_path = log_dir.join(format!("{app_name}.{timestamp}.log"));
    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: failed to create log file: {e}");
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("logging initialized, writing to {}", log_path.display());
    Some(guard)
}
