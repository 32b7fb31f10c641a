//! File logging for the CLI driver.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. `start_logging` wires a non-blocking file writer and hands
//! the flush guard back to the caller, who keeps it alive for the life of
//! the process.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

/// Directives used when `RUST_LOG` is absent or unparseable: engine
/// internals at debug, dependencies at info.
const DEFAULT_DIRECTIVES: &str = "caissa=debug,info";

/// Install the process-wide subscriber writing to `path`.
///
/// Returns `None` when the log file cannot be opened or another subscriber
/// won the race; the engine simply runs unlogged in that case.
#[must_use = "dropping the guard stops log flushing"]
pub fn start_logging(path: &Path) -> Option<WorkerGuard> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).ok()?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .ok()
        .map(|()| guard)
}
