//! Process-wide logging state

use super::level::level_rank;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Outcome of the single subscriber installation in this process
pub(crate) static INIT_RESULT: OnceCell<Result<(), String>> = OnceCell::new();

/// Dropping the guard stops the background file writer
pub(crate) static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Formatted lines fanned out to `/api/logs/stream` subscribers
pub(crate) static LOG_LINES: OnceCell<broadcast::Sender<String>> = OnceCell::new();

/// Minimum level forwarded to web clients, stored as its rank
static WEB_LEVEL_RANK: AtomicU8 = AtomicU8::new(2);

const LEVELS_BY_RANK: [Level; 5] = [
    Level::TRACE,
    Level::DEBUG,
    Level::INFO,
    Level::WARN,
    Level::ERROR,
];

/// Change the level applied to the live web log stream
pub fn set_web_log_level(level: Level) {
    WEB_LEVEL_RANK.store(level_rank(level), Ordering::Relaxed);
}

/// Level applied to the live web log stream; INFO until changed
pub fn get_web_log_level() -> Level {
    let rank = WEB_LEVEL_RANK.load(Ordering::Relaxed);
    LEVELS_BY_RANK
        .get(usize::from(rank))
        .copied()
        .unwrap_or(Level::INFO)
}
