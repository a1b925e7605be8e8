//! Structured logging and tracing for the Lake Shore 335 adapter
//!
//! This module provides logging with support for structured context fields,
//! daily log rotation, and a broadcast of formatted lines that the web API
//! streams to clients.

use crate::config::LoggingConfig;
use crate::error::{LakeshoreError, Result};
use std::path::Path;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod broadcast;
mod level;
mod state;
mod structured;

use broadcast::{BroadcastMakeWriter, get_or_init_log_tx};
use state::{FILE_GUARD, INIT_RESULT};

pub use broadcast::subscribe_log_lines;
pub use level::{parse_line_level, parse_log_level, set_web_log_level_str};
pub use state::{get_web_log_level, set_web_log_level};
pub use structured::{LogContext, StructuredLogger, get_logger, get_logger_with_context};

/// Install the subscriber once per process. Later calls return the outcome of
/// the first one.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_RESULT
        .get_or_init(|| install(config).map_err(|e| e.to_string()))
        .clone()
        .map_err(LakeshoreError::config)
}

/// Explicit level override for one output, else the base level
fn layer_level(over: Option<&String>, base: Level) -> Level {
    over.and_then(|s| parse_log_level(s).ok()).unwrap_or(base)
}

fn install(config: &LoggingConfig) -> Result<()> {
    let base_level = parse_log_level(&config.level)?;
    let console_level = layer_level(config.console_level.as_ref(), base_level);
    let file_level = layer_level(config.file_level.as_ref(), base_level);
    let web_level = layer_level(config.web_level.as_ref(), base_level);

    let most_verbose = level::min_level(level::min_level(console_level, file_level), web_level);
    let filter = build_env_filter(most_verbose);

    if should_use_console_only() {
        init_console_only_logging(filter, config.json_format, console_level, web_level);
    } else {
        init_file_logging(config, filter, console_level, file_level, web_level)?;
    }
    set_web_log_level(web_level);
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lakeshore335={},tower_http=warn", level).into())
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os("LAKESHORE_DISABLE_FILE_LOG").is_some()
}

fn broadcast_layer<S>(json_format: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let make = BroadcastMakeWriter {
        tx: get_or_init_log_tx(),
    };
    let base = fmt::layer()
        .with_writer(make)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    // Capture everything; the web level is applied per line when streaming
    if json_format {
        base.json().with_filter(LevelFilter::TRACE).boxed()
    } else {
        base.with_filter(LevelFilter::TRACE).boxed()
    }
}

fn console_layer<S>(json_format: bool, level: Level) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let base = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json_format {
        base.json().with_filter(LevelFilter::from_level(level)).boxed()
    } else {
        base.with_filter(LevelFilter::from_level(level)).boxed()
    }
}

fn init_console_only_logging(
    filter: EnvFilter,
    json_format: bool,
    console_level: Level,
    web_level: Level,
) {
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(json_format, console_level))
        .with(broadcast_layer(json_format))
        .try_init();

    info!(
        "Logging initialized - console_level: {:?}, web_level: {:?}, console-only",
        console_level, web_level
    );
}

fn init_file_logging(
    config: &LoggingConfig,
    filter: EnvFilter,
    console_level: Level,
    file_level: Level,
    web_level: Level,
) -> Result<()> {
    let p = Path::new(&config.file);
    // A path with an extension names the file; its parent is the log directory
    let (dir, prefix) = if p.extension().is_some() {
        (
            p.parent().unwrap_or(p),
            p.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("lakeshore335"),
        )
    } else {
        (p, "lakeshore335")
    };

    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(config.backup_count.max(1) as usize)
        .build(dir)
        .map_err(|e| LakeshoreError::io(format!("Failed to create log file appender: {}", e)))?;

    let (non_blocking_appender, guard) = non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let file_layer = {
        let base = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false);
        if config.json_format {
            base.json()
                .with_filter(LevelFilter::from_level(file_level))
                .boxed()
        } else {
            base.with_filter(LevelFilter::from_level(file_level))
                .boxed()
        }
    };

    let console = config
        .console_output
        .then(|| console_layer(config.json_format, console_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(broadcast_layer(config.json_format))
        .with(console)
        .try_init()
        .map_err(|e| LakeshoreError::config(format!("Failed to install subscriber: {}", e)))?;

    info!(
        "Logging initialized - console_level: {:?}, file_level: {:?}, web_level: {:?}, file: {}",
        console_level, file_level, web_level, config.file
    );
    Ok(())
}

/// Whether a formatted line should be emitted to the web SSE stream given the current runtime web level
pub fn should_emit_to_web(line: &str) -> bool {
    let current = get_web_log_level();
    match parse_line_level(line) {
        Some(line_lvl) => level::level_rank(line_lvl) >= level::level_rank(current),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_logging() {
        let config = LoggingConfig::default();
        init_logging(&config).ok();
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("ERROR").unwrap(), Level::ERROR);
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_log_context() {
        let context = LogContext::new("test")
            .with_port("/dev/ttyLakeshore")
            .with_output(1)
            .with_field("key", "value".to_string());

        assert_eq!(context.component, "test");
        assert_eq!(context.port.as_deref(), Some("/dev/ttyLakeshore"));
        assert_eq!(context.output, Some(1));
        assert_eq!(context.extra_fields.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_structured_logger() {
        init_test_logging();

        let logger = StructuredLogger::new(LogContext::new("test_component"));

        // These should not panic
        logger.info("Test info message");
        logger.debug("Test debug message");
        logger.warn("Test warning message");
        logger.error("Test error message");
    }

    #[test]
    fn test_get_logger() {
        let logger = get_logger("test_component");
        assert_eq!(logger.context.component, "test_component");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        assert!(init_logging(&LoggingConfig::default()).is_ok());
    }
}
