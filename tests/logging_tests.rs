use lakeshore335::logging::{
    LogContext, get_logger_with_context, parse_line_level, set_web_log_level,
    set_web_log_level_str, should_emit_to_web,
};
use tracing::Level;

#[test]
fn should_emit_filters_below_runtime_level() {
    // Runtime level WARN: INFO lines are dropped, ERROR passes
    set_web_log_level(Level::WARN);
    assert!(!should_emit_to_web(" INFO message"));
    assert!(should_emit_to_web(" ERROR something"));
    // Lines without a recognisable level are always forwarded
    assert!(should_emit_to_web("continuation line"));
}

#[test]
fn web_level_from_string() {
    assert!(set_web_log_level_str("warning").is_ok());
    assert!(set_web_log_level_str("loud").is_err());
}

#[test]
fn json_lines_are_classified() {
    let line = r#"{"timestamp":"2026-01-01T00:00:00Z","level":"DEBUG","fields":{"message":"-> KRDG?A"}}"#;
    assert_eq!(parse_line_level(line), Some(Level::DEBUG));
}

#[test]
fn logger_keeps_its_context() {
    let logger = get_logger_with_context(LogContext::new("driver").with_port("/dev/ttyS0"));
    assert_eq!(logger.context().component, "driver");
    assert_eq!(logger.context().port.as_deref(), Some("/dev/ttyS0"));
}
