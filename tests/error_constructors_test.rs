use lakeshore335::error::LakeshoreError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(
        LakeshoreError::config("x"),
        LakeshoreError::Config { .. }
    ));
    assert!(matches!(
        LakeshoreError::serial("x"),
        LakeshoreError::Serial { .. }
    ));
    assert!(matches!(
        LakeshoreError::protocol("x"),
        LakeshoreError::Protocol { .. }
    ));
    assert!(matches!(LakeshoreError::web("x"), LakeshoreError::Web { .. }));
}

#[test]
fn error_constructors_group_2() {
    let ser = LakeshoreError::Serialization {
        message: "s".into(),
    };
    assert!(matches!(ser, LakeshoreError::Serialization { .. }));
    assert!(matches!(LakeshoreError::io("x"), LakeshoreError::Io { .. }));
    assert!(matches!(
        LakeshoreError::validation("f", "m"),
        LakeshoreError::Validation { .. }
    ));
    assert!(matches!(
        LakeshoreError::generic("x"),
        LakeshoreError::Generic { .. }
    ));
}

#[test]
fn not_connected_is_a_serial_error() {
    let e = LakeshoreError::not_connected();
    assert!(matches!(e, LakeshoreError::Serial { .. }));
    assert!(e.is_not_connected());
    assert!(!LakeshoreError::serial("Failed to write").is_not_connected());
}

#[test]
fn display_messages() {
    let e = LakeshoreError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
    assert!(s.contains("field"));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let e: LakeshoreError = io.into();
    assert!(matches!(e, LakeshoreError::Io { .. }));
}
