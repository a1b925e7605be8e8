use lakeshore335::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.serial.port = "/dev/ttyUSB3".to_string();
    cfg.output = 2;
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.serial.port, "/dev/ttyUSB3");
    assert_eq!(loaded.output, 2);
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();
    assert!(cfg.validate().is_ok());

    cfg.serial.port.clear();
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.serial.baudrate = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.serial.timeout_ms = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.output = 3;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.web.port = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}

#[test]
fn explicit_path_wins_over_defaults() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "serial:\n  port: /dev/ttyS9\n").unwrap();
    let cfg = Config::load_from(Some(tmp.path())).unwrap();
    assert_eq!(cfg.serial.port, "/dev/ttyS9");
    assert_eq!(cfg.serial.baudrate, 57600);
}

#[test]
fn missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(Config::load_from(Some(&missing)).is_err());
}
