#![cfg(test)]

use super::config::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.serial.port, "/dev/ttyLakeshore");
    assert_eq!(config.serial.baudrate, 57600);
    assert_eq!(config.serial.timeout_ms, 3000);
    assert_eq!(config.serial.query_delay_ms, 20);
    assert_eq!(config.output, 1);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Empty port
    config.serial.port = String::new();
    assert!(config.validate().is_err());

    // Reset and test output outside 1..=2
    config = Config::default();
    config.output = 3;
    assert!(config.validate().is_err());

    config = Config::default();
    config.output = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config.serial.baudrate, deserialized.serial.baudrate);
    assert_eq!(config.output, deserialized.output);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let yaml = "serial:\n  port: /dev/ttyUSB3\noutput: 2\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.serial.port, "/dev/ttyUSB3");
    assert_eq!(config.serial.baudrate, 57600);
    assert_eq!(config.output, 2);
    assert_eq!(config.web.port, 8335);
}
