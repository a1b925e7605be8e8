use super::*;

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyLakeshore".to_string(),
            baudrate: 57600,
            timeout_ms: 3000,
            query_delay_ms: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            web_level: None,
            file: "/tmp/lakeshore335.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8335,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            output: 1,
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}
