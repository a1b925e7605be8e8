//! Lake Shore 335 device
//!
//! Owns the command channel to the controller and exposes the device's
//! attributes and commands. The device starts `Disconnected`; opening the
//! port at start-up moves it to `Connected` for the rest of the process
//! lifetime. A failed open leaves it `Disconnected` and every exchange is
//! refused from then on.

use crate::channel::{InstrumentLink, Request, SerialCommandChannel};
use crate::config::Config;
use crate::error::{LakeshoreError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::serial::open_port;

mod attributes;
mod commands;
mod snapshot;
pub mod types;

pub use attributes::{parse_float_reply, parse_int_reply};
pub use types::{ConnectionState, DeviceSnapshot, HeaterRange, LoopInput, Reading};

/// Identification query sent once after the port opens
pub const IDENTIFY: &str = "*IDN?";

/// The device adapter
pub struct Lakeshore335 {
    /// Configuration
    config: Config,

    /// Current connection state
    state: ConnectionState,

    /// Channel to the instrument; present only once connected
    link: Option<Box<dyn InstrumentLink>>,

    /// `*IDN?` reply captured at start-up
    identity: Option<String>,

    /// Logger with context
    logger: StructuredLogger,
}

impl Lakeshore335 {
    /// Create a disconnected device
    pub fn new(config: Config) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("driver")
                .with_port(&config.serial.port)
                .with_output(config.output),
        );
        Self {
            config,
            state: ConnectionState::Disconnected,
            link: None,
            identity: None,
            logger,
        }
    }

    /// Create a device that is already connected through `link`. No traffic is
    /// generated.
    pub fn with_link(config: Config, link: Box<dyn InstrumentLink>) -> Self {
        let mut device = Self::new(config);
        device.link = Some(link);
        device.state = ConnectionState::Connected;
        device
    }

    /// Open the configured serial port and run the start-up sequence.
    ///
    /// On failure the error is logged and the device stays `Disconnected`.
    /// There is no retry.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state.is_operational() {
            return Ok(());
        }

        let port = self.config.serial.port.clone();
        self.logger.info(&format!(
            "Opening serial port {} at {} baud",
            port, self.config.serial.baudrate
        ));

        match open_port(&self.config.serial) {
            Ok(stream) => {
                let channel = SerialCommandChannel::from_config(stream, &self.config.serial);
                self.attach(Box::new(channel)).await;
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error(&format!("Cannot connect on port {}: {}", port, e));
                Err(e)
            }
        }
    }

    /// Take ownership of an open link, mark the device connected and identify
    /// the instrument. A failed identification is only logged.
    pub async fn attach(&mut self, link: Box<dyn InstrumentLink>) {
        self.link = Some(link);
        self.state = ConnectionState::Connected;
        self.logger
            .info(&format!("Initialised on port {}", self.config.serial.port));

        match self.identify().await {
            Ok(id) if !id.is_empty() => {
                self.logger.info(&format!("Connected to device {}", id));
                self.identity = Some(id);
            }
            Ok(_) => self.logger.warn("Instrument did not answer identification"),
            Err(e) => self.logger.warn(&format!("Identification failed: {}", e)),
        }
    }

    /// Query the instrument identification string
    pub async fn identify(&mut self) -> Result<String> {
        let reply = self.query(IDENTIFY.to_string()).await?;
        Ok(reply.trim().to_string())
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_operational()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output index this device is bound to
    pub fn output(&self) -> u8 {
        self.config.output
    }

    fn link(&mut self) -> Result<&mut (dyn InstrumentLink + 'static)> {
        self.link
            .as_deref_mut()
            .ok_or_else(LakeshoreError::not_connected)
    }

    /// Send a query and return the raw reply
    async fn query(&mut self, text: String) -> Result<String> {
        let request = Request::query(text);
        self.link()?.execute(&request).await
    }

    /// Send a command; nothing is read back
    async fn command(&mut self, text: String) -> Result<()> {
        let request = Request::command(text);
        self.link()?.execute(&request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_device_is_disconnected_and_refuses_exchanges() {
        let mut device = Lakeshore335::new(Config::default());
        assert_eq!(device.state(), ConnectionState::Disconnected);
        let err = device.identify().await.unwrap_err();
        assert!(err.is_not_connected());
    }

    #[tokio::test]
    async fn failed_open_stays_disconnected() {
        let mut config = Config::default();
        config.serial.port = "/dev/lakeshore-missing".to_string();
        let mut device = Lakeshore335::new(config);

        assert!(device.connect().await.is_err());
        assert!(!device.is_connected());
        assert!(device.read_input_a().await.unwrap_err().is_not_connected());
    }
}
