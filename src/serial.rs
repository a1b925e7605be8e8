//! Serial line to the Lake Shore 335
//!
//! The controller talks 7 data bits, odd parity, one stop bit. Only the port
//! path, baud rate and timing are configurable.

use crate::config::SerialConfig;
use crate::error::{LakeshoreError, Result};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

/// Fixed line settings of the instrument
pub const DATA_BITS: DataBits = DataBits::Seven;
pub const PARITY: Parity = Parity::Odd;
pub const STOP_BITS: StopBits = StopBits::One;

/// Any byte stream the command channel can run over: a real serial port, or an
/// in-memory stream standing in for the instrument.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Open the configured serial port with the instrument's fixed line settings
pub fn open_port(config: &SerialConfig) -> Result<SerialStream> {
    tokio_serial::new(config.port.as_str(), config.baudrate)
        .data_bits(DATA_BITS)
        .parity(PARITY)
        .stop_bits(STOP_BITS)
        .flow_control(FlowControl::None)
        .timeout(Duration::from_millis(config.timeout_ms))
        .open_native_async()
        .map_err(|e| {
            LakeshoreError::serial(format!(
                "Failed to open serial port '{}' at {} baud: {}",
                config.port, config.baudrate, e
            ))
        })
}
