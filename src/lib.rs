//! # lakeshore335 - Lake Shore 335 temperature controller daemon
//!
//! Exposes the controller's serial-line command protocol as a small set of
//! readable and writable attributes and operator commands over HTTP/JSON.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration and validation
//! - `logging`: Structured logging and tracing
//! - `serial`: Serial port with the instrument's fixed line settings
//! - `channel`: Line-oriented query/command exchange
//! - `driver`: The device, its attributes and commands
//! - `web`: HTTP server and REST API

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod serial;
pub mod web;

#[cfg(test)]
mod config_tests;

// Re-export commonly used types
pub use channel::{InstrumentLink, Request, RequestKind, SerialCommandChannel};
pub use config::Config;
pub use driver::{ConnectionState, HeaterRange, Lakeshore335};
pub use error::{LakeshoreError, Result};
