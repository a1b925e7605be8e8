use crate::error::{LakeshoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection state of the device. There is no way back from `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Initial state; also the final state when the port failed to open
    Disconnected,
    /// Port opened at start-up
    Connected,
}

impl ConnectionState {
    pub fn is_operational(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connected => f.write_str("connected"),
        }
    }
}

/// Heater power level of an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum HeaterRange {
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl HeaterRange {
    pub const ALL: [HeaterRange; 4] = [
        HeaterRange::Off,
        HeaterRange::Low,
        HeaterRange::Medium,
        HeaterRange::High,
    ];

    /// Numeric code used on the wire
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            HeaterRange::Off => "off",
            HeaterRange::Low => "low",
            HeaterRange::Medium => "medium",
            HeaterRange::High => "high",
        }
    }
}

impl TryFrom<i64> for HeaterRange {
    type Error = LakeshoreError;

    fn try_from(value: i64) -> Result<Self> {
        HeaterRange::ALL
            .into_iter()
            .find(|r| i64::from(r.code()) == value)
            .ok_or_else(|| {
                LakeshoreError::validation(
                    "heater_range".to_string(),
                    format!("{} is not one of 0=off, 1=low, 2=medium, 3=high", value),
                )
            })
    }
}

impl fmt::Display for HeaterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sensor input driving a control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LoopInput {
    None = 0,
    A = 1,
    B = 2,
}

impl LoopInput {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for LoopInput {
    type Error = LakeshoreError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(LoopInput::None),
            1 => Ok(LoopInput::A),
            2 => Ok(LoopInput::B),
            other => Err(LakeshoreError::validation(
                "input".to_string(),
                format!("{} is not one of 0=None, 1=Input A, 2=Input B", other),
            )),
        }
    }
}

/// One attribute read: either a value or the reason it is missing
#[derive(Debug, Clone, Serialize)]
pub struct Reading<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<Result<T>> for Reading<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(v) => Self {
                value: Some(v),
                error: None,
            },
            Err(e) => Self {
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// All readable attributes of the device, read in one pass
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    pub timestamp: String,
    pub state: ConnectionState,
    pub port: String,
    pub output: u8,
    pub identity: Option<String>,
    /// Input A temperature (K)
    pub input_a: Reading<f64>,
    /// Input B temperature (K)
    pub input_b: Reading<f64>,
    /// Setpoint of the bound output (K)
    pub setpoint: Reading<f64>,
    pub heater_range: Reading<HeaterRange>,
    /// Heater output (%)
    pub heater_output: Reading<f64>,
}
