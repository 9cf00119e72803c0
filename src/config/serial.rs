use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::InvalidRequest;

use super::types::{DataBits, Parity, StopBits};

/// Configuration for the serial transports (RTU and ASCII).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub device: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,

    /// Overall deadline for receiving a complete response.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,

    /// Address of the target device on the bus.
    pub slave_id: u8,

    /// Emit sent and received frames at trace level.
    pub trace_frames: bool,
}

impl Config {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Checks the line-parameter combination before the port is opened.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.parity == Parity::None && self.stop_bits != StopBits::Two {
            return Err(InvalidRequest::ParityRequiresTwoStopBits);
        }
        Ok(())
    }

    pub fn port_info(&self) -> String {
        format!(
            "{} ({} baud, {} data bits, {} parity, {} stop bits)",
            self.device, self.baud_rate, self.data_bits, self.parity, self.stop_bits
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: "/dev/ttyS0".to_string(),
            baud_rate: 19200,
            data_bits: DataBits::default(),
            stop_bits: StopBits::default(),
            parity: Parity::default(),
            read_timeout: Duration::from_secs(5),
            slave_id: 1,
            trace_frames: false,
        }
    }
}
