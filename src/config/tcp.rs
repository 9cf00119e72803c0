use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default unit id for plain Modbus TCP, where addressing is carried by the
/// connection rather than the frame.
pub(crate) const DEFAULT_UNIT_ID: u8 = 0xFF;

/// Configuration for the TCP transports (plain MBAP and tunneled variants).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote endpoint as `host:port`.
    pub address: String,

    /// Dial timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Per-exchange read/write deadline. Zero disables the deadline.
    #[serde(with = "humantime_serde")]
    pub io_timeout: Duration,

    /// Close the connection after this long without activity. Zero keeps
    /// the connection open indefinitely.
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,

    /// Unit identifier placed in the MBAP header.
    pub unit_id: u8,

    /// Emit sent and received frames at trace level.
    pub trace_frames: bool,
}

impl Config {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:502".to_string(),
            connect_timeout: Duration::from_secs(10),
            io_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(60),
            unit_id: DEFAULT_UNIT_ID,
            trace_frames: false,
        }
    }
}
