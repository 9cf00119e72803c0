use std::time::Duration;

use thiserror::Error;

use super::IoOperation;

/// Connection establishment, write or read failed.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connect to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connect to {address} timed out after {limit:?}")]
    ConnectTimeout { address: String, limit: Duration },

    #[error("{operation} failed: {source}")]
    Io {
        operation: IoOperation,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: IoOperation,
        limit: Duration,
    },

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("no response received")]
    NoResponse,

    #[error("serial port error on {port}: {source}")]
    Serial {
        port: String,
        #[source]
        source: serialport::Error,
    },
}

impl TransportError {
    pub fn io(operation: IoOperation, source: std::io::Error) -> Self {
        TransportError::Io { operation, source }
    }

    pub fn timeout(operation: IoOperation, limit: Duration) -> Self {
        TransportError::Timeout { operation, limit }
    }

    pub fn serial(port: impl Into<String>, source: serialport::Error) -> Self {
        TransportError::Serial {
            port: port.into(),
            source,
        }
    }
}
