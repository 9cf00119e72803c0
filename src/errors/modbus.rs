use thiserror::Error;

use super::{FrameError, InvalidRequest, ModbusException, ProtocolError, TransportError};

/// Top-level error returned by every client and transport operation.
#[derive(Error, Debug)]
pub enum ModbusError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequest),

    #[error("encode error: adu length {length} exceeds maximum {max}")]
    Encode { length: usize, max: usize },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Exception(#[from] ModbusException),
}

impl ModbusError {
    /// True if the error is an exception response from the device, as
    /// opposed to a failure of the exchange itself.
    pub fn is_exception(&self) -> bool {
        matches!(self, ModbusError::Exception(_))
    }
}
