use thiserror::Error;

/// Response is well-framed but violates a function-specific expectation.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("response byte count {count} does not match data length {length}")]
    ByteCountMismatch { count: usize, length: usize },

    #[error("response of {length} bytes does not match fixed length {expected}")]
    FixedLengthMismatch { length: usize, expected: usize },

    #[error("response address {response:#06X} does not match request {request:#06X}")]
    AddressMismatch { request: u16, response: u16 },

    #[error("response value {response:#06X} does not match request {request:#06X}")]
    ValueMismatch { request: u16, response: u16 },

    #[error("response quantity {response} does not match request {request}")]
    QuantityMismatch { request: u16, response: u16 },

    #[error("response AND-mask {response:#06X} does not match request {request:#06X}")]
    AndMaskMismatch { request: u16, response: u16 },

    #[error("response OR-mask {response:#06X} does not match request {request:#06X}")]
    OrMaskMismatch { request: u16, response: u16 },

    #[error("fifo count {count} is greater than maximum {max}")]
    FifoCountExceeded { count: u16, max: u16 },

    #[error("response data is empty")]
    EmptyResponse,

    #[error("device identification response of {length} bytes does not meet minimum {min}")]
    DeviceIdTooShort { length: usize, min: usize },
}
