use thiserror::Error;

/// Caller violated a range or enumeration constraint. Reported before any
/// I/O is performed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("quantity {quantity} must be between {min} and {max}")]
    QuantityOutOfRange { quantity: u16, min: u16, max: u16 },

    #[error("coil value {value:#06X} must be either 0xFF00 (ON) or 0x0000 (OFF)")]
    InvalidCoilValue { value: u16 },

    #[error("write payload of {length} bytes does not match quantity {quantity}")]
    PayloadSizeMismatch { length: usize, quantity: u16 },

    #[error("data bits {bits} must be between 5 and 8")]
    InvalidDataBits { bits: u8 },

    #[error("parity 'none' requires 2 stop bits")]
    ParityRequiresTwoStopBits,
}
