use thiserror::Error;

/// Response violates the transport framing rules.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("response length {length} does not meet minimum {min}")]
    TooShort { length: usize, min: usize },

    #[error("length field {length} outside valid range [1, {max}]")]
    InvalidLengthField { length: usize, max: usize },

    #[error("adu length {length} does not match length field, expected {expected}")]
    SizeMismatch { length: usize, expected: usize },

    #[error("response transaction id {response:#06X} does not match request {request:#06X}")]
    TransactionIdMismatch { request: u16, response: u16 },

    #[error("response protocol id {response:#06X} does not match request {request:#06X}")]
    ProtocolIdMismatch { request: u16, response: u16 },

    #[error("response unit id {response:#04X} does not match request {request:#04X}")]
    UnitIdMismatch { request: u8, response: u8 },

    #[error("response slave id {response:#04X} does not match request {request:#04X}")]
    SlaveIdMismatch { request: u8, response: u8 },

    #[error("crc mismatch: calculated {calculated:#06X}, received {received:#06X}, frame {frame_hex}")]
    CrcMismatch {
        calculated: u16,
        received: u16,
        frame_hex: String,
    },

    #[error("lrc mismatch: calculated {calculated:#04X}, received {received:#04X}")]
    LrcMismatch { calculated: u8, received: u8 },

    #[error("frame does not start with ':'")]
    MissingStart,

    #[error("frame does not end with CRLF")]
    MissingEnd,

    #[error("frame body of {0} hex characters is not an even number")]
    OddLength(usize),

    #[error("invalid hex digit in frame")]
    InvalidHex(#[from] hex::FromHexError),
}
