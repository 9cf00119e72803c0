mod ascii;
mod rtu;
mod tcp;

pub use ascii::{AsciiPackager, ASCII_MAX_ADU};
pub use rtu::{predict_response_length, RtuPackager, RTU_MAX_ADU, RTU_MIN_ADU};
pub use tcp::{TcpPackager, TCP_HEADER_LEN, TCP_MAX_ADU};

pub(crate) use ascii::ascii_frame_complete;
pub(crate) use rtu::expected_response_length as rtu_expected_response_length;

use crate::errors::ModbusError;
use crate::pdu::ProtocolDataUnit;

/// Per-transport framer. Encodes a request PDU into an Application Data
/// Unit, checks a response ADU against the request it answers, and extracts
/// the response PDU.
///
/// `verify` runs before `decode`: header and addressing mismatches are
/// reported without touching the payload.
pub trait Packager: Send + Sync {
    fn encode(&self, pdu: &ProtocolDataUnit) -> Result<Vec<u8>, ModbusError>;
    fn verify(&self, adu_request: &[u8], adu_response: &[u8]) -> Result<(), ModbusError>;
    fn decode(&self, adu: &[u8]) -> Result<ProtocolDataUnit, ModbusError>;
}
