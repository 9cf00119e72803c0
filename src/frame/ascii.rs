use crate::checksum::lrc;
use crate::errors::{FrameError, ModbusError};
use crate::pdu::{ProtocolDataUnit, PDU_MAX_DATA};

use super::Packager;

/// Maximum ASCII frame size in characters, delimiters included.
pub const ASCII_MAX_ADU: usize = 513;
/// Smallest fragment worth scanning for the end-of-frame marker.
const ASCII_MIN_ADU: usize = 3;
/// Smallest complete frame: colon, address, function, LRC and CRLF.
const ASCII_MIN_FRAME: usize = ASCII_MIN_ADU + 6;

const ASCII_START: u8 = b':';
const ASCII_END: &[u8] = b"\r\n";

/// Packager for Modbus ASCII (uppercase hex framing with LRC).
#[derive(Debug, Clone, Copy)]
pub struct AsciiPackager {
    slave_id: u8,
}

impl AsciiPackager {
    pub fn new(slave_id: u8) -> Self {
        Self { slave_id }
    }

    pub fn slave_id(&self) -> u8 {
        self.slave_id
    }
}

fn read_hex_byte(adu: &[u8], at: usize) -> Result<u8, FrameError> {
    let src = adu.get(at..at + 2).ok_or(FrameError::TooShort {
        length: adu.len(),
        min: at + 2,
    })?;
    let mut out = [0u8; 1];
    hex::decode_to_slice(src, &mut out)?;
    Ok(out[0])
}

impl Packager for AsciiPackager {
    /// `":" | hex(ADDR) | hex(FC) | hex(DATA) | hex(LRC) | "\r\n"`, with the
    /// LRC computed over the binary bytes.
    fn encode(&self, pdu: &ProtocolDataUnit) -> Result<Vec<u8>, ModbusError> {
        if pdu.data.len() > PDU_MAX_DATA {
            return Err(ModbusError::Encode {
                length: ASCII_MIN_FRAME + 2 * pdu.data.len(),
                max: ASCII_MAX_ADU,
            });
        }
        let mut binary = Vec::with_capacity(2 + pdu.data.len());
        binary.push(self.slave_id);
        binary.push(pdu.function);
        binary.extend_from_slice(&pdu.data);
        let checksum = lrc(&binary);

        let mut adu = Vec::with_capacity(ASCII_MIN_FRAME + 2 * pdu.data.len());
        adu.push(ASCII_START);
        adu.extend_from_slice(hex::encode_upper(&binary).as_bytes());
        adu.extend_from_slice(hex::encode_upper([checksum]).as_bytes());
        adu.extend_from_slice(ASCII_END);
        Ok(adu)
    }

    /// Checks length, hex-digit parity, frame delimiters and the slave id.
    fn verify(&self, adu_request: &[u8], adu_response: &[u8]) -> Result<(), ModbusError> {
        let length = adu_response.len();
        if length < ASCII_MIN_FRAME {
            return Err(FrameError::TooShort {
                length,
                min: ASCII_MIN_FRAME,
            }
            .into());
        }
        // Body between the colon and CRLF must hold whole hex pairs
        if length % 2 != 1 {
            return Err(FrameError::OddLength(length - 1).into());
        }
        if adu_response[0] != ASCII_START {
            return Err(FrameError::MissingStart.into());
        }
        if &adu_response[length - ASCII_END.len()..] != ASCII_END {
            return Err(FrameError::MissingEnd.into());
        }
        let request_id = read_hex_byte(adu_request, 1).map_err(ModbusError::Frame)?;
        let response_id = read_hex_byte(adu_response, 1).map_err(ModbusError::Frame)?;
        if response_id != request_id {
            return Err(FrameError::SlaveIdMismatch {
                request: request_id,
                response: response_id,
            }
            .into());
        }
        Ok(())
    }

    /// Parses slave id, function code, payload and trailing LRC, then
    /// recomputes the LRC over the decoded bytes.
    fn decode(&self, adu: &[u8]) -> Result<ProtocolDataUnit, ModbusError> {
        let length = adu.len();
        if length < ASCII_MIN_FRAME {
            return Err(FrameError::TooShort {
                length,
                min: ASCII_MIN_FRAME,
            }
            .into());
        }
        let slave_id = read_hex_byte(adu, 1).map_err(ModbusError::Frame)?;
        let function = read_hex_byte(adu, 3).map_err(ModbusError::Frame)?;
        let data = hex::decode(&adu[5..length - 4]).map_err(FrameError::InvalidHex)?;
        let received = read_hex_byte(adu, length - 4).map_err(ModbusError::Frame)?;

        let mut binary = Vec::with_capacity(2 + data.len());
        binary.push(slave_id);
        binary.push(function);
        binary.extend_from_slice(&data);
        let calculated = lrc(&binary);
        if received != calculated {
            return Err(FrameError::LrcMismatch {
                calculated,
                received,
            }
            .into());
        }
        Ok(ProtocolDataUnit::new(function, data))
    }
}

/// True once the accumulated buffer holds a complete frame: the terminator
/// may arrive split across reads, so the scan always looks at the last two
/// bytes of the whole buffer rather than the latest chunk.
pub(crate) fn ascii_frame_complete(buffer: &[u8]) -> bool {
    buffer.len() > ASCII_MIN_ADU && buffer.ends_with(ASCII_END)
}
