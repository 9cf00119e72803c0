use crate::checksum::crc16;
use crate::errors::{FrameError, ModbusError};
use crate::pdu::{
    ProtocolDataUnit, EXCEPTION_FLAG, FUNC_MASK_WRITE_REGISTER, FUNC_READ_COILS,
    FUNC_READ_DISCRETE_INPUTS, FUNC_READ_FIFO_QUEUE, FUNC_READ_HOLDING_REGISTERS,
    FUNC_READ_INPUT_REGISTERS, FUNC_READ_WRITE_MULTIPLE_REGISTERS, FUNC_WRITE_MULTIPLE_COILS,
    FUNC_WRITE_MULTIPLE_REGISTERS, FUNC_WRITE_SINGLE_COIL, FUNC_WRITE_SINGLE_REGISTER,
};

use super::Packager;

/// Smallest valid RTU frame: address, function and CRC.
pub const RTU_MIN_ADU: usize = 4;
/// Maximum RTU frame size.
pub const RTU_MAX_ADU: usize = 256;
/// Exception frame: address, flagged function, exception code and CRC.
pub(crate) const RTU_EXCEPTION_ADU: usize = 5;

/// Packager for Modbus RTU (binary framing with CRC-16).
#[derive(Debug, Clone, Copy)]
pub struct RtuPackager {
    slave_id: u8,
}

impl RtuPackager {
    pub fn new(slave_id: u8) -> Self {
        Self { slave_id }
    }

    pub fn slave_id(&self) -> u8 {
        self.slave_id
    }
}

impl Packager for RtuPackager {
    /// `ADDR(1) | FC(1) | DATA(N) | CRC(2 LE)`, CRC over all preceding bytes.
    fn encode(&self, pdu: &ProtocolDataUnit) -> Result<Vec<u8>, ModbusError> {
        let length = pdu.data.len() + RTU_MIN_ADU;
        if length > RTU_MAX_ADU {
            return Err(ModbusError::Encode {
                length,
                max: RTU_MAX_ADU,
            });
        }
        let mut adu = Vec::with_capacity(length);
        adu.push(self.slave_id);
        adu.push(pdu.function);
        adu.extend_from_slice(&pdu.data);
        let checksum = crc16(&adu);
        adu.extend_from_slice(&checksum.to_le_bytes());
        Ok(adu)
    }

    /// Checks the minimum length and that the response comes from the
    /// addressed slave.
    fn verify(&self, adu_request: &[u8], adu_response: &[u8]) -> Result<(), ModbusError> {
        if adu_response.len() < RTU_MIN_ADU {
            return Err(FrameError::TooShort {
                length: adu_response.len(),
                min: RTU_MIN_ADU,
            }
            .into());
        }
        if adu_response[0] != adu_request[0] {
            return Err(FrameError::SlaveIdMismatch {
                request: adu_request[0],
                response: adu_response[0],
            }
            .into());
        }
        Ok(())
    }

    /// Recomputes the CRC over everything but the trailing two bytes and
    /// extracts the PDU.
    fn decode(&self, adu: &[u8]) -> Result<ProtocolDataUnit, ModbusError> {
        let length = adu.len();
        if length < RTU_MIN_ADU {
            return Err(FrameError::TooShort {
                length,
                min: RTU_MIN_ADU,
            }
            .into());
        }
        let calculated = crc16(&adu[..length - 2]);
        let received = u16::from_le_bytes([adu[length - 2], adu[length - 1]]);
        if calculated != received {
            return Err(FrameError::CrcMismatch {
                calculated,
                received,
                frame_hex: hex::encode(&adu[..length - 2]),
            }
            .into());
        }
        Ok(ProtocolDataUnit::new(adu[1], adu[2..length - 2].to_vec()))
    }
}

/// Predicts the length of a normal (non-exception) RTU response from the
/// request frame.
///
/// RTU carries no length field, so the receive loop must know how many
/// bytes to expect before they arrive. For read functions the answer
/// follows from the requested quantity; writes echo a fixed-size frame.
/// ReadFIFOQueue and unknown functions return the minimum frame size: their
/// length is only known once the response header is in (see
/// [`expected_response_length`]).
pub fn predict_response_length(adu_request: &[u8]) -> usize {
    if adu_request.len() < 6 {
        return RTU_MIN_ADU;
    }
    let quantity = u16::from_be_bytes([adu_request[4], adu_request[5]]) as usize;
    match adu_request[1] {
        FUNC_READ_COILS | FUNC_READ_DISCRETE_INPUTS => 5 + quantity.div_ceil(8),
        FUNC_READ_HOLDING_REGISTERS | FUNC_READ_INPUT_REGISTERS => 5 + 2 * quantity,
        // The read quantity sits at the same offset in the request
        FUNC_READ_WRITE_MULTIPLE_REGISTERS => 5 + 2 * quantity,
        FUNC_WRITE_SINGLE_COIL
        | FUNC_WRITE_SINGLE_REGISTER
        | FUNC_WRITE_MULTIPLE_COILS
        | FUNC_WRITE_MULTIPLE_REGISTERS => 8,
        // Address, function, 6-byte echo and CRC
        FUNC_MASK_WRITE_REGISTER => 10,
        _ => RTU_MIN_ADU,
    }
}

/// Refines the expected response length once at least [`RTU_MIN_ADU`] bytes
/// have arrived: an exception frame is always 5 bytes, and a FIFO response
/// declares its own size in the byte-count field.
pub(crate) fn expected_response_length(adu_request: &[u8], partial: &[u8]) -> usize {
    if partial.len() >= 2 && partial[1] == adu_request[1] | EXCEPTION_FLAG {
        return RTU_EXCEPTION_ADU;
    }
    if adu_request[1] == FUNC_READ_FIFO_QUEUE {
        if let Some(bytes) = partial.get(2..4) {
            let byte_count = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
            return (5 + byte_count).min(RTU_MAX_ADU);
        }
        return RTU_MIN_ADU;
    }
    predict_response_length(adu_request).min(RTU_MAX_ADU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_crc_low_byte_first() {
        let packager = RtuPackager::new(0x01);
        let pdu = ProtocolDataUnit::new(0x03, vec![0x50, 0x00, 0x00, 0x18]);
        let adu = packager.encode(&pdu).unwrap();
        assert_eq!(adu, [0x01, 0x03, 0x50, 0x00, 0x00, 0x18, 0x54, 0xC0]);
    }

    #[test]
    fn decode_verifies_crc_and_extracts_pdu() {
        let packager = RtuPackager::new(0x01);
        let adu = [0x01, 0x10, 0x8A, 0x00, 0x00, 0x03, 0xAA, 0x10];
        let pdu = packager.decode(&adu).unwrap();
        assert_eq!(pdu.function, 0x10);
        assert_eq!(pdu.data, vec![0x8A, 0x00, 0x00, 0x03]);
    }

    #[test]
    fn decode_rejects_corrupted_frame() {
        let packager = RtuPackager::new(0x01);
        let adu = [0x01, 0x10, 0x8A, 0x00, 0x00, 0x03, 0xAA, 0x11];
        assert!(matches!(
            packager.decode(&adu).unwrap_err(),
            ModbusError::Frame(FrameError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn verify_checks_length_and_slave_id() {
        let packager = RtuPackager::new(0x01);
        let request = [0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B];

        assert!(matches!(
            packager.verify(&request, &[0x01, 0x83, 0x02]).unwrap_err(),
            ModbusError::Frame(FrameError::TooShort { length: 3, min: 4 })
        ));
        assert!(matches!(
            packager
                .verify(&request, &[0x02, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
                .unwrap_err(),
            ModbusError::Frame(FrameError::SlaveIdMismatch { request: 1, response: 2 })
        ));
    }

    #[test]
    fn encode_rejects_oversize_pdu() {
        let packager = RtuPackager::new(0x01);
        let pdu = ProtocolDataUnit::new(0x10, vec![0; RTU_MAX_ADU - 3]);
        assert!(matches!(
            packager.encode(&pdu).unwrap_err(),
            ModbusError::Encode { length: 257, max: RTU_MAX_ADU }
        ));
    }

    fn read_request(function: u8, quantity: u16) -> Vec<u8> {
        let mut adu = vec![0x01, function, 0x00, 0x00];
        adu.extend_from_slice(&quantity.to_be_bytes());
        adu.extend_from_slice(&crc16(&adu).to_le_bytes());
        adu
    }

    #[test]
    fn predicted_length_covers_every_function() {
        // (request, expected response frame size)
        let cases: Vec<(Vec<u8>, usize)> = vec![
            (read_request(0x01, 1), 6),
            (read_request(0x01, 8), 6),
            (read_request(0x01, 9), 7),
            (read_request(0x01, 2000), 255),
            (read_request(0x02, 16), 7),
            (read_request(0x03, 1), 7),
            (read_request(0x03, 2), 9),
            (read_request(0x03, 125), 255),
            (read_request(0x04, 4), 13),
            (read_request(0x05, 0xFF00), 8),
            (read_request(0x06, 0x0102), 8),
            (read_request(0x0F, 10), 8),
            (read_request(0x10, 2), 8),
            (read_request(0x17, 3), 11),
            (vec![0x01, 0x16, 0x00, 0x04, 0x00, 0xF2, 0x00, 0x25, 0x66, 0x12], 10),
            // FIFO length is unknown until the response header arrives
            (vec![0x01, 0x18, 0x04, 0xDE, 0x91, 0xD6], RTU_MIN_ADU),
            // Unknown function code
            (read_request(0x41, 1), RTU_MIN_ADU),
        ];
        for (request, expected) in cases {
            assert_eq!(
                predict_response_length(&request),
                expected,
                "request {:02X?}",
                request
            );
        }
    }

    #[test]
    fn predicted_length_for_read_holding_example() {
        let request = [0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B];
        assert_eq!(predict_response_length(&request), 9);
    }

    #[test]
    fn expected_length_switches_to_exception_frame() {
        let request = read_request(0x03, 2);
        let partial = [0x01, 0x83, 0x02, 0x00];
        assert_eq!(expected_response_length(&request, &partial), 5);
    }

    #[test]
    fn expected_length_reads_fifo_byte_count_from_response() {
        let request = vec![0x01, 0x18, 0x04, 0xDE, 0x91, 0xD6];
        // Byte count 8: fifo count plus three registers
        let partial = [0x01, 0x18, 0x00, 0x08];
        assert_eq!(expected_response_length(&request, &partial), 13);
    }
}
