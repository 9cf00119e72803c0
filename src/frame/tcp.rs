use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::errors::{FrameError, ModbusError};
use crate::pdu::{ProtocolDataUnit, PDU_MAX_DATA};

use super::Packager;

/// MBAP header: transaction id, protocol id, length, unit id.
pub const TCP_HEADER_LEN: usize = 7;
/// Maximum ADU size over TCP.
pub const TCP_MAX_ADU: usize = 260;

const PROTOCOL_ID: u16 = 0x0000;

/// Packager for Modbus TCP (MBAP framing).
///
/// Cloning shares the transaction counter, so handles built from the same
/// packager never reuse a transaction id concurrently.
#[derive(Debug, Clone)]
pub struct TcpPackager {
    transaction_id: Arc<AtomicU32>,
    unit_id: u8,
}

impl TcpPackager {
    pub fn new(unit_id: u8) -> Self {
        Self {
            transaction_id: Arc::new(AtomicU32::new(0)),
            unit_id,
        }
    }

    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    fn next_transaction_id(&self) -> u16 {
        // Post-increment on a 32-bit atomic, truncated to the 16 bits the
        // header carries. Wrapping is allowed.
        self.transaction_id
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1) as u16
    }
}

impl Packager for TcpPackager {
    /// Prepends the MBAP header:
    ///
    /// ```text
    /// TID(2 BE) | PID(2 BE, =0) | LEN(2 BE) | UID(1) | FC(1) | DATA(N)
    /// ```
    ///
    /// LEN counts the bytes starting at the unit id (`1 + 1 + N`).
    fn encode(&self, pdu: &ProtocolDataUnit) -> Result<Vec<u8>, ModbusError> {
        if pdu.data.len() > PDU_MAX_DATA {
            return Err(ModbusError::Encode {
                length: TCP_HEADER_LEN + 1 + pdu.data.len(),
                max: TCP_MAX_ADU,
            });
        }
        let transaction_id = self.next_transaction_id();
        let length = (1 + 1 + pdu.data.len()) as u16;

        let mut adu = Vec::with_capacity(TCP_HEADER_LEN + 1 + pdu.data.len());
        adu.extend_from_slice(&transaction_id.to_be_bytes());
        adu.extend_from_slice(&PROTOCOL_ID.to_be_bytes());
        adu.extend_from_slice(&length.to_be_bytes());
        adu.push(self.unit_id);
        adu.push(pdu.function);
        adu.extend_from_slice(&pdu.data);
        Ok(adu)
    }

    /// Checks that transaction id, protocol id and unit id echo the request.
    fn verify(&self, adu_request: &[u8], adu_response: &[u8]) -> Result<(), ModbusError> {
        for adu in [adu_request, adu_response] {
            if adu.len() < TCP_HEADER_LEN {
                return Err(FrameError::TooShort {
                    length: adu.len(),
                    min: TCP_HEADER_LEN,
                }
                .into());
            }
        }

        let request_tid = u16::from_be_bytes([adu_request[0], adu_request[1]]);
        let response_tid = u16::from_be_bytes([adu_response[0], adu_response[1]]);
        if response_tid != request_tid {
            return Err(FrameError::TransactionIdMismatch {
                request: request_tid,
                response: response_tid,
            }
            .into());
        }

        let request_pid = u16::from_be_bytes([adu_request[2], adu_request[3]]);
        let response_pid = u16::from_be_bytes([adu_response[2], adu_response[3]]);
        if response_pid != request_pid {
            return Err(FrameError::ProtocolIdMismatch {
                request: request_pid,
                response: response_pid,
            }
            .into());
        }

        if adu_response[6] != adu_request[6] {
            return Err(FrameError::UnitIdMismatch {
                request: adu_request[6],
                response: adu_response[6],
            }
            .into());
        }
        Ok(())
    }

    /// Extracts the PDU, checking the length field against the actual size.
    fn decode(&self, adu: &[u8]) -> Result<ProtocolDataUnit, ModbusError> {
        if adu.len() < TCP_HEADER_LEN + 1 {
            return Err(FrameError::TooShort {
                length: adu.len(),
                min: TCP_HEADER_LEN + 1,
            }
            .into());
        }
        let length = u16::from_be_bytes([adu[4], adu[5]]) as usize;
        if length == 0 {
            return Err(FrameError::InvalidLengthField {
                length,
                max: TCP_MAX_ADU - TCP_HEADER_LEN + 1,
            }
            .into());
        }
        // The length field counts the unit id plus the PDU
        if adu.len() - TCP_HEADER_LEN != length - 1 {
            return Err(FrameError::SizeMismatch {
                length: adu.len() - TCP_HEADER_LEN,
                expected: length - 1,
            }
            .into());
        }
        Ok(ProtocolDataUnit::new(adu[7], adu[8..].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_increments_transaction_id() {
        let packager = TcpPackager::new(0x00);
        let pdu = ProtocolDataUnit::new(0x03, vec![0x00, 0x04, 0x00, 0x03]);

        let adu = packager.encode(&pdu).unwrap();
        let expected = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x03, 0x00, 0x04, 0x00, 0x03,
        ];
        assert_eq!(adu, expected);

        let adu = packager.encode(&pdu).unwrap();
        assert_eq!(&adu[..2], &[0x00, 0x02]);
    }

    #[test]
    fn clones_share_the_transaction_counter() {
        let packager = TcpPackager::new(0x01);
        let other = packager.clone();
        let pdu = ProtocolDataUnit::new(0x03, vec![0x00, 0x00, 0x00, 0x01]);

        let first = packager.encode(&pdu).unwrap();
        let second = other.encode(&pdu).unwrap();
        assert_eq!(&first[..2], &[0x00, 0x01]);
        assert_eq!(&second[..2], &[0x00, 0x02]);
    }

    #[test]
    fn decode_extracts_pdu() {
        let packager = TcpPackager::new(0x11);
        let adu = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x11, 0x03, 0x00, 0x78, 0x00, 0x03,
        ];
        let pdu = packager.decode(&adu).unwrap();
        assert_eq!(pdu.function, 0x03);
        assert_eq!(pdu.data, vec![0x00, 0x78, 0x00, 0x03]);
    }

    #[test]
    fn decode_rejects_length_field_mismatch() {
        let packager = TcpPackager::new(0x11);
        // Length field claims 6 but the PDU holds only 2 bytes
        let adu = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x11, 0x03, 0x00];
        let err = packager.decode(&adu).unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Frame(FrameError::SizeMismatch { length: 2, expected: 5 })
        ));
    }

    #[test]
    fn verify_checks_header_echo_fields() {
        let packager = TcpPackager::new(0x11);
        let request = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x11, 0x03, 0x00, 0x01, 0x00, 0x01];

        let mut response = request;
        response[1] = 0x02;
        assert!(matches!(
            packager.verify(&request, &response).unwrap_err(),
            ModbusError::Frame(FrameError::TransactionIdMismatch { request: 1, response: 2 })
        ));

        let mut response = request;
        response[3] = 0x01;
        assert!(matches!(
            packager.verify(&request, &response).unwrap_err(),
            ModbusError::Frame(FrameError::ProtocolIdMismatch { .. })
        ));

        let mut response = request;
        response[6] = 0x12;
        assert!(matches!(
            packager.verify(&request, &response).unwrap_err(),
            ModbusError::Frame(FrameError::UnitIdMismatch { request: 0x11, response: 0x12 })
        ));

        assert!(packager.verify(&request, &request).is_ok());
    }

    #[test]
    fn round_trip_preserves_pdu_and_unit_id() {
        let packager = TcpPackager::new(0x2A);
        let pdu = ProtocolDataUnit::new(0x10, vec![0x00, 0x10, 0x00, 0x02, 0x04, 1, 2, 3, 4]);
        let adu = packager.encode(&pdu).unwrap();
        assert_eq!(adu[6], 0x2A);
        assert_eq!(packager.decode(&adu).unwrap(), pdu);
    }

    #[test]
    fn encode_rejects_oversize_pdu() {
        let packager = TcpPackager::new(0xFF);
        let pdu = ProtocolDataUnit::new(0x10, vec![0; PDU_MAX_DATA + 1]);
        assert!(matches!(
            packager.encode(&pdu).unwrap_err(),
            ModbusError::Encode { .. }
        ));
    }
}
