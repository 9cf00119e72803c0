use crate::device_id::{parse_device_identification, DeviceIdentification};
use crate::errors::{InvalidRequest, ModbusError, ModbusException, ProtocolError};
use crate::frame::Packager;
use crate::pdu::{
    ProtocolDataUnit, FUNC_ENCAPSULATED_INTERFACE, FUNC_MASK_WRITE_REGISTER, FUNC_READ_COILS,
    FUNC_READ_DISCRETE_INPUTS, FUNC_READ_FIFO_QUEUE, FUNC_READ_HOLDING_REGISTERS,
    FUNC_READ_INPUT_REGISTERS, FUNC_READ_WRITE_MULTIPLE_REGISTERS, FUNC_WRITE_MULTIPLE_COILS,
    FUNC_WRITE_MULTIPLE_REGISTERS, FUNC_WRITE_SINGLE_COIL, FUNC_WRITE_SINGLE_REGISTER,
    MEI_TYPE_DEVICE_IDENTIFICATION,
};
use crate::transport::Transport;

const MAX_READ_BITS: u16 = 2000;
const MAX_READ_REGISTERS: u16 = 125;
const MAX_WRITE_BITS: u16 = 1968;
const MAX_WRITE_REGISTERS: u16 = 123;
const MAX_RW_WRITE_REGISTERS: u16 = 121;
const MAX_FIFO_COUNT: u16 = 31;

const COIL_ON: u16 = 0xFF00;
const COIL_OFF: u16 = 0x0000;

/// Modbus client: builds request PDUs, runs them through a packager and a
/// transport, and validates the responses.
///
/// One request is in flight at a time; concurrent calls on the same client
/// serialize on the transport's connection lock. Validation failures are
/// reported before any I/O happens.
pub struct Client {
    packager: Box<dyn Packager>,
    transport: Box<dyn Transport>,
}

impl Client {
    pub fn new(
        packager: impl Packager + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            packager: Box::new(packager),
            transport: Box::new(transport),
        }
    }

    /// Opens the underlying connection ahead of the first request.
    pub async fn connect(&self) -> Result<(), ModbusError> {
        self.transport.connect().await
    }

    /// Closes the underlying connection. The next request reconnects.
    pub async fn close(&self) -> Result<(), ModbusError> {
        self.transport.close().await
    }

    /// Reads coil states (0x01). Returns the bit-packed coil bytes.
    pub async fn read_coils(&self, address: u16, quantity: u16) -> Result<Vec<u8>, ModbusError> {
        check_quantity(quantity, MAX_READ_BITS)?;
        let request = ProtocolDataUnit::new(FUNC_READ_COILS, data_block(&[address, quantity]));
        let response = self.send(&request).await?;
        read_payload(&response.data)
    }

    /// Reads discrete input states (0x02). Returns the bit-packed bytes.
    pub async fn read_discrete_inputs(
        &self,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u8>, ModbusError> {
        check_quantity(quantity, MAX_READ_BITS)?;
        let request =
            ProtocolDataUnit::new(FUNC_READ_DISCRETE_INPUTS, data_block(&[address, quantity]));
        let response = self.send(&request).await?;
        read_payload(&response.data)
    }

    /// Reads holding registers (0x03). Returns the register bytes, two per
    /// register, big-endian.
    pub async fn read_holding_registers(
        &self,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u8>, ModbusError> {
        check_quantity(quantity, MAX_READ_REGISTERS)?;
        let request =
            ProtocolDataUnit::new(FUNC_READ_HOLDING_REGISTERS, data_block(&[address, quantity]));
        let response = self.send(&request).await?;
        read_payload(&response.data)
    }

    /// Reads input registers (0x04).
    pub async fn read_input_registers(
        &self,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u8>, ModbusError> {
        check_quantity(quantity, MAX_READ_REGISTERS)?;
        let request =
            ProtocolDataUnit::new(FUNC_READ_INPUT_REGISTERS, data_block(&[address, quantity]));
        let response = self.send(&request).await?;
        read_payload(&response.data)
    }

    /// Writes a single coil (0x05). `value` must be 0xFF00 (ON) or 0x0000
    /// (OFF); the device echoes address and value.
    pub async fn write_single_coil(&self, address: u16, value: u16) -> Result<(), ModbusError> {
        if value != COIL_ON && value != COIL_OFF {
            return Err(InvalidRequest::InvalidCoilValue { value }.into());
        }
        let request = ProtocolDataUnit::new(FUNC_WRITE_SINGLE_COIL, data_block(&[address, value]));
        let response = self.send(&request).await?;
        check_write_echo(&response.data, address, value, EchoKind::Value)
    }

    /// Writes a single holding register (0x06).
    pub async fn write_single_register(
        &self,
        address: u16,
        value: u16,
    ) -> Result<(), ModbusError> {
        let request =
            ProtocolDataUnit::new(FUNC_WRITE_SINGLE_REGISTER, data_block(&[address, value]));
        let response = self.send(&request).await?;
        check_write_echo(&response.data, address, value, EchoKind::Value)
    }

    /// Writes multiple coils (0x0F) from bit-packed bytes.
    pub async fn write_multiple_coils(
        &self,
        address: u16,
        quantity: u16,
        values: &[u8],
    ) -> Result<(), ModbusError> {
        check_quantity(quantity, MAX_WRITE_BITS)?;
        check_payload_len(values, (quantity as usize).div_ceil(8), quantity)?;
        let request = ProtocolDataUnit::new(
            FUNC_WRITE_MULTIPLE_COILS,
            data_block_suffix(values, &[address, quantity]),
        );
        let response = self.send(&request).await?;
        check_write_echo(&response.data, address, quantity, EchoKind::Quantity)
    }

    /// Writes multiple holding registers (0x10) from big-endian register
    /// bytes.
    pub async fn write_multiple_registers(
        &self,
        address: u16,
        quantity: u16,
        values: &[u8],
    ) -> Result<(), ModbusError> {
        check_quantity(quantity, MAX_WRITE_REGISTERS)?;
        check_payload_len(values, 2 * quantity as usize, quantity)?;
        let request = ProtocolDataUnit::new(
            FUNC_WRITE_MULTIPLE_REGISTERS,
            data_block_suffix(values, &[address, quantity]),
        );
        let response = self.send(&request).await?;
        check_write_echo(&response.data, address, quantity, EchoKind::Quantity)
    }

    /// Combined read/write (0x17): writes `values` first, then returns the
    /// read register bytes.
    pub async fn read_write_multiple_registers(
        &self,
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        write_quantity: u16,
        values: &[u8],
    ) -> Result<Vec<u8>, ModbusError> {
        check_quantity(read_quantity, MAX_READ_REGISTERS)?;
        check_quantity(write_quantity, MAX_RW_WRITE_REGISTERS)?;
        check_payload_len(values, 2 * write_quantity as usize, write_quantity)?;
        let request = ProtocolDataUnit::new(
            FUNC_READ_WRITE_MULTIPLE_REGISTERS,
            data_block_suffix(
                values,
                &[read_address, read_quantity, write_address, write_quantity],
            ),
        );
        let response = self.send(&request).await?;
        read_payload(&response.data)
    }

    /// Masked register update (0x16): the device applies
    /// `(current AND and_mask) OR (or_mask AND NOT and_mask)` and echoes
    /// address and both masks.
    pub async fn mask_write_register(
        &self,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> Result<(), ModbusError> {
        let request = ProtocolDataUnit::new(
            FUNC_MASK_WRITE_REGISTER,
            data_block(&[address, and_mask, or_mask]),
        );
        let response = self.send(&request).await?;

        let data = &response.data;
        if data.len() != 6 {
            return Err(ProtocolError::FixedLengthMismatch {
                length: data.len(),
                expected: 6,
            }
            .into());
        }
        let response_address = u16::from_be_bytes([data[0], data[1]]);
        if response_address != address {
            return Err(ProtocolError::AddressMismatch {
                request: address,
                response: response_address,
            }
            .into());
        }
        let response_and = u16::from_be_bytes([data[2], data[3]]);
        if response_and != and_mask {
            return Err(ProtocolError::AndMaskMismatch {
                request: and_mask,
                response: response_and,
            }
            .into());
        }
        let response_or = u16::from_be_bytes([data[4], data[5]]);
        if response_or != or_mask {
            return Err(ProtocolError::OrMaskMismatch {
                request: or_mask,
                response: response_or,
            }
            .into());
        }
        Ok(())
    }

    /// Reads a FIFO queue (0x18). Returns the queued register bytes, oldest
    /// first.
    pub async fn read_fifo_queue(&self, address: u16) -> Result<Vec<u8>, ModbusError> {
        let request = ProtocolDataUnit::new(FUNC_READ_FIFO_QUEUE, data_block(&[address]));
        let response = self.send(&request).await?;

        let data = &response.data;
        if data.len() < 4 {
            return Err(ProtocolError::FixedLengthMismatch {
                length: data.len(),
                expected: 4,
            }
            .into());
        }
        let byte_count = u16::from_be_bytes([data[0], data[1]]) as usize;
        if byte_count != data.len() - 1 {
            return Err(ProtocolError::ByteCountMismatch {
                count: byte_count,
                length: data.len() - 1,
            }
            .into());
        }
        let fifo_count = u16::from_be_bytes([data[2], data[3]]);
        if fifo_count > MAX_FIFO_COUNT {
            return Err(ProtocolError::FifoCountExceeded {
                count: fifo_count,
                max: MAX_FIFO_COUNT,
            }
            .into());
        }
        Ok(data[4..].to_vec())
    }

    /// Reads device identification (0x2B / MEI 0x0E) and decodes the object
    /// list into a typed record.
    pub async fn read_device_identification(
        &self,
        dev_id_code: u8,
        object_id: u8,
    ) -> Result<DeviceIdentification, ModbusError> {
        let request = ProtocolDataUnit::new(
            FUNC_ENCAPSULATED_INTERFACE,
            vec![MEI_TYPE_DEVICE_IDENTIFICATION, dev_id_code, object_id],
        );
        let response = self.send(&request).await?;

        // MEI type, device id code, conformity level, more-follows, next
        // object id and the object count precede the object list
        if response.data.len() < 6 {
            return Err(ProtocolError::DeviceIdTooShort {
                length: response.data.len(),
                min: 6,
            }
            .into());
        }
        Ok(parse_device_identification(&response.data[5..]))
    }

    /// Runs one exchange: encode, send, verify, decode, then surface a
    /// device exception if the echoed function code carries the flag.
    async fn send(&self, request: &ProtocolDataUnit) -> Result<ProtocolDataUnit, ModbusError> {
        let adu_request = self.packager.encode(request)?;
        let adu_response = self.transport.send(&adu_request).await?;
        self.packager.verify(&adu_request, &adu_response)?;
        let response = self.packager.decode(&adu_response)?;

        if response.function != request.function {
            let code = response.data.first().copied().unwrap_or(0);
            return Err(ModbusException::new(response.function, code).into());
        }
        if response.data.is_empty() {
            return Err(ProtocolError::EmptyResponse.into());
        }
        Ok(response)
    }
}

fn check_quantity(quantity: u16, max: u16) -> Result<(), InvalidRequest> {
    if quantity < 1 || quantity > max {
        return Err(InvalidRequest::QuantityOutOfRange {
            quantity,
            min: 1,
            max,
        });
    }
    Ok(())
}

fn check_payload_len(values: &[u8], expected: usize, quantity: u16) -> Result<(), InvalidRequest> {
    if values.len() != expected {
        return Err(InvalidRequest::PayloadSizeMismatch {
            length: values.len(),
            quantity,
        });
    }
    Ok(())
}

/// Validates the byte-count prefix of a read response and strips it.
fn read_payload(data: &[u8]) -> Result<Vec<u8>, ModbusError> {
    let count = data[0] as usize;
    if count != data.len() - 1 {
        return Err(ProtocolError::ByteCountMismatch {
            count,
            length: data.len() - 1,
        }
        .into());
    }
    Ok(data[1..].to_vec())
}

enum EchoKind {
    Value,
    Quantity,
}

/// Validates the 4-byte echo of the single- and multi-write functions.
fn check_write_echo(
    data: &[u8],
    address: u16,
    second: u16,
    kind: EchoKind,
) -> Result<(), ModbusError> {
    if data.len() != 4 {
        return Err(ProtocolError::FixedLengthMismatch {
            length: data.len(),
            expected: 4,
        }
        .into());
    }
    let response_address = u16::from_be_bytes([data[0], data[1]]);
    if response_address != address {
        return Err(ProtocolError::AddressMismatch {
            request: address,
            response: response_address,
        }
        .into());
    }
    let response_second = u16::from_be_bytes([data[2], data[3]]);
    if response_second != second {
        return Err(match kind {
            EchoKind::Value => ProtocolError::ValueMismatch {
                request: second,
                response: response_second,
            },
            EchoKind::Quantity => ProtocolError::QuantityMismatch {
                request: second,
                response: response_second,
            },
        }
        .into());
    }
    Ok(())
}

/// Lays out `values` as consecutive big-endian 16-bit fields.
fn data_block(values: &[u16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(2 * values.len());
    for value in values {
        data.extend_from_slice(&value.to_be_bytes());
    }
    data
}

/// Like [`data_block`], followed by a length-prefixed byte payload, as the
/// multi-write functions expect.
fn data_block_suffix(suffix: &[u8], values: &[u16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(2 * values.len() + 1 + suffix.len());
    for value in values {
        data.extend_from_slice(&value.to_be_bytes());
    }
    data.push(suffix.len() as u8);
    data.extend_from_slice(suffix);
    data
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::errors::{ExceptionCode, FrameError};
    use crate::frame::TcpPackager;

    use super::*;

    /// Transport stub that answers from a script of response PDUs, wrapping
    /// them in MBAP frames echoing the request header. Holds its lock for
    /// the whole exchange, as the real transports do, and asserts that only
    /// one send is in flight at a time.
    struct StubTransport {
        responses: Mutex<Vec<Vec<u8>>>,
        in_flight: AtomicUsize,
    }

    impl StubTransport {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
            let mut responses = self.responses.lock().await;
            assert_eq!(
                self.in_flight.fetch_add(1, Ordering::SeqCst),
                0,
                "send must be single-flight"
            );
            tokio::task::yield_now().await;
            assert!(!responses.is_empty(), "unexpected request");
            let pdu = responses.remove(0);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let mut adu = Vec::with_capacity(7 + pdu.len());
            adu.extend_from_slice(&adu_request[..4]);
            adu.extend_from_slice(&((1 + pdu.len()) as u16).to_be_bytes());
            adu.push(adu_request[6]);
            adu.extend_from_slice(&pdu);
            Ok(adu)
        }

        async fn connect(&self) -> Result<(), ModbusError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), ModbusError> {
            Ok(())
        }
    }

    fn stub_client(responses: Vec<Vec<u8>>) -> Client {
        Client::new(TcpPackager::new(0xFF), StubTransport::new(responses))
    }

    #[tokio::test]
    async fn read_holding_registers_strips_byte_count() {
        let client = stub_client(vec![vec![0x03, 0x04, 0x00, 0x2A, 0x00, 0x2B]]);
        let registers = client.read_holding_registers(0, 2).await.unwrap();
        assert_eq!(registers, vec![0x00, 0x2A, 0x00, 0x2B]);
    }

    #[tokio::test]
    async fn read_rejects_byte_count_mismatch() {
        let client = stub_client(vec![vec![0x03, 0x06, 0x00, 0x2A, 0x00, 0x2B]]);
        let err = client.read_holding_registers(0, 2).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::ByteCountMismatch { count: 6, length: 4 })
        ));
    }

    #[tokio::test]
    async fn quantity_guards_reject_at_boundaries_without_io() {
        let client = stub_client(vec![]);

        for (low, high) in [(0u16, 2001u16)] {
            assert!(client.read_coils(0, low).await.is_err());
            assert!(client.read_coils(0, high).await.is_err());
            assert!(client.read_discrete_inputs(0, low).await.is_err());
            assert!(client.read_discrete_inputs(0, high).await.is_err());
        }
        assert!(client.read_holding_registers(0, 0).await.is_err());
        assert!(client.read_holding_registers(0, 126).await.is_err());
        assert!(client.read_input_registers(0, 0).await.is_err());
        assert!(client.read_input_registers(0, 126).await.is_err());
        assert!(client.write_multiple_coils(0, 0, &[]).await.is_err());
        assert!(client
            .write_multiple_coils(0, 1969, &[0; 247])
            .await
            .is_err());
        assert!(client.write_multiple_registers(0, 0, &[]).await.is_err());
        assert!(client
            .write_multiple_registers(0, 124, &[0; 248])
            .await
            .is_err());
        assert!(client
            .read_write_multiple_registers(0, 0, 0, 1, &[0; 2])
            .await
            .is_err());
        assert!(client
            .read_write_multiple_registers(0, 126, 0, 1, &[0; 2])
            .await
            .is_err());
        assert!(client
            .read_write_multiple_registers(0, 1, 0, 0, &[])
            .await
            .is_err());
        assert!(client
            .read_write_multiple_registers(0, 1, 0, 122, &[0; 244])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn write_single_coil_accepts_only_on_and_off() {
        let client = stub_client(vec![]);
        for value in [0x0001, 0x00FF, 0xFF01, 0x1234] {
            let err = client.write_single_coil(0x00AC, value).await.unwrap_err();
            assert!(matches!(
                err,
                ModbusError::InvalidRequest(InvalidRequest::InvalidCoilValue { .. })
            ));
        }
    }

    #[tokio::test]
    async fn write_single_coil_checks_echo() {
        let client = stub_client(vec![
            vec![0x05, 0x00, 0xAC, 0xFF, 0x00],
            vec![0x05, 0x00, 0xAD, 0xFF, 0x00],
            vec![0x05, 0x00, 0xAC, 0x00, 0x00],
        ]);
        client.write_single_coil(0x00AC, 0xFF00).await.unwrap();

        let err = client.write_single_coil(0x00AC, 0xFF00).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::AddressMismatch { .. })
        ));

        let err = client.write_single_coil(0x00AC, 0xFF00).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::ValueMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn write_multiple_registers_checks_quantity_echo() {
        let client = stub_client(vec![
            vec![0x10, 0x00, 0x10, 0x00, 0x02],
            vec![0x10, 0x00, 0x10, 0x00, 0x03],
        ]);
        client
            .write_multiple_registers(0x0010, 2, &[0x00, 0x01, 0x00, 0x02])
            .await
            .unwrap();

        let err = client
            .write_multiple_registers(0x0010, 2, &[0x00, 0x01, 0x00, 0x02])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::QuantityMismatch { request: 2, response: 3 })
        ));
    }

    #[tokio::test]
    async fn mask_write_checks_all_three_echo_fields() {
        let client = stub_client(vec![
            vec![0x16, 0x00, 0x04, 0x00, 0xF2, 0x00, 0x25],
            vec![0x16, 0x00, 0x04, 0x00, 0xF3, 0x00, 0x25],
            vec![0x16, 0x00, 0x04, 0x00, 0xF2, 0x00, 0x26],
        ]);
        client.mask_write_register(0x0004, 0x00F2, 0x0025).await.unwrap();

        let err = client
            .mask_write_register(0x0004, 0x00F2, 0x0025)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::AndMaskMismatch { .. })
        ));

        let err = client
            .mask_write_register(0x0004, 0x00F2, 0x0025)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::OrMaskMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn read_fifo_queue_validates_counts() {
        // Byte count 7 = fifo count field (2) + count echo (2) + 2 registers ... matches len-1
        let client = stub_client(vec![
            vec![0x18, 0x00, 0x07, 0x00, 0x02, 0x01, 0xB8, 0x12, 0x84],
            vec![0x18, 0x00, 0x07, 0x00, 0x20, 0x01, 0xB8, 0x12, 0x84],
        ]);
        let values = client.read_fifo_queue(0x04DE).await.unwrap();
        assert_eq!(values, vec![0x01, 0xB8, 0x12, 0x84]);

        let err = client.read_fifo_queue(0x04DE).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::FifoCountExceeded { count: 32, max: 31 })
        ));
    }

    #[tokio::test]
    async fn exception_response_surfaces_function_and_code() {
        let client = stub_client(vec![vec![0x83, 0x02]]);
        let err = client.read_holding_registers(0x0100, 1).await.unwrap_err();
        match err {
            ModbusError::Exception(e) => {
                assert_eq!(e.function, 0x03);
                assert_eq!(e.exception, ExceptionCode::IllegalDataAddress);
            }
            other => panic!("expected exception, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_response_data_is_a_protocol_error() {
        let client = stub_client(vec![vec![0x03]]);
        let err = client.read_holding_registers(0, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn verify_failure_is_reported_before_decode() {
        struct WrongUnitTransport;

        #[async_trait]
        impl Transport for WrongUnitTransport {
            async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
                let mut adu = adu_request.to_vec();
                adu[6] ^= 0xFF;
                Ok(adu)
            }
            async fn connect(&self) -> Result<(), ModbusError> {
                Ok(())
            }
            async fn close(&self) -> Result<(), ModbusError> {
                Ok(())
            }
        }

        let client = Client::new(TcpPackager::new(0x11), WrongUnitTransport);
        let err = client.read_holding_registers(0, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Frame(FrameError::UnitIdMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_requests_on_one_client_serialize() {
        let responses = (0..8)
            .map(|_| vec![0x03, 0x02, 0x00, 0x2A])
            .collect::<Vec<_>>();
        let client = Arc::new(stub_client(responses));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = Arc::clone(&client);
            handles.push(tokio::spawn(async move {
                client.read_holding_registers(0, 1).await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn device_identification_is_parsed_from_objects() {
        let mut pdu = vec![0x2B, 0x0E, 0x01, 0x01, 0x00, 0x00, 0x03];
        for (id, value) in [(0u8, "Vendor"), (1, "PC-1"), (2, "v2.1")] {
            pdu.push(id);
            pdu.push(value.len() as u8);
            pdu.extend_from_slice(value.as_bytes());
        }
        let client = stub_client(vec![pdu]);

        let identification = client.read_device_identification(0x01, 0x00).await.unwrap();
        assert_eq!(identification.vendor_name, "Vendor");
        assert_eq!(identification.product_code, "PC-1");
        assert_eq!(identification.major_minor_revision, "v2.1");
        assert!(identification.vendor_url.is_none());
    }

    #[tokio::test]
    async fn undersized_device_identification_is_rejected() {
        let client = stub_client(vec![vec![0x2B, 0x0E, 0x01, 0x01]]);
        let err = client.read_device_identification(0x01, 0x00).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::DeviceIdTooShort { length: 3, min: 6 })
        ));
    }
}
