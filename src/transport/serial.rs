use std::io::{Read, Write};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, trace};

use crate::config::SerialConfig;
use crate::errors::{IoOperation, ModbusError, TransportError};
use crate::frame::{
    ascii_frame_complete, rtu_expected_response_length, ASCII_MAX_ADU, RTU_MAX_ADU, RTU_MIN_ADU,
};

use super::Transport;

/// How long a single port read may block before the loop re-checks its
/// deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Minimal byte-stream contract the Modbus core needs from a serial port.
/// Platform specifics stay behind this seam; [`SystemPort`] is the default
/// implementation.
pub trait SerialPort: Send {
    /// Opens the device and applies the whole line configuration in one
    /// step.
    fn open(&mut self, config: &SerialConfig) -> Result<(), TransportError>;
    fn close(&mut self) -> Result<(), TransportError>;
    fn is_connected(&self) -> bool;
    /// Reads whatever is available, up to the timeout configured on open.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;
}

/// Serial port backed by the `serialport` crate.
#[derive(Default)]
pub struct SystemPort {
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SystemPort {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SerialPort for SystemPort {
    fn open(&mut self, config: &SerialConfig) -> Result<(), TransportError> {
        info!("opening serial port {}", config.port_info());
        let port = serialport::new(&config.device, config.baud_rate)
            .data_bits(config.data_bits.into())
            .parity(config.parity.into())
            .stop_bits(config.stop_bits.into())
            .timeout(POLL_INTERVAL)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|source| TransportError::serial(&config.device, source))?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.port.take();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.port.as_mut() {
            Some(port) => port.read(buf),
            None => Err(std::io::ErrorKind::NotConnected.into()),
        }
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.port.as_mut() {
            Some(port) => port.write(buf),
            None => Err(std::io::ErrorKind::NotConnected.into()),
        }
    }
}

fn write_full(port: &mut dyn SerialPort, buf: &[u8]) -> Result<(), TransportError> {
    let mut written = 0;
    while written < buf.len() {
        match port.write(&buf[written..]) {
            Ok(0) => {
                return Err(TransportError::ShortWrite {
                    written,
                    expected: buf.len(),
                })
            }
            Ok(n) => written += n,
            Err(e) => return Err(TransportError::io(IoOperation::Write, e)),
        }
    }
    Ok(())
}

fn retriable(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

/// Transport for Modbus RTU over a serial line.
///
/// The read loop first collects the 4-byte minimum frame, refines the
/// expected length from the request (switching to the 5-byte exception
/// frame when the function code comes back flagged) and keeps reading until
/// the frame is complete or the deadline passes.
pub struct RtuSerialTransport {
    config: SerialConfig,
    port: Mutex<Box<dyn SerialPort>>,
}

impl RtuSerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self::with_port(config, Box::new(SystemPort::new()))
    }

    /// Builds the transport on a caller-supplied port implementation.
    pub fn with_port(config: SerialConfig, port: Box<dyn SerialPort>) -> Self {
        Self {
            config,
            port: Mutex::new(port),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.port.lock().await.is_connected()
    }
}

#[async_trait]
impl Transport for RtuSerialTransport {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
        let mut port = self.port.lock().await;
        if !port.is_connected() {
            self.config.validate()?;
            port.open(&self.config)?;
        }
        if self.config.trace_frames {
            trace!("sending {:02X?}", adu_request);
        }
        write_full(&mut **port, adu_request)?;

        let deadline = Instant::now() + self.config.read_timeout;
        let mut buf = [0u8; RTU_MAX_ADU];
        let mut total = 0;
        let mut expected = RTU_MIN_ADU;
        loop {
            match port.read(&mut buf[total..expected]) {
                Ok(0) => {}
                Ok(n) => {
                    total += n;
                    if total >= RTU_MIN_ADU {
                        expected = rtu_expected_response_length(adu_request, &buf[..total])
                            .clamp(total, RTU_MAX_ADU);
                    }
                    if total >= expected {
                        break;
                    }
                }
                Err(e) if retriable(&e) => {}
                Err(e) => {
                    port.close()?;
                    return Err(TransportError::io(IoOperation::Read, e).into());
                }
            }
            if Instant::now() >= deadline {
                if total == 0 {
                    return Err(TransportError::NoResponse.into());
                }
                return Err(TransportError::timeout(
                    IoOperation::Read,
                    self.config.read_timeout,
                )
                .into());
            }
            tokio::task::yield_now().await;
        }

        let adu = buf[..total].to_vec();
        if self.config.trace_frames {
            trace!("received {:02X?}", adu);
        }
        Ok(adu)
    }

    async fn connect(&self) -> Result<(), ModbusError> {
        let mut port = self.port.lock().await;
        if !port.is_connected() {
            self.config.validate()?;
            port.open(&self.config)?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), ModbusError> {
        Ok(self.port.lock().await.close()?)
    }
}

/// Transport for Modbus ASCII over a serial line. Accumulates chunks until
/// the CRLF terminator arrives, the buffer fills up or the deadline passes.
pub struct AsciiSerialTransport {
    config: SerialConfig,
    port: Mutex<Box<dyn SerialPort>>,
}

impl AsciiSerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self::with_port(config, Box::new(SystemPort::new()))
    }

    pub fn with_port(config: SerialConfig, port: Box<dyn SerialPort>) -> Self {
        Self {
            config,
            port: Mutex::new(port),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.port.lock().await.is_connected()
    }
}

#[async_trait]
impl Transport for AsciiSerialTransport {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
        let mut port = self.port.lock().await;
        if !port.is_connected() {
            self.config.validate()?;
            port.open(&self.config)?;
        }
        if self.config.trace_frames {
            trace!("sending {:?}", String::from_utf8_lossy(adu_request));
        }
        write_full(&mut **port, adu_request)?;

        let deadline = Instant::now() + self.config.read_timeout;
        let mut buf = [0u8; ASCII_MAX_ADU];
        let mut length = 0;
        loop {
            match port.read(&mut buf[length..]) {
                Ok(0) => {}
                Ok(n) => {
                    length += n;
                    if length >= ASCII_MAX_ADU || ascii_frame_complete(&buf[..length]) {
                        break;
                    }
                }
                Err(e) if retriable(&e) => {}
                Err(e) => {
                    port.close()?;
                    return Err(TransportError::io(IoOperation::Read, e).into());
                }
            }
            if Instant::now() >= deadline {
                if length == 0 {
                    return Err(TransportError::NoResponse.into());
                }
                return Err(TransportError::timeout(
                    IoOperation::Read,
                    self.config.read_timeout,
                )
                .into());
            }
            tokio::task::yield_now().await;
        }

        let adu = buf[..length].to_vec();
        if self.config.trace_frames {
            trace!("received {:?}", String::from_utf8_lossy(&adu));
        }
        Ok(adu)
    }

    async fn connect(&self) -> Result<(), ModbusError> {
        let mut port = self.port.lock().await;
        if !port.is_connected() {
            self.config.validate()?;
            port.open(&self.config)?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), ModbusError> {
        Ok(self.port.lock().await.close()?)
    }
}
