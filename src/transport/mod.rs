mod ascii_tcp;
mod net;
mod rtu_tcp;
mod serial;
mod tcp;
mod udp;

pub use ascii_tcp::AsciiOverTcpTransport;
pub use rtu_tcp::RtuOverTcpTransport;
pub use serial::{AsciiSerialTransport, RtuSerialTransport, SerialPort, SystemPort};
pub use tcp::TcpTransport;
pub use udp::UdpTransport;

use async_trait::async_trait;

use crate::errors::ModbusError;

/// Per-transport byte channel. Owns the connection, performs exactly one
/// request/response exchange per `send`, and applies the configured
/// timeouts.
///
/// `connect` and `close` are optional: `send` connects lazily and the idle
/// timer closes on its own. Both are safe to call at any time; `close` is
/// idempotent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError>;
    async fn connect(&self) -> Result<(), ModbusError>;
    async fn close(&self) -> Result<(), ModbusError>;
}
