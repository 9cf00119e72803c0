pub mod checksum;
pub mod client;
pub mod config;
pub mod device_id;
pub mod errors;
pub mod frame;
pub mod handle;
pub mod pdu;
pub mod transport;

pub use client::Client;
pub use config::{DataBits, Parity, SerialConfig, StopBits, TcpConfig};
pub use device_id::DeviceIdentification;
pub use errors::{
    ExceptionCode, FrameError, InvalidRequest, IoOperation, ModbusError, ModbusException,
    ProtocolError, TransportError,
};
pub use frame::{AsciiPackager, Packager, RtuPackager, TcpPackager};
pub use handle::{
    AsciiHandle, AsciiOverTcpHandle, AsciiUdpHandle, RtuHandle, RtuOverTcpHandle, TcpHandle,
};
pub use pdu::ProtocolDataUnit;
pub use transport::{
    AsciiOverTcpTransport, AsciiSerialTransport, RtuOverTcpTransport, RtuSerialTransport,
    SerialPort, SystemPort, TcpTransport, Transport, UdpTransport,
};
