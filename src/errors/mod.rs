mod exception;
mod frame;
mod io_operation;
mod modbus;
mod protocol;
mod request;
mod transport;

pub use exception::{ExceptionCode, ModbusException};
pub use frame::FrameError;
pub use io_operation::IoOperation;
pub use modbus::ModbusError;
pub use protocol::ProtocolError;
pub use request::InvalidRequest;
pub use transport::TransportError;
