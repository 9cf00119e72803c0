mod serial;
mod tcp;
mod types;

pub use serial::Config as SerialConfig;
pub use tcp::Config as TcpConfig;
pub use types::{DataBits, Parity, StopBits};
