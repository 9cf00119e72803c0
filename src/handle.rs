use crate::client::Client;
use crate::config::{SerialConfig, TcpConfig};
use crate::frame::{AsciiPackager, RtuPackager, TcpPackager};
use crate::transport::{
    AsciiOverTcpTransport, AsciiSerialTransport, RtuOverTcpTransport, RtuSerialTransport,
    TcpTransport, UdpTransport,
};

/// Packager and transport for plain Modbus TCP.
pub struct TcpHandle {
    pub packager: TcpPackager,
    pub transport: TcpTransport,
}

impl TcpHandle {
    pub fn new(config: TcpConfig) -> Self {
        Self {
            packager: TcpPackager::new(config.unit_id),
            transport: TcpTransport::new(config),
        }
    }

    pub fn into_client(self) -> Client {
        Client::new(self.packager, self.transport)
    }
}

/// Packager and transport for RTU frames tunneled over TCP.
pub struct RtuOverTcpHandle {
    pub packager: RtuPackager,
    pub transport: RtuOverTcpTransport,
}

impl RtuOverTcpHandle {
    pub fn new(config: TcpConfig, slave_id: u8) -> Self {
        Self {
            packager: RtuPackager::new(slave_id),
            transport: RtuOverTcpTransport::new(config),
        }
    }

    pub fn into_client(self) -> Client {
        Client::new(self.packager, self.transport)
    }
}

/// Packager and transport for ASCII frames tunneled over TCP.
pub struct AsciiOverTcpHandle {
    pub packager: AsciiPackager,
    pub transport: AsciiOverTcpTransport,
}

impl AsciiOverTcpHandle {
    pub fn new(config: TcpConfig, slave_id: u8) -> Self {
        Self {
            packager: AsciiPackager::new(slave_id),
            transport: AsciiOverTcpTransport::new(config),
        }
    }

    pub fn into_client(self) -> Client {
        Client::new(self.packager, self.transport)
    }
}

/// Packager and transport for ASCII frames carried in UDP datagrams.
pub struct AsciiUdpHandle {
    pub packager: AsciiPackager,
    pub transport: UdpTransport,
}

impl AsciiUdpHandle {
    pub fn new(config: TcpConfig, slave_id: u8) -> Self {
        Self {
            packager: AsciiPackager::new(slave_id),
            transport: UdpTransport::new(config),
        }
    }

    pub fn into_client(self) -> Client {
        Client::new(self.packager, self.transport)
    }
}

/// Packager and transport for Modbus RTU on a serial line.
pub struct RtuHandle {
    pub packager: RtuPackager,
    pub transport: RtuSerialTransport,
}

impl RtuHandle {
    pub fn new(config: SerialConfig) -> Self {
        Self {
            packager: RtuPackager::new(config.slave_id),
            transport: RtuSerialTransport::new(config),
        }
    }

    pub fn into_client(self) -> Client {
        Client::new(self.packager, self.transport)
    }
}

/// Packager and transport for Modbus ASCII on a serial line.
pub struct AsciiHandle {
    pub packager: AsciiPackager,
    pub transport: AsciiSerialTransport,
}

impl AsciiHandle {
    pub fn new(config: SerialConfig) -> Self {
        Self {
            packager: AsciiPackager::new(config.slave_id),
            transport: AsciiSerialTransport::new(config),
        }
    }

    pub fn into_client(self) -> Client {
        Client::new(self.packager, self.transport)
    }
}
