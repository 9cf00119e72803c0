use thiserror::Error;

/// Exception codes a device may return in an exception response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    ServerDeviceFailure,
    Acknowledge,
    ServerDeviceBusy,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetDeviceFailedToRespond,
    Unknown(u8),
}

impl ExceptionCode {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::IllegalFunction,
            0x02 => Self::IllegalDataAddress,
            0x03 => Self::IllegalDataValue,
            0x04 => Self::ServerDeviceFailure,
            0x05 => Self::Acknowledge,
            0x06 => Self::ServerDeviceBusy,
            0x08 => Self::MemoryParityError,
            0x0A => Self::GatewayPathUnavailable,
            0x0B => Self::GatewayTargetDeviceFailedToRespond,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::IllegalFunction => 0x01,
            Self::IllegalDataAddress => 0x02,
            Self::IllegalDataValue => 0x03,
            Self::ServerDeviceFailure => 0x04,
            Self::Acknowledge => 0x05,
            Self::ServerDeviceBusy => 0x06,
            Self::MemoryParityError => 0x08,
            Self::GatewayPathUnavailable => 0x0A,
            Self::GatewayTargetDeviceFailedToRespond => 0x0B,
            Self::Unknown(other) => *other,
        }
    }
}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalFunction => write!(f, "illegal function"),
            Self::IllegalDataAddress => write!(f, "illegal data address"),
            Self::IllegalDataValue => write!(f, "illegal data value"),
            Self::ServerDeviceFailure => write!(f, "server device failure"),
            Self::Acknowledge => write!(f, "acknowledge"),
            Self::ServerDeviceBusy => write!(f, "server device busy"),
            Self::MemoryParityError => write!(f, "memory parity error"),
            Self::GatewayPathUnavailable => write!(f, "gateway path unavailable"),
            Self::GatewayTargetDeviceFailedToRespond => {
                write!(f, "gateway target device failed to respond")
            }
            Self::Unknown(code) => write!(f, "unknown exception code {:#04X}", code),
        }
    }
}

/// Exception response returned by a device: the request function code plus
/// the exception code carried in the first data byte.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("modbus exception for function {function:#04X}: {exception} ({code:#04X})", code = .exception.code())]
pub struct ModbusException {
    pub function: u8,
    pub exception: ExceptionCode,
}

impl ModbusException {
    /// Builds the exception from an exception-flagged response PDU. The
    /// reported function code is the request's, without the flag.
    pub fn new(function: u8, code: u8) -> Self {
        Self {
            function: function & !crate::pdu::EXCEPTION_FLAG,
            exception: ExceptionCode::from_code(code),
        }
    }
}
