/// Maximum number of data bytes a PDU may carry.
pub const PDU_MAX_DATA: usize = 252;

// Bit access
pub const FUNC_READ_COILS: u8 = 0x01;
pub const FUNC_READ_DISCRETE_INPUTS: u8 = 0x02;
pub const FUNC_WRITE_SINGLE_COIL: u8 = 0x05;
pub const FUNC_WRITE_MULTIPLE_COILS: u8 = 0x0F;

// 16-bit access
pub const FUNC_READ_HOLDING_REGISTERS: u8 = 0x03;
pub const FUNC_READ_INPUT_REGISTERS: u8 = 0x04;
pub const FUNC_WRITE_SINGLE_REGISTER: u8 = 0x06;
pub const FUNC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;
pub const FUNC_MASK_WRITE_REGISTER: u8 = 0x16;
pub const FUNC_READ_WRITE_MULTIPLE_REGISTERS: u8 = 0x17;
pub const FUNC_READ_FIFO_QUEUE: u8 = 0x18;

// Modbus Encapsulated Interface
pub const FUNC_ENCAPSULATED_INTERFACE: u8 = 0x2B;
pub const MEI_TYPE_DEVICE_IDENTIFICATION: u8 = 0x0E;

/// Bit a device sets in the echoed function code to signal an exception.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Protocol Data Unit: the transport-independent part of a Modbus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolDataUnit {
    pub function: u8,
    pub data: Vec<u8>,
}

impl ProtocolDataUnit {
    pub fn new(function: u8, data: Vec<u8>) -> Self {
        Self { function, data }
    }

    /// True if the function code carries the exception flag.
    pub fn is_exception(&self) -> bool {
        self.function & EXCEPTION_FLAG != 0
    }
}
