use serde::{Deserialize, Serialize};

use crate::errors::InvalidRequest;

/// Number of data bits per character. Configs carry the plain number, so
/// it serializes as `5..=8`; anything else is rejected when the value is
/// deserialized or constructed.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl DataBits {
    pub fn new(bits: u8) -> Option<Self> {
        Self::try_from(bits).ok()
    }

    pub fn get(&self) -> u8 {
        u8::from(*self)
    }
}

impl TryFrom<u8> for DataBits {
    type Error = InvalidRequest;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            _ => Err(InvalidRequest::InvalidDataBits { bits }),
        }
    }
}

impl From<DataBits> for u8 {
    fn from(data_bits: DataBits) -> Self {
        match data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(data_bits: DataBits) -> Self {
        match data_bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

impl std::fmt::Display for DataBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}
