//! USB identity and host-to-device commands of the UT32x.

use serde::{Deserialize, Serialize};

/// WCH CH9325 vendor ID
pub const USB_VID: u16 = 0x1a86;
/// WCH CH9325 product ID
pub const USB_PID: u16 = 0xe008;
pub const USB_INTERFACE: u8 = 0;
pub const USB_CONFIGURATION: u8 = 1;

/// Interrupt IN endpoint carrying measurement reports
pub const EP_IN: u8 = 0x80 | 2;
/// OUT endpoint for commands
pub const EP_OUT: u8 = 2;

/// First byte of every command, the CH9325 length prefix
const COMMAND_PREFIX: u8 = 0x01;

/// Commands understood by the thermometer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Stream live measurements
    GetLive = 1,
    /// Stop sending reports
    Stop = 2,
    /// Dump the stored memory slots
    GetStored = 7,
}

impl Command {
    /// Wire encoding sent on [`EP_OUT`]
    pub const fn to_bytes(self) -> [u8; 2] {
        [COMMAND_PREFIX, self as u8]
    }
}

impl TryFrom<u8> for Command {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::GetLive),
            2 => Ok(Self::Stop),
            7 => Ok(Self::GetStored),
            _ => Err(()),
        }
    }
}

/// Where the thermometer reads measurements from
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Live,
    /// Stored memory; empty slots arrive as "no measurement" packets
    Memory,
}

impl DataSource {
    /// Command that starts acquisition from this source
    pub const fn start_command(self) -> Command {
        match self {
            Self::Live => Command::GetLive,
            Self::Memory => Command::GetStored,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Memory => "Memory",
        }
    }
}
