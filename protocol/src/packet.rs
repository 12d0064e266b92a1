//! # Packet Decoding
//!
//! Every measurement arrives as a fixed 19-byte text packet:
//!
//! ```text
//! offset  0   1..=4   5     6..=7   8     9..=12  13    14..=15  16    17..=18
//!       ┌───┬───────┬─────┬───────┬─────┬───────┬─────┬────────┬─────┬───────┐
//!       │ ? │ temp  │unit │   ?   │ '0' │   ?   │chan │   ?    │ '1' │ \r\n  │
//!       └───┴───────┴─────┴───────┴─────┴───────┴─────┴────────┴─────┴───────┘
//! ```
//!
//! Structural checks (length, separator, the two literal markers) reject the
//! frame outright. Field checks then decide whether the packet carries a
//! usable measurement. Only packets that pass everything produce a
//! [`MeasurementRecord`]; an unreadable temperature discards the packet just
//! like a missing one does.

use log::{debug, error, log_enabled, trace, Level};
use serde::{Deserialize, Serialize};

use crate::temperature::{parse_temperature, Temperature, TemperatureError, FIELD_LEN, NEG};
use crate::{PACKET_SIZE, SEPARATOR};

const TEMPERATURE_OFFSET: usize = 1;
const UNIT_OFFSET: usize = 5;
const ZERO_MARKER_OFFSET: usize = 8;
const CHANNEL_OFFSET: usize = 13;
const ONE_MARKER_OFFSET: usize = 16;
const SEPARATOR_OFFSET: usize = 17;

/// Measurement unit reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Unit digit outside the known range; the value is still passed on
    Unknown,
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Unit {
    /// Map the numeric unit code (packet byte minus `'0'`)
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Celsius,
            2 => Self::Fahrenheit,
            3 => Self::Kelvin,
            _ => Self::Unknown,
        }
    }
}

/// Probe channel a measurement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    T1,
    T2,
    /// Difference between both probes
    #[serde(rename = "T1-T2")]
    T1MinusT2,
}

impl Channel {
    /// Map the numeric channel code (packet byte minus `'0'`)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::T1),
            1 => Some(Self::T2),
            2 | 3 => Some(Self::T1MinusT2),
            _ => None,
        }
    }

    /// Whether values on this channel are relative to another channel
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::T1MinusT2)
    }
}

/// One decoded measurement, handed to the sink and then dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementRecord {
    pub temperature: Temperature,
    pub unit: Unit,
    pub channel: Channel,
    /// Set for the T1-T2 difference channel
    pub relative: bool,
}

/// Why a frame produced no measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Frame length differs from [`PACKET_SIZE`]
    WrongLength(usize),
    /// Bytes 17-18 are not `\r\n`
    BadSeparator,
    /// Byte 8 is not `'0'` or byte 16 is not `'1'`
    BadMarkers,
    /// Temperature field is all sign markers (empty memory slot, missing probe)
    NoMeasurement,
    /// Temperature field could not be decoded
    Temperature(TemperatureError),
    /// Channel digit outside 0-3, carrying the raw packet byte
    UnknownChannel(u8),
}

impl From<TemperatureError> for PacketError {
    fn from(e: TemperatureError) -> Self {
        PacketError::Temperature(e)
    }
}

impl PacketError {
    /// Structural errors mean the frame was not a packet at all
    pub fn is_malformed_frame(&self) -> bool {
        matches!(
            self,
            PacketError::WrongLength(_) | PacketError::BadSeparator | PacketError::BadMarkers
        )
    }
}

/// Validate a frame and extract its measurement
pub fn parse_packet(frame: &[u8]) -> Result<MeasurementRecord, PacketError> {
    if frame.len() != PACKET_SIZE {
        return Err(PacketError::WrongLength(frame.len()));
    }
    if frame[SEPARATOR_OFFSET..SEPARATOR_OFFSET + SEPARATOR.len()] != SEPARATOR {
        return Err(PacketError::BadSeparator);
    }
    if frame[ZERO_MARKER_OFFSET] != b'0' || frame[ONE_MARKER_OFFSET] != b'1' {
        return Err(PacketError::BadMarkers);
    }
    debug!("Processing {}-byte packet.", PACKET_SIZE);

    let mut field = [0u8; FIELD_LEN];
    field.copy_from_slice(&frame[TEMPERATURE_OFFSET..TEMPERATURE_OFFSET + FIELD_LEN]);
    if field == [NEG; FIELD_LEN] {
        return Err(PacketError::NoMeasurement);
    }
    let temperature = parse_temperature(&field)?;

    let unit_byte = frame[UNIT_OFFSET];
    let unit = Unit::from_code(unit_byte.wrapping_sub(b'0'));
    if unit == Unit::Unknown {
        debug!("Unknown unit 0x{:02x}.", unit_byte);
    }

    let channel_byte = frame[CHANNEL_OFFSET];
    let channel = Channel::from_code(channel_byte.wrapping_sub(b'0'))
        .ok_or(PacketError::UnknownChannel(channel_byte))?;

    Ok(MeasurementRecord {
        temperature,
        unit,
        channel,
        relative: channel.is_relative(),
    })
}

/// Decode a frame, logging why it was rejected
///
/// Returns `None` for anything that is not a complete, valid measurement.
pub fn decode(frame: &[u8]) -> Option<MeasurementRecord> {
    if log_enabled!(Level::Trace) {
        trace!("Got a packet, len {}, bytes {:02x?}", frame.len(), frame);
    }

    match parse_packet(frame) {
        Ok(record) => Some(record),
        Err(PacketError::UnknownChannel(byte)) => {
            error!("Unknown channel 0x{:02x}.", byte);
            None
        }
        Err(PacketError::Temperature(TemperatureError::DoubleNegative)) => {
            debug!("Double negative sign!");
            None
        }
        Err(PacketError::Temperature(TemperatureError::InvalidDigit(byte))) => {
            debug!("Invalid digit '{:02x}'!", byte);
            None
        }
        Err(e) => {
            trace!("Discarding frame: {:?}", e);
            None
        }
    }
}
