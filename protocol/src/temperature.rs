//! Temperature field decoding.
//!
//! The device sends temperatures as four ASCII characters in tenths of a
//! degree. Leading positions may hold a blank placeholder (`:`) and a single
//! negative sign (`;`) may appear anywhere in the field.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Width of the temperature field in bytes
pub const FIELD_LEN: usize = 4;

/// Placeholder for an unused digit position
pub const BLANK: u8 = b':';

/// Negative sign marker
pub const NEG: u8 = b';';

/// A decoded temperature in tenths of a degree
///
/// Serializes as `{"value": <degrees>, "tenths": <raw>}`; only `tenths` is
/// read back when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    tenths: i32,
}

impl Temperature {
    pub const fn from_tenths(tenths: i32) -> Self {
        Self { tenths }
    }

    /// Raw fixed-point value in tenths of a degree
    #[inline]
    pub const fn tenths(self) -> i32 {
        self.tenths
    }

    /// Value in degrees of whatever unit the packet carried
    #[inline]
    pub fn value(self) -> f32 {
        self.tenths as f32 / 10.0
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Temperature", 2)?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("tenths", &self.tenths)?;
        state.end()
    }
}

/// Why a temperature field could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureError {
    /// More than one sign marker in the field
    DoubleNegative,
    /// A byte that is neither a digit, blank nor sign
    InvalidDigit(u8),
}

/// Decode the 4-byte temperature field
///
/// # Example
///
/// ```rust
/// use ut32x_protocol::temperature::parse_temperature;
///
/// let temp = parse_temperature(b";075").unwrap();
/// assert_eq!(temp.tenths(), -75);
/// assert_eq!(temp.value(), -7.5);
/// ```
pub fn parse_temperature(field: &[u8; FIELD_LEN]) -> Result<Temperature, TemperatureError> {
    let mut magnitude: i32 = 0;
    let mut negative = false;

    for &byte in field {
        match byte {
            BLANK => continue,
            NEG if negative => return Err(TemperatureError::DoubleNegative),
            NEG => negative = true,
            b'0'..=b'9' => magnitude = magnitude * 10 + i32::from(byte - b'0'),
            other => return Err(TemperatureError::InvalidDigit(other)),
        }
    }

    Ok(Temperature::from_tenths(if negative { -magnitude } else { magnitude }))
}
