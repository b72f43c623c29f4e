use super::PeripheralError;
use serde::{Deserialize, Serialize};

/// Native integer range of a converter, `0..=2^bits - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AmplitudeRange {
    bits: u8,
}

impl AmplitudeRange {
    pub const EIGHT_BIT: Self = Self { bits: 8 };
    pub const TWELVE_BIT: Self = Self { bits: 12 };

    pub fn new(bits: u8) -> Result<Self, PeripheralError> {
        if (1..=16).contains(&bits) {
            Ok(Self { bits })
        } else {
            Err(PeripheralError::UnsupportedResolution(bits))
        }
    }

    pub fn max(&self) -> u16 {
        ((1u32 << self.bits) - 1) as u16
    }

    /// Code of a silent line, `quantize(0.0)`.
    pub fn midscale(&self) -> u16 {
        self.max() / 2
    }

    pub fn contains(&self, value: u16) -> bool {
        value <= self.max()
    }

    /// Maps a unit amplitude in `[-1, 1]` onto the range, truncating like the
    /// converter's integer write.
    pub fn quantize(&self, unit: f64) -> u16 {
        let half = f64::from(self.max()) / 2.0;
        let scaled = half * unit.clamp(-1.0, 1.0) + half;
        (scaled as u16).min(self.max())
    }

    /// Signed offset of a raw reading from mid-scale.
    pub fn center(&self, raw: u16) -> i32 {
        i32::from(raw) - i32::from(self.midscale())
    }
}

impl TryFrom<u8> for AmplitudeRange {
    type Error = PeripheralError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<AmplitudeRange> for u8 {
    fn from(range: AmplitudeRange) -> Self {
        range.bits
    }
}

/// Input attenuation setting of the digitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Attenuation {
    #[default]
    Db0,
    Db2_5,
    Db6,
    Db11,
}
