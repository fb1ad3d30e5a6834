//! Item quantities in thousandths of a unit.

use serde::{Deserialize, Serialize};

/// Quantity of pieces or kilograms, stored as milli-units.
///
/// Pieces are whole multiples of [`Quantity::SCALE`]; weights may be
/// fractional (2.5 kg is `2_500`).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const SCALE: u32 = 1_000;
    pub const ZERO: Quantity = Quantity(0);
    pub const ONE: Quantity = Quantity(Self::SCALE);

    pub const fn from_milli(milli: u32) -> Self {
        Self(milli)
    }

    pub const fn whole(units: u32) -> Self {
        Self(units.saturating_mul(Self::SCALE))
    }

    pub const fn milli(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_whole(self) -> bool {
        self.0 % Self::SCALE == 0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let units = self.0 / Self::SCALE;
        let frac = self.0 % Self::SCALE;
        if frac == 0 {
            return write!(f, "{units}");
        }
        let digits = format!("{frac:03}");
        write!(f, "{units}.{}", digits.trim_end_matches('0'))
    }
}
