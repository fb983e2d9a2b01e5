//! Unit prefixes and conversions between user-facing and database units.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(
    Copy, Clone, Default, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum SiPrefix {
    Pico,
    #[default]
    Nano,
    Micro,
    Milli,
    None,
}

impl SiPrefix {
    pub fn multiplier(&self) -> f64 {
        match self {
            SiPrefix::Pico => 1e-12,
            SiPrefix::Nano => 1e-9,
            SiPrefix::Micro => 1e-6,
            SiPrefix::Milli => 1e-3,
            SiPrefix::None => 1e0,
        }
    }
}

impl Display for SiPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match *self {
            Self::Pico => "p",
            Self::Nano => "n",
            Self::Micro => "u",
            Self::Milli => "m",
            Self::None => "",
        };

        write!(f, "{s}")
    }
}

/// Converts a length in micrometers to integer database units of size `db_unit`.
///
/// Rounds to the nearest database unit.
pub fn um_to_db(value: f64, db_unit: SiPrefix) -> i64 {
    (value * SiPrefix::Micro.multiplier() / db_unit.multiplier()).round() as i64
}

/// Converts a length in database units of size `db_unit` to micrometers.
pub fn db_to_um(value: i64, db_unit: SiPrefix) -> f64 {
    value as f64 * db_unit.multiplier() / SiPrefix::Micro.multiplier()
}
