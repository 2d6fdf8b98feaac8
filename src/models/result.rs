use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::constants::MICROS_PER_MILLI;

/// One completed block reported by the transport, id already decoded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub block_id: u64,
    pub bct: f64, // block completion time, unit per BctUnit
    pub size: u64,
    pub priority: u32,
    pub deadline: u64, // ms
    pub duration: u64, // wall-clock completion timestamp, µs
}

/// Unit the `bct` column is written in.
///
/// Deadlines are always milliseconds; this decides whether `bct` has to be
/// scaled before the in-time comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BctUnit {
    #[default]
    Micros,
    Millis,
}

impl BctUnit {
    pub fn to_millis(self, bct: f64) -> f64 {
        match self {
            BctUnit::Micros => bct / MICROS_PER_MILLI,
            BctUnit::Millis => bct,
        }
    }

    /// `bct < deadline` after bringing `bct` to milliseconds.
    pub fn is_intime(self, bct: f64, deadline: u64) -> bool {
        self.to_millis(bct) < deadline as f64
    }
}

impl FromStr for BctUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us" | "micros" => Ok(BctUnit::Micros),
            "ms" | "millis" => Ok(BctUnit::Millis),
            _ => Err(format!("Unknown bct unit: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intime_respects_unit() {
        assert!(BctUnit::Micros.is_intime(150_000.0, 200));
        assert!(!BctUnit::Micros.is_intime(200_000.0, 200));
        assert!(BctUnit::Millis.is_intime(150.0, 200));
        assert!(!BctUnit::Millis.is_intime(250.0, 200));
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("ms".parse::<BctUnit>(), Ok(BctUnit::Millis));
        assert_eq!("MICROS".parse::<BctUnit>(), Ok(BctUnit::Micros));
        assert!("s".parse::<BctUnit>().is_err());
    }
}
