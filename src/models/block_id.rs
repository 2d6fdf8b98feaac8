use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Wire identifier of trace block `id`: `((id + 1) << 2) + 1`.
///
/// The transport numbers blocks like QUIC streams, so the two low bits carry
/// stream flags and the value is always odd.
pub fn encode(id: u64) -> u64 {
    ((id + 1) << 2) + 1
}

/// Decoding formula applied to a wire identifier.
///
/// Result CSVs and transport logs were historically decoded with different
/// formulas. Both agree on every value produced by [`encode`] but disagree on
/// wire ids that are multiples of 4, so they are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// `((w - 1) >> 2) - 1`, used for result CSVs
    #[default]
    Stream,
    /// `(w >> 2) - 1`, used for ids reported in transport logs
    Log,
}

impl IdScheme {
    /// Internal block id for `wire`, or `None` when the value is too small to
    /// have come from [`encode`].
    pub fn decode(self, wire: u64) -> Option<u64> {
        match self {
            IdScheme::Stream => (wire.checked_sub(1)? >> 2).checked_sub(1),
            IdScheme::Log => (wire >> 2).checked_sub(1),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IdScheme::Stream => "stream",
            IdScheme::Log => "log",
        }
    }
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stream" => Ok(IdScheme::Stream),
            "log" => Ok(IdScheme::Log),
            _ => Err(format!("Unknown id scheme: {s}")),
        }
    }
}
