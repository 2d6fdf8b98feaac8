use serde::{Deserialize, Serialize};

use super::block_id::IdScheme;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Start,
    Complete,
    Cancelled,
}

impl LogStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            LogStatus::Start => "start",
            LogStatus::Complete => "complete",
            LogStatus::Cancelled => "cancelled",
        }
    }
}

/// A matched transport log line. `wire_id` is kept as printed by the
/// transport; [`LogEvent::block_id`] decodes it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub wire_id: u64,
    pub status: LogStatus,
    pub duration: Option<u64>,
    pub passed: Option<u64>, // ms already spent when the block was cancelled
}

impl LogEvent {
    pub fn block_id(&self) -> Option<u64> {
        IdScheme::Log.decode(self.wire_id)
    }
}

/// All events of one block folded together, last write wins per field.
/// This is also the row layout of the normalized server log CSV.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BlockRecord {
    #[serde(rename = "block_id")]
    pub wire_id: u64,
    pub start: Option<u64>,
    pub complete: Option<u64>,
    pub cancelled: Option<u64>,
    pub cancelled_passed: Option<u64>,
}

impl BlockRecord {
    pub fn new(wire_id: u64) -> Self {
        Self {
            wire_id,
            ..Default::default()
        }
    }

    pub fn block_id(&self) -> Option<u64> {
        IdScheme::Log.decode(self.wire_id)
    }

    pub fn apply(&mut self, event: &LogEvent) {
        match event.status {
            LogStatus::Start => {
                if event.duration.is_some() {
                    self.start = event.duration;
                }
            }
            LogStatus::Complete => {
                if event.duration.is_some() {
                    self.complete = event.duration;
                }
            }
            LogStatus::Cancelled => {
                if event.duration.is_some() {
                    self.cancelled = event.duration;
                }
                if event.passed.is_some() {
                    self.cancelled_passed = event.passed;
                }
            }
        }
    }

    /// Latest terminal status, cancellation taking precedence.
    pub fn final_status(&self) -> Option<LogStatus> {
        if self.cancelled.is_some() || self.cancelled_passed.is_some() {
            Some(LogStatus::Cancelled)
        } else if self.complete.is_some() {
            Some(LogStatus::Complete)
        } else if self.start.is_some() {
            Some(LogStatus::Start)
        } else {
            None
        }
    }

    /// Collapse the record back into its terminal event, stamped with the
    /// time of that status. `None` for a record without any field set.
    pub fn to_event(&self) -> Option<LogEvent> {
        let status = self.final_status()?;
        let duration = match status {
            LogStatus::Start => self.start,
            LogStatus::Complete => self.complete,
            LogStatus::Cancelled => self.cancelled,
        };
        Some(LogEvent {
            wire_id: self.wire_id,
            status,
            duration,
            passed: self.cancelled_passed,
        })
    }
}
