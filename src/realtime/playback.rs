use std::time::Duration;

use crate::models::{LogEvent, ResultRow};
use crate::utils::constants::MICROS_PER_MILLI;

/// Elapsed-time counter driving the live views.
///
/// In playback mode a row becomes visible once
/// `duration - first_duration <= elapsed` (µs), so a finished run is replayed
/// at wall-clock speed. Live mode shows everything that is on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    tick_ms: u64,
    elapsed_ms: u64,
    playback: bool,
}

impl PlaybackClock {
    pub fn new(tick_ms: u64, playback: bool) -> Self {
        Self {
            tick_ms,
            elapsed_ms: 0,
            playback,
        }
    }

    pub fn live(tick_ms: u64) -> Self {
        Self::new(tick_ms, false)
    }

    pub fn is_playback(&self) -> bool {
        self.playback
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn advance(&mut self) {
        self.elapsed_ms += self.tick_ms;
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn elapsed_us(&self) -> u64 {
        (self.elapsed_ms as f64 * MICROS_PER_MILLI) as u64
    }

    /// Items whose timestamp is within `elapsed` of the earliest one. Items
    /// without a timestamp are always visible.
    fn visible_by<T: Clone>(&self, items: &[T], timestamp: impl Fn(&T) -> Option<u64>) -> Vec<T> {
        if !self.playback {
            return items.to_vec();
        }
        let Some(first) = items.iter().filter_map(&timestamp).min() else {
            return items.to_vec();
        };
        let elapsed = self.elapsed_us();
        items
            .iter()
            .filter(|item| timestamp(item).map_or(true, |t| t - first <= elapsed))
            .cloned()
            .collect()
    }

    pub fn visible_results(&self, rows: &[ResultRow]) -> Vec<ResultRow> {
        self.visible_by(rows, |r| Some(r.duration))
    }

    pub fn visible_events(&self, events: &[LogEvent]) -> Vec<LogEvent> {
        self.visible_by(events, |e| e.duration)
    }

    /// True once playback has revealed every row. Never true in live mode
    /// or before any row exists.
    pub fn is_exhausted(&self, rows: &[ResultRow]) -> bool {
        if !self.playback {
            return false;
        }
        let first = rows.iter().map(|r| r.duration).min();
        let last = rows.iter().map(|r| r.duration).max();
        match (first, last) {
            (Some(first), Some(last)) => last - first <= self.elapsed_us(),
            _ => false,
        }
    }
}
