use std::collections::{BTreeMap, HashMap};

use super::join::JoinedRow;
use crate::models::{BctUnit, LogStatus, ResultRow, Trace};
use crate::log_warn;
use crate::utils::constants::{MAX_HIST_BUCKETS, QOE_BASE, QOE_PRIORITY_LEVELS, QOE_PRIORITY_WEIGHT};

// BCT 통계 계산을 위한 헬퍼 구조체
#[derive(Debug, Clone, Default)]
pub struct BctStats {
    values: Vec<f64>,
    sum: f64,
    min: f64,
    max: f64,
}

impl BctStats {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            sum: 0.0,
            min: f64::MAX,
            max: 0.0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.values.push(value);
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    pub fn min(&self) -> Option<f64> {
        (!self.values.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.values.is_empty()).then_some(self.max)
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    /// Nearest-rank percentile, `p` in `0..=100`.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sorted = self.sorted();
        let idx = (p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64).round() as usize;
        Some(sorted[idx])
    }

    pub fn median(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sorted = self.sorted();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    pub fn std_dev(&self) -> Option<f64> {
        if self.values.len() <= 1 {
            return None;
        }
        let mean = self.mean()?;
        let variance = self
            .values
            .iter()
            .map(|&v| (mean - v) * (mean - v))
            .sum::<f64>()
            / (self.values.len() - 1) as f64;
        Some(variance.sqrt())
    }
}

/// Everything the tables show for one priority class.
#[derive(Debug, Clone, Default)]
pub struct ClassSummary {
    pub priority: u32,
    pub total: usize,
    pub intime: usize,
    pub bct: BctStats,
}

impl ClassSummary {
    fn new(priority: u32) -> Self {
        Self {
            priority,
            total: 0,
            intime: 0,
            bct: BctStats::new(),
        }
    }

    /// `count(intime) / count(rows)`, `None` without rows.
    pub fn arrival_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.intime as f64 / self.total as f64)
    }

    pub fn mean_bct(&self) -> Option<f64> {
        self.bct.mean()
    }
}

/// Per-class summary for `classes`, present even when a class has no rows.
pub fn summarize_by_class(rows: &[JoinedRow], classes: &[u32]) -> BTreeMap<u32, ClassSummary> {
    let mut summaries: BTreeMap<u32, ClassSummary> = classes
        .iter()
        .map(|&c| (c, ClassSummary::new(c)))
        .collect();

    for row in rows {
        if let Some(summary) = summaries.get_mut(&row.priority) {
            summary.total += 1;
            if row.intime {
                summary.intime += 1;
            }
            summary.bct.add(row.bct);
        }
    }
    summaries
}

pub fn mean_bct_by_class(rows: &[JoinedRow], classes: &[u32]) -> Vec<(u32, Option<f64>)> {
    summarize_by_class(rows, classes)
        .into_values()
        .map(|s| (s.priority, s.mean_bct()))
        .collect()
}

pub fn arrival_rate_by_class(rows: &[JoinedRow], classes: &[u32]) -> Vec<(u32, Option<f64>)> {
    summarize_by_class(rows, classes)
        .into_values()
        .map(|s| (s.priority, s.arrival_rate()))
        .collect()
}

/// Weighted quality-of-experience score.
///
/// Every seen block adds `0.9 * (3 - priority) / 2 + 0.1` to `max`; in-time
/// blocks add the same to `qoe`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QoeAccumulator {
    pub qoe: f64,
    pub max: f64,
}

impl QoeAccumulator {
    pub fn weight(priority: u32) -> f64 {
        QOE_PRIORITY_WEIGHT * (QOE_PRIORITY_LEVELS - priority as f64) / 2.0 + QOE_BASE
    }

    pub fn add(&mut self, priority: u32, intime: bool) {
        let weight = Self::weight(priority);
        self.max += weight;
        if intime {
            self.qoe += weight;
        }
    }

    /// `qoe / max`, or `placeholder` before any block was seen.
    pub fn ratio(&self, placeholder: f64) -> f64 {
        if self.max == 0.0 {
            placeholder
        } else {
            self.qoe / self.max
        }
    }
}

pub fn qoe_score(rows: &[JoinedRow]) -> QoeAccumulator {
    let mut acc = QoeAccumulator::default();
    for row in rows {
        acc.add(row.priority, row.intime);
    }
    acc
}

/// Completed / cancelled / still waiting blocks of one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusBreakdown {
    pub complete: usize,
    pub cancelled: usize,
    pub waiting: usize,
}

impl StatusBreakdown {
    pub fn total(&self) -> usize {
        self.complete + self.cancelled + self.waiting
    }
}

/// Join trace blocks with log statuses (last status per block wins) and
/// count per class. Blocks without a terminal status are waiting.
pub fn status_breakdown(
    trace: &Trace,
    statuses: &[(u64, LogStatus)],
    classes: &[u32],
) -> BTreeMap<u32, StatusBreakdown> {
    let latest: HashMap<u64, LogStatus> = statuses.iter().copied().collect();
    let mut breakdown: BTreeMap<u32, StatusBreakdown> = classes
        .iter()
        .map(|&c| (c, StatusBreakdown::default()))
        .collect();

    for block in &trace.blocks {
        let Some(counts) = breakdown.get_mut(&block.priority) else {
            continue;
        };
        match latest.get(&block.id) {
            Some(LogStatus::Complete) => counts.complete += 1,
            Some(LogStatus::Cancelled) => counts.cancelled += 1,
            Some(LogStatus::Start) | None => counts.waiting += 1,
        }
    }
    breakdown
}

/// Overall timing of a run taken from its result file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalTime {
    pub completed: usize,
    pub first_completion_us: u64,
    pub last_completion_us: u64,
    pub max_bct: f64,
}

impl TotalTime {
    pub fn span_us(&self) -> u64 {
        self.last_completion_us - self.first_completion_us
    }
}

pub fn total_time(results: &[ResultRow]) -> Option<TotalTime> {
    let first = results.iter().map(|r| r.duration).min()?;
    let last = results.iter().map(|r| r.duration).max()?;
    let max_bct = results.iter().map(|r| r.bct).fold(0.0_f64, f64::max);
    Some(TotalTime {
        completed: results.len(),
        first_completion_us: first,
        last_completion_us: last,
        max_bct,
    })
}

/// BCT distribution in fixed-width millisecond buckets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BctHistogram {
    pub bucket_ms: f64,
    /// Counts per class; every class has the same number of buckets
    pub counts: BTreeMap<u32, Vec<usize>>,
    /// Per class, BCTs at or beyond `bucket_count() * bucket_ms`
    pub overflow: BTreeMap<u32, usize>,
}

impl BctHistogram {
    pub fn bucket_count(&self) -> usize {
        self.counts.values().map(Vec::len).max().unwrap_or(0)
    }

    /// `[low, high)` bounds of bucket `idx` in ms.
    pub fn bounds(&self, idx: usize) -> (f64, f64) {
        let low = idx as f64 * self.bucket_ms;
        (low, low + self.bucket_ms)
    }

    pub fn has_overflow(&self) -> bool {
        self.overflow.values().any(|&n| n > 0)
    }
}

/// Histogram of result BCTs (converted to ms) for `classes`, keyed by the
/// priority column of the result file.
///
/// Non-finite BCTs are skipped. At most [`MAX_HIST_BUCKETS`] buckets are
/// kept; anything past the last one lands in `overflow`.
pub fn bct_histogram(
    results: &[ResultRow],
    unit: BctUnit,
    bucket_ms: f64,
    classes: &[u32],
) -> BctHistogram {
    // float -> usize 변환은 포화되므로 상한을 먼저 적용
    let bucket_of = |bct: f64| {
        let idx = (unit.to_millis(bct).max(0.0) / bucket_ms).floor();
        if idx >= MAX_HIST_BUCKETS as f64 {
            MAX_HIST_BUCKETS
        } else {
            idx as usize
        }
    };

    let selected: Vec<&ResultRow> = results
        .iter()
        .filter(|r| classes.contains(&r.priority))
        .filter(|r| {
            if r.bct.is_finite() {
                true
            } else {
                log_warn!("skipping block {} with non-finite bct {}", r.block_id, r.bct);
                false
            }
        })
        .collect();

    let buckets = selected
        .iter()
        .map(|r| bucket_of(r.bct).saturating_add(1))
        .max()
        .unwrap_or(0)
        .min(MAX_HIST_BUCKETS);

    let mut counts: BTreeMap<u32, Vec<usize>> =
        classes.iter().map(|&c| (c, vec![0; buckets])).collect();
    let mut overflow: BTreeMap<u32, usize> = classes.iter().map(|&c| (c, 0)).collect();
    for result in selected {
        let idx = bucket_of(result.bct);
        match counts.get_mut(&result.priority).and_then(|c| c.get_mut(idx)) {
            Some(count) => *count += 1,
            None => *overflow.entry(result.priority).or_default() += 1,
        }
    }

    BctHistogram {
        bucket_ms,
        counts,
        overflow,
    }
}
