
use crate::models::{BctUnit, ResultRow, Trace};
use crate::utils::constants::MILLIS_PER_SECOND;

/// A completed block with the trace columns it was scheduled with.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub block_id: u64,
    pub priority: u32, // from the trace
    pub deadline: u64, // ms, from the trace
    pub start: f64,    // s
    pub bct: f64,      // as written in the result file
    pub duration: u64, // µs
    pub intime: bool,
    pub timestamp: f64, // deadline / 1000 + start, s
}

/// Inner part of the trace ⋈ result outer join: one row per result whose
/// id exists in the trace, ordered by `timestamp` (ties keep result order).
///
/// Trace blocks without a result are the unsent ones, see
/// [`super::unsent::find_unsent`]; results outside the trace are dropped.
pub fn join(trace: &Trace, results: &[ResultRow], unit: BctUnit) -> Vec<JoinedRow> {
    let mut rows: Vec<JoinedRow> = results
        .iter()
        .filter_map(|result| {
            let block = trace.get(result.block_id)?;
            Some(JoinedRow {
                block_id: result.block_id,
                priority: block.priority,
                deadline: block.deadline,
                start: block.start,
                bct: result.bct,
                duration: result.duration,
                intime: unit.is_intime(result.bct, block.deadline),
                timestamp: block.deadline as f64 / MILLIS_PER_SECOND + block.start,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    rows
}
