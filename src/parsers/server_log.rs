use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::outcome::ReadOutcome;
use crate::models::{BlockRecord, LogEvent, LogStatus};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::utils::open_lossy_reader;

lazy_static! {
    static ref COMPLETE_RE: Regex = Regex::new(
        r"^\[INFO\] quiche: stream (?P<id>\d+) send complete(?:,(?P<duration>\d+))?"
    )
    .unwrap();
    static ref CANCEL_RE: Regex = Regex::new(
        r"^\[INFO\] quiche::scheduler::dtp_scheduler: block (?P<id>\d+) is canceled, passed (?P<passed>\d+)(?:,(?P<duration>\d+))?"
    )
    .unwrap();
    // 전처리된 로그의 블록 시작 기록
    static ref START_RE: Regex = Regex::new(r"^(?P<id>\d+),start,(?P<duration>\d+)").unwrap();
}

fn capture_u64(caps: &Captures, name: &str) -> Option<u64> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Match one transport log line. Lines that match no pattern give `None`.
pub fn parse_log_line(line: &str) -> Option<LogEvent> {
    if line.starts_with("block_id") {
        return None;
    }

    if let Some(caps) = START_RE.captures(line) {
        return Some(LogEvent {
            wire_id: capture_u64(&caps, "id")?,
            status: LogStatus::Start,
            duration: capture_u64(&caps, "duration"),
            passed: None,
        });
    }

    if let Some(caps) = COMPLETE_RE.captures(line) {
        return Some(LogEvent {
            wire_id: capture_u64(&caps, "id")?,
            status: LogStatus::Complete,
            duration: capture_u64(&caps, "duration"),
            passed: None,
        });
    }

    if let Some(caps) = CANCEL_RE.captures(line) {
        return Some(LogEvent {
            wire_id: capture_u64(&caps, "id")?,
            status: LogStatus::Cancelled,
            duration: capture_u64(&caps, "duration"),
            passed: capture_u64(&caps, "passed"),
        });
    }

    None
}

/// Scan a transport log for block events.
///
/// A file without any matching line is `Ready` with no events.
pub fn read_server_log(path: &Path) -> ReadOutcome<Vec<LogEvent>> {
    let reader = match open_lossy_reader(path, DEFAULT_BUFFER_SIZE) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::NotYetAvailable,
        Err(e) => return ReadOutcome::Malformed(format!("cannot read {}: {e}", path.display())),
    };

    let mut events = Vec::new();
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if let Some(event) = parse_log_line(&line) {
                    events.push(event);
                }
            }
            Err(e) => return ReadOutcome::Malformed(format!("read error: {e}")),
        }
    }

    ReadOutcome::Ready(events)
}

/// `(decoded block id, status)` pairs in log order.
pub fn status_table(events: &[LogEvent]) -> Vec<(u64, LogStatus)> {
    events
        .iter()
        .filter_map(|event| event.block_id().map(|id| (id, event.status)))
        .collect()
}

/// Fold events into one record per wire id, ordered by id.
pub fn aggregate_events(events: &[LogEvent]) -> Vec<BlockRecord> {
    let mut records: BTreeMap<u64, BlockRecord> = BTreeMap::new();
    for event in events {
        records
            .entry(event.wire_id)
            .or_insert_with(|| BlockRecord::new(event.wire_id))
            .apply(event);
    }
    records.into_values().collect()
}

/// Read back the normalized server log CSV
/// (`block_id,start,complete,cancelled,cancelled_passed`).
pub fn read_server_log_csv(path: &Path) -> ReadOutcome<Vec<BlockRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::NotYetAvailable,
        Err(e) => return ReadOutcome::Malformed(format!("cannot read {}: {e}", path.display())),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    match reader.headers() {
        Ok(headers) if headers.is_empty() => return ReadOutcome::NotYetAvailable,
        Ok(_) => {}
        Err(e) => return ReadOutcome::Malformed(format!("invalid header: {e}")),
    }

    let mut records = Vec::new();
    for (idx, record) in reader.deserialize::<BlockRecord>().enumerate() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => return ReadOutcome::Malformed(format!("row {}: {e}", idx + 2)),
        }
    }
    ReadOutcome::Ready(records)
}

/// Block events from either a raw transport log or its normalized CSV
/// (picked by the `.csv` extension). CSV rows become one event each, carrying
/// the block's final status.
pub fn read_server_events(path: &Path) -> ReadOutcome<Vec<LogEvent>> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        read_server_log_csv(path)
            .map(|records| records.iter().filter_map(BlockRecord::to_event).collect())
    } else {
        read_server_log(path)
    }
}
