use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use super::outcome::ReadOutcome;
use crate::log_warn;
use crate::models::{IdScheme, ResultRow};

pub const RESULT_COLUMNS: [&str; 6] = ["block_id", "bct", "size", "priority", "deadline", "duration"];

// CSV 원본 행 (block_id는 아직 wire id)
#[derive(Debug, Deserialize)]
struct RawResultRow {
    block_id: u64,
    bct: f64,
    size: u64,
    priority: u32,
    deadline: u64,
    duration: u64,
}

/// Read a result CSV written by the transport client.
///
/// Columns are located by header name, so their order does not matter.
/// `block_id` is decoded with `scheme`. A last row without its trailing
/// newline is treated as still being written and skipped.
pub fn read_results(path: &Path, scheme: IdScheme) -> ReadOutcome<Vec<ResultRow>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::NotYetAvailable,
        Err(e) => return ReadOutcome::Malformed(format!("cannot read {}: {e}", path.display())),
    };
    parse_results(&bytes, scheme)
}

/// [`read_results`] over an in-memory buffer.
pub fn parse_results(bytes: &[u8], scheme: IdScheme) -> ReadOutcome<Vec<ResultRow>> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return ReadOutcome::NotYetAvailable;
    }
    let complete_tail = bytes.ends_with(b"\n");

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => return ReadOutcome::Malformed(format!("invalid header: {e}")),
    };
    for column in RESULT_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return ReadOutcome::Malformed(format!("missing column '{column}'"));
        }
    }

    let mut records: Vec<csv::Result<RawResultRow>> = reader.deserialize().collect();
    // 기록 중인 마지막 줄: 필드가 다 있어도 숫자가 잘렸을 수 있음
    if !complete_tail {
        records.pop();
    }
    let mut rows = Vec::with_capacity(records.len());

    for (idx, record) in records.into_iter().enumerate() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => return ReadOutcome::Malformed(format!("row {}: {e}", idx + 2)),
        };

        let Some(block_id) = scheme.decode(raw.block_id) else {
            log_warn!(
                "skipping result row with undecodable block id {}",
                raw.block_id
            );
            continue;
        };

        rows.push(ResultRow {
            block_id,
            bct: raw.bct,
            size: raw.size,
            priority: raw.priority,
            deadline: raw.deadline,
            duration: raw.duration,
        });
    }

    ReadOutcome::Ready(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::encode;
    use std::io::Write;

    #[test]
    fn test_decodes_block_ids() {
        let csv = format!(
            "block_id,bct,size,priority,deadline,duration\n{},120000,1300,1,200,5000\n{},90000,1300,2,200,7000\n",
            encode(0),
            encode(2)
        );
        let rows = parse_results(csv.as_bytes(), IdScheme::Stream).into_table();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].block_id, 0);
        assert_eq!(rows[1].block_id, 2);
        assert_eq!(rows[1].priority, 2);
        assert_eq!(rows[1].duration, 7000);
    }

    #[test]
    fn test_column_order_is_free() {
        let csv = "duration,priority,block_id,deadline,size,bct\n5000,1,9,200,1300,1.5\n";
        let rows = parse_results(csv.as_bytes(), IdScheme::Stream).into_table();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].block_id, 1);
        assert_eq!(rows[0].bct, 1.5);
    }

    #[test]
    fn test_missing_file_and_empty_file() {
        let outcome = read_results(Path::new("/nonexistent/result.csv"), IdScheme::Stream);
        assert_eq!(outcome, ReadOutcome::NotYetAvailable);
        assert!(outcome.into_table().is_empty());

        let file = tempfile::NamedTempFile::new().unwrap();
        let outcome = read_results(file.path(), IdScheme::Stream);
        assert_eq!(outcome, ReadOutcome::NotYetAvailable);
    }

    #[test]
    fn test_header_only_is_ready_and_empty() {
        let outcome = parse_results(b"block_id,bct,size,priority,deadline,duration\n", IdScheme::Stream);
        assert_eq!(outcome, ReadOutcome::Ready(Vec::new()));
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let outcome = parse_results(b"block_id,bct,size\n5,1,1\n", IdScheme::Stream);
        assert!(matches!(outcome, ReadOutcome::Malformed(_)));
        assert!(outcome.into_table().is_empty());
    }

    #[test]
    fn test_partial_last_row_is_skipped() {
        let csv = "block_id,bct,size,priority,deadline,duration\n5,100,1300,1,200,5000\n9,10";
        let rows = parse_results(csv.as_bytes(), IdScheme::Stream).into_table();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_unterminated_last_row_is_skipped_even_when_complete_looking() {
        let csv = "block_id,bct,size,priority,deadline,duration\n5,100,1300,1,200,5000\n9,150000,1300,1,200,50";
        let rows = parse_results(csv.as_bytes(), IdScheme::Stream).into_table();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].block_id, 0);
        assert_eq!(rows[0].duration, 5000);
    }

    #[test]
    fn test_bad_inner_row_is_malformed() {
        let csv = "block_id,bct,size,priority,deadline,duration\nx,100,1300,1,200,5000\n9,100,1300,1,200,6000\n";
        assert!(matches!(
            parse_results(csv.as_bytes(), IdScheme::Stream),
            ReadOutcome::Malformed(_)
        ));
    }

    #[test]
    fn test_undecodable_id_is_skipped() {
        let csv = "block_id,bct,size,priority,deadline,duration\n1,100,1300,1,200,5000\n5,100,1300,1,200,6000\n";
        let rows = parse_results(csv.as_bytes(), IdScheme::Stream).into_table();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].block_id, 0);
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "block_id,bct,size,priority,deadline,duration").unwrap();
        writeln!(file, "{},150,1300,1,200,1000", encode(4)).unwrap();
        file.flush().unwrap();

        let rows = read_results(file.path(), IdScheme::Log).into_table();
        assert_eq!(rows[0].block_id, 4);
    }
}
