use std::io::BufRead;
use std::path::Path;

use crate::error::{Result, TraceError};
use crate::models::{Trace, TraceBlock};
use crate::utils::encoding::open_lossy_reader;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// Split one trace line into `(gap, deadline, size, priority)`.
///
/// Fields past the fourth are ignored. Any gap that parses as a float is
/// accepted, negative ones included.
pub fn parse_trace_line(line: &str) -> std::result::Result<(f64, u64, u64, u32), String> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| {
        fields
            .next()
            .ok_or_else(|| format!("missing field '{name}', expected 'gap deadline size priority'"))
    };

    let gap_str = next("gap")?;
    let deadline_str = next("deadline")?;
    let size_str = next("size")?;
    let priority_str = next("priority")?;

    let gap: f64 = gap_str
        .parse()
        .map_err(|_| format!("invalid gap '{gap_str}'"))?;
    let deadline: u64 = deadline_str
        .parse()
        .map_err(|_| format!("invalid deadline '{deadline_str}'"))?;
    let size: u64 = size_str
        .parse()
        .map_err(|_| format!("invalid size '{size_str}'"))?;
    let priority: u32 = priority_str
        .parse()
        .map_err(|_| format!("invalid priority '{priority_str}'"))?;

    Ok((gap, deadline, size, priority))
}

/// Parse a trace file. Any malformed line aborts the whole read.
pub fn parse_trace(path: &Path) -> Result<Trace> {
    let reader = open_lossy_reader(path, DEFAULT_BUFFER_SIZE).map_err(|e| TraceError::io(path, e))?;
    parse_trace_reader(reader, &path.display().to_string())
}

/// Parse trace lines from any reader. `source_name` only labels errors.
pub fn parse_trace_reader<R: BufRead>(reader: R, source_name: &str) -> Result<Trace> {
    let mut blocks: Vec<TraceBlock> = Vec::new();
    let mut start = 0.0;
    // 빈 줄은 파일 끝에서만 허용 (중간에 있으면 id와 줄 번호가 어긋남)
    let mut pending_blank: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| TraceError::io(source_name, e))?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            pending_blank.get_or_insert(line_no);
            continue;
        }
        if let Some(blank_no) = pending_blank {
            return Err(TraceError::format(
                source_name,
                blank_no,
                "blank line inside trace",
            ));
        }

        let (gap, deadline, size, priority) = parse_trace_line(trimmed)
            .map_err(|reason| TraceError::format(source_name, line_no, reason))?;

        // 누적 합: 첫 블록의 start는 자기 자신의 gap
        start += gap;
        blocks.push(TraceBlock {
            id: blocks.len() as u64,
            gap,
            start,
            deadline,
            size,
            priority,
        });
    }

    Ok(Trace::new(blocks))
}
