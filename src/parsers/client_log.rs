use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TraceError};
use crate::log_warn;
use crate::utils::read_lossy_to_string;

// 클라이언트 로그 앞부분의 헤더 줄 수
const CLIENT_HEADER_LINES: usize = 4;

lazy_static! {
    static ref CLIENT_STATS_RE: Regex = Regex::new(
        r"connection closed, recv=(?P<recv>-?\d+) sent=(?P<sent>-?\d+) lost=(?P<lost>-?\d+) rtt=(?:(?P<rtt>[\d.]+)ms|-1) cwnd=(?P<cwnd>-?\d+), total_bytes=(?P<total_bytes>-?\d+), complete_bytes=(?P<complete_bytes>-?\d+), good_bytes=(?P<good_bytes>-?\d+), total_time=(?P<total_time>-?\d+)"
    )
    .unwrap();
}

/// Per-block line of `client.log`: `BlockID bct BlockSize Priority Deadline`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientBlock {
    #[serde(rename = "BlockID")]
    pub block_id: u64,
    pub bct: f64,
    #[serde(rename = "BlockSize")]
    pub block_size: u64,
    #[serde(rename = "Priority")]
    pub priority: u32,
    #[serde(rename = "Deadline")]
    pub deadline: u64,
}

/// Connection summary printed on the last line of `client.log`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientStats {
    pub c_recv: i64,
    pub c_sent: i64,
    pub c_lost: i64,
    #[serde(rename = "c_rtt(ms)")]
    pub c_rtt_ms: f64, // -1 when the client never measured an RTT
    pub c_cwnd: i64,
    pub c_total_bytes: i64,
    pub c_complete_bytes: i64,
    pub c_good_bytes: i64,
    #[serde(rename = "c_total_time(us)")]
    pub c_total_time_us: i64,
    pub qoe: f64,         // not reported by the client, always -1
    pub retry_times: i64, // not reported by the client, always -1
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientLog {
    pub blocks: Vec<ClientBlock>,
    pub stats: ClientStats,
}

fn parse_client_block(line: &str) -> Option<ClientBlock> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return None;
    }
    Some(ClientBlock {
        block_id: fields[0].parse().ok()?,
        bct: fields[1].parse().ok()?,
        block_size: fields[2].parse().ok()?,
        priority: fields[3].parse().ok()?,
        deadline: fields[4].parse().ok()?,
    })
}

fn capture_i64(caps: &Captures, name: &str) -> Option<i64> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Parse the summary line, `None` if it is not one.
pub fn parse_client_stats(line: &str) -> Option<ClientStats> {
    let caps = CLIENT_STATS_RE.captures(line)?;
    let rtt = match caps.name("rtt") {
        Some(m) => m.as_str().parse().ok()?,
        None => -1.0,
    };
    Some(ClientStats {
        c_recv: capture_i64(&caps, "recv")?,
        c_sent: capture_i64(&caps, "sent")?,
        c_lost: capture_i64(&caps, "lost")?,
        c_rtt_ms: rtt,
        c_cwnd: capture_i64(&caps, "cwnd")?,
        c_total_bytes: capture_i64(&caps, "total_bytes")?,
        c_complete_bytes: capture_i64(&caps, "complete_bytes")?,
        c_good_bytes: capture_i64(&caps, "good_bytes")?,
        c_total_time_us: capture_i64(&caps, "total_time")?,
        qoe: -1.0,
        retry_times: -1,
    })
}

/// `path` itself, or `path/client.log` when `path` is a run directory.
pub fn client_log_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("client.log")
    } else {
        path.to_path_buf()
    }
}

/// Parse a client log. Malformed block lines are skipped with a warning, a
/// missing or unrecognised summary line fails the whole parse.
pub fn parse_client_log(path: &Path) -> Result<ClientLog> {
    let log_path = client_log_path(path);
    let text = read_lossy_to_string(&log_path).map_err(|e| TraceError::io(&log_path, e))?;
    let source_name = log_path.display().to_string();
    let lines: Vec<&str> = text.lines().collect();

    let Some((last, body)) = lines.split_last() else {
        return Err(TraceError::format(source_name, 1, "client log is empty"));
    };

    let mut blocks = Vec::new();
    for (idx, line) in body.iter().enumerate().skip(CLIENT_HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_client_block(line) {
            Some(block) => blocks.push(block),
            None => log_warn!(
                "{}:{}: client block line has unexpected format, skipped",
                source_name,
                idx + 1
            ),
        }
    }

    let stats = parse_client_stats(last).ok_or_else(|| {
        TraceError::format(
            source_name.clone(),
            lines.len(),
            "last line is not a 'connection closed' summary",
        )
    })?;

    Ok(ClientLog { blocks, stats })
}
