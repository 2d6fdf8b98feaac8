use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::path::Path;

use super::outcome::ReadOutcome;
use crate::utils::open_lossy_reader;

lazy_static! {
    static ref FEC_RE: Regex = Regex::new(
        r"^\[INFO\] quiche: redundancy rate: (?P<redundancy>\d+\.\d+), rtt: (?P<rtt>\d+\.\d+), pacing_rate: (?P<pacing>\d+\.\d+), remaining_time:\s*(?P<remaining>\d+(?:\.\d+)?), predict_loss_rate: (?P<loss>\d+(?:\.\d+)?), FEC: (?P<fec>\d) (?P<note>[ \w]+)"
    )
    .unwrap();
}

/// FEC decision reported by the tunnel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecState {
    /// FEC on because the remaining time is short
    TimeShort,
    /// FEC on because bandwidth is plentiful
    BandwidthAmple,
    Disabled,
    Unknown(u8),
}

impl FecState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => FecState::TimeShort,
            1 => FecState::BandwidthAmple,
            2 => FecState::Disabled,
            other => FecState::Unknown(other),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            FecState::TimeShort => "enabled (time short)".to_string(),
            FecState::BandwidthAmple => "enabled (bandwidth ample)".to_string(),
            FecState::Disabled => "disabled".to_string(),
            FecState::Unknown(code) => format!("unknown state {code}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FecSample {
    pub redundancy_rate: f64,
    pub rtt: f64,
    pub pacing_rate: f64,
    pub remaining_time: f64,
    pub predict_loss_rate: f64,
    pub fec: FecState,
    pub note: String,
}

pub fn parse_fec_line(line: &str) -> Option<FecSample> {
    let caps = FEC_RE.captures(line)?;
    Some(FecSample {
        redundancy_rate: caps["redundancy"].parse().ok()?,
        rtt: caps["rtt"].parse().ok()?,
        pacing_rate: caps["pacing"].parse().ok()?,
        remaining_time: caps["remaining"].parse().ok()?,
        predict_loss_rate: caps["loss"].parse().ok()?,
        fec: FecState::from_code(caps["fec"].parse().ok()?),
        note: caps["note"].trim().to_string(),
    })
}

/// Collect every FEC status line of a tunnel log.
pub fn read_tunnel_log(path: &Path) -> ReadOutcome<Vec<FecSample>> {
    let reader = match open_lossy_reader(path, 1 << 16) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::NotYetAvailable,
        Err(e) => return ReadOutcome::Malformed(format!("cannot read {}: {e}", path.display())),
    };

    let mut samples = Vec::new();
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if let Some(sample) = parse_fec_line(&line) {
                    samples.push(sample);
                }
            }
            Err(e) => return ReadOutcome::Malformed(format!("read error: {e}")),
        }
    }
    ReadOutcome::Ready(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LINE: &str = "[INFO] quiche: redundancy rate: 0.25, rtt: 35.20, pacing_rate: 1200.50, remaining_time: 80, predict_loss_rate: 0.03, FEC: 1 bandwidth ample";

    #[test]
    fn test_parse_fec_line() {
        let sample = parse_fec_line(LINE).unwrap();
        assert_eq!(sample.redundancy_rate, 0.25);
        assert_eq!(sample.rtt, 35.2);
        assert_eq!(sample.remaining_time, 80.0);
        assert_eq!(sample.predict_loss_rate, 0.03);
        assert_eq!(sample.fec, FecState::BandwidthAmple);
        assert_eq!(sample.note, "bandwidth ample");
    }

    #[test]
    fn test_unknown_state_kept() {
        let line = LINE.replace("FEC: 1", "FEC: 7");
        assert_eq!(parse_fec_line(&line).unwrap().fec, FecState::Unknown(7));
    }

    #[test]
    fn test_read_tunnel_log() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[INFO] quiche: handshake done").unwrap();
        writeln!(file, "{LINE}").unwrap();
        writeln!(file, "{}", LINE.replace("FEC: 1 bandwidth ample", "FEC: 2 off")).unwrap();
        file.flush().unwrap();

        let samples = read_tunnel_log(file.path()).into_table();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].fec, FecState::Disabled);

        assert_eq!(
            read_tunnel_log(Path::new("/nonexistent/tunnel.log")),
            ReadOutcome::NotYetAvailable
        );
    }
}
