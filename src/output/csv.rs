use csv::Writer;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, TraceError};
use crate::models::BlockRecord;
use crate::parsers::{ClientBlock, ClientStats};

fn create_writer(path: &Path) -> Result<Writer<File>> {
    let file = File::create(path).map_err(|e| TraceError::io(path, e))?;
    Ok(Writer::from_writer(file))
}

fn optional_cell(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Default output of `log2csv`: `<log>.csv` next to the log.
pub fn server_log_csv_path(log_path: &Path) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(".csv");
    PathBuf::from(name)
}

/// Write the normalized server log. Ids stay as the transport printed them;
/// absent fields are empty cells.
pub fn save_server_log_csv(records: &[BlockRecord], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writer.write_record(["block_id", "start", "complete", "cancelled", "cancelled_passed"])?;

    for record in records {
        writer.write_record(&[
            record.wire_id.to_string(),
            optional_cell(record.start),
            optional_cell(record.complete),
            optional_cell(record.cancelled),
            optional_cell(record.cancelled_passed),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// `blocks.csv` of the client log converter.
pub fn save_client_blocks_csv(blocks: &[ClientBlock], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writer.write_record(["BlockID", "bct", "BlockSize", "Priority", "Deadline"])?;

    for block in blocks {
        writer.write_record(&[
            block.block_id.to_string(),
            block.bct.to_string(),
            block.block_size.to_string(),
            block.priority.to_string(),
            block.deadline.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// `stats.csv` of the client log converter, a single row.
pub fn save_client_stats_csv(stats: &ClientStats, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;
    // header comes from the serde renames
    writer.serialize(stats)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_log_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log.csv");
        let records = vec![
            BlockRecord {
                wire_id: 9,
                start: Some(100),
                complete: Some(400),
                ..Default::default()
            },
            BlockRecord {
                wire_id: 13,
                cancelled: Some(900),
                cancelled_passed: Some(238),
                ..Default::default()
            },
        ];

        save_server_log_csv(&records, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "block_id,start,complete,cancelled,cancelled_passed");
        assert_eq!(lines[1], "9,100,400,,");
        assert_eq!(lines[2], "13,,,900,238");
    }

    #[test]
    fn test_default_csv_path() {
        assert_eq!(
            server_log_csv_path(Path::new("runs/server.log")),
            PathBuf::from("runs/server.log.csv")
        );
    }

    #[test]
    fn test_client_csvs() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = vec![ClientBlock {
            block_id: 5,
            bct: 42.5,
            block_size: 1350,
            priority: 1,
            deadline: 200,
        }];
        let stats = ClientStats {
            c_recv: 10,
            c_sent: 8,
            c_lost: 0,
            c_rtt_ms: 12.5,
            c_cwnd: 13500,
            c_total_bytes: 4000,
            c_complete_bytes: 3000,
            c_good_bytes: 2500,
            c_total_time_us: 123456,
            qoe: -1.0,
            retry_times: -1,
        };

        let blocks_path = dir.path().join("blocks.csv");
        let stats_path = dir.path().join("stats.csv");
        save_client_blocks_csv(&blocks, &blocks_path).unwrap();
        save_client_stats_csv(&stats, &stats_path).unwrap();

        let blocks_text = std::fs::read_to_string(&blocks_path).unwrap();
        assert_eq!(blocks_text, "BlockID,bct,BlockSize,Priority,Deadline\n5,42.5,1350,1,200\n");

        let stats_text = std::fs::read_to_string(&stats_path).unwrap();
        let mut lines = stats_text.lines();
        assert_eq!(
            lines.next(),
            Some("c_recv,c_sent,c_lost,c_rtt(ms),c_cwnd,c_total_bytes,c_complete_bytes,c_good_bytes,c_total_time(us),qoe,retry_times")
        );
        assert_eq!(lines.next(), Some("10,8,0,12.5,13500,4000,3000,2500,123456,-1.0,-1"));
    }
}
