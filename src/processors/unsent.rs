use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, TraceError};
use crate::models::{encode, IdScheme};
use crate::parsers::{read_results, ReadOutcome};
use crate::utils::count_newlines;
use crate::{log, log_warn};

/// Blocks of `0..block_count` missing from `received`, as
/// `(id, wire id)` pairs in ascending id order.
pub fn find_unsent(block_count: u64, received: impl IntoIterator<Item = u64>) -> Vec<(u64, u64)> {
    let received: HashSet<u64> = received.into_iter().collect();
    (0..block_count)
        .filter(|id| !received.contains(id))
        .map(|id| (id, encode(id)))
        .collect()
}

/// Unsent blocks of a run on disk.
///
/// The trace is only used for its line count. A result file that is missing
/// or unreadable counts as "nothing received".
pub fn find_unsent_in_files(
    result_path: &Path,
    trace_path: Option<&Path>,
    scheme: IdScheme,
) -> Result<Vec<(u64, u64)>> {
    let trace_path = trace_path.ok_or(TraceError::MissingArgument("trace file (-t/--trace)"))?;
    let block_count = count_newlines(trace_path).map_err(|e| TraceError::io(trace_path, e))?;

    let results = match read_results(result_path, scheme) {
        ReadOutcome::Ready(rows) => rows,
        other => {
            log_warn!(
                "result file {}: {}, treating every block as unsent",
                result_path.display(),
                other.describe()
            );
            Vec::new()
        }
    };

    log!(
        "{} blocks in trace, {} results in {}",
        block_count,
        results.len(),
        result_path.display()
    );
    Ok(find_unsent(block_count, results.iter().map(|r| r.block_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_set_difference() {
        let unsent = find_unsent(5, [0, 2, 4]);
        assert_eq!(unsent, vec![(1, encode(1)), (3, encode(3))]);
        assert_eq!(unsent, vec![(1, 9), (3, 17)]);
    }

    #[test]
    fn test_everything_received_or_nothing() {
        assert!(find_unsent(3, [2, 1, 0, 0]).is_empty());
        assert_eq!(find_unsent(2, []).len(), 2);
        // ids outside the trace do not matter
        assert_eq!(find_unsent(1, [5]), vec![(0, 5)]);
    }

    #[test]
    fn test_trace_is_required() {
        let err = find_unsent_in_files(Path::new("result.csv"), None, IdScheme::Stream).unwrap_err();
        assert!(matches!(err, TraceError::MissingArgument(_)));
    }

    #[test]
    fn test_three_block_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let trace_path = dir.path().join("trace.txt");
        let result_path = dir.path().join("result.csv");

        let mut trace = std::fs::File::create(&trace_path).unwrap();
        write!(trace, "0.1 200 1300 1\n0.1 200 1300 2\n0.1 200 1300 1\n").unwrap();

        let mut result = std::fs::File::create(&result_path).unwrap();
        writeln!(result, "block_id,bct,size,priority,deadline,duration").unwrap();
        writeln!(result, "{},120000,1300,1,200,5000", encode(0)).unwrap();
        writeln!(result, "{},130000,1300,1,200,9000", encode(2)).unwrap();

        let unsent =
            find_unsent_in_files(&result_path, Some(&trace_path), IdScheme::Stream).unwrap();
        assert_eq!(unsent, vec![(1, encode(1))]);
    }

    #[test]
    fn test_missing_result_file_means_all_unsent() {
        let dir = tempfile::tempdir().unwrap();
        let trace_path = dir.path().join("trace.txt");
        std::fs::write(&trace_path, "0.1 200 1300 1\n0.1 200 1300 2\n").unwrap();

        let unsent = find_unsent_in_files(
            &dir.path().join("missing.csv"),
            Some(&trace_path),
            IdScheme::Stream,
        )
        .unwrap();
        assert_eq!(unsent, vec![(0, 5), (1, 9)]);
    }
}
