use std::collections::BTreeMap;

use crate::parsers::FecSample;
use crate::processors::{BctHistogram, ClassSummary, QoeAccumulator, StatusBreakdown, TotalTime};

const NOT_AVAILABLE: &str = "N/A";

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn fmt_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Per-class table: arrival rate plus BCT statistics.
pub fn class_summary_lines(summaries: &BTreeMap<u32, ClassSummary>) -> Vec<String> {
    let mut lines = vec!["Class\tBlocks\tInTime\tArrival\tAvg\tMin\tMedian\tMax\tStd\t99th".to_string()];
    for summary in summaries.values() {
        let bct = &summary.bct;
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            summary.priority,
            summary.total,
            summary.intime,
            fmt_percent(summary.arrival_rate()),
            fmt_opt(bct.mean(), 3),
            fmt_opt(bct.min(), 3),
            fmt_opt(bct.median(), 3),
            fmt_opt(bct.max(), 3),
            fmt_opt(bct.std_dev(), 3),
            fmt_opt(bct.percentile(99.0), 3),
        ));
    }
    lines
}

pub fn qoe_line(qoe: &QoeAccumulator, placeholder: f64) -> String {
    format!(
        "QoE: {:.3} / {:.3} ({:.1}%)",
        qoe.qoe,
        qoe.max,
        qoe.ratio(placeholder) * 100.0
    )
}

pub fn status_lines(breakdown: &BTreeMap<u32, StatusBreakdown>) -> Vec<String> {
    let mut lines = vec!["Class\tComplete\tCancelled\tWaiting\tTotal".to_string()];
    for (class, counts) in breakdown {
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}",
            class,
            counts.complete,
            counts.cancelled,
            counts.waiting,
            counts.total()
        ));
    }
    lines
}

pub fn fec_lines(samples: &[FecSample]) -> Vec<String> {
    let Some(last) = samples.last() else {
        return vec![format!("RTT: {NOT_AVAILABLE}\tLoss: {NOT_AVAILABLE}\tFEC: {NOT_AVAILABLE}")];
    };
    vec![
        format!("Samples: {}", samples.len()),
        format!(
            "RTT: {:.3} ms\tLoss: {:.3}\tRedundancy: {:.3}\tPacing: {:.1}",
            last.rtt, last.predict_loss_rate, last.redundancy_rate, last.pacing_rate
        ),
        format!(
            "Remaining: {:.1} ms\tFEC: {} ({})",
            last.remaining_time,
            last.fec.display_name(),
            last.note
        ),
    ]
}

pub fn print_class_summary(summaries: &BTreeMap<u32, ClassSummary>, qoe: &QoeAccumulator, placeholder: f64) {
    println!("\n[Block completion by priority class]");
    for line in class_summary_lines(summaries) {
        println!("{line}");
    }
    println!("{}", qoe_line(qoe, placeholder));
}

pub fn print_unsent(unsent: &[(u64, u64)]) {
    println!("Unsent blocks: {}", unsent.len());
    if unsent.is_empty() {
        return;
    }
    println!("BlockID\tWireID");
    for (id, wire) in unsent {
        println!("{id}\t{wire}");
    }
}

pub fn print_total_time(total: Option<&TotalTime>) {
    match total {
        Some(total) => {
            println!("Completed blocks: {}", total.completed);
            println!(
                "First completion: {} us, last completion: {} us",
                total.first_completion_us, total.last_completion_us
            );
            println!("Total time: {:.3} s", total.span_us() as f64 / 1_000_000.0);
            println!("Max BCT: {:.3}", total.max_bct);
        }
        None => println!("Completed blocks: 0\tTotal time: {NOT_AVAILABLE}"),
    }
}

pub fn print_histogram(hist: &BctHistogram) {
    println!("\n[BCT distribution, {} ms buckets]", hist.bucket_ms);
    let classes: Vec<String> = hist.counts.keys().map(|c| format!("P{c}")).collect();
    println!("Range (ms)\t{}", classes.join("\t"));
    for idx in 0..hist.bucket_count() {
        let (low, high) = hist.bounds(idx);
        let counts: Vec<String> = hist
            .counts
            .values()
            .map(|c| c.get(idx).copied().unwrap_or(0).to_string())
            .collect();
        println!("{low:.1}-{high:.1}\t{}", counts.join("\t"));
    }
    if hist.has_overflow() {
        let (low, _) = hist.bounds(hist.bucket_count());
        let counts: Vec<String> = hist.overflow.values().map(usize::to_string).collect();
        println!(">={low:.1}\t{}", counts.join("\t"));
    }
}

pub fn print_status(breakdown: &BTreeMap<u32, StatusBreakdown>) {
    for line in status_lines(breakdown) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::BctStats;

    #[test]
    fn test_empty_class_prints_placeholders() {
        let mut summaries = BTreeMap::new();
        summaries.insert(
            2,
            ClassSummary {
                priority: 2,
                total: 0,
                intime: 0,
                bct: BctStats::new(),
            },
        );
        let lines = class_summary_lines(&summaries);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2\t0\t0\tN/A\tN/A"));
    }

    #[test]
    fn test_arrival_rate_as_percent() {
        let mut bct = BctStats::new();
        bct.add(10.0);
        let summary = ClassSummary {
            priority: 1,
            total: 10,
            intime: 7,
            bct,
        };
        let lines = class_summary_lines(&BTreeMap::from([(1, summary)]));
        assert!(lines[1].contains("70.0%"));
    }

    #[test]
    fn test_fec_lines_without_samples() {
        let lines = fec_lines(&[]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("N/A"));
    }
}
