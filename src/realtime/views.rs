use std::path::PathBuf;

use super::playback::PlaybackClock;
use crate::error::Result;
use crate::log_warn;
use crate::models::Trace;
use crate::output::{self, PlottersConfig};
use crate::parsers::{read_results, read_server_events, read_tunnel_log, status_table, ReadOutcome};
use crate::processors::{intime_series, join, qoe_score, status_breakdown, summarize_by_class};
use crate::utils::AnalysisConfig;

/// One refresh of a live view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub lines: Vec<String>,
    /// Playback has shown every row, the loop may stop
    pub finished: bool,
}

/// Something the dashboard redraws on every tick. Inputs are re-read and all
/// values recomputed from scratch each time.
pub trait LiveView {
    fn title(&self) -> &str;
    fn refresh(&mut self, clock: &PlaybackClock) -> Result<Frame>;
}

/// Surface a soft read failure as a warning plus a console line, and carry
/// on with an empty table.
fn soft_table<T: Default>(outcome: ReadOutcome<T>, what: &str, lines: &mut Vec<String>) -> T {
    match outcome {
        ReadOutcome::Ready(table) => table,
        ReadOutcome::NotYetAvailable => {
            lines.push(format!("{what}: waiting for data"));
            T::default()
        }
        ReadOutcome::Malformed(reason) => {
            log_warn!("{}: {}", what, reason);
            lines.push(format!("{what}: malformed ({reason})"));
            T::default()
        }
    }
}

/// In-time ratio per class from a growing result file (`live`).
pub struct IntimeView {
    title: String,
    trace: Trace,
    result_path: PathBuf,
    config: AnalysisConfig,
    chart_path: Option<PathBuf>,
    plot_config: PlottersConfig,
}

impl IntimeView {
    pub fn new(
        title: String,
        trace: Trace,
        result_path: PathBuf,
        config: AnalysisConfig,
        chart_path: Option<PathBuf>,
    ) -> Self {
        let plot_config = PlottersConfig::from_analysis(&config);
        Self {
            title,
            trace,
            result_path,
            config,
            chart_path,
            plot_config,
        }
    }
}

impl LiveView for IntimeView {
    fn title(&self) -> &str {
        &self.title
    }

    fn refresh(&mut self, clock: &PlaybackClock) -> Result<Frame> {
        let mut lines = Vec::new();
        let outcome = read_results(&self.result_path, self.config.result_id_scheme);
        let rows = soft_table(outcome, "result file", &mut lines);

        let visible = clock.visible_results(&rows);
        let joined = join(&self.trace, &visible, self.config.bct_unit);
        let series = intime_series(&joined, &self.config.classes, self.config.default_ratio);
        let summaries = summarize_by_class(&joined, &self.config.classes);
        let qoe = qoe_score(&joined);

        lines.push(format!(
            "Blocks: {} in trace, {} visible of {} received",
            self.trace.len(),
            visible.len(),
            rows.len()
        ));
        for &class in &self.config.classes {
            let ratio = series.last_ratio(class).unwrap_or(self.config.default_ratio);
            lines.push(format!("Priority {class} in-time ratio: {:.1}%", ratio * 100.0));
        }
        lines.extend(output::class_summary_lines(&summaries));
        lines.push(output::qoe_line(&qoe, self.config.default_ratio));

        if let Some(path) = &self.chart_path {
            output::save_intime_chart(&series, &self.title, path, &self.plot_config)?;
        }

        Ok(Frame {
            lines,
            finished: clock.is_exhausted(&rows),
        })
    }
}

/// Complete / cancelled / waiting counts from the transport log or its
/// normalized `.csv` (`live_server`).
pub struct ServerView {
    title: String,
    trace: Trace,
    log_path: PathBuf,
    classes: Vec<u32>,
    chart_path: Option<PathBuf>,
    plot_config: PlottersConfig,
}

impl ServerView {
    pub fn new(
        title: String,
        trace: Trace,
        log_path: PathBuf,
        config: &AnalysisConfig,
        chart_path: Option<PathBuf>,
    ) -> Self {
        Self {
            title,
            trace,
            log_path,
            classes: config.classes.clone(),
            chart_path,
            plot_config: PlottersConfig::from_analysis(config),
        }
    }
}

impl LiveView for ServerView {
    fn title(&self) -> &str {
        &self.title
    }

    fn refresh(&mut self, clock: &PlaybackClock) -> Result<Frame> {
        let mut lines = Vec::new();
        let events = soft_table(read_server_events(&self.log_path), "server log", &mut lines);
        let visible = clock.visible_events(&events);
        let breakdown = status_breakdown(&self.trace, &status_table(&visible), &self.classes);

        lines.push(format!(
            "Events: {} visible of {}, {} blocks in trace",
            visible.len(),
            events.len(),
            self.trace.len()
        ));
        lines.extend(output::status_lines(&breakdown));

        if let Some(path) = &self.chart_path {
            output::save_status_chart(&breakdown, &self.title, path, &self.plot_config)?;
        }

        let finished = clock.is_playback() && !events.is_empty() && visible.len() == events.len();
        Ok(Frame { lines, finished })
    }
}

/// RTT, loss-rate prediction and FEC state from the tunnel log (`tunnel`).
pub struct TunnelView {
    title: String,
    log_path: PathBuf,
    chart_path: Option<PathBuf>,
    plot_config: PlottersConfig,
}

impl TunnelView {
    pub fn new(
        title: String,
        log_path: PathBuf,
        config: &AnalysisConfig,
        chart_path: Option<PathBuf>,
    ) -> Self {
        Self {
            title,
            log_path,
            chart_path,
            plot_config: PlottersConfig::from_analysis(config),
        }
    }
}

impl LiveView for TunnelView {
    fn title(&self) -> &str {
        &self.title
    }

    fn refresh(&mut self, _clock: &PlaybackClock) -> Result<Frame> {
        let mut lines = Vec::new();
        let samples = soft_table(read_tunnel_log(&self.log_path), "tunnel log", &mut lines);
        lines.extend(output::fec_lines(&samples));

        if let Some(path) = &self.chart_path {
            output::save_tunnel_chart(&samples, &self.title, path, &self.plot_config)?;
        }

        Ok(Frame {
            lines,
            finished: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{encode, TraceBlock};
    use std::io::Write;

    fn trace() -> Trace {
        let blocks = (0..4)
            .map(|id| TraceBlock {
                id,
                gap: 0.1,
                start: 0.1 * (id + 1) as f64,
                deadline: 200,
                size: 1300,
                priority: if id < 2 { 1 } else { 2 },
            })
            .collect();
        Trace::new(blocks)
    }

    #[test]
    fn test_intime_view_waits_for_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = IntimeView::new(
            "test".to_string(),
            trace(),
            dir.path().join("result.csv"),
            AnalysisConfig::default(),
            None,
        );
        let frame = view.refresh(&PlaybackClock::live(500)).unwrap();
        assert!(!frame.finished);
        assert!(frame.lines[0].contains("waiting"));
        assert!(frame.lines.iter().any(|l| l.contains("Priority 2 in-time ratio: 100.0%")));
    }

    #[test]
    fn test_intime_view_playback_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let result_path = dir.path().join("result.csv");
        let mut file = std::fs::File::create(&result_path).unwrap();
        writeln!(file, "block_id,bct,size,priority,deadline,duration").unwrap();
        writeln!(file, "{},150000,1300,1,200,1000000", encode(0)).unwrap();
        writeln!(file, "{},250000,1300,1,200,1300000", encode(1)).unwrap();

        let mut view = IntimeView::new(
            "test".to_string(),
            trace(),
            result_path,
            AnalysisConfig::default(),
            None,
        );
        let mut clock = PlaybackClock::new(500, true);
        let first = view.refresh(&clock).unwrap();
        assert!(!first.finished);
        assert!(first.lines.iter().any(|l| l.contains("Priority 1 in-time ratio: 100.0%")));

        clock.advance();
        let second = view.refresh(&clock).unwrap();
        assert!(second.finished);
        assert!(second.lines.iter().any(|l| l.contains("Priority 1 in-time ratio: 50.0%")));
    }

    #[test]
    fn test_server_view_counts_statuses() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("server.log");
        std::fs::write(
            &log_path,
            "[INFO] quiche: stream 5 send complete,100\n\
             [INFO] quiche::scheduler::dtp_scheduler: block 13 is canceled, passed 210,300\n",
        )
        .unwrap();

        let mut view = ServerView::new(
            "server".to_string(),
            trace(),
            log_path,
            &AnalysisConfig::default(),
            None,
        );
        let frame = view.refresh(&PlaybackClock::live(500)).unwrap();
        assert!(frame.lines.contains(&"1\t1\t0\t1\t2".to_string()));
        assert!(frame.lines.contains(&"2\t0\t1\t1\t2".to_string()));
    }
}
