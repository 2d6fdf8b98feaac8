mod csv;
pub mod plotters_charts;
mod statistics;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, TraceError};
use crate::parsers::FecSample;
use crate::processors::{BctHistogram, InTimeSeries, StatusBreakdown};

pub use self::csv::{save_client_blocks_csv, save_client_stats_csv, save_server_log_csv, server_log_csv_path};
pub use plotters_charts::PlottersConfig;
pub use statistics::{
    class_summary_lines, fec_lines, print_class_summary, print_histogram, print_status,
    print_total_time, print_unsent, qoe_line, status_lines,
};

pub fn save_intime_chart(series: &InTimeSeries, title: &str, path: &Path, config: &PlottersConfig) -> Result<()> {
    plotters_charts::draw_intime_chart(series, title, path, config).map_err(TraceError::Chart)
}

pub fn save_histogram_chart(hist: &BctHistogram, title: &str, path: &Path, config: &PlottersConfig) -> Result<()> {
    plotters_charts::draw_bct_histogram_chart(hist, title, path, config).map_err(TraceError::Chart)
}

pub fn save_status_chart(
    breakdown: &BTreeMap<u32, StatusBreakdown>,
    title: &str,
    path: &Path,
    config: &PlottersConfig,
) -> Result<()> {
    plotters_charts::draw_status_chart(breakdown, title, path, config).map_err(TraceError::Chart)
}

pub fn save_tunnel_chart(samples: &[FecSample], title: &str, path: &Path, config: &PlottersConfig) -> Result<()> {
    plotters_charts::draw_tunnel_chart(samples, title, path, config).map_err(TraceError::Chart)
}
