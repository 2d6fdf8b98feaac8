pub mod intime;
pub mod join;
pub mod summary;
pub mod unsent;

pub use intime::{intime_series, InTimeSeries};
pub use join::{join, JoinedRow};
pub use summary::{
    arrival_rate_by_class, bct_histogram, mean_bct_by_class, qoe_score, status_breakdown,
    summarize_by_class, total_time, BctHistogram, BctStats, ClassSummary, QoeAccumulator,
    StatusBreakdown, TotalTime,
};
pub use unsent::{find_unsent, find_unsent_in_files};
