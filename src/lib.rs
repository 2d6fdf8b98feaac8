pub mod error;
pub mod generator;
pub mod models;
pub mod output;
pub mod parsers;
pub mod processors;
pub mod realtime;
pub mod utils;

// 주요 기능 재내보내기(re-exporting)
pub use error::{Result, TraceError};
pub use models::{encode, BctUnit, IdScheme, ResultRow, Trace, TraceBlock};
pub use parsers::{parse_trace, read_results, read_server_log, ReadOutcome};
pub use processors::{find_unsent, intime_series, join};
