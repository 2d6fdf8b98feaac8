pub mod client_log;
mod outcome;
pub mod result;
pub mod server_log;
pub mod trace;
pub mod tunnel_log;

pub use client_log::{
    client_log_path, parse_client_log, parse_client_stats, ClientBlock, ClientLog, ClientStats,
};
pub use outcome::ReadOutcome;
pub use result::{parse_results, read_results};
pub use server_log::{
    aggregate_events, parse_log_line, read_server_events, read_server_log, read_server_log_csv,
    status_table,
};
pub use trace::{parse_trace, parse_trace_line, parse_trace_reader};
pub use tunnel_log::{parse_fec_line, read_tunnel_log, FecSample, FecState};
