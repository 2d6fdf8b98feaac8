mod block;
pub mod block_id;
mod log_event;
mod result;

pub use block::{Trace, TraceBlock};
pub use block_id::{encode, IdScheme};
pub use log_event::{BlockRecord, LogEvent, LogStatus};
pub use result::{BctUnit, ResultRow};
