pub mod config;
pub mod constants;
pub mod encoding;
pub mod lines;
pub mod logger;

pub use self::config::{parse_classes, AnalysisConfig};
pub use self::encoding::{open_lossy_reader, read_lossy_to_string};
pub use self::lines::count_newlines;
pub use self::logger::Logger;
