use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Hard failures that abort a command.
///
/// Soft conditions (a result file that is not written yet, a half-written
/// log) never end up here; the readers report them through
/// [`crate::parsers::ReadOutcome`].
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("{0} is required for this command")]
    MissingArgument(&'static str),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{source_name}:{line}: {reason}")]
    Format {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Output(#[from] io::Error),
}

impl TraceError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TraceError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(source_name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        TraceError::Format {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
