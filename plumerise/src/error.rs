use chrono::NaiveDateTime;
use std::{path::PathBuf, process::ExitStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlumeRiseError {
    #[error("unknown value for PLUME_TOP_BEHAVIOR: {0}")]
    UnknownBehavior(String),

    #[error("unknown distribution mode: {0}")]
    UnknownDistribution(String),

    #[error("failed to start {tool:?}: {source}")]
    ToolSpawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool:?} exited with {status}: {stderr}")]
    ToolFailed {
        tool: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("plume file is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("plume file parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("plume file has {found} rows, expected one per hour ({expected})")]
    RowCount { expected: usize, found: usize },

    #[error("sounding at {timestamp}: {reason}")]
    Sounding {
        timestamp: NaiveDateTime,
        reason: &'static str,
    },
}
