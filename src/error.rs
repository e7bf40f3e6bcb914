//! Error taxonomy for a job run. Every variant is terminal: nothing is retried and no
//! partial output is serialized.

use std::fmt;
use thiserror::Error;

/// Which phase a callback failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => f.write_str("map"),
            Phase::Reduce => f.write_str("reduce"),
        }
    }
}

#[derive(Error, Debug)]
pub enum JobError {
    /// Unknown format tag, or a record/argument shape that does not fit the job.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed or unreadable input.
    #[error("parse error in {source_id}{}: {message}", .line.map(|n| format!(" at line {n}")).unwrap_or_default())]
    Parse {
        source_id: String,
        line: Option<usize>,
        message: String,
    },

    /// A mapper or reducer returned an error.
    #[error("{phase} callback failed for {context}: {source}")]
    Callback {
        phase: Phase,
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// Writing serialized output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        JobError::Configuration(msg.into())
    }

    pub fn parse(source_id: impl Into<String>, line: Option<usize>, err: impl fmt::Display) -> Self {
        JobError::Parse { source_id: source_id.into(), line, message: err.to_string() }
    }

    /// Wrap a callback failure. Errors that already are a `JobError` (e.g. a record accessor's
    /// shape mismatch propagated with `?`) surface unchanged.
    pub(crate) fn from_callback(phase: Phase, context: impl Into<String>, err: anyhow::Error) -> Self {
        match err.downcast::<JobError>() {
            Ok(job_err) => job_err,
            Err(source) => JobError::Callback { phase, context: context.into(), source },
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, JobError::Configuration(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, JobError::Parse { .. })
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, JobError::Callback { .. })
    }
}
