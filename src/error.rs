// Error taxonomy for the scaffolding pipeline
//
// Configuration and tool problems are reported before any stage runs.
// Stage failures abort the run and point at the log of the failed stage.

use crate::plan::PlanError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScaraError>;

#[derive(Debug, Error)]
pub enum ScaraError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{tool} executable not found: {}", path.display())]
    ToolUnavailable { tool: &'static str, path: PathBuf },

    #[error("this pipeline requires {required} to run the Bridger script; cannot find an appropriate {runtime}")]
    RuntimeUnavailable {
        runtime: String,
        required: &'static str,
    },

    #[error("input file does not exist: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("stage '{stage}' failed ({status}); see {}", log.display())]
    StageFailed {
        stage: String,
        status: String,
        log: PathBuf,
    },

    #[error("malformed overlap record in {} line {line}: {reason}", path.display())]
    OverlapParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("error reading sequences from {}: {reason}", path.display())]
    Sequence { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ScaraError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ScaraError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach a context message to an `io::Result`, like `anyhow::Context` but typed
pub(crate) trait IoContext<T> {
    fn with_io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn with_io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| ScaraError::io(f(), e))
    }
}
