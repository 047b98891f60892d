// Stage cache: the filesystem is the only persistence layer
//
// Every stage owns a deterministic output path. If that path exists the stage
// is skipped; otherwise the action runs and its captured text is written to
// the stage log. Re-running the pipeline on the same results directory thus
// resumes at the first stage whose output is missing.
//
// The existence check is not atomic with the write: one driver process per
// results directory is assumed.

use crate::error::{IoContext, Result};
use crate::tools::ToolOutput;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "stage_cache_test.rs"]
mod stage_cache_test;

/// Outcome of one cache-checked stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// Output already present, action not invoked
    Skipped(PathBuf),
    /// Action ran; `outcome` holds its exit state and captured log text
    Executed {
        output: PathBuf,
        log_path: PathBuf,
        outcome: ToolOutput,
    },
}

impl StageResult {
    pub fn output(&self) -> &Path {
        match self {
            StageResult::Skipped(path) => path,
            StageResult::Executed { output, .. } => output,
        }
    }

    pub fn was_executed(&self) -> bool {
        matches!(self, StageResult::Executed { .. })
    }

    /// False only for an executed stage whose action reported failure
    pub fn succeeded(&self) -> bool {
        match self {
            StageResult::Skipped(_) => true,
            StageResult::Executed { outcome, .. } => outcome.success,
        }
    }
}

/// Stage counters for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    pub executed: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct StageCache {
    stats: StageStats,
}

impl StageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `exists(output) => skip` without touching the action
    pub fn is_cached(&self, output: &Path) -> bool {
        output.exists()
    }

    /// Run `action` unless `output` already exists
    ///
    /// # Arguments
    /// * `stage` - Human readable stage name used in log messages
    /// * `output` - Artifact the action is expected to produce
    /// * `log_path` - Where the action's captured text is persisted
    /// * `action` - The stage body; errors from it are propagated unchanged
    ///
    /// The log is written even when the action reports failure, so the
    /// caller can point at it.
    pub fn run_cached<F>(
        &mut self,
        stage: &str,
        output: &Path,
        log_path: &Path,
        action: F,
    ) -> Result<StageResult>
    where
        F: FnOnce() -> Result<ToolOutput>,
    {
        if self.is_cached(output) {
            log::info!("{} found: {}", stage, output.display());
            self.stats.skipped += 1;
            return Ok(StageResult::Skipped(output.to_path_buf()));
        }

        let outcome = action()?;
        self.stats.executed += 1;

        fs::write(log_path, &outcome.log)
            .with_io_context(|| format!("failed to write log {}", log_path.display()))?;

        log::debug!(
            "{} finished with {} ({} bytes of log)",
            stage,
            outcome.status_text(),
            outcome.log.len()
        );

        Ok(StageResult::Executed {
            output: output.to_path_buf(),
            log_path: log_path.to_path_buf(),
            outcome,
        })
    }

    pub fn stats(&self) -> StageStats {
        self.stats
    }
}
