// Overlap aligner adapter (minimap2 command line)

use super::Invocation;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Aligner {
    exe: PathBuf,
    options: Vec<String>,
}

impl Aligner {
    pub fn new(exe: impl Into<PathBuf>, options: Vec<String>) -> Self {
        Self {
            exe: exe.into(),
            options,
        }
    }

    /// Map `query` sequences onto `target`, writing the PAF table to `output`
    ///
    /// Reads-vs-contigs passes contigs as target; reads-vs-reads passes the
    /// same read file twice.
    pub fn overlaps(&self, target: &Path, query: &Path, output: &Path) -> Invocation {
        Invocation::new(&self.exe)
            .args(&self.options)
            .arg(target)
            .arg(query)
            .stdout_to(output)
    }
}
