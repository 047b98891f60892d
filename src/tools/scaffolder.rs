// Scaffolder backends
//
// Both backends take the current contigs, the read set and a reads-vs-contigs
// overlap file, and emit a new contig set:
// - Ezra extends contigs incrementally and prints scaffolds on stdout
// - Bridger rebuilds scaffolds from a read graph, needs the reads-vs-reads
//   overlaps as well, and writes its own output file (or none at all when it
//   has nothing to do). It is pointed at `<output>.partial`, which the
//   invocation moves into place after a clean exit

use super::Invocation;
use crate::defaults;
use crate::plan::OperationKind;
use std::path::{Path, PathBuf};

/// Inputs of one scaffolding iteration
#[derive(Debug, Clone, Copy)]
pub struct ScaffoldRequest<'a> {
    pub contigs: &'a Path,
    pub reads: &'a Path,
    pub contig_overlaps: &'a Path,       // reads-vs-contigs, fresh for this iteration
    pub read_overlaps: Option<&'a Path>, // reads-vs-reads, computed once per run
}

pub trait Scaffolder {
    /// Tool name used in stage names and log file names
    fn name(&self) -> &'static str;

    /// File name of the per-iteration reads-vs-contigs overlaps
    fn overlaps_file(&self) -> &'static str;

    /// Command producing scaffolds for `request` at `output`
    fn invocation(&self, request: &ScaffoldRequest<'_>, output: &Path) -> Invocation;

    /// Whether a clean exit without an output file means "nothing to do"
    fn allows_empty_result(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct Ezra {
    exe: PathBuf,
    options: Vec<String>,
}

impl Ezra {
    pub fn new(exe: impl Into<PathBuf>, options: Vec<String>) -> Self {
        Self {
            exe: exe.into(),
            options,
        }
    }
}

impl Scaffolder for Ezra {
    fn name(&self) -> &'static str {
        OperationKind::IncrementalScaffold.tool_name()
    }

    fn overlaps_file(&self) -> &'static str {
        defaults::EZRA_OVERLAPS
    }

    fn invocation(&self, request: &ScaffoldRequest<'_>, output: &Path) -> Invocation {
        Invocation::new(&self.exe)
            .arg("-r")
            .arg(request.reads)
            .arg("-c")
            .arg(request.contigs)
            .arg("-o")
            .arg(request.contig_overlaps)
            .args(&self.options)
            .stdout_to(output)
    }
}

#[derive(Debug, Clone)]
pub struct Bridger {
    script: PathBuf,
    interpreter: Option<PathBuf>, // Set when the scaffolder is a Python script
    options: Vec<String>,
}

impl Bridger {
    pub fn new(script: impl Into<PathBuf>, interpreter: Option<PathBuf>, options: Vec<String>) -> Self {
        Self {
            script: script.into(),
            interpreter,
            options,
        }
    }

    /// A `.py` Bridger needs an interpreter; anything else is run directly
    pub fn needs_interpreter(script: &Path) -> bool {
        script
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("py"))
    }
}

impl Scaffolder for Bridger {
    fn name(&self) -> &'static str {
        OperationKind::GraphScaffold.tool_name()
    }

    fn overlaps_file(&self) -> &'static str {
        defaults::BRIDGER_OVERLAPS
    }

    fn invocation(&self, request: &ScaffoldRequest<'_>, output: &Path) -> Invocation {
        let inv = match &self.interpreter {
            Some(python) => Invocation::new(python).arg(&self.script),
            None => Invocation::new(&self.script),
        };

        let mut inv = inv
            .arg("scaffold")
            .arg(request.contigs)
            .arg(request.reads)
            .arg(request.contig_overlaps);
        if let Some(read_overlaps) = request.read_overlaps {
            inv = inv.arg(read_overlaps);
        }
        inv.arg("-o").output_arg(output).args(&self.options)
    }

    fn allows_empty_result(&self) -> bool {
        true
    }
}
