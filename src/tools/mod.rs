//! External tool adapters.
//!
//! Each adapter turns a request over artifact paths into an [`Invocation`]:
//! - `aligner`: minimap2-style overlap computation (PAF on stdout)
//! - `scaffolder`: Bridger (graph) and Ezra (incremental) backends
//! - `polisher`: racon-style consensus polishing (FASTA on stdout)
//!
//! The tools themselves are opaque executables; nothing here inspects what
//! they compute.

pub mod aligner;
pub mod invocation;
pub mod polisher;
pub mod scaffolder;

pub use aligner::Aligner;
pub use invocation::{Invocation, ToolOutput};
pub use polisher::Polisher;
pub use scaffolder::{Bridger, Ezra, ScaffoldRequest, Scaffolder};

/// Split a pass-through option string into arguments
pub fn split_options(options: &str) -> Vec<String> {
    options.split_whitespace().map(str::to_string).collect()
}
