pub mod config; // Tool discovery and the immutable run configuration
pub mod containment; // Contained-read filter
pub mod defaults;
pub mod error;
pub mod io; // FASTA/FASTQ and PAF readers, format-preserving writer
pub mod pipeline;
pub mod plan; // Scaffolding plan grammar
pub mod scaffold_opt;
pub mod stage_cache; // exists => skip
pub mod tools; // External tool adapters

pub use config::{PipelineConfig, ToolPaths};
pub use error::{Result, ScaraError};
pub use pipeline::{Pipeline, PipelineReport};
pub use plan::Plan;
pub use scaffold_opt::ScaffoldOpt;
