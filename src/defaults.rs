// src/defaults.rs

// Plan Constants
pub const PLAN: &str = "E3B1"; // Ezra three times, then Bridger once
pub const MAX_REPEAT: u32 = 9;

// Tool Option Constants
pub const ALIGNER_OPTIONS: &str = "-x ava-pb --dual=yes";
pub const EZRA_OPTIONS: &str = "-m"; // multithreading
pub const BRIDGER_OPTIONS: &str = "";
pub const RACON_OPTIONS: &str = "";

// Tool Layout (relative to the tools directory)
pub const MINIMAP2_PATH: &str = "minimap2/minimap2";
pub const EZRA_PATH: &str = "ezra/build/ezra";
pub const BRIDGER_PATH: &str = "bridger.py";
pub const RACON_PATH: &str = "racon/build/bin/racon";
pub const PYTHON: &str = "python";
pub const PYTHON_FALLBACK: &str = "python2";
pub const PYTHON_VERSION_PREFIX: &str = "Python 2.7";

// Environment overrides
pub const ENV_TOOLS_DIR: &str = "SCARA_TOOLS_DIR";
pub const ENV_MINIMAP2: &str = "SCARA_MINIMAP2";
pub const ENV_EZRA: &str = "SCARA_EZRA";
pub const ENV_BRIDGER: &str = "SCARA_BRIDGER";
pub const ENV_RACON: &str = "SCARA_RACON";
pub const ENV_PYTHON: &str = "SCARA_PYTHON";

// Results Layout
pub const RESULTS_DIR: &str = "scaffolding_results";
pub const FINAL_STEM: &str = "scara_scaffolds_final";
pub const FASTA_EXT: &str = "fasta";

pub const PREPROCESS_OVERLAPS: &str = "readsToContigs_preprocess.paf";
pub const PREPROCESS_LOG: &str = "Minimap2_r2c_preprocess.log";
pub const FILTERED_READS_STEM: &str = "reads_processed";
pub const FILTER_LOG: &str = "Containment_filter.log";

pub const READ_OVERLAPS: &str = "reads2reads_ovl.paf";
pub const READ_OVERLAPS_LOG: &str = "Minimap2_r2r.log";

pub const EZRA_OVERLAPS: &str = "readsToContigs.paf";
pub const BRIDGER_OVERLAPS: &str = "reads2contigs.paf";
pub const ITERATION_ALIGN_LOG: &str = "Minimap2_r2c.log";

// Polishing Layout
pub const POLISH_SUFFIX: &str = "_racon";
pub const FINAL_POLISH_SUFFIX: &str = "_racon_final";
pub const START_POLISH_OVERLAPS: &str = "readsToContigs_racon_start.paf";
pub const START_POLISH_ALIGN_LOG: &str = "Minimap2_r2c_racon_start.log";
pub const START_POLISH_LOG: &str = "Racon_initial.log";
pub const ITERATION_POLISH_OVERLAPS: &str = "readsToContigs_racon.paf";
pub const ITERATION_POLISH_ALIGN_LOG: &str = "Minimap2_r2c_racon.log";
pub const END_POLISH_OVERLAPS: &str = "readsToContigs_racon_final.paf";
pub const END_POLISH_ALIGN_LOG: &str = "Minimap2_r2c_racon_final.log";
pub const END_POLISH_LOG: &str = "Racon_final.log";

// Other Constants
pub const VERBOSITY: i32 = 3;
pub const CONTAINMENT_FRACTION: f64 = 0.5;
