// Scaffolding run options
//
// Every user-facing knob of one pipeline run, with documented defaults. The
// CLI fills a `ScaffoldOpt` field by field; `validate` turns the plan string
// into a typed `Plan` before anything is executed.

use crate::defaults;
use crate::error::Result;
use crate::plan::Plan;
use crate::tools::split_options;
use std::path::PathBuf;

#[cfg(test)]
#[path = "scaffold_opt_test.rs"]
mod scaffold_opt_test;

#[derive(Debug, Clone)]
pub struct ScaffoldOpt {
    pub plan: String,         // Plan string, e.g. E3B1
    pub results_dir: PathBuf, // Root of all artifacts and logs

    // Optional stages
    pub preprocess: bool,  // Drop reads contained in contigs before scaffolding
    pub racon_start: bool, // Polish the input contigs once before the plan
    pub racon: bool,       // Polish after every graph scaffolding iteration
    pub racon_end: bool,   // Polish the plan result once at the end

    pub threads: usize, // Passed to the aligner and polisher as `-t N`

    // Pass-through option strings, split on whitespace
    pub aligner_options: String,
    pub ezra_options: String,
    pub bridger_options: String,
    pub racon_options: String,
}

impl Default for ScaffoldOpt {
    fn default() -> Self {
        Self {
            plan: defaults::PLAN.to_string(),
            results_dir: PathBuf::from(defaults::RESULTS_DIR),
            preprocess: false,
            racon_start: false,
            racon: false,
            racon_end: false,
            threads: num_cpus::get(),
            aligner_options: defaults::ALIGNER_OPTIONS.to_string(),
            ezra_options: defaults::EZRA_OPTIONS.to_string(),
            bridger_options: defaults::BRIDGER_OPTIONS.to_string(),
            racon_options: defaults::RACON_OPTIONS.to_string(),
        }
    }
}

impl ScaffoldOpt {
    /// Parse and check the plan; the only option that can be invalid
    pub fn validate(&self) -> Result<Plan> {
        Ok(Plan::parse(&self.plan)?)
    }

    /// Whether any polishing call site is enabled
    pub fn polishing_requested(&self) -> bool {
        self.racon_start || self.racon || self.racon_end
    }

    pub fn aligner_args(&self) -> Vec<String> {
        with_thread_flag(&self.aligner_options, self.threads)
    }

    pub fn racon_args(&self) -> Vec<String> {
        with_thread_flag(&self.racon_options, self.threads)
    }

    pub fn ezra_args(&self) -> Vec<String> {
        split_options(&self.ezra_options)
    }

    pub fn bridger_args(&self) -> Vec<String> {
        split_options(&self.bridger_options)
    }
}

/// `-t`, `-t<N>`, `--threads` or `--threads=<N>`
fn is_thread_flag(arg: &str) -> bool {
    if arg == "--threads" || arg.starts_with("--threads=") {
        return true;
    }
    match arg.strip_prefix("-t") {
        Some(count) => count.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Prepend `-t <threads>` unless the user already chose a thread count
fn with_thread_flag(options: &str, threads: usize) -> Vec<String> {
    let user = split_options(options);
    if user.iter().any(|a| is_thread_flag(a)) {
        return user;
    }
    let mut args = vec!["-t".to_string(), threads.to_string()];
    args.extend(user);
    args
}

/// Requested thread count clamped to `[1, 2 * cores]`
///
/// # Arguments
/// * `requested` - Value from the command line, `None` for all cores
pub fn resolve_threads(requested: Option<usize>) -> usize {
    let mut num_threads = requested.unwrap_or_else(num_cpus::get);

    if num_threads < 1 {
        log::warn!("Invalid thread count {}, using 1 thread", num_threads);
        num_threads = 1;
    }

    let max_threads = num_cpus::get() * 2;
    if num_threads > max_threads {
        log::warn!(
            "Thread count {} exceeds recommended maximum {}, capping at {}",
            num_threads,
            max_threads,
            max_threads
        );
        num_threads = max_threads;
    }

    num_threads
}
