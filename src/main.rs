use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use scara::scaffold_opt::resolve_threads;
use scara::{defaults, Pipeline, PipelineConfig, PipelineReport, ScaffoldOpt, ToolPaths};

#[derive(Parser)]
#[command(name = "scara")]
#[command(about = "ScaRa - Scaffolding with Reads: iterative contig scaffolding using long reads", long_about = None)]
#[command(version)]
struct Cli {
    /// Input contigs (FASTA)
    #[arg(value_name = "CONTIGS.FA")]
    contigs: PathBuf,

    /// Input long reads (FASTA or FASTQ, optionally gzipped)
    #[arg(value_name = "READS.FQ")]
    reads: PathBuf,

    // ===== Pipeline Options =====
    /// Scaffolding plan: pairs of operation code and iteration count.
    /// E = Ezra (incremental), B = Bridger (graph); counts 1-9.
    /// For example E3B2 runs Ezra three times, then Bridger twice.
    #[arg(short = 'p', long, value_name = "PLAN", default_value = defaults::PLAN)]
    plan: String,

    /// Folder for intermediate and final results
    #[arg(short = 'r', long, value_name = "DIR", default_value = defaults::RESULTS_DIR)]
    results: PathBuf,

    /// Remove reads contained in the contigs before scaffolding
    #[arg(long)]
    preprocess: bool,

    /// Run racon after each Bridger iteration, before proceeding
    #[arg(long)]
    racon: bool,

    /// Run racon on the input contigs before scaffolding
    #[arg(long = "racon-start")]
    racon_start: bool,

    /// Run racon on the final scaffolds, after all scaffolding iterations
    #[arg(long = "racon-end")]
    racon_end: bool,

    // ===== Tool Options (passed through verbatim) =====
    /// Options for minimap2
    #[arg(long = "MM2Options", value_name = "STR", default_value = defaults::ALIGNER_OPTIONS, allow_hyphen_values = true)]
    aligner_options: String,

    /// Options for Ezra
    #[arg(long = "EOptions", value_name = "STR", default_value = defaults::EZRA_OPTIONS, allow_hyphen_values = true)]
    ezra_options: String,

    /// Options for Bridger
    #[arg(long = "POptions", value_name = "STR", default_value = defaults::BRIDGER_OPTIONS, allow_hyphen_values = true)]
    bridger_options: String,

    /// Options for racon
    #[arg(long = "ROptions", value_name = "STR", default_value = defaults::RACON_OPTIONS, allow_hyphen_values = true)]
    racon_options: String,

    /// Number of threads for minimap2 and racon (default: all available cores)
    #[arg(short = 't', long, value_name = "INT")]
    threads: Option<usize>,

    // ===== Tool Locations =====
    /// Directory holding the bundled tools (default: next to this executable)
    #[arg(long = "tools-dir", value_name = "DIR")]
    tools_dir: Option<PathBuf>,

    /// minimap2 executable
    #[arg(long, value_name = "FILE")]
    minimap2: Option<PathBuf>,

    /// Ezra executable
    #[arg(long, value_name = "FILE")]
    ezra: Option<PathBuf>,

    /// Bridger script or executable
    #[arg(long, value_name = "FILE")]
    bridger: Option<PathBuf>,

    /// racon executable
    #[arg(long = "racon-bin", value_name = "FILE")]
    racon_bin: Option<PathBuf>,

    /// Python 2.7 interpreter for a Bridger script
    #[arg(long, value_name = "FILE")]
    python: Option<PathBuf>,

    /// Verbose level: 1=error, 2=warning, 3=message, 4+=debugging
    #[arg(short = 'v', long, value_name = "INT", default_value_t = defaults::VERBOSITY)]
    verbosity: i32,
}

impl Cli {
    fn tool_paths(&self) -> ToolPaths {
        // --tools-dir takes the place of SCARA_TOOLS_DIR
        let mut paths = ToolPaths::discover_with(|key| match &self.tools_dir {
            Some(dir) if key == defaults::ENV_TOOLS_DIR => Some(dir.clone().into_os_string()),
            _ => std::env::var_os(key),
        });

        if let Some(p) = &self.minimap2 {
            paths.aligner = p.clone();
        }
        if let Some(p) = &self.ezra {
            paths.ezra = p.clone();
        }
        if let Some(p) = &self.bridger {
            paths.bridger = p.clone();
        }
        if let Some(p) = &self.racon_bin {
            paths.racon = p.clone();
        }
        if let Some(p) = &self.python {
            paths.python = Some(p.clone());
        }
        paths
    }

    fn scaffold_opt(&self) -> ScaffoldOpt {
        ScaffoldOpt {
            plan: self.plan.clone(),
            results_dir: self.results.clone(),
            preprocess: self.preprocess,
            racon_start: self.racon_start,
            racon: self.racon,
            racon_end: self.racon_end,
            threads: resolve_threads(self.threads),
            aligner_options: self.aligner_options.clone(),
            ezra_options: self.ezra_options.clone(),
            bridger_options: self.bridger_options.clone(),
            racon_options: self.racon_options.clone(),
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<PipelineReport> {
    let opt = cli.scaffold_opt();
    let thread_word = if opt.threads == 1 { "thread" } else { "threads" };
    log::info!("Using {} {}", opt.threads, thread_word);

    let config = PipelineConfig::new(cli.contigs.clone(), cli.reads.clone(), opt, &cli.tool_paths())
        .context("invalid configuration")?;
    let report = Pipeline::new(&config)
        .run()
        .context("scaffolding failed")?;
    Ok(report)
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger based on verbosity level
    // (1=error, 2=warning, 3=message, 4=debug, 5+=trace)
    let log_level = match cli.verbosity {
        v if v <= 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace, // 5+ = trace
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None) // Don't show timestamps
        .format_target(false) // Don't show module names
        .init();

    match run(&cli) {
        Ok(report) => {
            log::info!("Scaffolds written to {}", report.published.display());
        }
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
