//! Scaffolding pipeline driver
//!
//! Runs the stages of one scaffolding job strictly in sequence:
//!
//! ```text
//! Init → Filtering → PairwiseAlign → StartPolish → PlanExecution → EndPolish → Publish → Done
//! ```
//!
//! Filtering, pairwise alignment and the polishing sites are optional. Every
//! stage goes through the [`StageCache`], so a re-run against the same results
//! directory resumes after the last artifact that was produced. Intermediate
//! artifacts are never deleted.
//!
//! The driver only moves a "current contigs" and a "current reads" pointer
//! forward; the external tools do the actual work.

use crate::config::PipelineConfig;
use crate::containment;
use crate::defaults;
use crate::error::{IoContext, Result, ScaraError};
use crate::io::sequence::{split_name, suffixed_name};
use crate::plan::OperationKind;
use crate::stage_cache::{StageCache, StageResult, StageStats};
use crate::tools::invocation::partial_path;
use crate::tools::{Invocation, ScaffoldRequest, Scaffolder, ToolOutput};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Filtering,
    PairwiseAlign,
    StartPolish,
    PlanExecution,
    EndPolish,
    Publish,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::Filtering => "containment filtering",
            PipelineState::PairwiseAlign => "reads-to-reads alignment",
            PipelineState::StartPolish => "initial polishing",
            PipelineState::PlanExecution => "scaffolding",
            PipelineState::EndPolish => "final polishing",
            PipelineState::Publish => "publishing",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Where a polishing step is invoked from; each site owns distinct paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolishSite {
    Start,
    Iteration(u32),
    End,
}

impl fmt::Display for PolishSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolishSite::Start => write!(f, "initial racon"),
            PolishSite::Iteration(n) => write!(f, "racon for iteration {}", n),
            PolishSite::End => write!(f, "final racon"),
        }
    }
}

/// Artifact and log locations of one polishing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishPaths {
    pub output: PathBuf,
    pub overlaps: PathBuf,
    pub align_log: PathBuf,
    pub polish_log: PathBuf,
}

impl PolishSite {
    /// Paths for polishing `contigs` at this site below `root`
    ///
    /// The start and end sites write into `root`; an iteration site writes
    /// into that iteration's folder.
    pub fn paths(self, root: &Path, contigs: &Path) -> PolishPaths {
        match self {
            PolishSite::Start => PolishPaths {
                output: root.join(suffixed_name(contigs, defaults::POLISH_SUFFIX)),
                overlaps: root.join(defaults::START_POLISH_OVERLAPS),
                align_log: root.join(defaults::START_POLISH_ALIGN_LOG),
                polish_log: root.join(defaults::START_POLISH_LOG),
            },
            PolishSite::Iteration(n) => {
                let dir = iteration_dir(root, n);
                PolishPaths {
                    output: dir.join(suffixed_name(contigs, defaults::POLISH_SUFFIX)),
                    overlaps: dir.join(defaults::ITERATION_POLISH_OVERLAPS),
                    align_log: dir.join(defaults::ITERATION_POLISH_ALIGN_LOG),
                    polish_log: dir.join(format!("Racon_I{}.log", n)),
                }
            }
            PolishSite::End => PolishPaths {
                output: root.join(suffixed_name(contigs, defaults::FINAL_POLISH_SUFFIX)),
                overlaps: root.join(defaults::END_POLISH_OVERLAPS),
                align_log: root.join(defaults::END_POLISH_ALIGN_LOG),
                polish_log: root.join(defaults::END_POLISH_LOG),
            },
        }
    }
}

pub fn iteration_dir(root: &Path, iteration: u32) -> PathBuf {
    root.join(format!("iter{}", iteration))
}

pub fn scaffolds_path(root: &Path, iteration: u32) -> PathBuf {
    iteration_dir(root, iteration).join(format!("scaffolds_iter{}.fasta", iteration))
}

/// `<root>/scara_scaffolds_final.<ext>`, extension taken from `contigs`
pub fn published_path(root: &Path, contigs: &Path) -> PathBuf {
    let ext = split_name(contigs)
        .1
        .unwrap_or_else(|| defaults::FASTA_EXT.to_string());
    root.join(format!("{}.{}", defaults::FINAL_STEM, ext))
}

/// Mutable state of one driver execution
#[derive(Debug)]
struct RunContext {
    root: PathBuf,
    contigs: PathBuf,               // Current contigs
    reads: PathBuf,                 // Current reads, filtered after preprocessing
    read_overlaps: Option<PathBuf>, // Set once reads-vs-reads alignment is available
    iteration: u32,                 // Global 1-based counter, never reset between steps
    fallbacks: usize,
    cache: StageCache,
    state: PipelineState,
}

impl RunContext {
    fn new(root: PathBuf, contigs: PathBuf, reads: PathBuf) -> Self {
        Self {
            root,
            contigs,
            reads,
            read_overlaps: None,
            iteration: 0,
            fallbacks: 0,
            cache: StageCache::new(),
            state: PipelineState::Init,
        }
    }

    fn enter(&mut self, state: PipelineState) {
        log::debug!("Pipeline state: {} -> {}", self.state, state);
        self.state = state;
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub published: PathBuf,
    pub final_contigs: PathBuf, // Artifact the published file was copied from
    pub iterations: u32,
    pub stats: StageStats,
    pub fallbacks: usize,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} stages executed, {} skipped, {} fallbacks; result: {}",
            self.iterations,
            self.stats.executed,
            self.stats.skipped,
            self.fallbacks,
            self.published.display()
        )
    }
}

/// Run `invocation` as a cached stage and turn a non-zero exit into an error
///
/// The invocation stages its artifact under a partial name, so a failed run
/// leaves nothing at `output` for the next run to mistake for a result.
fn run_tool(
    cache: &mut StageCache,
    stage: &str,
    invocation: &Invocation,
    output: &Path,
    log_path: &Path,
) -> Result<StageResult> {
    let result = cache.run_cached(stage, output, log_path, || {
        log::debug!("Stage: {}", stage);
        log::info!("Running command: {}", invocation);
        invocation
            .run()
            .with_io_context(|| format!("cannot run {}", invocation.program().display()))
    })?;

    if let StageResult::Executed {
        outcome, log_path, ..
    } = &result
    {
        if !outcome.success {
            return Err(ScaraError::StageFailed {
                stage: stage.to_string(),
                status: outcome.status_text(),
                log: log_path.clone(),
            });
        }
    }
    Ok(result)
}

/// Copy `source` to `target` through `<target>.partial`
///
/// The copy only appears under its final name once complete, so an
/// interrupted copy is redone rather than cached.
fn copy_into_place(source: &Path, target: &Path) -> Result<()> {
    let staging = partial_path(target);
    fs::copy(source, &staging).with_io_context(|| {
        format!("cannot copy {} to {}", source.display(), staging.display())
    })?;
    fs::rename(&staging, target).with_io_context(|| {
        format!("cannot rename {} to {}", staging.display(), target.display())
    })
}

fn ensure_dir(dir: &Path, what: &str) -> Result<()> {
    if dir.is_dir() {
        log::info!("{} found: {}", what, dir.display());
        return Ok(());
    }
    log::info!("Creating {}: {}", what.to_lowercase(), dir.display());
    fs::create_dir_all(dir).with_io_context(|| format!("cannot create {}", dir.display()))
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Execute the whole job and publish the final scaffolds
    pub fn run(&self) -> Result<PipelineReport> {
        let config = self.config;
        let mut ctx = RunContext::new(
            config.opt.results_dir.clone(),
            config.contigs.clone(),
            config.reads.clone(),
        );

        log::info!("Starting scaffolding with plan {}", config.plan);
        log::info!("Contigs: {}", config.contigs.display());
        log::info!("Reads: {}", config.reads.display());

        match self.execute(&mut ctx) {
            Ok(published) => {
                let report = PipelineReport {
                    published,
                    final_contigs: ctx.contigs.clone(),
                    iterations: ctx.iteration,
                    stats: ctx.cache.stats(),
                    fallbacks: ctx.fallbacks,
                };
                log::info!("Scaffolding finished: {}", report);
                Ok(report)
            }
            Err(e) => {
                log::error!("Pipeline stopped during {}", ctx.state);
                Err(e)
            }
        }
    }

    fn execute(&self, ctx: &mut RunContext) -> Result<PathBuf> {
        let opt = &self.config.opt;
        ensure_dir(&ctx.root, "Results folder")?;

        if opt.preprocess {
            ctx.enter(PipelineState::Filtering);
            self.filter_reads(ctx)?;
        }

        if self.config.plan.requires_read_overlaps() {
            ctx.enter(PipelineState::PairwiseAlign);
            self.align_reads_pairwise(ctx)?;
        }

        if opt.racon_start {
            ctx.enter(PipelineState::StartPolish);
            self.polish(ctx, PolishSite::Start)?;
        }

        ctx.enter(PipelineState::PlanExecution);
        for (iteration, kind) in self.config.plan.iterations() {
            ctx.iteration = iteration;
            self.run_iteration(ctx, kind)?;
        }

        if opt.racon_end {
            ctx.enter(PipelineState::EndPolish);
            self.polish(ctx, PolishSite::End)?;
        }

        ctx.enter(PipelineState::Publish);
        let published = self.publish(ctx)?;
        ctx.enter(PipelineState::Done);
        Ok(published)
    }

    /// Drop reads contained in the input contigs
    fn filter_reads(&self, ctx: &mut RunContext) -> Result<()> {
        let overlaps = ctx.root.join(defaults::PREPROCESS_OVERLAPS);
        let output = containment::filtered_reads_path(&ctx.root, &ctx.reads);

        if !ctx.cache.is_cached(&output) {
            let inv = self
                .config
                .tools
                .aligner
                .overlaps(&ctx.contigs, &ctx.reads, &overlaps);
            let align_log = ctx.root.join(defaults::PREPROCESS_LOG);
            run_tool(
                &mut ctx.cache,
                "Preprocessing alignment",
                &inv,
                &overlaps,
                &align_log,
            )?;
        }

        let reads = ctx.reads.clone();
        let filter_log = ctx.root.join(defaults::FILTER_LOG);
        ctx.cache
            .run_cached("Processed reads", &output, &filter_log, || {
                let contained = containment::collect_contained(&overlaps)?;
                let summary = containment::filter_reads(&reads, &contained, &output)?;
                Ok(ToolOutput::in_process(summary.to_string()))
            })?;

        ctx.reads = output;
        Ok(())
    }

    /// One-time reads-vs-reads overlaps used by every graph iteration
    fn align_reads_pairwise(&self, ctx: &mut RunContext) -> Result<()> {
        let output = ctx.root.join(defaults::READ_OVERLAPS);
        let log_path = ctx.root.join(defaults::READ_OVERLAPS_LOG);
        let inv = self
            .config
            .tools
            .aligner
            .overlaps(&ctx.reads, &ctx.reads, &output);

        run_tool(&mut ctx.cache, "Reads-to-reads overlaps", &inv, &output, &log_path)?;
        ctx.read_overlaps = Some(output);
        Ok(())
    }

    fn scaffolder(&self, kind: OperationKind) -> Result<&dyn Scaffolder> {
        let tools = &self.config.tools;
        let found = match kind {
            OperationKind::IncrementalScaffold => tools.ezra.as_ref().map(|t| t as &dyn Scaffolder),
            OperationKind::GraphScaffold => tools.bridger.as_ref().map(|t| t as &dyn Scaffolder),
        };
        found.ok_or_else(|| ScaraError::ToolUnavailable {
            tool: kind.tool_name(),
            path: PathBuf::new(),
        })
    }

    /// Align, scaffold and (for graph steps with racon) polish once
    fn run_iteration(&self, ctx: &mut RunContext, kind: OperationKind) -> Result<()> {
        let n = ctx.iteration;
        let scaffolder = self.scaffolder(kind)?;
        log::info!("Scaffolding iteration {} using {}", n, scaffolder.name());

        let dir = iteration_dir(&ctx.root, n);
        ensure_dir(&dir, "Iteration folder")?;

        let output = scaffolds_path(&ctx.root, n);
        let overlaps = dir.join(scaffolder.overlaps_file());

        if !ctx.cache.is_cached(&output) {
            let inv = self
                .config
                .tools
                .aligner
                .overlaps(&ctx.contigs, &ctx.reads, &overlaps);
            let align_log = dir.join(defaults::ITERATION_ALIGN_LOG);
            let stage = format!("Reads-to-contigs overlaps for iteration {}", n);
            run_tool(&mut ctx.cache, &stage, &inv, &overlaps, &align_log)?;
        }

        let read_overlaps = match kind {
            OperationKind::GraphScaffold => ctx.read_overlaps.as_deref(),
            OperationKind::IncrementalScaffold => None,
        };
        let request = ScaffoldRequest {
            contigs: &ctx.contigs,
            reads: &ctx.reads,
            contig_overlaps: &overlaps,
            read_overlaps,
        };
        let inv = scaffolder.invocation(&request, &output);
        let log_path = dir.join(format!("{}_i{}.log", scaffolder.name(), n));
        let stage = format!("{} scaffolds for iteration {}", scaffolder.name(), n);

        let result = run_tool(&mut ctx.cache, &stage, &inv, &output, &log_path)?;

        if result.was_executed() && !output.exists() {
            if !scaffolder.allows_empty_result() {
                return Err(ScaraError::StageFailed {
                    stage,
                    status: "no output produced".to_string(),
                    log: log_path,
                });
            }
            log::warn!(
                "{} produced no scaffolds in iteration {}; keeping {}",
                scaffolder.name(),
                n,
                ctx.contigs.display()
            );
            copy_into_place(&ctx.contigs, &output)?;
            ctx.fallbacks += 1;
        }

        ctx.contigs = output;

        if kind == OperationKind::GraphScaffold && self.config.opt.racon {
            self.polish(ctx, PolishSite::Iteration(n))?;
        }
        Ok(())
    }

    /// Fresh reads-to-contigs alignment followed by the polisher
    ///
    /// When the polished output is already present the alignment is not
    /// needed and is skipped as well.
    fn polish(&self, ctx: &mut RunContext, site: PolishSite) -> Result<()> {
        let polisher = self
            .config
            .tools
            .polisher
            .as_ref()
            .ok_or_else(|| ScaraError::ToolUnavailable {
                tool: "racon",
                path: PathBuf::new(),
            })?;
        let paths = site.paths(&ctx.root, &ctx.contigs);

        if !ctx.cache.is_cached(&paths.output) {
            let inv = self
                .config
                .tools
                .aligner
                .overlaps(&ctx.contigs, &ctx.reads, &paths.overlaps);
            let stage = format!("Overlaps for {}", site);
            run_tool(&mut ctx.cache, &stage, &inv, &paths.overlaps, &paths.align_log)?;
        }

        let inv = polisher.polish(&ctx.reads, &paths.overlaps, &ctx.contigs, &paths.output);
        let stage = format!("Polished contigs ({})", site);
        run_tool(&mut ctx.cache, &stage, &inv, &paths.output, &paths.polish_log)?;

        ctx.contigs = paths.output;
        Ok(())
    }

    /// Copy the current contigs to the well-known final name
    fn publish(&self, ctx: &RunContext) -> Result<PathBuf> {
        let target = published_path(&ctx.root, &ctx.contigs);
        copy_into_place(&ctx.contigs, &target)?;
        log::info!("Final scaffolds: {}", target.display());
        Ok(target)
    }
}
