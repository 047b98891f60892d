// Integration tests for the scaffolding pipeline driver
//
// The external tools are replaced by small shell scripts that append their
// command line to a call log, so each test can count invocations and check
// which artifacts were handed to which tool.

#![cfg(unix)]

use scara::error::ScaraError;
use scara::{Pipeline, PipelineConfig, ScaffoldOpt, ToolPaths};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// Writing an executable while another test forks can fail with ETXTBSY
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

const CONTIGS: &str = ">ctg1\nACGTACGTACGT\n>ctg2\nTTTTGGGGCCCC\n";
const READS: &str = "@read1 len=8\nACGTACGT\n+\nIIIIIIII\n@read2\nGGGGCCCC\n+\n########\n";
const PAF_ROW: &str = "read1\t1000\t100\t900\t+\tctg1\t10000\t5000\t5800\t780\t800\t60";

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    calls: PathBuf,
    contigs: PathBuf,
    reads: PathBuf,
    tools: ToolPaths,
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();
        let bin = base.join("bin");
        fs::create_dir(&bin).unwrap();

        let calls = base.join("calls.log");
        let contigs = base.join("contigs.fasta");
        let reads = base.join("reads.fastq");
        fs::write(&contigs, CONTIGS).unwrap();
        fs::write(&reads, READS).unwrap();

        let tools = ToolPaths {
            aligner: bin.join("minimap2"),
            ezra: bin.join("ezra"),
            bridger: bin.join("bridger"),
            racon: bin.join("racon"),
            python: None,
        };

        write_script(
            &tools.aligner,
            &format!(
                "echo \"minimap2 $*\" >> '{}'\nprintf '{}\\n'\n",
                calls.display(),
                PAF_ROW.replace('\t', "\\t")
            ),
        );
        write_script(
            &tools.ezra,
            &format!(
                "echo \"ezra $*\" >> '{}'\n\
                 while [ $# -gt 0 ]; do\n  case \"$1\" in\n    -c) shift; contigs=\"$1\";;\n  esac\n  shift\ndone\n\
                 cat \"$contigs\"\nprintf '>ezra_ext\\nACGT\\n'\n",
                calls.display()
            ),
        );
        write_script(
            &tools.racon,
            &format!(
                "echo \"racon $*\" >> '{}'\nfor a in \"$@\"; do last=\"$a\"; done\n\
                 cat \"$last\"\nprintf '>polished\\nGG\\n'\n",
                calls.display()
            ),
        );

        let fixture = Self {
            root: base.join("results"),
            _dir: dir,
            calls,
            contigs,
            reads,
            tools,
        };
        fixture.bridger_writes_output(true);
        fixture
    }

    /// Bridger mock: `scaffold contigs reads c2r [r2r] -o out`, writing to whatever `-o` names
    fn bridger_writes_output(&self, writes: bool) {
        let body = if writes {
            "cat \"$2\" > \"$out\"\nprintf '>bridged\\nCCCC\\n' >> \"$out\"\n"
        } else {
            "echo 'nothing to scaffold'\n"
        };
        write_script(
            &self.tools.bridger,
            &format!(
                "echo \"bridger $*\" >> '{}'\n\
                 prev=''\nfor a in \"$@\"; do\n  if [ \"$prev\" = '-o' ]; then out=\"$a\"; fi\n  prev=\"$a\"\ndone\n{}",
                self.calls.display(),
                body
            ),
        );
    }

    fn opt(&self, plan: &str) -> ScaffoldOpt {
        ScaffoldOpt {
            plan: plan.to_string(),
            results_dir: self.root.clone(),
            threads: 2,
            ..Default::default()
        }
    }

    fn config(&self, opt: ScaffoldOpt) -> PipelineConfig {
        PipelineConfig::new(self.contigs.clone(), self.reads.clone(), opt, &self.tools).unwrap()
    }

    fn calls(&self) -> Vec<String> {
        match fs::read_to_string(&self.calls) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn count(&self, tool: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(&format!("{} ", tool)))
            .count()
    }
}

#[test]
fn test_ezra_plan_runs_one_alignment_per_iteration() {
    let _guard = serial();
    let fx = Fixture::new();
    let config = fx.config(fx.opt("E2"));

    let report = Pipeline::new(&config).run().unwrap();

    assert_eq!(fx.count("minimap2"), 2);
    assert_eq!(fx.count("ezra"), 2);
    assert_eq!(fx.count("bridger"), 0);
    assert_eq!(report.iterations, 2);

    let iter1 = fx.root.join("iter1/scaffolds_iter1.fasta");
    let iter2 = fx.root.join("iter2/scaffolds_iter2.fasta");
    assert!(iter1.exists());
    assert!(fx.root.join("iter1/readsToContigs.paf").exists());
    assert!(fx.root.join("iter1/Ezra_i1.log").exists());
    assert!(!fx.root.join("reads2reads_ovl.paf").exists());

    // Iteration 2 scaffolds the output of iteration 1
    let ezra_calls: Vec<String> = fx.calls().into_iter().filter(|c| c.starts_with("ezra")).collect();
    assert!(ezra_calls[1].contains(&format!("-c {}", iter1.display())));

    assert_eq!(report.published, fx.root.join("scara_scaffolds_final.fasta"));
    assert_eq!(report.final_contigs, iter2);
    assert_eq!(fs::read(&report.published).unwrap(), fs::read(&iter2).unwrap());
}

#[test]
fn test_rerun_performs_no_invocations() {
    let _guard = serial();
    let fx = Fixture::new();
    let config = fx.config(fx.opt("E1B1"));

    let first = Pipeline::new(&config).run().unwrap();
    let calls_after_first = fx.calls();
    let published_first = fs::read(&first.published).unwrap();

    let second = Pipeline::new(&config).run().unwrap();

    assert_eq!(fx.calls(), calls_after_first);
    assert_eq!(first.stats.executed, 5);
    assert_eq!(second.stats.executed, 0);
    // Read overlaps plus one scaffolding stage per iteration; alignments
    // feeding a cached scaffold are not consulted
    assert_eq!(second.stats.skipped, 3);
    assert_eq!(fs::read(&second.published).unwrap(), published_first);
}

#[test]
fn test_graph_iteration_with_racon_publishes_polished_scaffolds() {
    let _guard = serial();
    let fx = Fixture::new();
    let opt = ScaffoldOpt {
        racon: true,
        ..fx.opt("B1")
    };
    let config = fx.config(opt);

    let report = Pipeline::new(&config).run().unwrap();

    let read_overlaps = fx.root.join("reads2reads_ovl.paf");
    assert!(read_overlaps.exists());
    assert!(fx.root.join("Minimap2_r2r.log").exists());

    let calls = fx.calls();
    let tools: Vec<&str> = calls.iter().filter_map(|c| c.split(' ').next()).collect();
    assert_eq!(tools, vec!["minimap2", "minimap2", "bridger", "minimap2", "racon"]);

    let bridger_call = &calls[2];
    assert!(bridger_call.contains(&read_overlaps.display().to_string()));
    assert!(bridger_call.contains("iter1/reads2contigs.paf"));

    let polished = fx.root.join("iter1/scaffolds_iter1_racon.fasta");
    assert!(fx.root.join("iter1/Racon_I1.log").exists());
    assert_eq!(report.final_contigs, polished);
    assert_eq!(fs::read(&report.published).unwrap(), fs::read(&polished).unwrap());
    assert!(fs::read_to_string(&polished).unwrap().ends_with(">polished\nGG\n"));
}

#[test]
fn test_bridger_without_output_keeps_previous_contigs() {
    let _guard = serial();
    let fx = Fixture::new();
    fx.bridger_writes_output(false);
    let config = fx.config(fx.opt("B1"));

    let report = Pipeline::new(&config).run().unwrap();

    assert_eq!(report.fallbacks, 1);
    let scaffolds = fx.root.join("iter1/scaffolds_iter1.fasta");
    assert_eq!(fs::read(&scaffolds).unwrap(), CONTIGS.as_bytes());
    assert_eq!(fs::read(&report.published).unwrap(), CONTIGS.as_bytes());
    assert_eq!(
        fs::read_to_string(fx.root.join("iter1/Bridger_i1.log")).unwrap(),
        "nothing to scaffold\n"
    );
}

#[test]
fn test_stale_partial_from_interrupted_run_is_not_cached() {
    let _guard = serial();
    let fx = Fixture::new();
    fx.bridger_writes_output(false);
    let iter1 = fx.root.join("iter1");
    fs::create_dir_all(&iter1).unwrap();
    let stale = iter1.join("scaffolds_iter1.fasta.partial");
    fs::write(&stale, ">truncated\nAC").unwrap();
    let config = fx.config(fx.opt("B1"));

    let report = Pipeline::new(&config).run().unwrap();

    let bridger_call = fx.calls().into_iter().find(|c| c.starts_with("bridger")).unwrap();
    assert!(bridger_call.contains("-o ") && bridger_call.contains("scaffolds_iter1.fasta.partial"));
    assert_eq!(report.fallbacks, 1);
    assert_eq!(fs::read(iter1.join("scaffolds_iter1.fasta")).unwrap(), CONTIGS.as_bytes());
    assert!(!stale.exists());
    assert!(!fx.root.join("scara_scaffolds_final.fasta.partial").exists());
}

#[test]
fn test_failed_bridger_leaves_nothing_to_resume_from() {
    let _guard = serial();
    let fx = Fixture::new();
    write_script(
        &fx.tools.bridger,
        &format!(
            "echo \"bridger $*\" >> '{}'\n\
             prev=''\nfor a in \"$@\"; do\n  if [ \"$prev\" = '-o' ]; then out=\"$a\"; fi\n  prev=\"$a\"\ndone\n\
             printf '>half\\nAC' > \"$out\"\nexit 2\n",
            fx.calls.display()
        ),
    );
    let config = fx.config(fx.opt("B1"));

    let err = Pipeline::new(&config).run().unwrap_err();
    assert!(matches!(err, ScaraError::StageFailed { .. }));
    let scaffolds = fx.root.join("iter1/scaffolds_iter1.fasta");
    assert!(!scaffolds.exists());
    assert!(!fx.root.join("iter1/scaffolds_iter1.fasta.partial").exists());

    // The rerun scaffolds again instead of picking up the half-written file
    fx.bridger_writes_output(true);
    Pipeline::new(&config).run().unwrap();
    assert_eq!(fx.count("bridger"), 2);
    assert!(fs::read_to_string(&scaffolds).unwrap().ends_with(">bridged\nCCCC\n"));
}

#[test]
fn test_preprocess_filters_contained_reads() {
    let _guard = serial();
    let fx = Fixture::new();
    let opt = ScaffoldOpt {
        preprocess: true,
        ..fx.opt("E1")
    };
    let config = fx.config(opt);

    Pipeline::new(&config).run().unwrap();

    let processed = fx.root.join("reads_processed.fastq");
    assert_eq!(
        fs::read_to_string(&processed).unwrap(),
        "@read2\nGGGGCCCC\n+\n########\n"
    );
    assert!(fx.root.join("readsToContigs_preprocess.paf").exists());
    assert!(fx.root.join("Containment_filter.log").exists());

    let ezra_call = fx.calls().into_iter().find(|c| c.starts_with("ezra")).unwrap();
    assert!(ezra_call.contains(&format!("-r {}", processed.display())));
}

#[test]
fn test_start_and_end_polishing_use_distinct_artifacts() {
    let _guard = serial();
    let fx = Fixture::new();
    let opt = ScaffoldOpt {
        racon_start: true,
        racon_end: true,
        ..fx.opt("E1")
    };
    let config = fx.config(opt);

    let report = Pipeline::new(&config).run().unwrap();

    assert_eq!(fx.count("racon"), 2);
    assert!(fx.root.join("contigs_racon.fasta").exists());
    assert!(fx.root.join("Racon_initial.log").exists());
    assert!(fx.root.join("Racon_final.log").exists());

    let ezra_call = fx.calls().into_iter().find(|c| c.starts_with("ezra")).unwrap();
    assert!(ezra_call.contains("contigs_racon.fasta"));

    let final_polish = fx.root.join("scaffolds_iter1_racon_final.fasta");
    assert_eq!(report.final_contigs, final_polish);
    assert_eq!(fs::read(&report.published).unwrap(), fs::read(&final_polish).unwrap());
}

#[test]
fn test_failed_tool_aborts_and_leaves_no_artifact() {
    let _guard = serial();
    let fx = Fixture::new();
    write_script(
        &fx.tools.ezra,
        &format!(
            "echo \"ezra $*\" >> '{}'\necho 'out of memory' >&2\nexit 3\n",
            fx.calls.display()
        ),
    );
    let config = fx.config(fx.opt("E1"));

    let err = Pipeline::new(&config).run().unwrap_err();
    match err {
        ScaraError::StageFailed { status, log, .. } => {
            assert_eq!(status, "exit code 3");
            assert_eq!(log, fx.root.join("iter1/Ezra_i1.log"));
            assert_eq!(fs::read_to_string(&log).unwrap(), "out of memory\n");
        }
        other => panic!("expected stage failure, got {:?}", other),
    }
    assert!(!fx.root.join("iter1/scaffolds_iter1.fasta").exists());
    assert!(!fx.root.join("scara_scaffolds_final.fasta").exists());

    // A fixed tool resumes after the cached alignment
    let fixed = Fixture::new();
    fs::copy(&fixed.tools.ezra, &fx.tools.ezra).unwrap();
    let report = Pipeline::new(&config).run().unwrap();
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(report.stats.executed, 1);
}

#[test]
fn test_invalid_plan_fails_before_any_stage() {
    let _guard = serial();
    let fx = Fixture::new();

    let err = PipelineConfig::new(
        fx.contigs.clone(),
        fx.reads.clone(),
        fx.opt("X1"),
        &fx.tools,
    )
    .unwrap_err();

    assert!(matches!(err, ScaraError::Plan(_)));
    assert!(err.to_string().contains("X1"));
    assert!(!fx.root.exists());
    assert!(fx.calls().is_empty());
}
