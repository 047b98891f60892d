#[cfg(test)]
mod tests {
    use crate::error::ScaraError;
    use crate::stage_cache::{StageCache, StageResult, StageStats};
    use crate::tools::ToolOutput;
    use std::cell::Cell;
    use std::fs;

    #[test]
    fn test_existing_output_is_skipped_without_running_action() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("reads2reads_ovl.paf");
        let log = temp_dir.path().join("Minimap2_r2r.log");
        fs::write(&output, "cached").unwrap();

        let calls = Cell::new(0);
        let mut cache = StageCache::new();
        let result = cache
            .run_cached("read overlaps", &output, &log, || {
                calls.set(calls.get() + 1);
                Ok(ToolOutput::in_process(String::new()))
            })
            .unwrap();

        assert_eq!(result, StageResult::Skipped(output.clone()));
        assert_eq!(calls.get(), 0);
        assert!(!log.exists());
        assert_eq!(
            cache.stats(),
            StageStats {
                executed: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_missing_output_runs_action_and_persists_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("scaffolds_iter1.fasta");
        let log = temp_dir.path().join("Ezra_i1.log");

        let mut cache = StageCache::new();
        let result = cache
            .run_cached("Ezra", &output, &log, || {
                fs::write(&output, ">ctg1\nACGT\n").unwrap();
                Ok(ToolOutput::in_process("3 contigs extended\n".to_string()))
            })
            .unwrap();

        assert!(result.was_executed());
        assert!(result.succeeded());
        assert_eq!(result.output(), output.as_path());
        assert_eq!(fs::read_to_string(&log).unwrap(), "3 contigs extended\n");
        assert_eq!(cache.stats().executed, 1);

        // Second call finds the artifact
        let again = cache
            .run_cached("Ezra", &output, &log, || panic!("must not rerun"))
            .unwrap();
        assert!(!again.was_executed());
        assert_eq!(
            cache.stats(),
            StageStats {
                executed: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_failed_action_still_writes_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("out.paf");
        let log = temp_dir.path().join("out.log");

        let mut cache = StageCache::new();
        let result = cache
            .run_cached("aligner", &output, &log, || {
                Ok(ToolOutput {
                    exit_code: Some(1),
                    success: false,
                    log: "index build failed\n".to_string(),
                })
            })
            .unwrap();

        assert!(!result.succeeded());
        assert_eq!(fs::read_to_string(&log).unwrap(), "index build failed\n");
    }

    #[test]
    fn test_action_error_propagates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("out.paf");
        let log = temp_dir.path().join("out.log");

        let mut cache = StageCache::new();
        let err = cache
            .run_cached("aligner", &output, &log, || {
                Err(ScaraError::io(
                    "spawn failed",
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ))
            })
            .unwrap_err();

        assert!(matches!(err, ScaraError::Io { .. }));
        assert_eq!(cache.stats(), StageStats::default());
    }
}
