#[cfg(test)]
mod tests {
    use crate::error::ScaraError;
    use crate::plan::PlanError;
    use crate::scaffold_opt::{resolve_threads, ScaffoldOpt};
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let opt = ScaffoldOpt::default();
        assert_eq!(opt.plan, "E3B1");
        assert_eq!(opt.results_dir, PathBuf::from("scaffolding_results"));
        assert!(!opt.preprocess);
        assert!(!opt.polishing_requested());
        assert_eq!(opt.ezra_args(), vec!["-m"]);
        assert!(opt.bridger_args().is_empty());
        assert!(opt.threads >= 1);
    }

    #[test]
    fn test_thread_flag_is_prepended() {
        let opt = ScaffoldOpt {
            threads: 12,
            ..Default::default()
        };
        assert_eq!(
            opt.aligner_args(),
            vec!["-t", "12", "-x", "ava-pb", "--dual=yes"]
        );
        assert_eq!(opt.racon_args(), vec!["-t", "12"]);
    }

    #[test]
    fn test_user_thread_flag_wins() {
        let opt = ScaffoldOpt {
            threads: 12,
            aligner_options: "-t 4 -x map-ont".to_string(),
            racon_options: "-t2 -m 8".to_string(),
            ..Default::default()
        };
        assert_eq!(opt.aligner_args(), vec!["-t", "4", "-x", "map-ont"]);
        assert_eq!(opt.racon_args(), vec!["-t2", "-m", "8"]);
    }

    #[test]
    fn test_other_t_prefixed_options_still_get_thread_count() {
        let opt = ScaffoldOpt {
            threads: 6,
            aligner_options: "-x ava-pb -tfoo".to_string(),
            racon_options: "--threads=3".to_string(),
            ..Default::default()
        };
        assert_eq!(opt.aligner_args(), vec!["-t", "6", "-x", "ava-pb", "-tfoo"]);
        assert_eq!(opt.racon_args(), vec!["--threads=3"]);
    }

    #[test]
    fn test_validate_reports_plan_errors() {
        let opt = ScaffoldOpt {
            plan: "E3X1".to_string(),
            ..Default::default()
        };
        match opt.validate() {
            Err(ScaraError::Plan(PlanError::InvalidOperation { op, .. })) => assert_eq!(op, 'X'),
            other => panic!("expected plan error, got {:?}", other),
        }

        let ok = ScaffoldOpt::default().validate().unwrap();
        assert_eq!(ok.total_iterations(), 4);
    }

    #[test]
    fn test_resolve_threads_clamps() {
        let max = num_cpus::get() * 2;
        assert_eq!(resolve_threads(Some(0)), 1);
        assert_eq!(resolve_threads(Some(1)), 1);
        assert_eq!(resolve_threads(Some(max + 100)), max);
        assert_eq!(resolve_threads(None), num_cpus::get());
    }
}
