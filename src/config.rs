// Pipeline configuration
//
// Tool discovery and validation, and the immutable `PipelineConfig` handed to
// the driver. Everything that can make a run impossible (bad plan, missing
// input, missing tool, wrong Python) is reported here, before any stage
// touches the results directory.

use crate::defaults;
use crate::error::{Result, ScaraError};
use crate::plan::{OperationKind, Plan};
use crate::scaffold_opt::ScaffoldOpt;
use crate::tools::{Aligner, Bridger, Ezra, Polisher};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Where each external tool is expected to live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub aligner: PathBuf,
    pub ezra: PathBuf,
    pub bridger: PathBuf,
    pub racon: PathBuf,
    pub python: Option<PathBuf>, // None: try `python`, then `python2`
}

impl ToolPaths {
    /// Default layout below one tools directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            aligner: dir.join(defaults::MINIMAP2_PATH),
            ezra: dir.join(defaults::EZRA_PATH),
            bridger: dir.join(defaults::BRIDGER_PATH),
            racon: dir.join(defaults::RACON_PATH),
            python: None,
        }
    }

    /// Resolve from the process environment
    ///
    /// The tools directory is `SCARA_TOOLS_DIR` or the directory holding the
    /// running executable; per-tool variables override single entries.
    pub fn discover() -> Self {
        Self::discover_with(|key| env::var_os(key))
    }

    /// `discover` with an injectable variable lookup
    pub fn discover_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let tools_dir = lookup(defaults::ENV_TOOLS_DIR)
            .map(PathBuf::from)
            .or_else(executable_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        log::debug!("Tools directory: {}", tools_dir.display());

        let mut paths = Self::in_dir(&tools_dir);
        let overrides: [(&str, &mut PathBuf); 4] = [
            (defaults::ENV_MINIMAP2, &mut paths.aligner),
            (defaults::ENV_EZRA, &mut paths.ezra),
            (defaults::ENV_BRIDGER, &mut paths.bridger),
            (defaults::ENV_RACON, &mut paths.racon),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key) {
                *slot = PathBuf::from(value);
            }
        }
        if let Some(value) = lookup(defaults::ENV_PYTHON) {
            paths.python = Some(PathBuf::from(value));
        }
        paths
    }
}

fn executable_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Find `program` as given, or on `PATH` when it is a bare name
fn locate(program: &Path) -> Option<PathBuf> {
    if program.is_file() {
        return Some(program.to_path_buf());
    }
    if program.components().count() != 1 {
        return None;
    }
    let search = env::var_os("PATH")?;
    env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

fn require_tool(tool: &'static str, path: &Path) -> Result<PathBuf> {
    match locate(path) {
        Some(found) => {
            log::debug!("{} found: {}", tool, found.display());
            Ok(found)
        }
        None => Err(ScaraError::ToolUnavailable {
            tool,
            path: path.to_path_buf(),
        }),
    }
}

/// Whether `interpreter --version` reports the required major.minor
///
/// Python 2 prints its version on stderr, Python 3 on stdout; both are checked.
fn python_matches(interpreter: &Path) -> bool {
    let output = match Command::new(interpreter)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            log::debug!("Cannot run {}: {}", interpreter.display(), e);
            return false;
        }
    };

    let mut version = String::from_utf8_lossy(&output.stdout).into_owned();
    version.push_str(&String::from_utf8_lossy(&output.stderr));
    let version = version.trim();
    log::debug!("{} --version: {}", interpreter.display(), version);
    version.starts_with(defaults::PYTHON_VERSION_PREFIX)
}

fn find_python(preferred: Option<&Path>) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = match preferred {
        Some(path) => vec![path.to_path_buf()],
        None => vec![
            PathBuf::from(defaults::PYTHON),
            PathBuf::from(defaults::PYTHON_FALLBACK),
        ],
    };

    for candidate in &candidates {
        if python_matches(candidate) {
            log::info!("Using {} for the Bridger script", candidate.display());
            return Ok(candidate.clone());
        }
    }

    let tried = candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ScaraError::RuntimeUnavailable {
        runtime: format!("python interpreter (tried {})", tried),
        required: defaults::PYTHON_VERSION_PREFIX,
    })
}

/// Tool adapters needed by one plan, validated up front
#[derive(Debug, Clone)]
pub struct ToolSet {
    pub aligner: Aligner,
    pub ezra: Option<Ezra>,
    pub bridger: Option<Bridger>,
    pub polisher: Option<Polisher>,
}

impl ToolSet {
    /// Check only the tools `plan` and `opt` will actually call
    pub fn resolve(paths: &ToolPaths, plan: &Plan, opt: &ScaffoldOpt) -> Result<Self> {
        let aligner = Aligner::new(require_tool("minimap2", &paths.aligner)?, opt.aligner_args());

        let ezra = if plan.uses(OperationKind::IncrementalScaffold) {
            let exe = require_tool("Ezra", &paths.ezra)?;
            Some(Ezra::new(exe, opt.ezra_args()))
        } else {
            None
        };

        let bridger = if plan.uses(OperationKind::GraphScaffold) {
            let script = require_tool("Bridger", &paths.bridger)?;
            let interpreter = if Bridger::needs_interpreter(&script) {
                Some(find_python(paths.python.as_deref())?)
            } else {
                None
            };
            Some(Bridger::new(script, interpreter, opt.bridger_args()))
        } else {
            None
        };

        let polisher = if opt.polishing_requested() {
            let exe = require_tool("racon", &paths.racon)?;
            Some(Polisher::new(exe, opt.racon_args()))
        } else {
            None
        };

        Ok(Self {
            aligner,
            ezra,
            bridger,
            polisher,
        })
    }
}

/// Everything one run needs, built once and read-only afterwards
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub contigs: PathBuf,
    pub reads: PathBuf,
    pub opt: ScaffoldOpt,
    pub plan: Plan,
    pub tools: ToolSet,
}

impl PipelineConfig {
    /// Validate the plan, the inputs and the tools, in that order
    pub fn new(contigs: PathBuf, reads: PathBuf, opt: ScaffoldOpt, paths: &ToolPaths) -> Result<Self> {
        let plan = opt.validate()?;

        for input in [&contigs, &reads] {
            if !input.is_file() {
                return Err(ScaraError::InputMissing {
                    path: input.clone(),
                });
            }
        }

        let tools = ToolSet::resolve(paths, &plan, &opt)?;

        Ok(Self {
            contigs,
            reads,
            opt,
            plan,
            tools,
        })
    }
}
