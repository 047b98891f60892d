// Typed description of one external tool call
//
// An `Invocation` is built by the tool adapters (aligner, scaffolders,
// polisher) and executed as a blocking child process. Every artifact is
// produced under `<target>.partial` and renamed to the target only after a
// successful exit. That holds both for stdout redirected by the driver and for
// a file the tool writes itself, so neither a crashed tool nor a killed driver
// leaves something that looks like a finished artifact.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Exit state and captured diagnostics of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>, // None when killed by a signal
    pub success: bool,
    pub log: String, // Captured text persisted beside the artifact
}

impl ToolOutput {
    pub fn from_status(status: ExitStatus, log: String) -> Self {
        Self {
            exit_code: status.code(),
            success: status.success(),
            log,
        }
    }

    /// Outcome of a stage computed inside this process
    pub fn in_process(log: String) -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            log,
        }
    }

    pub fn status_text(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    stdout: Option<PathBuf>, // Redirect target, `None` to capture stdout in the log
    written: Option<PathBuf>, // Target the tool writes itself, named via `output_arg`
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: None,
            written: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn stdout_to(mut self, target: impl Into<PathBuf>) -> Self {
        self.stdout = Some(target.into());
        self
    }

    /// Name an output file the tool writes itself
    ///
    /// The tool is handed `<target>.partial`; `run` moves it to `target`
    /// after a successful exit.
    pub fn output_arg(mut self, target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        self.args.push(partial_path(&target).into_os_string());
        self.written = Some(target);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check the descriptor before anything is spawned
    ///
    /// Programs given as paths must exist; bare names are left to `PATH`
    /// lookup. A redirect target needs an existing parent directory.
    pub fn validate(&self) -> io::Result<()> {
        if self.program.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty program name",
            ));
        }

        let is_bare_name = self.program.components().count() == 1;
        if !is_bare_name && !self.program.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("program not found: {}", self.program.display()),
            ));
        }

        for target in self.stdout.iter().chain(self.written.iter()) {
            match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("output directory does not exist: {}", parent.display()),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Run to completion, blocking the caller
    pub fn run(&self) -> io::Result<ToolOutput> {
        self.validate()?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());

        // A leftover from an interrupted run must not be taken for this run's result
        if let Some(target) = &self.written {
            remove_if_present(&partial_path(target))?;
        }

        let output = match &self.stdout {
            Some(target) => {
                let sink = File::create(partial_path(target))?;
                cmd.stdout(Stdio::from(sink));
                cmd.output()?
            }
            None => cmd.output()?,
        };

        let mut log = match &self.stdout {
            Some(_) => String::new(),
            None => String::from_utf8_lossy(&output.stdout).into_owned(),
        };
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        for target in self.stdout.iter().chain(self.written.iter()) {
            let partial = partial_path(target);
            if !output.status.success() {
                let _ = fs::remove_file(&partial);
            } else if partial.exists() {
                fs::rename(&partial, target)?;
            }
        }
        Ok(ToolOutput::from_status(output.status, log))
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(target) = &self.stdout {
            write!(f, " > {}", target.display())?;
        }
        Ok(())
    }
}

/// Scratch path an artifact is written to before the final rename
pub fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}
