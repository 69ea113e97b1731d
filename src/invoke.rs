use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;

/// A fully specified subprocess run: program, arguments, and the working
/// directory and environment overrides applied to the child only. The
/// parent process environment and current directory are never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Materialize a `Command` with the working directory and environment
    /// overrides applied.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }

    /// Render the invocation for diagnostics.
    pub fn display(&self) -> String {
        let program = self.program.display().to_string();
        if self.args.is_empty() {
            program
        } else {
            format!("{program} {}", self.args.join(" "))
        }
    }
}

/// Result of a captured run: success flag plus the combined stdout and
/// stderr text.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub success: bool,
    pub output: String,
}

/// Execution seam for subprocess runs. The installer and uninstaller only
/// talk to external tools through this trait, so tests can substitute a
/// recording implementation.
pub trait CommandRunner {
    /// Run with inherited stdio, blocking until the child exits. Returns
    /// whether the child reported success.
    fn run(&mut self, invocation: &Invocation) -> anyhow::Result<bool>;

    /// Run with stdout and stderr captured, blocking until the child exits.
    fn capture(&mut self, invocation: &Invocation) -> anyhow::Result<CaptureResult>;
}

/// Runs invocations as real subprocesses.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> anyhow::Result<bool> {
        let status = invocation
            .command()
            .status()
            .with_context(|| format!("running {}", invocation.display()))?;
        Ok(status.success())
    }

    fn capture(&mut self, invocation: &Invocation) -> anyhow::Result<CaptureResult> {
        let output = invocation
            .command()
            .output()
            .with_context(|| format!("running {}", invocation.display()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CaptureResult {
            success: output.status.success(),
            output: text,
        })
    }
}
