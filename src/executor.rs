use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use thiserror::Error;

use crate::invoke::{CommandRunner, Invocation};

/// How a plan reacts to a failing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Stop at the first failure and surface it to the caller.
    FailFast,
    /// Log the failure and keep going with the remaining steps.
    BestEffort,
}

/// What a step does when it runs.
#[derive(Debug, Clone)]
pub enum Action {
    /// Spawn a subprocess with inherited stdio and require success.
    Invoke(Invocation),
    /// Ask a query command for a directory path, then delete that directory
    /// recursively. Trailing newline and carriage-return characters are
    /// stripped from the captured output before it is used as a path.
    RemoveReportedDir { query: Invocation },
    /// Delete a single file.
    RemoveFile { path: PathBuf },
}

/// Interactive yes/no gate in front of a step. Declining skips the step
/// without failing the plan.
#[derive(Debug, Clone)]
pub struct Gate {
    pub question: String,
    pub decline_note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub label: String,
    pub gate: Option<Gate>,
    pub action: Action,
}

impl Step {
    pub fn invoke(label: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            label: label.into(),
            gate: None,
            action: Action::Invoke(invocation),
        }
    }

    pub fn gated(
        label: impl Into<String>,
        question: impl Into<String>,
        decline_note: Option<&str>,
        invocation: Invocation,
    ) -> Self {
        Self {
            label: label.into(),
            gate: Some(Gate {
                question: question.into(),
                decline_note: decline_note.map(str::to_string),
            }),
            action: Action::Invoke(invocation),
        }
    }

    pub fn remove_reported_dir(label: impl Into<String>, query: Invocation) -> Self {
        Self {
            label: label.into(),
            gate: None,
            action: Action::RemoveReportedDir { query },
        }
    }

    pub fn remove_file(label: impl Into<String>, path: PathBuf) -> Self {
        Self {
            label: label.into(),
            gate: None,
            action: Action::RemoveFile { path },
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("step {index} '{label}' failed: {message}")]
    StepFailed {
        index: usize,
        label: String,
        message: String,
    },
}

/// Outcome summary of a plan run.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub completed: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
    pub total: usize,
}

enum StepOutcome {
    Completed,
    Skipped(Option<String>),
}

/// Execute the steps in order under the given policy. `confirm` answers the
/// gate questions; it is only called for gated steps.
pub fn execute_plan(
    steps: &[Step],
    policy: Policy,
    runner: &mut dyn CommandRunner,
    confirm: &mut dyn FnMut(&str) -> anyhow::Result<bool>,
) -> Result<ExecutionReport, ExecutionError> {
    let mut report = ExecutionReport {
        total: steps.len(),
        ..ExecutionReport::default()
    };

    for (index, step) in steps.iter().enumerate() {
        println!("==> [{}/{}] {}", index + 1, steps.len(), step.label);

        let outcome = (|| -> anyhow::Result<StepOutcome> {
            if let Some(gate) = &step.gate {
                if !confirm(&gate.question).context("reading confirmation")? {
                    return Ok(StepOutcome::Skipped(gate.decline_note.clone()));
                }
            }
            run_step(step, runner)?;
            Ok(StepOutcome::Completed)
        })();

        match outcome {
            Ok(StepOutcome::Completed) => report.completed += 1,
            Ok(StepOutcome::Skipped(note)) => {
                println!("Skipping {}", step.label);
                if let Some(note) = note {
                    println!("{note}");
                }
                report.skipped += 1;
            }
            Err(err) => {
                let message = format!("{err:#}");
                match policy {
                    Policy::FailFast => {
                        return Err(ExecutionError::StepFailed {
                            index,
                            label: step.label.clone(),
                            message,
                        });
                    }
                    Policy::BestEffort => {
                        eprintln!("warning: {} failed: {message}", step.label);
                        report.failures.push(format!("{}: {message}", step.label));
                    }
                }
            }
        }
    }

    Ok(report)
}

fn run_step(step: &Step, runner: &mut dyn CommandRunner) -> anyhow::Result<()> {
    match &step.action {
        Action::Invoke(invocation) => {
            if !runner.run(invocation)? {
                anyhow::bail!("command failed: {}", invocation.display());
            }
            Ok(())
        }
        Action::RemoveReportedDir { query } => {
            let result = runner.capture(query)?;
            if !result.success {
                anyhow::bail!("query failed: {}", query.display());
            }
            let dir = trim_trailing_newlines(&result.output);
            if dir.is_empty() {
                anyhow::bail!("query reported an empty path: {}", query.display());
            }
            println!("    removing {dir}");
            fs::remove_dir_all(dir).with_context(|| format!("removing {dir}"))?;
            Ok(())
        }
        Action::RemoveFile { path } => {
            println!("    removing {}", path.display());
            fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
            Ok(())
        }
    }
}

/// Strip trailing newline and carriage-return characters from captured
/// command output.
pub fn trim_trailing_newlines(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::{ExecutionError, Policy, Step, execute_plan, trim_trailing_newlines};
    use crate::invoke::{CaptureResult, CommandRunner, Invocation};

    struct FakeRunner {
        calls: Vec<String>,
        fail_on: Option<usize>,
        capture_output: String,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                fail_on: None,
                capture_output: String::new(),
            }
        }

        fn failing_at(index: usize) -> Self {
            Self {
                fail_on: Some(index),
                ..Self::new()
            }
        }

        fn record(&mut self, invocation: &Invocation) -> bool {
            let index = self.calls.len();
            self.calls.push(invocation.display());
            self.fail_on != Some(index)
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&mut self, invocation: &Invocation) -> anyhow::Result<bool> {
            Ok(self.record(invocation))
        }

        fn capture(&mut self, invocation: &Invocation) -> anyhow::Result<CaptureResult> {
            let success = self.record(invocation);
            Ok(CaptureResult {
                success,
                output: self.capture_output.clone(),
            })
        }
    }

    fn no_confirm(_: &str) -> anyhow::Result<bool> {
        panic!("confirm should not be called for ungated steps");
    }

    fn plan_of_invokes(count: usize) -> Vec<Step> {
        (0..count)
            .map(|i| Step::invoke(format!("step {i}"), Invocation::new("tool").arg(i.to_string())))
            .collect()
    }

    #[test]
    fn fail_fast_stops_at_the_first_failure() {
        let steps = plan_of_invokes(4);
        let mut runner = FakeRunner::failing_at(1);

        let err = execute_plan(&steps, Policy::FailFast, &mut runner, &mut no_confirm)
            .expect_err("second step should abort the plan");

        let ExecutionError::StepFailed { index, label, .. } = err;
        assert_eq!(index, 1);
        assert_eq!(label, "step 1");
        assert_eq!(runner.calls, vec!["tool 0", "tool 1"]);
    }

    #[test]
    fn best_effort_runs_every_step_past_failures() {
        let steps = plan_of_invokes(3);
        let mut runner = FakeRunner::failing_at(0);

        let report = execute_plan(&steps, Policy::BestEffort, &mut runner, &mut no_confirm)
            .expect("best effort never aborts");

        assert_eq!(runner.calls.len(), 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].starts_with("step 0:"));
    }

    #[test]
    fn declined_gate_skips_without_failing() {
        let steps = vec![
            Step::gated(
                "optional",
                "Install extras? (y/n)",
                Some("Skipping extras."),
                Invocation::new("tool").arg("extras"),
            ),
            Step::invoke("after", Invocation::new("tool").arg("after")),
        ];
        let mut runner = FakeRunner::new();
        let mut questions = Vec::new();
        let mut confirm = |question: &str| -> anyhow::Result<bool> {
            questions.push(question.to_string());
            Ok(false)
        };

        let report = execute_plan(&steps, Policy::FailFast, &mut runner, &mut confirm)
            .expect("declined gate is not a failure");

        assert_eq!(questions, vec!["Install extras? (y/n)"]);
        assert_eq!(runner.calls, vec!["tool after"]);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.completed, 1);
    }

    #[test]
    fn accepted_gate_runs_the_step() {
        let steps = vec![Step::gated(
            "optional",
            "Install extras? (y/n)",
            None,
            Invocation::new("tool").arg("extras"),
        )];
        let mut runner = FakeRunner::new();
        let mut confirm = |_: &str| -> anyhow::Result<bool> { Ok(true) };

        let report = execute_plan(&steps, Policy::FailFast, &mut runner, &mut confirm)
            .expect("accepted gate should run");

        assert_eq!(runner.calls, vec!["tool extras"]);
        assert_eq!(report.completed, 1);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn remove_reported_dir_deletes_the_queried_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let victim = tmp.path().join("python-dir");
        std::fs::create_dir_all(victim.join("nested")).unwrap();

        let mut runner = FakeRunner::new();
        runner.capture_output = format!("{}\r\n", victim.display());
        let steps = vec![Step::remove_reported_dir(
            "remove python dir",
            Invocation::new("tool").args(["python", "dir"]),
        )];

        let report = execute_plan(&steps, Policy::BestEffort, &mut runner, &mut no_confirm)
            .expect("plan should complete");

        assert_eq!(report.completed, 1);
        assert!(!victim.exists());
    }

    #[test]
    fn remove_reported_dir_rejects_an_empty_report() {
        let mut runner = FakeRunner::new();
        runner.capture_output = "\r\n".to_string();
        let steps = vec![Step::remove_reported_dir(
            "remove python dir",
            Invocation::new("tool").args(["python", "dir"]),
        )];

        let report = execute_plan(&steps, Policy::BestEffort, &mut runner, &mut no_confirm)
            .expect("best effort never aborts");

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("empty path"));
    }

    #[test]
    fn remove_file_deletes_the_target() {
        let tmp = tempfile::tempdir().unwrap();
        let victim = tmp.path().join("uv.exe");
        std::fs::write(&victim, b"stub").unwrap();

        let mut runner = FakeRunner::new();
        let steps = vec![Step::remove_file("remove uv.exe", victim.clone())];

        let report = execute_plan(&steps, Policy::BestEffort, &mut runner, &mut no_confirm)
            .expect("plan should complete");

        assert_eq!(report.completed, 1);
        assert!(!victim.exists());
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let steps = vec![
            Step::remove_file("remove uv.exe", tmp.path().join("uv.exe")),
            Step::remove_file("remove uvx.exe", tmp.path().join("uvx.exe")),
        ];
        let mut runner = FakeRunner::new();

        let report = execute_plan(&steps, Policy::BestEffort, &mut runner, &mut no_confirm)
            .expect("best effort never aborts");

        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn trims_trailing_newline_characters() {
        assert_eq!(trim_trailing_newlines("C:\\dir\r\n"), "C:\\dir");
        assert_eq!(trim_trailing_newlines("C:\\dir\n"), "C:\\dir");
        assert_eq!(trim_trailing_newlines("C:\\dir"), "C:\\dir");
        assert_eq!(trim_trailing_newlines("\r\n"), "");
    }
}
