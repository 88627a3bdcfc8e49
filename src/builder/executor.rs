//! Build execution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

use super::fingerprint::StepFingerprint;
use super::plan::{BuildPlan, BuildStep};

/// Runs a build plan step by step from the project root.
pub struct Executor<'a> {
    project_root: &'a Path,
    force: bool,
}

/// Outcome of executing a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// The built extension module
    pub artifact: PathBuf,
    /// Steps that ran
    pub executed: usize,
    /// Steps skipped as up to date
    pub fresh: usize,
}

impl<'a> Executor<'a> {
    pub fn new(project_root: &'a Path) -> Self {
        Executor {
            project_root,
            force: false,
        }
    }

    /// Ignore fingerprints and run every step.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Execute all steps in order, stopping at the first failure.
    pub fn execute(&self, plan: &BuildPlan) -> Result<BuildReport> {
        let mut report = BuildReport {
            artifact: plan.artifact.clone(),
            executed: 0,
            fresh: 0,
        };

        for step in &plan.steps {
            let output = self.project_root.join(&step.output);
            let fingerprint = StepFingerprint::compute(step, self.project_root)?;

            if !self.force && fingerprint.is_fresh(&output) {
                tracing::debug!("fresh: {}", step.output.display());
                report.fresh += 1;
                continue;
            }

            self.run(step, &output)?;
            fingerprint.save(&output)?;
            report.executed += 1;
        }

        Ok(report)
    }

    fn run(&self, step: &BuildStep, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            ensure_dir(parent)?;
        }

        let subject = step
            .inputs
            .first()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        tracing::info!("{:>12} {}", step.kind.verb(), subject);

        ProcessBuilder::new(&step.command.program)
            .args(&step.command.args)
            .cwd(self.project_root)
            .exec_and_check()
            .with_context(|| format!("{} `{}` failed", step.kind.verb().to_lowercase(), subject))?;

        anyhow::ensure!(
            output.exists(),
            "`{}` did not produce {}",
            step.command.display(),
            output.display()
        );

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::builder::plan::StepKind;
    use crate::builder::toolchain::CommandSpec;
    use tempfile::TempDir;

    fn copy_step(from: &str, to: &str) -> BuildStep {
        BuildStep {
            kind: StepKind::Compile,
            command: CommandSpec::new("cp").args([from, to]),
            inputs: vec![PathBuf::from(from)],
            output: PathBuf::from(to),
        }
    }

    #[test]
    fn test_execute_then_skip_fresh() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(tmp.path().join("build")).unwrap();

        let plan = BuildPlan {
            steps: vec![copy_step("a.txt", "build/b.txt")],
            artifact: PathBuf::from("build/b.txt"),
        };

        let first = Executor::new(tmp.path()).execute(&plan).unwrap();
        assert_eq!(first.executed, 1);
        assert!(tmp.path().join("build/b.txt").exists());

        let second = Executor::new(tmp.path()).execute(&plan).unwrap();
        assert_eq!(second.executed, 0);
        assert_eq!(second.fresh, 1);

        let forced = Executor::new(tmp.path()).force(true).execute(&plan).unwrap();
        assert_eq!(forced.executed, 1);
    }

    #[test]
    fn test_failing_step_stops_the_build() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();

        let failing = BuildStep {
            kind: StepKind::Codegen,
            command: CommandSpec::new("sh").args(["-c", "echo 'cKing.pyx:3:0: syntax' >&2; exit 1"]),
            inputs: vec![PathBuf::from("a.txt")],
            output: PathBuf::from("build/a.c"),
        };
        let plan = BuildPlan {
            steps: vec![failing, copy_step("build/a.c", "build/a.o")],
            artifact: PathBuf::from("build/a.o"),
        };

        let err = Executor::new(tmp.path()).execute(&plan).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("cythonizing `a.txt` failed"));
        assert!(msg.contains("syntax"));
        assert!(!tmp.path().join("build/a.o").exists());
    }
}
