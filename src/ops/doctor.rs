//! Environment and toolchain health checks.
//!
//! The `doctor` command verifies that the external tools the build drives
//! are available:
//!
//! - pkg-config (or pkgconf) and the packages it is asked about
//! - the Cython code generator
//! - a C compiler
//! - the python interpreter, and numpy when the manifest wants its headers

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::builder::codegen::needs_codegen;
use crate::builder::host::HostProbe;
use crate::resolver::{resolve_flags, PkgConfig};
use crate::util::process::ProcessBuilder;
use crate::util::GlobalContext;

use super::declare::load_manifest;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// How long the check took
    pub duration: Duration,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the tool path.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,

    /// Total time taken
    pub total_duration: Duration,
}

impl DoctorReport {
    /// Add a check result.
    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    /// Get the count of passed checks.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Get the count of failed checks.
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// Get the count of required failed checks.
    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Run every check.
pub fn doctor(ctx: &GlobalContext) -> Result<DoctorReport> {
    let start = Instant::now();
    let mut report = DoctorReport::default();
    let manifest = load_manifest(ctx)?;

    report.add(check_tool("pkg-config", ctx.pkg_config_program(), "--version"));

    let packages = manifest.extension.pkg_config.join(" ");
    report.add(check_packages(ctx, &manifest.extension.pkg_config, &packages));

    let cython = check_tool("cython", ctx.cython_program(), "--version");
    let uses_codegen = manifest
        .extension
        .sources
        .first()
        .is_some_and(|s| needs_codegen(Path::new(s)));
    report.add(if uses_codegen { cython } else { cython.optional() });

    report.add(check_tool(
        "C compiler",
        ctx.c_compiler().map(|cc| cc.compiler().to_path_buf()),
        "--version",
    ));

    let python = ctx.python_program();
    report.add(check_tool("python", python.clone(), "--version"));

    if manifest.extension.numpy {
        report.add(check_numpy(python.as_deref()));
    }

    report.total_duration = start.elapsed();
    Ok(report)
}

fn check_tool(name: &str, path: Option<PathBuf>, version_flag: &str) -> CheckResult {
    let start = Instant::now();

    let Some(path) = path else {
        return CheckResult::fail(name, format!("{} not found", name))
            .with_duration(start.elapsed());
    };

    // cython and older pythons print their version on stderr
    let version = ProcessBuilder::new(&path)
        .arg(version_flag)
        .exec()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| {
            let text = if out.stdout.is_empty() { out.stderr } else { out.stdout };
            String::from_utf8_lossy(&text)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "unknown version".to_string());

    CheckResult::pass(name, format!("{} is available", name))
        .with_path(path)
        .with_version(version)
        .with_duration(start.elapsed())
}

fn check_packages(ctx: &GlobalContext, packages: &[String], display: &str) -> CheckResult {
    let start = Instant::now();
    let name = format!("packages ({})", display);

    let pkg_config = match PkgConfig::from_context(ctx) {
        Ok(p) => p,
        Err(e) => {
            return CheckResult::fail(name, format!("cannot query: {}", e))
                .with_duration(start.elapsed())
        }
    };

    match resolve_flags(&pkg_config, packages) {
        Ok(options) => CheckResult::pass(name, options.to_flags().join(" "))
            .with_duration(start.elapsed()),
        Err(e) => CheckResult::fail(name, e.to_string()).with_duration(start.elapsed()),
    }
}

fn check_numpy(python: Option<&Path>) -> CheckResult {
    let start = Instant::now();

    let Some(python) = python else {
        return CheckResult::fail("numpy", "no python interpreter to import numpy with")
            .with_duration(start.elapsed());
    };

    match HostProbe::new(python).numpy_include() {
        Ok(include) => CheckResult::pass("numpy", format!("headers in {}", include))
            .with_path(PathBuf::from(include))
            .with_duration(start.elapsed()),
        Err(e) => CheckResult::fail("numpy", format!("{:#}", e)).with_duration(start.elapsed()),
    }
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    let _ = writeln!(output, "king-setup doctor");
    let _ = writeln!(output, "=================\n");

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || !check.passed {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
            if let Some(version) = &check.version {
                let _ = writeln!(output, "      Version: {}", version);
            }
        }
    }

    let _ = writeln!(output);

    let passed = report.passed_count();
    let failed = report.failed_count();
    let required_failed = report.required_failed_count();

    let _ = writeln!(output, "Summary: {} passed, {} failed", passed, failed);

    if required_failed > 0 {
        let _ = writeln!(
            output,
            "\n{} required check(s) failed. The extension cannot be built.",
            required_failed
        );
    } else if failed > 0 {
        let _ = writeln!(
            output,
            "\nAll required checks passed. {} optional check(s) failed.",
            failed
        );
    } else {
        let _ = writeln!(output, "\nAll checks passed. Ready to build.");
    }

    output
}
