//! Subprocess execution utilities.
//!
//! Every external tool this crate drives (pkg-config, cython, the C
//! compiler, the host interpreter) goes through [`ProcessBuilder`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("running `{}`", self.display_command());

        let output = cmd
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Execute and require success.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                stderr.trim_end()
            );
        }
        Ok(output)
    }

    /// Execute, require success, and return trimmed stdout.
    pub fn exec_stdout(&self) -> Result<String> {
        let output = self.exec_and_check()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a tool program.
///
/// An environment variable wins over a configured path, which wins over the
/// default name. The result is looked up on PATH when it is a bare name. A
/// variable naming a missing program resolves to nothing rather than falling
/// back.
pub fn resolve_tool(
    env_var: &str,
    configured: Option<&Path>,
    default: &str,
) -> Option<PathBuf> {
    if let Some(value) = env_value(env_var) {
        let found = find_executable(&value);
        if found.is_none() {
            tracing::warn!("{}=`{}` was not found", env_var, value);
        }
        return found;
    }

    if let Some(path) = configured {
        return find_executable(path);
    }

    find_executable(default)
}

/// A C compiler invocation: the program plus any leading words, such as
/// `ccache gcc` split into `ccache` and `["gcc"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CompilerCommand {
    pub fn new(program: PathBuf) -> Self {
        CompilerCommand {
            program,
            args: Vec::new(),
        }
    }

    /// Parse a `CC`-style value, looking the first word up on PATH.
    pub fn from_env_value(value: &str) -> Option<Self> {
        let mut words = value.split_whitespace();
        let program = find_executable(words.next()?)?;
        Some(CompilerCommand {
            program,
            args: words.map(String::from).collect(),
        })
    }

    /// The path of the compiler proper: the last word of the command.
    pub fn compiler(&self) -> &Path {
        self.args
            .last()
            .map(Path::new)
            .unwrap_or(self.program.as_path())
    }
}

/// Find a C compiler.
///
/// Same precedence as [`resolve_tool`]: `CC`, then the configured path, then
/// the first of `cc`, `gcc`, `clang` on PATH.
pub fn find_c_compiler(configured: Option<&Path>) -> Option<CompilerCommand> {
    if let Some(value) = env_value("CC") {
        let found = CompilerCommand::from_env_value(&value);
        if found.is_none() {
            tracing::warn!("CC=`{}` was not found", value);
        }
        return found;
    }

    if let Some(path) = configured {
        return find_executable(path).map(CompilerCommand::new);
    }

    ["cc", "gcc", "clang"]
        .iter()
        .find_map(|compiler| find_executable(compiler))
        .map(CompilerCommand::new)
}

/// A non-blank environment variable, trimmed.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_process_builder() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_and_check_reports_failure() {
        let err = ProcessBuilder::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .exec_and_check()
            .unwrap_err();

        let msg = format!("{:#}", err);
        assert!(msg.contains("exit code Some(3)"));
        assert!(msg.contains("broken"));
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("pkg-config").args(["--libs", "--cflags", "king"]);

        assert_eq!(pb.display_command(), "pkg-config --libs --cflags king");
    }

    #[cfg(unix)]
    #[test]
    fn test_compiler_command_keeps_trailing_words() {
        let cmd = CompilerCommand::from_env_value("  sh  gcc ").unwrap();

        assert!(cmd.program.ends_with("sh"));
        assert_eq!(cmd.args, vec!["gcc"]);
        assert_eq!(cmd.compiler(), Path::new("gcc"));
    }

    #[test]
    fn test_compiler_command_missing_program() {
        assert!(CompilerCommand::from_env_value("king-setup-missing-ccache gcc").is_none());
        assert!(CompilerCommand::from_env_value("   ").is_none());
    }

    #[test]
    fn test_spawn_missing_program_fails() {
        let result = ProcessBuilder::new("king-setup-definitely-missing-tool").exec();
        assert!(result.is_err());
    }
}
