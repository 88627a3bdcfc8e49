//! Flag discovery through the package-configuration tool.

use std::path::PathBuf;

use crate::core::flags::OptionSet;
use crate::util::process::ProcessBuilder;
use crate::util::GlobalContext;

use super::errors::FlagError;

/// Arguments requesting combined linker and compiler flags.
pub const QUERY_ARGS: [&str; 2] = ["--libs", "--cflags"];

/// Something that reports the raw flag tokens for a set of packages.
pub trait FlagSource {
    /// Return the tool's whitespace-separated flag output.
    fn query(&self, packages: &[String]) -> Result<String, FlagError>;

    /// Human-readable description of the query, for logs.
    fn describe(&self, packages: &[String]) -> String;
}

/// `pkg-config --libs --cflags <packages>`.
#[derive(Debug, Clone)]
pub struct PkgConfig {
    program: PathBuf,
}

impl PkgConfig {
    /// Use a specific program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        PkgConfig {
            program: program.into(),
        }
    }

    /// Locate the tool from the environment and configuration.
    ///
    /// Fails with [`FlagError::ToolNotFound`] when it is not installed.
    pub fn from_context(ctx: &GlobalContext) -> Result<Self, FlagError> {
        ctx.pkg_config_program()
            .map(PkgConfig::new)
            .ok_or_else(|| FlagError::ToolNotFound {
                program: ctx.pkg_config_name(),
            })
    }

    fn command(&self, packages: &[String]) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .args(QUERY_ARGS)
            .args(packages)
    }
}

impl FlagSource for PkgConfig {
    fn query(&self, packages: &[String]) -> Result<String, FlagError> {
        let cmd = self.command(packages);
        let output = cmd.exec().map_err(|e| FlagError::Spawn {
            command: cmd.display_command(),
            message: format!("{:#}", e),
        })?;

        if !output.status.success() {
            return Err(FlagError::QueryFailed {
                command: cmd.display_command(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn describe(&self, packages: &[String]) -> String {
        self.command(packages).display_command()
    }
}

/// Query `source` for `packages` and partition the result.
///
/// Each call starts from an empty [`OptionSet`].
pub fn resolve_flags(source: &dyn FlagSource, packages: &[String]) -> Result<OptionSet, FlagError> {
    if packages.is_empty() {
        return Err(FlagError::NoPackages);
    }

    tracing::debug!("querying `{}`", source.describe(packages));
    let output = source.query(packages)?;
    let options = OptionSet::parse(&output);

    if options.is_empty() {
        tracing::debug!("no flags reported for {}", packages.join(" "));
    }

    for token in &options.unrecognized {
        tracing::warn!("ignoring unrecognized flag `{}`", token);
    }

    Ok(options)
}
