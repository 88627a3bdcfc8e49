//! Global context for king-setup operations.
//!
//! Provides centralized access to the project root, the merged
//! configuration and the tool programs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::MANIFEST_NAME;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::process::{find_c_compiler, resolve_tool, CompilerCommand};

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Global context shared by all operations.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory holding `Setup.toml`, or the working directory without one
    project_root: PathBuf,

    /// Path to the manifest, if one was found
    manifest_path: Option<PathBuf>,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        Self::with_global_config(cwd, global_config_path().as_deref())
    }

    /// Create a context reading the global configuration from `global_config`
    /// (`None` skips it).
    pub fn with_global_config(cwd: PathBuf, global_config: Option<&Path>) -> Self {
        let manifest_path = find_manifest(&cwd);
        let project_root = manifest_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        let config = load_config(global_config, &project_config_path(&project_root));

        GlobalContext {
            project_root,
            manifest_path,
            config,
        }
    }

    /// Replace the merged configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Get the project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the manifest path, if a `Setup.toml` exists.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the build directory.
    pub fn build_dir(&self) -> PathBuf {
        let dir = self
            .config
            .build
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        self.project_root.join(dir)
    }

    /// Resolve the package-configuration tool (`PKG_CONFIG`, config, `pkg-config`).
    pub fn pkg_config_program(&self) -> Option<PathBuf> {
        resolve_tool(
            "PKG_CONFIG",
            self.config.tools.pkg_config.as_deref(),
            "pkg-config",
        )
    }

    /// The name reported when the package-configuration tool is missing.
    pub fn pkg_config_name(&self) -> String {
        std::env::var("PKG_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                self.config
                    .tools
                    .pkg_config
                    .as_ref()
                    .map(|p| p.display().to_string())
            })
            .unwrap_or_else(|| "pkg-config".to_string())
    }

    /// Resolve the Cython code generator (`CYTHON`, config, `cython`).
    pub fn cython_program(&self) -> Option<PathBuf> {
        resolve_tool("CYTHON", self.config.tools.cython.as_deref(), "cython")
    }

    /// Resolve the host interpreter (`PYTHON`, config, `python3`).
    pub fn python_program(&self) -> Option<PathBuf> {
        resolve_tool("PYTHON", self.config.tools.python.as_deref(), "python3")
    }

    /// Resolve the C compiler (`CC`, config, `cc`/`gcc`/`clang`).
    pub fn c_compiler(&self) -> Option<CompilerCommand> {
        find_c_compiler(self.config.tools.cc.as_deref())
    }
}

/// Search `start` and its ancestors for `Setup.toml`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}
