//! Configuration file support for king-setup.
//!
//! Two configuration file locations are read:
//! - Global: `~/.king-setup/config.toml` - User-wide defaults
//! - Project: `.king-setup/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Environment
//! variables (`PKG_CONFIG`, `CYTHON`, `PYTHON`, `CC`) take precedence over
//! both and are applied where the tools are resolved.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// king-setup configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool overrides
    pub tools: ToolsConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// Paths of the external programs driven by the build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolsConfig {
    /// Package-configuration tool (default: pkg-config)
    pub pkg_config: Option<PathBuf>,

    /// Cython code generator (default: cython)
    pub cython: Option<PathBuf>,

    /// Host interpreter (default: python3)
    pub python: Option<PathBuf>,

    /// C compiler (default: first of cc, gcc, clang)
    pub cc: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Directory for intermediates and the built extension, relative to the project root
    pub build_dir: Option<PathBuf>,

    /// Always rebuild, ignoring fingerprints
    pub force: bool,

    /// Extra C compiler flags
    pub cflags: Vec<String>,

    /// Extra linker flags
    pub ldflags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.tools.pkg_config.is_some() {
            self.tools.pkg_config = other.tools.pkg_config;
        }
        if other.tools.cython.is_some() {
            self.tools.cython = other.tools.cython;
        }
        if other.tools.python.is_some() {
            self.tools.python = other.tools.python;
        }
        if other.tools.cc.is_some() {
            self.tools.cc = other.tools.cc;
        }

        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.force {
            self.build.force = true;
        }
        if !other.build.cflags.is_empty() {
            self.build.cflags = other.build.cflags;
        }
        if !other.build.ldflags.is_empty() {
            self.build.ldflags = other.build.ldflags;
        }
    }
}

/// Get the global config directory (~/.king-setup).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".king-setup"))
}

/// Get the global config path (~/.king-setup/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.king-setup/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".king-setup").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.king-setup/config.toml)
/// 2. Global config (~/.king-setup/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
