//! Setup.toml manifest parsing and schema.
//!
//! The manifest carries the static package metadata, the single extension
//! target and the data files installed next to it. A project without a
//! manifest builds the King extension with the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Setup.toml";

/// Subdirectory of the first include directory that data files go to.
pub const DEFAULT_DATA_SUBDIR: &str = "king";

/// Error loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {message}")]
    Invalid { message: String },
}

impl ManifestError {
    fn invalid(message: impl Into<String>) -> Self {
        ManifestError::Invalid {
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ManifestError::Read { path, source } => {
                Diagnostic::error(format!("cannot read {}", MANIFEST_NAME))
                    .with_location(path)
                    .with_context(source.to_string())
            }
            ManifestError::Parse { path, source } => {
                Diagnostic::error(format!("{} is not valid TOML", MANIFEST_NAME))
                    .with_location(path)
                    .with_context(source.message().to_string())
            }
            ManifestError::Invalid { message } => Diagnostic::error(message.clone())
                .with_suggestion(format!(
                    "Remove {} to build with the built-in King defaults",
                    MANIFEST_NAME
                )),
        }
    }
}

/// The whole manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupManifest {
    pub package: PackageMetadata,

    pub extension: ExtensionSpec,

    #[serde(default, rename = "data-files")]
    pub data_files: Vec<DataFilesSpec>,
}

/// `[package]`: static metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `[extension]`: the compiled extension target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionSpec {
    /// Module name; defaults to the package name
    #[serde(default)]
    pub name: Option<String>,

    /// Interface-definition source (`.pyx`) or generated C source (`.c`)
    pub sources: Vec<String>,

    /// Packages queried through pkg-config
    pub pkg_config: Vec<String>,

    /// Include directories appended after the discovered ones
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<String>,

    /// Append the host's numpy include directory
    #[serde(default = "default_true")]
    pub numpy: bool,
}

/// `[[data-files]]`: files copied below the first include directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFilesSpec {
    #[serde(default = "default_subdir")]
    pub subdir: String,
    pub files: Vec<String>,
}

fn default_include_dirs() -> Vec<String> {
    vec![".".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_subdir() -> String {
    DEFAULT_DATA_SUBDIR.to_string()
}

impl Default for SetupManifest {
    /// The King extension: `cKing.pyx` against pkg-config package `king`,
    /// installing `King.pxd`.
    fn default() -> Self {
        SetupManifest {
            package: PackageMetadata {
                name: "King".to_string(),
                version: "1.0".to_string(),
                author: Some("Guillaume Plum".to_string()),
                description: Some("Wrapper cython around my king library.".to_string()),
            },
            extension: ExtensionSpec {
                name: None,
                sources: vec!["cKing.pyx".to_string()],
                pkg_config: vec!["king".to_string()],
                include_dirs: default_include_dirs(),
                numpy: true,
            },
            data_files: vec![DataFilesSpec {
                subdir: default_subdir(),
                files: vec!["King.pxd".to_string()],
            }],
        }
    }
}

impl SetupManifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest: SetupManifest =
            toml::from_str(&contents).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Load the manifest at `path`, or the built-in defaults when there is none.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ManifestError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("no {} found, using built-in defaults", MANIFEST_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Check the structural rules serde cannot express.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.package.name.trim().is_empty() {
            return Err(ManifestError::invalid("`package.name` must not be empty"));
        }
        if self.package.version.trim().is_empty() {
            return Err(ManifestError::invalid("`package.version` must not be empty"));
        }

        match self.extension.sources.as_slice() {
            [source] => {
                let ext = Path::new(source).extension().and_then(|e| e.to_str());
                if !matches!(ext, Some("pyx") | Some("c")) {
                    return Err(ManifestError::invalid(format!(
                        "extension source `{}` must be a .pyx or .c file",
                        source
                    )));
                }
            }
            sources => {
                return Err(ManifestError::invalid(format!(
                    "an extension is built from exactly one source file, found {}",
                    sources.len()
                )));
            }
        }

        if self.extension.pkg_config.is_empty() {
            return Err(ManifestError::invalid(
                "`extension.pkg-config` must name at least one package",
            ));
        }

        for group in &self.data_files {
            if group.files.is_empty() {
                return Err(ManifestError::invalid(format!(
                    "data-files group `{}` lists no files",
                    group.subdir
                )));
            }
        }

        Ok(())
    }

    /// The extension module name.
    pub fn extension_name(&self) -> &str {
        self.extension
            .name
            .as_deref()
            .unwrap_or(&self.package.name)
    }
}
