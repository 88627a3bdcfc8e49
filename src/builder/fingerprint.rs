//! Build fingerprinting for incremental builds.
//!
//! A fingerprint captures the command line and input contents of a step,
//! stored next to the step's output. A step whose output exists and whose
//! fingerprint is unchanged is skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs::write_string;
use crate::util::hash::{sha256_file, Fingerprint};

use super::plan::BuildStep;

/// Fingerprint of one build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFingerprint {
    /// Hash of the program and arguments
    pub command_hash: String,

    /// Input file hashes
    pub input_hashes: BTreeMap<PathBuf, String>,
}

impl StepFingerprint {
    /// Fingerprint a step whose relative inputs live under `root`.
    pub fn compute(step: &BuildStep, root: &Path) -> Result<Self> {
        let mut fp = Fingerprint::new();
        fp.update_str(&step.command.program.to_string_lossy());
        fp.update_strs(step.command.args.iter().map(String::as_str));
        let command_hash = fp.finish();

        let mut input_hashes = BTreeMap::new();
        for input in &step.inputs {
            let path = root.join(input);
            let hash = sha256_file(&path)
                .with_context(|| format!("missing build input: {}", path.display()))?;
            input_hashes.insert(input.clone(), hash);
        }

        Ok(StepFingerprint {
            command_hash,
            input_hashes,
        })
    }

    /// Where the fingerprint of `output` is stored.
    pub fn path_for(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_owned();
        name.push(".fingerprint");
        PathBuf::from(name)
    }

    /// Load the stored fingerprint of `output`, if any.
    pub fn load(output: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(Self::path_for(output)).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Store this fingerprint next to `output`.
    pub fn save(&self, output: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_string(&Self::path_for(output), &json)
    }

    /// True when `output` exists and was built from the same inputs.
    pub fn is_fresh(&self, output: &Path) -> bool {
        output.exists() && Self::load(output).as_ref() == Some(self)
    }
}
