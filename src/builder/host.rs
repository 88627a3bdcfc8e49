//! Queries against the host interpreter the extension is built for.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::process::ProcessBuilder;

const HOST_INFO_SCRIPT: &str = "\
import json, sys, sysconfig
paths = sysconfig.get_paths()
print(json.dumps({
    'version': '%d.%d.%d' % sys.version_info[:3],
    'prefix': sys.prefix,
    'include': paths['include'],
    'platlib': paths['platlib'],
    'ext_suffix': sysconfig.get_config_var('EXT_SUFFIX') or '.so',
}))";

const NUMPY_INCLUDE_SCRIPT: &str = "import numpy; print(numpy.get_include())";

/// What the build needs to know about the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Interpreter version, e.g. `3.12.1`
    pub version: String,
    /// Installation prefix; relative data-file destinations resolve against it
    pub prefix: PathBuf,
    /// Directory holding `Python.h`
    pub include: PathBuf,
    /// Site directory for compiled modules
    pub platlib: PathBuf,
    /// Extension filename suffix, e.g. `.cpython-312-x86_64-linux-gnu.so`
    pub ext_suffix: String,
}

impl HostInfo {
    /// File name of a compiled module.
    pub fn module_file_name(&self, module: &str) -> String {
        format!("{}{}", module, self.ext_suffix)
    }
}

/// Runs small scripts in the host interpreter.
#[derive(Debug, Clone)]
pub struct HostProbe {
    python: PathBuf,
}

impl HostProbe {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        HostProbe {
            python: python.into(),
        }
    }

    /// Interpreter paths and extension suffix.
    pub fn info(&self) -> Result<HostInfo> {
        let stdout = self
            .script(HOST_INFO_SCRIPT)
            .exec_stdout()
            .context("failed to query the host interpreter")?;

        serde_json::from_str(&stdout)
            .with_context(|| format!("unexpected host interpreter output: {}", stdout))
    }

    /// Include directory of the numeric-array library (numpy).
    pub fn numpy_include(&self) -> Result<String> {
        let include = self
            .script(NUMPY_INCLUDE_SCRIPT)
            .exec_stdout()
            .context("numpy is not importable by the host interpreter")?;

        anyhow::ensure!(!include.is_empty(), "numpy reported an empty include directory");
        Ok(include)
    }

    fn script(&self, source: &str) -> ProcessBuilder {
        ProcessBuilder::new(&self.python).arg("-c").arg(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_info_from_json() {
        let info: HostInfo = serde_json::from_str(
            r#"{"version": "3.12.1", "prefix": "/usr", "include": "/usr/include/python3.12",
                "platlib": "/usr/lib/python3/dist-packages",
                "ext_suffix": ".cpython-312-x86_64-linux-gnu.so"}"#,
        )
        .unwrap();

        assert_eq!(info.include, PathBuf::from("/usr/include/python3.12"));
        assert_eq!(
            info.module_file_name("King"),
            "King.cpython-312-x86_64-linux-gnu.so"
        );
    }

    #[cfg(unix)]
    mod with_script {
        use super::*;
        use crate::test_support::fake_tool;
        use tempfile::TempDir;

        #[test]
        fn test_numpy_include() {
            let tmp = TempDir::new().unwrap();
            let python = fake_tool(tmp.path(), "python3", "echo /np/include");

            let probe = HostProbe::new(python);
            assert_eq!(probe.numpy_include().unwrap(), "/np/include");
        }

        #[test]
        fn test_numpy_missing() {
            let tmp = TempDir::new().unwrap();
            let python = fake_tool(
                tmp.path(),
                "python3",
                "echo \"ModuleNotFoundError: No module named 'numpy'\" >&2; exit 1",
            );

            let err = HostProbe::new(python).numpy_include().unwrap_err();
            assert!(format!("{:#}", err).contains("numpy is not importable"));
        }

        #[test]
        fn test_info_rejects_garbage() {
            let tmp = TempDir::new().unwrap();
            let python = fake_tool(tmp.path(), "python3", "echo not-json");

            let err = HostProbe::new(python).info().unwrap_err();
            assert!(err.to_string().contains("unexpected host interpreter output"));
        }
    }
}
