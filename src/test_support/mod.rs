//! Test utilities for king-setup unit tests.
//!
//! Provides a canned [`FlagSource`], fake external tools written as shell
//! scripts, and a King project fixture.

use std::path::{Path, PathBuf};

use crate::builder::host::HostInfo;
use crate::resolver::{FlagError, FlagSource};

/// A flag source returning fixed output instead of running a tool.
#[derive(Debug, Clone)]
pub struct FixedFlags {
    output: String,
}

impl FixedFlags {
    pub fn new(output: impl Into<String>) -> Self {
        FixedFlags {
            output: output.into(),
        }
    }
}

impl FlagSource for FixedFlags {
    fn query(&self, _packages: &[String]) -> Result<String, FlagError> {
        Ok(self.output.clone())
    }

    fn describe(&self, packages: &[String]) -> String {
        format!("fixed flags for {}", packages.join(" "))
    }
}

/// Host information for a typical Linux CPython 3.12.
pub fn host_info() -> HostInfo {
    HostInfo {
        version: "3.12.1".to_string(),
        prefix: PathBuf::from("/usr"),
        include: PathBuf::from("/usr/include/python3.12"),
        platlib: PathBuf::from("/usr/lib/python3/dist-packages"),
        ext_suffix: ".cpython-312-x86_64-linux-gnu.so".to_string(),
    }
}

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Create `cKing.pyx` and `King.pxd` in `dir`.
pub fn king_project(dir: &Path) {
    std::fs::write(
        dir.join("cKing.pyx"),
        "cimport King\n\ndef version():\n    return King.king_version()\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("King.pxd"),
        "cdef extern from \"king.h\":\n    int king_version()\n",
    )
    .unwrap();
}
