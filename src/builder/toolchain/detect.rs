//! Toolchain detection functions.

use std::path::Path;

use anyhow::{bail, Result};

use crate::util::process::{CompilerCommand, ProcessBuilder};
use crate::util::GlobalContext;

use super::{GccToolchain, Toolchain, ToolchainPlatform};

/// Detect the C compiler for the extension.
pub fn detect_toolchain(ctx: &GlobalContext) -> Result<Box<dyn Toolchain>> {
    let Some(cc) = ctx.c_compiler() else {
        bail!(
            "no C compiler found\n\
             \n\
             Building the extension requires a C compiler (cc, gcc or clang).\n\
             Set the CC environment variable, set `tools.cc` in .king-setup/config.toml,\n\
             or install a compiler."
        );
    };

    let family = detect_compiler_family(&cc);
    tracing::debug!(
        "using {} compiler `{}`",
        family.as_str(),
        ProcessBuilder::new(&cc.program).args(&cc.args).display_command()
    );

    Ok(Box::new(GccToolchain::new(cc.program, family).with_args(cc.args)))
}

/// Detect the compiler family from its name, then from `--version`.
pub fn detect_compiler_family(cc: &CompilerCommand) -> ToolchainPlatform {
    let name = compiler_name(cc.compiler());

    if name.contains("gcc") {
        return ToolchainPlatform::Gcc;
    }

    let version = ProcessBuilder::new(&cc.program)
        .args(&cc.args)
        .arg("--version")
        .exec()
        .map(|out| String::from_utf8_lossy(&out.stdout).to_lowercase())
        .unwrap_or_default();

    family_from_version(&name, &version)
}

fn compiler_name(cc: &Path) -> String {
    cc.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn family_from_version(name: &str, version: &str) -> ToolchainPlatform {
    if name.contains("clang") || version.contains("clang") {
        if version.contains("apple") {
            ToolchainPlatform::AppleClang
        } else {
            ToolchainPlatform::Clang
        }
    } else {
        ToolchainPlatform::Gcc
    }
}
