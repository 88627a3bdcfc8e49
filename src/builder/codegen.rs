//! Cython code generation: `.pyx` interface definitions to C.

use std::path::{Path, PathBuf};

use super::toolchain::CommandSpec;

/// Input for a code generation step.
#[derive(Debug, Clone)]
pub struct CodegenInput {
    /// Interface-definition source
    pub source: PathBuf,
    /// Generated C file
    pub output: PathBuf,
    /// Name of the extension module the C file initializes
    pub module_name: String,
    /// Directories searched for `.pxd` files
    pub include_dirs: Vec<PathBuf>,
}

/// The Cython compiler.
#[derive(Debug, Clone)]
pub struct Cython {
    program: PathBuf,
}

impl Cython {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Cython {
            program: program.into(),
        }
    }

    /// `cython -3 --module-name <name> -I<dir>... <source> -o <output>`
    ///
    /// The module name sets the `PyInit_` symbol, so `cKing.pyx` can build
    /// the importable module `King`.
    pub fn command(&self, input: &CodegenInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program)
            .arg("-3")
            .arg("--module-name")
            .arg(input.module_name.as_str());

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd.arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }
}

/// Whether a source must go through the code generator first.
pub fn needs_codegen(source: &Path) -> bool {
    source.extension().and_then(|e| e.to_str()) == Some("pyx")
}
