//! Build plan generation.
//!
//! A BuildPlan lists the commands that turn the extension's single source
//! into a loadable module: optional code generation, one compile, one link.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

use crate::core::declaration::SetupDeclaration;
use crate::util::fs::glob_existing;

use super::codegen::{needs_codegen, CodegenInput, Cython};
use super::host::HostInfo;
use super::toolchain::{CommandSpec, CompileInput, LinkInput, Toolchain};

/// Subdirectory of the build directory holding object files.
pub const TEMP_DIR: &str = "temp";

/// A complete build plan.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Steps in execution order
    pub steps: Vec<BuildStep>,
    /// The extension module produced by the last step
    pub artifact: PathBuf,
}

/// What a step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Generate C from the interface definition
    Codegen,
    /// Compile C to an object file
    Compile,
    /// Link the extension module
    Link,
}

impl StepKind {
    /// Status word for log lines.
    pub fn verb(&self) -> &'static str {
        match self {
            StepKind::Codegen => "Cythonizing",
            StepKind::Compile => "Compiling",
            StepKind::Link => "Linking",
        }
    }
}

/// A build step in the plan.
#[derive(Debug, Clone, Serialize)]
pub struct BuildStep {
    pub kind: StepKind,
    pub command: CommandSpec,
    /// Files whose contents the output depends on
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Extensions of files the code generator reads through `cimport`/`include`.
const INTERFACE_EXTENSIONS: [&str; 2] = ["pxd", "pxi"];

/// Tools and locations a plan is made for.
pub struct PlanInputs<'a> {
    /// Directory the source and data-file paths are relative to
    pub project_root: &'a Path,
    pub build_dir: &'a Path,
    pub host: &'a HostInfo,
    pub toolchain: &'a dyn Toolchain,
    pub cython: Option<&'a Cython>,
    pub cflags: &'a [String],
    pub ldflags: &'a [String],
}

/// Plan the build of the declared extension.
pub fn plan_build(decl: &SetupDeclaration, inputs: &PlanInputs<'_>) -> Result<BuildPlan> {
    let ext = &decl.extension;
    let options = &ext.options;
    let source = ext.source().to_path_buf();

    let Some(stem) = source
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
    else {
        bail!("extension source `{}` has no file name", source.display());
    };

    let include_dirs: Vec<PathBuf> = options.include_dirs.iter().map(PathBuf::from).collect();
    let mut steps = Vec::new();

    let c_source = if needs_codegen(&source) {
        let Some(cython) = inputs.cython else {
            bail!(
                "`{}` needs the Cython code generator, which was not found\n\
                 help: Install cython, or point CYTHON at it",
                source.display()
            );
        };

        let generated = inputs.build_dir.join(format!("{}.c", stem));
        let codegen = CodegenInput {
            source: source.clone(),
            output: generated.clone(),
            module_name: ext.name.clone(),
            include_dirs: include_dirs.clone(),
        };

        let mut codegen_inputs = vec![source.clone()];
        codegen_inputs.extend(interface_files(decl, inputs.project_root)?);

        steps.push(BuildStep {
            kind: StepKind::Codegen,
            command: cython.command(&codegen),
            inputs: codegen_inputs,
            output: generated.clone(),
        });

        generated
    } else {
        source
    };

    let object = inputs
        .build_dir
        .join(TEMP_DIR)
        .join(format!("{}.o", stem));

    let mut compile_includes = include_dirs;
    compile_includes.push(inputs.host.include.clone());

    let compile = CompileInput {
        source: c_source.clone(),
        output: object.clone(),
        include_dirs: compile_includes,
        cflags: inputs.cflags.to_vec(),
    };

    steps.push(BuildStep {
        kind: StepKind::Compile,
        command: inputs.toolchain.compile_command(&compile),
        inputs: vec![c_source],
        output: object.clone(),
    });

    let artifact = inputs
        .build_dir
        .join(inputs.host.module_file_name(&ext.name));

    let link = LinkInput {
        objects: vec![object.clone()],
        output: artifact.clone(),
        lib_dirs: options.library_dirs.iter().map(PathBuf::from).collect(),
        libs: options.libraries.clone(),
        ldflags: inputs.ldflags.to_vec(),
    };

    steps.push(BuildStep {
        kind: StepKind::Link,
        command: inputs.toolchain.link_module_command(&link),
        inputs: vec![object],
        output: artifact.clone(),
    });

    Ok(BuildPlan { steps, artifact })
}

/// The declared `.pxd`/`.pxi` data files present in the project, relative
/// to `project_root`.
///
/// The generated C embeds their declarations, so editing one must rerun the
/// code generator.
fn interface_files(decl: &SetupDeclaration, project_root: &Path) -> Result<Vec<PathBuf>> {
    let patterns: Vec<String> = decl
        .data_files
        .iter()
        .flat_map(|group| group.files.iter().cloned())
        .collect();

    let files = glob_existing(project_root, &patterns)?
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| INTERFACE_EXTENSIONS.contains(&e))
        })
        .map(|path| {
            path.strip_prefix(project_root)
                .map(Path::to_path_buf)
                .unwrap_or(path)
        })
        .collect();

    Ok(files)
}
