//! `build-ext`: generate, compile and link the extension module.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::codegen::Cython;
use crate::builder::host::HostInfo;
use crate::builder::{
    detect_toolchain, plan_build, BuildPlan, BuildReport, Executor, PlanInputs, Toolchain,
};
use crate::core::declaration::SetupDeclaration;
use crate::util::fs::copy_into;
use crate::util::GlobalContext;

use super::declare::{declare, host_probe};

/// Options for build-ext.
#[derive(Debug, Clone, Default)]
pub struct BuildExtOptions {
    /// Copy the built module into the project root
    pub inplace: bool,

    /// Rebuild even if fingerprints match
    pub force: bool,

    /// Only produce the plan
    pub plan_only: bool,
}

/// What build-ext produced.
#[derive(Debug, Clone)]
pub struct BuildExtResult {
    pub declaration: SetupDeclaration,
    pub host: HostInfo,
    pub plan: BuildPlan,
    /// None when only planning
    pub report: Option<BuildReport>,
    /// The in-place copy, if requested
    pub inplace_copy: Option<PathBuf>,
}

/// Run build-ext with tools located from the context.
pub fn build_ext(ctx: &GlobalContext, opts: &BuildExtOptions) -> Result<BuildExtResult> {
    let declaration = declare(ctx)?;
    let host = host_probe(ctx)?.info()?;
    tracing::debug!("building for python {}", host.version);

    let toolchain = detect_toolchain(ctx)?;
    let cython = ctx.cython_program().map(Cython::new);

    build_ext_with(ctx, declaration, host, toolchain.as_ref(), cython.as_ref(), opts)
}

/// Run build-ext with explicit tools.
pub fn build_ext_with(
    ctx: &GlobalContext,
    declaration: SetupDeclaration,
    host: HostInfo,
    toolchain: &dyn Toolchain,
    cython: Option<&Cython>,
    opts: &BuildExtOptions,
) -> Result<BuildExtResult> {
    let build_dir = ctx.build_dir();
    let config = &ctx.config().build;

    let inputs = PlanInputs {
        project_root: ctx.project_root(),
        build_dir: &build_dir,
        host: &host,
        toolchain,
        cython,
        cflags: &config.cflags,
        ldflags: &config.ldflags,
    };
    let plan = plan_build(&declaration, &inputs)?;

    if opts.plan_only {
        return Ok(BuildExtResult {
            declaration,
            host,
            plan,
            report: None,
            inplace_copy: None,
        });
    }

    let report = Executor::new(ctx.project_root())
        .force(opts.force || config.force)
        .execute(&plan)
        .with_context(|| format!("failed to build extension `{}`", declaration.extension.name))?;

    let inplace_copy = if opts.inplace {
        Some(copy_into(&report.artifact, ctx.project_root())?)
    } else {
        None
    };

    tracing::info!(
        "{:>12} {} ({} step(s) run, {} fresh)",
        "Finished",
        report.artifact.display(),
        report.executed,
        report.fresh
    );

    Ok(BuildExtResult {
        declaration,
        host,
        plan,
        report: Some(report),
        inplace_copy,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::builder::toolchain::{GccToolchain, ToolchainPlatform};
    use crate::core::flags::OptionSet;
    use crate::core::manifest::SetupManifest;
    use crate::test_support::{fake_tool, host_info, king_project};
    use tempfile::TempDir;

    /// Writes "generated" to whatever follows `-o`.
    const WRITE_OUTPUT: &str = r#"out=""; prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
echo generated > "$out""#;

    fn declaration() -> SetupDeclaration {
        SetupDeclaration::declare(
            &SetupManifest::default(),
            OptionSet::parse("-I/usr/include/king -lking"),
            Some("/np".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_build_ext_runs_all_steps_then_is_fresh() {
        let tmp = TempDir::new().unwrap();
        king_project(tmp.path());
        let tools = TempDir::new().unwrap();
        let cython = Cython::new(fake_tool(tools.path(), "cython", WRITE_OUTPUT));
        let cc = GccToolchain::new(fake_tool(tools.path(), "cc", WRITE_OUTPUT), ToolchainPlatform::Gcc);
        let ctx = GlobalContext::with_global_config(tmp.path().to_path_buf(), None);
        let opts = BuildExtOptions {
            inplace: true,
            ..Default::default()
        };

        let result = build_ext_with(&ctx, declaration(), host_info(), &cc, Some(&cython), &opts).unwrap();

        let report = result.report.unwrap();
        assert_eq!(report.executed, 3);
        assert_eq!(
            report.artifact,
            tmp.path().join("build/King.cpython-312-x86_64-linux-gnu.so")
        );
        assert!(report.artifact.exists());
        assert_eq!(
            result.inplace_copy,
            Some(tmp.path().join("King.cpython-312-x86_64-linux-gnu.so"))
        );

        let again = build_ext_with(&ctx, declaration(), host_info(), &cc, Some(&cython), &opts).unwrap();
        let report = again.report.unwrap();
        assert_eq!(report.executed, 0);
        assert_eq!(report.fresh, 3);
    }

    #[test]
    fn test_editing_header_reruns_codegen() {
        let tmp = TempDir::new().unwrap();
        king_project(tmp.path());
        let tools = TempDir::new().unwrap();
        let cython = Cython::new(fake_tool(tools.path(), "cython", WRITE_OUTPUT));
        let cc = GccToolchain::new(fake_tool(tools.path(), "cc", WRITE_OUTPUT), ToolchainPlatform::Gcc);
        let ctx = GlobalContext::with_global_config(tmp.path().to_path_buf(), None);
        let opts = BuildExtOptions::default();

        build_ext_with(&ctx, declaration(), host_info(), &cc, Some(&cython), &opts).unwrap();

        std::fs::write(
            tmp.path().join("King.pxd"),
            "cdef extern from \"king.h\":\n    int king_version()\n    int king_reset()\n",
        )
        .unwrap();

        let again = build_ext_with(&ctx, declaration(), host_info(), &cc, Some(&cython), &opts).unwrap();
        let report = again.report.unwrap();
        // the fake generator writes identical C, so compile and link stay fresh
        assert_eq!(report.executed, 1);
        assert_eq!(report.fresh, 2);
    }

    #[test]
    fn test_plan_only_runs_nothing() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_global_config(tmp.path().to_path_buf(), None);
        let cc = GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc);
        let cython = Cython::new("cython");
        let opts = BuildExtOptions {
            plan_only: true,
            ..Default::default()
        };

        let result = build_ext_with(&ctx, declaration(), host_info(), &cc, Some(&cython), &opts).unwrap();
        assert!(result.report.is_none());
        assert_eq!(result.plan.steps.len(), 3);
        assert!(!tmp.path().join("build").exists());
    }

    #[test]
    fn test_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_global_config(tmp.path().to_path_buf(), None);
        let cc = GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc);
        let cython = Cython::new("cython");

        let err = build_ext_with(
            &ctx,
            declaration(),
            host_info(),
            &cc,
            Some(&cython),
            &BuildExtOptions::default(),
        )
        .unwrap_err();

        let msg = format!("{:#}", err);
        assert!(msg.contains("missing build input"));
        assert!(msg.contains("failed to build extension `King`"));
    }
}
