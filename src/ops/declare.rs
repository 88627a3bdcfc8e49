//! Flag resolution followed by the build declaration.

use anyhow::{bail, Result};

use crate::builder::host::HostProbe;
use crate::core::declaration::SetupDeclaration;
use crate::core::manifest::SetupManifest;
use crate::resolver::{resolve_flags, FlagSource, PkgConfig};
use crate::util::GlobalContext;

/// Locate the host interpreter.
pub fn host_probe(ctx: &GlobalContext) -> Result<HostProbe> {
    match ctx.python_program() {
        Some(python) => Ok(HostProbe::new(python)),
        None => bail!(
            "python interpreter not found\n\
             help: Install python3, or point PYTHON at the interpreter to build for"
        ),
    }
}

/// Load the manifest, query pkg-config and declare the extension.
pub fn declare(ctx: &GlobalContext) -> Result<SetupDeclaration> {
    let manifest = load_manifest(ctx)?;
    let pkg_config =
        PkgConfig::from_context(ctx).map_err(|e| anyhow::Error::msg(e.to_diagnostic()))?;

    let probe = if manifest.extension.numpy {
        Some(host_probe(ctx)?)
    } else {
        None
    };

    declare_with(&manifest, &pkg_config, probe.as_ref())
}

/// Load `Setup.toml`, or the built-in defaults.
pub fn load_manifest(ctx: &GlobalContext) -> Result<SetupManifest> {
    SetupManifest::load_or_default(ctx.manifest_path())
        .map_err(|e| anyhow::Error::msg(e.to_diagnostic()))
}

/// Declare the extension from an explicit flag source and host.
///
/// `probe` is consulted only when the manifest asks for numpy headers.
pub fn declare_with(
    manifest: &SetupManifest,
    flags: &dyn FlagSource,
    probe: Option<&HostProbe>,
) -> Result<SetupDeclaration> {
    let options = resolve_flags(flags, &manifest.extension.pkg_config)
        .map_err(|e| anyhow::Error::msg(e.to_diagnostic()))?;

    let array_include = if manifest.extension.numpy {
        let Some(probe) = probe else {
            bail!("numpy headers were requested but no python interpreter is available");
        };
        Some(probe.numpy_include()?)
    } else {
        None
    };

    let declaration = SetupDeclaration::declare(manifest, options, array_include)
        .map_err(|e| anyhow::Error::msg(e.to_diagnostic()))?;

    tracing::debug!("declared options {}", declaration);
    Ok(declaration)
}
