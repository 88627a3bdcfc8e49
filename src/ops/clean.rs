//! `clean`: remove build outputs.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::util::fs::{glob_existing, remove_dir_all_if_exists};
use crate::util::GlobalContext;

use super::declare::load_manifest;

/// Remove the build directory, and with `all` the in-place module copies.
///
/// Returns the removed paths.
pub fn clean(ctx: &GlobalContext, all: bool) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    let build_dir = ctx.build_dir();
    if build_dir.exists() {
        remove_dir_all_if_exists(&build_dir)?;
        removed.push(build_dir);
    }

    if all {
        let manifest = load_manifest(ctx)?;
        let name = manifest.extension_name();
        let patterns = vec![
            format!("{}.so", name),
            format!("{}.*.so", name),
            format!("{}.*.pyd", name),
        ];

        for file in glob_existing(ctx.project_root(), &patterns)? {
            std::fs::remove_file(&file)
                .with_context(|| format!("failed to remove {}", file.display()))?;
            removed.push(file);
        }
    }

    for path in &removed {
        tracing::info!("{:>12} {}", "Removed", path.display());
    }

    Ok(removed)
}
