//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Copy a file into a directory, creating the directory if needed.
///
/// Returns the path of the copy.
pub fn copy_into(file: &Path, dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("not a file path: {}", file.display()))?;
    ensure_dir(dir)?;

    let dest = dir.join(name);
    fs::copy(file, &dest)
        .with_context(|| format!("failed to copy {} to {}", file.display(), dest.display()))?;
    Ok(dest)
}

/// Find files matching glob patterns relative to a base directory.
///
/// A pattern without glob metacharacters must name an existing file.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    for pattern in patterns.iter().filter(|p| !is_glob(p)) {
        let path = base.join(pattern);
        anyhow::ensure!(path.is_file(), "file not found: {}", path.display());
    }
    glob_existing(base, patterns)
}

/// Find the existing files matching glob patterns relative to a base directory.
///
/// Literal paths that do not exist are skipped.
pub fn glob_existing(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Place `path` under `root`.
///
/// Absolute paths lose their root/prefix component, relative paths are
/// joined as they are. `/usr/include/king` under `/tmp/stage` becomes
/// `/tmp/stage/usr/include/king`.
pub fn reroot(root: &Path, path: &Path) -> PathBuf {
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    root.join(relative)
}
