//! `install`: build the extension, then copy it and the data files into place.
//!
//! Relative data-file destinations (the `./king` produced when pkg-config
//! reports no include directory) resolve against the install prefix, the
//! way the interpreter's own installers treat them. `--root` stages every
//! destination below another directory.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::host::HostInfo;
use crate::core::declaration::SetupDeclaration;
use crate::util::fs::{copy_into, glob_files, reroot};
use crate::util::GlobalContext;

use super::build_ext::{build_ext, BuildExtOptions};

/// Options for install.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Stage all destinations below this directory
    pub root: Option<PathBuf>,

    /// Prefix for relative data-file destinations (default: the interpreter's prefix)
    pub prefix: Option<PathBuf>,

    /// Directory for the extension module (default: the interpreter's platlib)
    pub target_dir: Option<PathBuf>,

    /// List the copies without building or copying
    pub dry_run: bool,

    /// Rebuild even if fingerprints match
    pub force: bool,
}

/// One file copied by install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCopy {
    pub source: PathBuf,
    pub destination_dir: PathBuf,
}

impl FileCopy {
    /// Full path of the installed file.
    pub fn destination(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.destination_dir.join(name),
            None => self.destination_dir.clone(),
        }
    }
}

/// Build and install.
pub fn install(ctx: &GlobalContext, opts: &InstallOptions) -> Result<Vec<FileCopy>> {
    let build = build_ext(
        ctx,
        &BuildExtOptions {
            inplace: false,
            force: opts.force,
            plan_only: opts.dry_run,
        },
    )?;

    let copies = plan_install(
        &build.declaration,
        &build.plan.artifact,
        &build.host,
        ctx.project_root(),
        opts,
    )?;

    if opts.dry_run {
        return Ok(copies);
    }

    perform_install(&copies)?;
    Ok(copies)
}

/// Work out every copy install performs.
///
/// Data files are matched against the project root; a listed file that does
/// not exist is an error.
pub fn plan_install(
    decl: &SetupDeclaration,
    artifact: &Path,
    host: &HostInfo,
    project_root: &Path,
    opts: &InstallOptions,
) -> Result<Vec<FileCopy>> {
    let staged = |dir: PathBuf| match &opts.root {
        Some(root) => reroot(root, &dir),
        None => dir,
    };
    let prefix = opts.prefix.clone().unwrap_or_else(|| host.prefix.clone());

    let mut copies = vec![FileCopy {
        source: artifact.to_path_buf(),
        destination_dir: staged(
            opts.target_dir
                .clone()
                .unwrap_or_else(|| host.platlib.clone()),
        ),
    }];

    for group in &decl.data_files {
        let destination = if group.destination.is_absolute() {
            group.destination.clone()
        } else {
            prefix.join(&group.destination)
        };
        let destination = staged(destination);

        for file in glob_files(project_root, &group.files)? {
            copies.push(FileCopy {
                source: file,
                destination_dir: destination.clone(),
            });
        }
    }

    Ok(copies)
}

/// Copy every file.
pub fn perform_install(copies: &[FileCopy]) -> Result<()> {
    for copy in copies {
        let installed = copy_into(&copy.source, &copy.destination_dir)?;
        tracing::info!("{:>12} {}", "Installed", installed.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flags::OptionSet;
    use crate::core::manifest::SetupManifest;
    use crate::test_support::{host_info, king_project};
    use tempfile::TempDir;

    fn declaration(flags: &str) -> SetupDeclaration {
        SetupDeclaration::declare(&SetupManifest::default(), OptionSet::parse(flags), None).unwrap()
    }

    const ARTIFACT: &str = "/p/build/King.cpython-312-x86_64-linux-gnu.so";

    #[test]
    fn test_plan_install_defaults() {
        let tmp = TempDir::new().unwrap();
        king_project(tmp.path());

        let copies = plan_install(
            &declaration("-I/usr/include/king -lking"),
            Path::new(ARTIFACT),
            &host_info(),
            tmp.path(),
            &InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].destination_dir, PathBuf::from("/usr/lib/python3/dist-packages"));
        assert_eq!(copies[1].source, tmp.path().join("King.pxd"));
        assert_eq!(copies[1].destination_dir, PathBuf::from("/usr/include/king/king"));
        assert_eq!(
            copies[1].destination(),
            PathBuf::from("/usr/include/king/king/King.pxd")
        );
    }

    #[test]
    fn test_plan_install_rerooted() {
        let tmp = TempDir::new().unwrap();
        king_project(tmp.path());
        let opts = InstallOptions {
            root: Some(PathBuf::from("/stage")),
            ..Default::default()
        };

        let copies = plan_install(
            &declaration("-I/usr/include/king"),
            Path::new(ARTIFACT),
            &host_info(),
            tmp.path(),
            &opts,
        )
        .unwrap();

        assert_eq!(
            copies[0].destination_dir,
            PathBuf::from("/stage/usr/lib/python3/dist-packages")
        );
        assert_eq!(copies[1].destination_dir, PathBuf::from("/stage/usr/include/king/king"));
    }

    #[test]
    fn test_relative_destination_uses_prefix() {
        let tmp = TempDir::new().unwrap();
        king_project(tmp.path());
        let opts = InstallOptions {
            prefix: Some(PathBuf::from("/opt/king")),
            ..Default::default()
        };

        let copies = plan_install(
            &declaration("-lking"),
            Path::new(ARTIFACT),
            &host_info(),
            tmp.path(),
            &opts,
        )
        .unwrap();

        assert_eq!(copies[1].destination_dir, PathBuf::from("/opt/king/king"));
    }

    #[test]
    fn test_missing_data_file_is_an_error() {
        let tmp = TempDir::new().unwrap();

        let err = plan_install(
            &declaration("-I/inc"),
            Path::new(ARTIFACT),
            &host_info(),
            tmp.path(),
            &InstallOptions::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("King.pxd"));
    }

    #[test]
    fn test_perform_install_copies_files() {
        let tmp = TempDir::new().unwrap();
        king_project(tmp.path());
        let dest = tmp.path().join("stage").join("include").join("king");

        let copies = vec![FileCopy {
            source: tmp.path().join("King.pxd"),
            destination_dir: dest.clone(),
        }];
        perform_install(&copies).unwrap();

        assert!(dest.join("King.pxd").exists());
    }
}
