//! The build declaration: one extension target plus its data files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::flags::OptionSet;
use crate::core::manifest::{ManifestError, PackageMetadata, SetupManifest};

/// A compiled extension target, built from exactly one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    pub name: String,
    source: PathBuf,
    pub options: OptionSet,
}

impl ExtensionDescriptor {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>, options: OptionSet) -> Self {
        ExtensionDescriptor {
            name: name.into(),
            source: source.into(),
            options,
        }
    }

    /// The source file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The source list handed to the build, always one entry long.
    pub fn sources(&self) -> &[PathBuf] {
        std::slice::from_ref(&self.source)
    }
}

/// Files copied into one destination directory on install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFileDescriptor {
    pub destination: PathBuf,
    pub files: Vec<String>,
}

/// Everything install and build-ext need to know about the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupDeclaration {
    pub metadata: PackageMetadata,
    pub extension: ExtensionDescriptor,
    pub data_files: Vec<DataFileDescriptor>,
}

impl SetupDeclaration {
    /// Combine the manifest with resolved flags.
    ///
    /// The manifest's include directories, then `array_include` (the host's
    /// numpy headers, when given), are appended after the discovered include
    /// directories. Every data-file group lands in the first include
    /// directory joined with the group's subdirectory.
    pub fn declare(
        manifest: &SetupManifest,
        mut options: OptionSet,
        array_include: Option<String>,
    ) -> Result<Self, ManifestError> {
        manifest.validate()?;

        options.augment_include_dirs(manifest.extension.include_dirs.iter().cloned());
        options.augment_include_dirs(array_include);

        let data_files = if manifest.data_files.is_empty() {
            Vec::new()
        } else {
            let first = options.include_dirs.first().ok_or_else(|| ManifestError::Invalid {
                message: "data files are installed below the first include directory, \
                          but no include directory was resolved"
                    .to_string(),
            })?;

            manifest
                .data_files
                .iter()
                .map(|group| DataFileDescriptor {
                    destination: Path::new(first).join(&group.subdir),
                    files: group.files.clone(),
                })
                .collect()
        };

        let [source] = manifest.extension.sources.as_slice() else {
            return Err(ManifestError::Invalid {
                message: "an extension is built from exactly one source file".to_string(),
            });
        };
        let extension = ExtensionDescriptor::new(manifest.extension_name(), source, options);

        Ok(SetupDeclaration {
            metadata: manifest.package.clone(),
            extension,
            data_files,
        })
    }

    /// The option set handed to the compiler and linker.
    pub fn options(&self) -> &OptionSet {
        &self.extension.options
    }
}

impl fmt::Display for SetupDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::DataFilesSpec;

    const NUMPY: &str = "/usr/lib/python3/dist-packages/numpy/core/include";

    fn declare(flags: &str) -> SetupDeclaration {
        SetupDeclaration::declare(
            &SetupManifest::default(),
            OptionSet::parse(flags),
            Some(NUMPY.to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_single_extension_from_one_source() {
        let decl = declare("-I/usr/include/king -L/usr/lib -lking");

        assert_eq!(decl.extension.name, "King");
        assert_eq!(decl.extension.sources(), [PathBuf::from("cKing.pyx")]);
        assert_eq!(decl.extension.source(), Path::new("cKing.pyx"));
        assert_eq!(decl.options().library_dirs, vec!["/usr/lib"]);
        assert_eq!(decl.options().libraries, vec!["king"]);
        assert_eq!(decl.metadata.version, "1.0");
    }

    #[test]
    fn test_descriptor_always_has_one_source() {
        let ext = ExtensionDescriptor::new("King", "cKing.c", OptionSet::new());

        assert_eq!(ext.sources().len(), 1);
        assert_eq!(ext.source(), Path::new("cKing.c"));

        let json = serde_json::to_value(&ext).unwrap();
        assert_eq!(json["source"], "cKing.c");
    }

    #[test]
    fn test_fixed_include_dirs_follow_parsed_ones() {
        let decl = declare("-I/a -I/b");
        assert_eq!(decl.options().include_dirs, vec!["/a", "/b", ".", NUMPY]);
    }

    #[test]
    fn test_data_file_destination_is_first_include_dir() {
        let decl = declare("-I/usr/include/king-1.0 -lking");

        assert_eq!(decl.data_files.len(), 1);
        assert_eq!(
            decl.data_files[0].destination,
            Path::new(&decl.options().include_dirs[0]).join("king")
        );
        assert_eq!(
            decl.data_files[0].destination,
            PathBuf::from("/usr/include/king-1.0/king")
        );
        assert_eq!(decl.data_files[0].files, vec!["King.pxd"]);
    }

    #[test]
    fn test_no_discovered_include_dirs_uses_current_dir() {
        let decl = declare("-lking");
        assert_eq!(decl.data_files[0].destination, PathBuf::from("./king"));
    }

    #[test]
    fn test_numpy_include_optional() {
        let decl = SetupDeclaration::declare(
            &SetupManifest::default(),
            OptionSet::parse("-I/inc"),
            None,
        )
        .unwrap();
        assert_eq!(decl.options().include_dirs, vec!["/inc", "."]);
    }

    #[test]
    fn test_no_include_dir_for_data_files_is_an_error() {
        let mut manifest = SetupManifest::default();
        manifest.extension.include_dirs.clear();

        let result = SetupDeclaration::declare(&manifest, OptionSet::parse("-lking"), None);
        assert!(matches!(result, Err(ManifestError::Invalid { .. })));
    }

    #[test]
    fn test_multiple_data_file_groups() {
        let mut manifest = SetupManifest::default();
        manifest.data_files.push(DataFilesSpec {
            subdir: "king/extra".to_string(),
            files: vec!["*.pxi".to_string()],
        });

        let decl =
            SetupDeclaration::declare(&manifest, OptionSet::parse("-I/inc"), None).unwrap();
        assert_eq!(decl.data_files[1].destination, PathBuf::from("/inc/king/extra"));
    }

    #[test]
    fn test_display_prints_options() {
        let decl = declare("-I/inc -lking");
        assert_eq!(
            decl.to_string(),
            format!(
                "{{'include_dirs': ['/inc', '.', '{}'], 'library_dirs': [], 'libraries': ['king']}}",
                NUMPY
            )
        );
    }
}
