//! Core data types: flag tokens, the manifest and the build declaration.

pub mod declaration;
pub mod flags;
pub mod manifest;

pub use declaration::{DataFileDescriptor, ExtensionDescriptor, SetupDeclaration};
pub use flags::{FlagCategory, FlagToken, OptionSet};
pub use manifest::{ManifestError, SetupManifest};
