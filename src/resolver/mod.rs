//! Compiler/linker flag resolution.

pub mod errors;
pub mod pkg_config;

pub use errors::FlagError;
pub use pkg_config::{resolve_flags, FlagSource, PkgConfig};
