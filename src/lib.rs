//! king-setup - build and install the King Cython extension
//!
//! The King extension wraps the native `king` library. Its compiler and
//! linker flags come from `pkg-config`, the interface definition goes
//! through Cython, and the resulting module plus the `King.pxd` header are
//! installed next to the interpreter and the library headers.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for king-setup unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    declaration::SetupDeclaration, flags::OptionSet, manifest::SetupManifest,
};

pub use resolver::{resolve_flags, FlagSource, PkgConfig};
pub use util::context::GlobalContext;
