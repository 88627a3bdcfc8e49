//! Command implementations

pub mod build_ext;
pub mod clean;
pub mod completions;
pub mod doctor;
pub mod flags;
pub mod install;
