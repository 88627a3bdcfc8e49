//! High-level operations.
//!
//! This module contains the implementation of king-setup commands.

pub mod build_ext;
pub mod clean;
pub mod declare;
pub mod doctor;
pub mod install;

pub use build_ext::{build_ext, build_ext_with, BuildExtOptions, BuildExtResult};
pub use clean::clean;
pub use declare::{declare, declare_with, host_probe, load_manifest};
pub use doctor::{doctor, format_report, DoctorReport};
pub use install::{install, perform_install, plan_install, FileCopy, InstallOptions};
