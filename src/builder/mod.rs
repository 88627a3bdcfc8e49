//! The build-ext driver: code generation, compilation and linking of the
//! extension module.

pub mod codegen;
pub mod executor;
pub mod fingerprint;
pub mod host;
pub mod plan;
pub mod toolchain;

pub use codegen::Cython;
pub use executor::{BuildReport, Executor};
pub use host::{HostInfo, HostProbe};
pub use plan::{plan_build, BuildPlan, BuildStep, PlanInputs, StepKind};
pub use toolchain::{detect_toolchain, Toolchain};
