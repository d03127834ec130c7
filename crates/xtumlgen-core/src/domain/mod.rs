//! Domain layer: pure data and decisions, no I/O.

pub mod dependency_set;
pub mod error;
pub mod options;
pub mod paths;
pub mod toolchain;
pub mod trigger;
pub mod validation;

pub use dependency_set::DependencySet;
pub use error::DomainError;
pub use options::{CodegenOptions, OptionsOverrides, QuietLevel, StdioPlan, StreamMode};
pub use toolchain::{Invocation, MODEL_SUFFIX, REQUIRED_PACKAGES, Stage, Toolchain};
pub use trigger::BuildTrigger;
pub use validation::DomainValidator;
