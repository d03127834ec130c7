//! Application layer for xtumlgen.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (BuildOrchestrator)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer. Decisions such as
//! "does this cycle need a rebuild?" live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{BuildOrchestrator, CycleOutcome, OrchestratorPorts};

// Re-export port traits (for adapter implementation)
pub use ports::{
    BuildContext, BuildLifecycle, DependencySink, FileCollector, FileHandler, Filesystem,
    PreconditionChecker, ProcessExit, ProcessRunner,
};

pub use error::ApplicationError;
