//! Infrastructure adapters for xtumlgen.
//!
//! This crate implements the ports defined in `xtumlgen-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod collector;
pub mod config;
pub mod environment;
pub mod filesystem;
pub mod logging;
pub mod process;

use std::path::PathBuf;

use xtumlgen_core::{
    application::{BuildOrchestrator, OrchestratorPorts},
    domain::{CodegenOptions, Toolchain},
    error::CodegenResult,
};

// Re-export commonly used adapters
pub use collector::LocalFileCollector;
pub use config::OptionsLoader;
pub use environment::PythonEnvironment;
pub use filesystem::LocalFilesystem;
pub use logging::{LogSettings, init_logging};
pub use process::TokioProcessRunner;

/// Schema artifact imported ahead of every stage-1 output.
///
/// The file comes from the BridgePoint distribution and is installed into
/// `schema/` next to this crate. [`PythonEnvironment::for_toolchain`] refuses
/// to pass the precondition check while it is absent.
pub fn bundled_schema() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("schema")
        .join("schema.sql")
}

/// Orchestrator for the BridgePoint toolchain with the local adapters.
pub fn bridgepoint_orchestrator(options: CodegenOptions) -> CodegenResult<BuildOrchestrator> {
    let toolchain = Toolchain::bridgepoint(bundled_schema());
    let ports = OrchestratorPorts {
        runner: Box::new(TokioProcessRunner::new()),
        collector: Box::new(LocalFileCollector::new()),
        filesystem: Box::new(LocalFilesystem::new()),
        environment: Box::new(PythonEnvironment::for_toolchain(&toolchain)),
    };
    BuildOrchestrator::new(options, toolchain, ports)
}
