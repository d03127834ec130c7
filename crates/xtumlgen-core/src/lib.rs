//! xtumlgen Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for driving a
//! two-stage xtUML code generation toolchain from a host build system,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Host build system                │
//! │  (environment / before_run / watch_run  │
//! │   / after_compile)                      │
//! └──────────────────┬──────────────────────┘
//!                    │ calls (BuildLifecycle)
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │          (BuildOrchestrator)            │
//! │   Decide → Pre-build → Generate         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (ProcessRunner, FileCollector,          │
//! │  Filesystem, PreconditionChecker)       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   xtumlgen-adapters (Infrastructure)    │
//! │ (TokioProcessRunner, LocalFileCollector │
//! │  PythonEnvironment, OptionsLoader)      │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (CodegenOptions, DependencySet,         │
//! │  BuildTrigger, Toolchain)               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xtumlgen_core::prelude::*;
//!
//! // 1. Wire adapters
//! let orchestrator = BuildOrchestrator::new(options, Toolchain::bridgepoint(schema), ports)?;
//!
//! // 2. Dispatch host events
//! orchestrator.environment()?;
//! orchestrator.before_run(&BuildContext::single_run("/path/to/project")).await?;
//! orchestrator.after_compile(&ctx, &mut host_dependencies)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BuildContext, BuildLifecycle, BuildOrchestrator, CycleOutcome, OrchestratorPorts,
        ports::{
            DependencySink, FileCollector, FileHandler, Filesystem, PreconditionChecker,
            ProcessExit, ProcessRunner,
        },
    };
    pub use crate::domain::{
        BuildTrigger, CodegenOptions, DependencySet, Invocation, OptionsOverrides, QuietLevel,
        Stage, StdioPlan, StreamMode, Toolchain,
    };
    pub use crate::error::{CodegenError, CodegenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
