//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `xtumlgen-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: Workspace directory creation
//!   - `FileCollector`: Recursive source-model discovery
//!   - `ProcessRunner`: Toolchain process launches
//!   - `PreconditionChecker`: Toolchain runtime verification
//!   - `DependencySink`: The host's file-dependency graph
//!
//! - **Driving (Input) Ports**: Called by the host, implemented by application
//!   - `BuildLifecycle`: environment / before_run / watch_run / after_compile

pub mod input;
pub mod output;

pub use input::{BuildContext, BuildLifecycle};
pub use output::{
    DependencySink, FileCollector, FileHandler, Filesystem, PreconditionChecker, ProcessExit,
    ProcessRunner,
};
