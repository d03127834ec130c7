//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the orchestrator needs from the outside world.
//! The `xtumlgen-adapters` crate provides implementations; the host's
//! dependency graph implements [`DependencySink`].

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Invocation;
use crate::error::CodegenResult;

/// Callback invoked once per regular file found by a [`FileCollector`].
///
/// May be called from several tasks at once.
pub type FileHandler = Arc<dyn Fn(&Path) -> CodegenResult<()> + Send + Sync>;

/// Port for workspace filesystem operations.
///
/// Implemented by:
/// - `xtumlgen_adapters::LocalFilesystem`
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories. Succeeds if it exists.
    async fn create_dir_all(&self, path: &Path) -> CodegenResult<()>;
}

/// Port for recursive file discovery.
///
/// Implemented by:
/// - `xtumlgen_adapters::LocalFileCollector`
#[async_trait]
pub trait FileCollector: Send + Sync {
    /// Call `handler` once for every regular file reachable from `root`.
    ///
    /// `root` itself is passed to the handler when it is a file. Directories
    /// are never passed. Fails if `root` cannot be stat'd; a handler error
    /// aborts the walk and is returned unchanged.
    async fn for_each_file(&self, root: &Path, handler: FileHandler) -> CodegenResult<()>;
}

/// How a successful process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

/// Port for launching external programs.
///
/// Implemented by:
/// - `xtumlgen_adapters::TokioProcessRunner`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// Resolves only on exit code 0. Any other code, or death by signal,
    /// is `ApplicationError::ProcessExited`. Output is never captured.
    async fn run(&self, invocation: &Invocation) -> CodegenResult<ProcessExit>;
}

/// Port for verifying the toolchain's runtime before the first build.
///
/// Implemented by:
/// - `xtumlgen_adapters::PythonEnvironment`
#[cfg_attr(test, mockall::automock)]
pub trait PreconditionChecker: Send + Sync {
    /// Fail with `InterpreterMissing`, `PackageMissing` or `SchemaMissing`
    /// on the first absent requirement. Never installs anything.
    fn check(&self) -> CodegenResult<()>;
}

/// The host's own file-dependency graph.
///
/// Adding a path that is already present must be a no-op.
pub trait DependencySink {
    fn add_file_dependency(&mut self, path: &Path);
}

impl DependencySink for HashSet<PathBuf> {
    fn add_file_dependency(&mut self, path: &Path) {
        self.insert(path.to_path_buf());
    }
}

impl DependencySink for BTreeSet<PathBuf> {
    fn add_file_dependency(&mut self, path: &Path) {
        self.insert(path.to_path_buf());
    }
}
