//! Driving (input) ports - called by the host build system.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::application::ports::output::DependencySink;
use crate::application::services::CycleOutcome;
use crate::error::CodegenResult;

/// Snapshot of the host's state for one lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Directory relative configured paths are resolved against.
    pub project_root: PathBuf,
    /// `true` when the host re-runs builds on file changes.
    pub watch_mode: bool,
    /// Paths the host's watcher saw change since the last cycle.
    pub modified_files: Vec<PathBuf>,
}

impl BuildContext {
    /// A one-shot build rooted at `project_root`.
    pub fn single_run(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            watch_mode: false,
            modified_files: Vec::new(),
        }
    }

    /// A watch-mode cycle with the watcher's modified paths.
    pub fn watching<I, P>(project_root: impl Into<PathBuf>, modified_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            project_root: project_root.into(),
            watch_mode: true,
            modified_files: modified_files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lifecycle hooks a host build system dispatches, in order:
///
/// ```text
/// environment (once) -> { before_run | watch_run } -> after_compile -> ...
/// ```
#[async_trait]
pub trait BuildLifecycle: Send + Sync {
    /// Startup. Verifies the toolchain; an error must abort the host.
    fn environment(&self) -> CodegenResult<()>;

    /// A single-shot build is about to compile.
    async fn before_run(&self, ctx: &BuildContext) -> CodegenResult<CycleOutcome>;

    /// A watch-mode rebuild is about to compile.
    async fn watch_run(&self, ctx: &BuildContext) -> CodegenResult<CycleOutcome>;

    /// The host finished compiling. Returns how many paths were published.
    fn after_compile(
        &self,
        ctx: &BuildContext,
        sink: &mut dyn DependencySink,
    ) -> CodegenResult<usize>;
}
