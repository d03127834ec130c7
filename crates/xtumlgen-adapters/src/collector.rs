//! Recursive file discovery on the local filesystem.
//!
//! Every entry of a directory is visited on its own tokio task; a directory
//! completes only after all of its branches have been joined.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, instrument, trace};
use xtumlgen_core::{
    application::ports::{FileCollector, FileHandler},
    error::{CodegenError, CodegenResult},
};

use crate::filesystem::map_io_error;

type Branch = Pin<Box<dyn Future<Output = CodegenResult<()>> + Send + 'static>>;

/// Canonical paths of the directories enclosing the current branch.
type Ancestors = Arc<Vec<PathBuf>>;

/// [`FileCollector`] over `tokio::fs`.
///
/// Symbolic links are followed, so a file reachable through several links is
/// reported once per path. A link back into one of its own enclosing
/// directories is not entered, which makes link cycles terminate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileCollector;

impl LocalFileCollector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileCollector for LocalFileCollector {
    #[instrument(skip_all, fields(root = %root.display()))]
    async fn for_each_file(&self, root: &Path, handler: FileHandler) -> CodegenResult<()> {
        visit(root.to_path_buf(), handler, Arc::new(Vec::new())).await
    }
}

fn visit(path: PathBuf, handler: FileHandler, ancestors: Ancestors) -> Branch {
    Box::pin(async move {
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| map_io_error(&path, e, "stat"))?;

        if metadata.is_file() {
            trace!(path = %path.display(), "Found file");
            return handler(&path);
        }
        if !metadata.is_dir() {
            debug!(path = %path.display(), "Skipping special file");
            return Ok(());
        }

        let canonical = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| map_io_error(&path, e, "resolve directory"))?;
        if ancestors.contains(&canonical) {
            debug!(path = %path.display(), "Symlink cycle, skipping");
            return Ok(());
        }
        let mut chain = Vec::with_capacity(ancestors.len() + 1);
        chain.extend(ancestors.iter().cloned());
        chain.push(canonical);
        let ancestors: Ancestors = Arc::new(chain);

        let mut entries = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| map_io_error(&path, e, "read directory"))?;

        let mut branches = JoinSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| map_io_error(&path, e, "read directory"))?
        {
            branches.spawn(visit(
                entry.path(),
                Arc::clone(&handler),
                Arc::clone(&ancestors),
            ));
        }

        // Dropping `branches` on early return aborts the remaining tasks.
        while let Some(joined) = branches.join_next().await {
            match joined {
                Ok(result) => result?,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    return Err(CodegenError::Internal {
                        message: format!("scan of {} was cancelled: {}", path.display(), e),
                    });
                }
            }
        }

        Ok(())
    })
}
