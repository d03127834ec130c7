//! Local filesystem adapter using tokio::fs.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use xtumlgen_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{CodegenError, CodegenResult},
};

/// Production filesystem implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn create_dir_all(&self, path: &Path) -> CodegenResult<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| map_io_error(path, e, "create directory"))
    }
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> CodegenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_workspace_idempotently() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = temp.path().join("a/b/.codegen");
        let fs = LocalFilesystem::new();

        fs.create_dir_all(&workspace).await.unwrap();
        fs.create_dir_all(&workspace).await.unwrap();

        assert!(workspace.is_dir());
    }

    #[tokio::test]
    async fn file_in_the_way_is_a_filesystem_error() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = LocalFilesystem::new()
            .create_dir_all(&blocker.join("ws"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CodegenError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
