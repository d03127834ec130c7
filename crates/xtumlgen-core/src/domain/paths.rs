use std::path::{Component, Path, PathBuf};

/// Resolve a configured path against the project root.
///
/// Absolute paths are kept. `.` components are dropped so that paths built
/// here compare equal to the ones a directory scan or file watcher reports.
pub fn resolve(project_root: &Path, configured: &Path) -> PathBuf {
    let joined = if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        project_root.join(configured)
    };
    joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

pub fn resolve_all(project_root: &Path, configured: &[PathBuf]) -> Vec<PathBuf> {
    configured
        .iter()
        .map(|p| resolve(project_root, p))
        .collect()
}
