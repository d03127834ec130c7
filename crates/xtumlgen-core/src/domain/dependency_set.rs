use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Files whose modification must trigger regeneration.
///
/// Append-only: there is no removal API. A set only starts empty again when
/// a new orchestrator is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    paths: BTreeSet<PathBuf>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path`. Returns `true` if it was not tracked before.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    /// Track every path in `paths`, returning how many were new.
    pub fn extend<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|p| self.insert(p))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// `true` if any of `candidates` is tracked.
    pub fn intersects<'a, I>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        candidates.into_iter().any(|p| self.paths.contains(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
