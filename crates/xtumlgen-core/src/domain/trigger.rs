//! The per-cycle "does anything need regenerating?" decision.

use std::fmt;
use std::path::PathBuf;

use crate::domain::DependencySet;

/// Why a cycle runs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTrigger {
    /// Nothing is tracked yet, or the host is not watching.
    FirstBuild,
    /// A watched file in the dependency set was modified.
    WatchTrigger,
}

impl BuildTrigger {
    /// Classify a host event. `None` means skip the cycle entirely.
    ///
    /// A build counts as first unless the host is watching *and* something
    /// is already tracked. Otherwise the pipeline runs only when a modified
    /// file is in `dependencies`.
    pub fn decide(
        watch_mode: bool,
        dependencies: &DependencySet,
        modified_files: &[PathBuf],
    ) -> Option<Self> {
        if !watch_mode || dependencies.is_empty() {
            return Some(Self::FirstBuild);
        }
        if dependencies.intersects(modified_files) {
            return Some(Self::WatchTrigger);
        }
        None
    }
}

impl fmt::Display for BuildTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstBuild => write!(f, "first-build"),
            Self::WatchTrigger => write!(f, "watch-trigger"),
        }
    }
}
