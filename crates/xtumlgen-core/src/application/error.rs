//! Application layer errors.
//!
//! These errors represent failures in orchestration, not option validation.
//! Validation errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Stage;
use crate::error::ErrorCategory;

/// Errors that occur while driving the pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The toolchain interpreter could not be started.
    #[error("{interpreter} is not installed")]
    InterpreterMissing { interpreter: String },

    /// A required toolchain package is not importable.
    #[error("`{package}` is not installed. Install with `{install_hint}`")]
    PackageMissing {
        package: String,
        install_hint: String,
    },

    /// The schema imported by code generation is not where the toolchain
    /// expects it.
    #[error("Schema file {} not found", path.display())]
    SchemaMissing { path: PathBuf },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The operating system refused to start a process.
    #[error("Failed to start {program}: {reason}")]
    ProcessSpawnFailed { program: String, reason: String },

    /// A process ran but did not exit with status 0.
    #[error("{program} exited with {}", describe_exit(.code, .signal))]
    ProcessExited {
        program: String,
        code: Option<i32>,
        signal: Option<i32>,
    },

    /// A pipeline stage failed; the cycle is abandoned.
    #[error("{stage} failed: toolchain exited with {}", describe_exit(.code, .signal))]
    StageFailed {
        stage: Stage,
        code: Option<i32>,
        signal: Option<i32>,
    },

    /// Shared orchestrator state is unusable (lock poisoned).
    #[error("Dependency state lock poisoned")]
    StateLockError,

    /// A build cycle was triggered while another one was still running.
    #[error("A code generation cycle is already in progress")]
    BuildInProgress,
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (*code, *signal) {
        (Some(code), _) => format!("code {}", code),
        (None, Some(signal)) => format!("signal {}", signal),
        (None, None) => "an unknown status".to_string(),
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InterpreterMissing { interpreter } => vec![
                format!("Install {} and make sure it is on PATH", interpreter),
                format!("Verify with: {} --version", interpreter),
            ],
            Self::PackageMissing { install_hint, .. } => vec![
                format!("Run: {}", install_hint),
                "Make sure the package is installed for the same interpreter".into(),
            ],
            Self::SchemaMissing { path } => vec![
                format!(
                    "Copy the BridgePoint metamodel schema (schema.sql) to {}",
                    path.display()
                ),
                "The schema ships with the BridgePoint/pyxtuml distribution".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the path exists and you have permission to read it".into(),
            ],
            Self::ProcessSpawnFailed { program, .. } => vec![
                format!("Check that '{}' is installed and executable", program),
            ],
            Self::StageFailed { stage, .. } => vec![
                format!("The toolchain reported an error during {}", stage),
                "Set quiet to 0 to see the toolchain's own diagnostics".into(),
            ],
            Self::BuildInProgress => vec![
                "Wait for the running cycle to finish".into(),
                "Hosts must not dispatch overlapping build events".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InterpreterMissing { .. }
            | Self::PackageMissing { .. }
            | Self::SchemaMissing { .. } => ErrorCategory::Environment,
            Self::FilesystemError { .. } => ErrorCategory::Filesystem,
            Self::ProcessSpawnFailed { .. }
            | Self::ProcessExited { .. }
            | Self::StageFailed { .. } => ErrorCategory::Pipeline,
            Self::StateLockError | Self::BuildInProgress => ErrorCategory::Internal,
        }
    }
}
