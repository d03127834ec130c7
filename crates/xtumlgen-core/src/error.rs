//! Unified error handling for xtumlgen core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for xtumlgen core operations.
///
/// This enum wraps all possible errors that can occur while orchestrating
/// code generation, providing a unified interface to the host.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodegenError {
    /// Errors from the domain layer (invalid options).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl CodegenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check xtumlgen.toml and XTUMLGEN_* environment variables".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in xtumlgen".into(),
                "Please report this issue at: https://github.com/cosecruz/xtumlgen/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// `true` if this is a pipeline stage failure (stage process exited badly).
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StageFailed { .. }))
    }
}

/// Error categories for host display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Environment,
    Filesystem,
    Pipeline,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;

    #[test]
    fn domain_errors_are_validation() {
        let err: CodegenError = DomainError::EmptyField {
            field: "gen_workspace",
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn stage_failure_is_detected() {
        let err: CodegenError = ApplicationError::StageFailed {
            stage: Stage::Generate,
            code: Some(1),
            signal: None,
        }
        .into();
        assert!(err.is_stage_failure());
        assert_eq!(err.category(), ErrorCategory::Pipeline);
    }

    #[test]
    fn configuration_suggestions_mention_env_prefix() {
        let err = CodegenError::Configuration {
            message: "bad".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("XTUMLGEN_")));
    }
}
