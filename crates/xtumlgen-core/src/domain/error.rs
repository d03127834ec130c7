// ============================================================================
// domain/error.rs - OPTION VALIDATION ERRORS
// ============================================================================

use thiserror::Error;

use crate::error::ErrorCategory;

/// Root domain error type.
///
/// Every variant is a rejected option value and carries a suggestion for
/// fixing it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Option '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("Option '{field}' must be a bare file name, got '{value}'")]
    NotAFileName { field: &'static str, value: String },

    #[error("Empty path at {field}[{index}]")]
    EmptyPathEntry { field: &'static str, index: usize },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyField { field } => vec![
                format!("Set '{}' or remove it to use the default", field),
            ],
            Self::NotAFileName { field, value } => vec![
                format!("'{}' names a file inside the workspace directory", field),
                format!("Move the directory part of '{}' into 'gen_workspace'", value),
            ],
            Self::EmptyPathEntry { field, index } => vec![
                format!("Remove the empty entry at position {} of '{}'", index, field),
            ],
        }
    }

    /// Error category for host display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyField { .. } | Self::NotAFileName { .. } | Self::EmptyPathEntry { .. } => {
                ErrorCategory::Validation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_is_a_validation_error_with_a_suggestion() {
        let errors = [
            DomainError::EmptyField {
                field: "gen_workspace",
            },
            DomainError::NotAFileName {
                field: "prebuild_output",
                value: "a/b.sql".into(),
            },
            DomainError::EmptyPathEntry {
                field: "archetypes",
                index: 1,
            },
        ];
        for err in errors {
            assert_eq!(err.category(), ErrorCategory::Validation);
            assert!(!err.suggestions().is_empty());
        }
    }
}
