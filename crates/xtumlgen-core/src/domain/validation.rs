use crate::domain::{error::DomainError, options::CodegenOptions};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across call sites.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_options(options: &CodegenOptions) -> Result<(), DomainError> {
        options.validate()
    }
}
