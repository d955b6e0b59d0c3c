//! Error helpers for recordkit-store
//!
//! Wraps recordkit-core ExError with store-specific constructors

use recordkit_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a provider configuration error
pub fn configuration_error(property: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("provider_config")
        .with_field(property.to_string())
        .with_message(format!("property {}: {}", property, reason))
}

/// Create a provisioning script failure
pub fn provisioning_error(script_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("create_database")
        .with_message(format!("Provisioning script {} failed: {}", script_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(script_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("provisioning_checksum")
        .with_message(format!(
            "Checksum mismatch for script {}: recorded {}, got {}",
            script_id, expected, actual
        ))
}

/// Reject statements that bind by position instead of by field name
pub fn anonymous_parameter(entity: &str, index: usize) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("bind_parameters")
        .with_entity(entity.to_string())
        .with_message(format!(
            "parameter {} is positional; statements must use named parameters",
            index
        ))
}
