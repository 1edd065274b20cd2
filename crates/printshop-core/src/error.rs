//! # Error Types
//!
//! Domain-specific error types for printshop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  printshop-core errors (this file)                                     │
//! │  ├── CoreError        - NotFound / Validation / Conflict / Forbidden   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  printshop-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller (HTTP layer)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable by the caller. Mapping to status codes and
//! user-facing copy happens outside this workspace.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced product, size, printing, cart line or order does not
    /// resolve, or is not visible to the requesting principal.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// State conflict, e.g. a unique name already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The principal is not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Quantity failures are split into [`ValidationError::BelowMinimum`] and
/// [`ValidationError::StepMismatch`] so callers can tell the user which
/// constraint they missed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, negative price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Quantity is lower than the product's minimum order quantity.
    #[error("quantity {requested} is below the minimum of {minimum}")]
    BelowMinimum { minimum: i64, requested: i64 },

    /// Quantity is not a multiple of the product's quantity step.
    #[error("quantity {requested} is not a multiple of {step}")]
    StepMismatch { step: i64, requested: i64 },

    /// Selected option is not part of the product's option schema.
    #[error("unknown option: {name}")]
    UnknownOption { name: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::not_found("Product", "abc");
        assert_eq!(err.to_string(), "Product not found: abc");
    }

    #[test]
    fn test_quantity_error_messages_are_distinct() {
        let below = ValidationError::BelowMinimum {
            minimum: 5,
            requested: 3,
        };
        let step = ValidationError::StepMismatch {
            step: 3,
            requested: 7,
        };
        assert_eq!(below.to_string(), "quantity 3 is below the minimum of 5");
        assert_eq!(step.to_string(), "quantity 7 is not a multiple of 3");
        assert_ne!(below, step);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "size".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
