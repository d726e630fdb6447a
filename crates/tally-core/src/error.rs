//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Cart, pricing and tender rule violations       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-store errors (separate crate)                                   │
//! │  └── StoreError       - Flat-file read/write failures                  │
//! │                                                                         │
//! │  tally-engine errors                                                   │
//! │  └── EngineError      - What the caller sees, tagged with an ErrorKind │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError ← StoreError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock on hand for the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add "Rice" (qty: 120)
    ///      │
    ///      ▼
    /// Check stock: available=100
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Rice", available: 100, requested: 120 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The tender instrument code is not one of the known kinds.
    #[error("Unknown payment method code {code} (expected 1-4)")]
    UnknownPaymentMethod { code: u8 },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Non-cash instruments need an opaque reference (card slip, txn id).
    #[error("{method} payment requires a reference")]
    MissingPaymentReference { method: String },

    /// Payment entries do not cover the amount due.
    #[error("Payments total {paid}, amount due is {due}")]
    PaymentMismatch { paid: Money, due: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g. barcode with letters, name with a delimiter).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. a phone number already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
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
        let err = CoreError::InsufficientStock {
            product: "Rice".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Rice: available 3, requested 5"
        );

        let err = CoreError::PaymentMismatch {
            paid: Money::from_cents(50000),
            due: Money::from_cents(79000),
        };
        assert_eq!(err.to_string(), "Payments total 500.00, amount due is 790.00");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Duplicate {
            field: "phone".to_string(),
            value: "01700000000".to_string(),
        };
        assert_eq!(err.to_string(), "phone '01700000000' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
