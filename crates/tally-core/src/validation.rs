//! # Validation Module
//!
//! Input validation utilities for Tally POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (menu / API surface)                                  │
//! │  └── Parses raw input into primitives                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation (quantity > 0, barcode digits, ...)      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Flat-file stores                                             │
//! │  └── Tolerant reads skip records that slipped past layers 1-2          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delimiter Safety
//! Every store is a `|`-delimited, newline-terminated text file. Any free
//! text that ends up in a record must contain neither, or the record would
//! split into garbage on the next load.
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_barcode, validate_quantity};
//!
//! assert!(validate_barcode("12345678").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest accepted barcode (EAN-8).
pub const BARCODE_MIN_DIGITS: usize = 8;

/// Longest accepted barcode (EAN-13).
pub const BARCODE_MAX_DIGITS: usize = 13;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects text that would corrupt a delimited record.
pub fn validate_record_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.contains('|') || value.contains('\n') || value.contains('\r') {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain '|' or line breaks".to_string(),
        });
    }
    Ok(())
}

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
/// - Must be delimiter-safe
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Rice ").unwrap(), "Rice");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    validate_record_text("name", name)?;

    Ok(name.to_string())
}

/// Validates a barcode.
///
/// ## Rules
/// - Empty means "no barcode" and is accepted
/// - Otherwise 8 to 13 ASCII digits
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_barcode;
///
/// assert!(validate_barcode("").is_ok());
/// assert!(validate_barcode("8901234567890").is_ok());
/// assert!(validate_barcode("1234567").is_err());
/// assert!(validate_barcode("12345678901234").is_err());
/// assert!(validate_barcode("1234567A").is_err());
/// ```
pub fn validate_barcode(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Ok(());
    }

    let len = code.len();
    if !code.chars().all(|c| c.is_ascii_digit())
        || !(BARCODE_MIN_DIGITS..=BARCODE_MAX_DIGITS).contains(&len)
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: format!(
                "must be {} to {} digits",
                BARCODE_MIN_DIGITS, BARCODE_MAX_DIGITS
            ),
        });
    }

    Ok(())
}

/// Validates a phone number used as a customer lookup key.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }
    validate_record_text("phone", phone)?;
    Ok(phone.to_string())
}

/// Validates a customer display name.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }
    validate_record_text("customer name", name)?;
    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity being sold.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item                                                         │
/// │                                                                         │
/// │  Cashier enters quantity: 20                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(20) ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → stock check against the freshly loaded catalog          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level (zero is allowed, negative is not).
pub fn validate_stock_level(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a single tender amount.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
