//! # Engine Error Type
//!
//! What callers of the transaction engine see when an operation fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  engine.add_by_name("Rice", 120)                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Store I/O failed? ── StoreError::Io ──────────┐                 │  │
//! │  │         │                                      │                 │  │
//! │  │         ▼                                      ▼                 │  │
//! │  │  Rule violated? ──── CoreError::Insufficient ─ EngineError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  match err.kind() {                                                     │
//! │      ErrorKind::InsufficientStock => /* ask for a smaller quantity */   │
//! │      ErrorKind::PersistenceFailure => /* transaction is aborted */      │
//! │      ...                                                                │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recoverability
//! Every kind except `PersistenceFailure` and `InvalidState` leaves the
//! transaction where it was, so the caller can correct the input and retry.

use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_store::StoreError;
use thiserror::Error;

use crate::state::TransactionState;

/// Machine-readable category of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Product, customer or other lookup missed
    NotFound,

    /// Requested more than is on hand
    InsufficientStock,

    /// Input rejected before anything changed
    Validation,

    /// A store could not be read or written
    PersistenceFailure,

    /// Payments do not cover the amount due
    PaymentMismatch,

    /// Operation not allowed in the current state
    InvalidState,
}

/// Errors returned by the transaction engine and till configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Lookup by name, barcode or phone found nothing.
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The call is not valid while the transaction is in `state`.
    #[error("Cannot {operation} while the transaction is {state}")]
    InvalidState {
        operation: &'static str,
        state: TransactionState,
    },

    /// Checkout requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A loyalty redemption was requested but none is available.
    #[error("Loyalty discount unavailable: {reason}")]
    LoyaltyUnavailable { reason: String },

    /// `till.toml` could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Configuration values are out of range.
    #[error("Invalid till configuration: {0}")]
    InvalidConfig(String),

    /// Cart, pricing or tender rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store read or write failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

impl EngineError {
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, state: TransactionState) -> Self {
        EngineError::InvalidState { operation, state }
    }

    /// Category used by callers to decide how to react.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::InvalidState { .. } => ErrorKind::InvalidState,
            EngineError::EmptyCart
            | EngineError::LoyaltyUnavailable { .. }
            | EngineError::InvalidConfig(_) => ErrorKind::Validation,
            EngineError::ConfigLoadFailed(_) => ErrorKind::PersistenceFailure,
            EngineError::Core(err) => match err {
                CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
                CoreError::PaymentMismatch { .. } => ErrorKind::PaymentMismatch,
                CoreError::UnknownPaymentMethod { .. }
                | CoreError::InvalidPaymentAmount { .. }
                | CoreError::MissingPaymentReference { .. }
                | CoreError::Validation(_) => ErrorKind::Validation,
            },
            EngineError::Store(err) => match err {
                StoreError::Io { .. } => ErrorKind::PersistenceFailure,
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::Duplicate { .. } | StoreError::Validation(_) => ErrorKind::Validation,
            },
        }
    }

    /// True when the transaction is still usable after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::PersistenceFailure | ErrorKind::InvalidState
        )
    }
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
