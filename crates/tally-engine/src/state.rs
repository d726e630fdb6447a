//! # Transaction State
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──open()──► Open ──checkout()──► Pricing ──► PaymentCollection   │
//! │                     │ ▲                                  │     │        │
//! │        add / loyalty└─┘                         commit() │     │cancel()│
//! │                     │                                    ▼     │        │
//! │             cancel()│                              Committed   │        │
//! │                     ▼                                          ▼        │
//! │                 Cancelled ◄────────────────────────────────────┘        │
//! │                                                                         │
//! │   any persistence failure ──► Aborted                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Before `open()` has resolved the customer.
    Idle,

    /// Accepting items and an optional loyalty redemption.
    Open,

    /// Computing totals; only seen inside `checkout()`.
    Pricing,

    /// Accepting tenders until the net total is covered.
    PaymentCollection,

    Committed,
    Cancelled,

    /// A store write failed; see the error log for reconciliation details.
    Aborted,
}

impl TransactionState {
    /// No further operations are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::Cancelled | TransactionState::Aborted
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Idle => write!(f, "idle"),
            TransactionState::Open => write!(f, "open"),
            TransactionState::Pricing => write!(f, "pricing"),
            TransactionState::PaymentCollection => write!(f, "collecting payment"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::Cancelled => write!(f, "cancelled"),
            TransactionState::Aborted => write!(f, "aborted"),
        }
    }
}
