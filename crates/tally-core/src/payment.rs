//! # Payment Splitter
//!
//! Collects one or more payment entries whose amounts sum to the amount due.
//!
//! ## Tender Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PaymentSplitter::new(790.00)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tender(Card, 500.00, "AUTH-1") ──► remaining 290.00                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tender(Cash, 0.00) ──────────────► rejected, nothing consumed          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tender(Cash, 300.00) ────────────► clamped to 290.00, remaining 0.00   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  finish() ────────────────────────► [Card 500.00, Cash 290.00]          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are integer cents, so "settled" means `remaining == 0` exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{validate_payment_amount, validate_record_text};

// =============================================================================
// Payment Method
// =============================================================================

/// Instrument kinds accepted at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileBanking,
    DigitalWallet,
}

impl PaymentMethod {
    /// Maps the numeric menu code (1-4) to a method.
    pub fn from_code(code: u8) -> CoreResult<Self> {
        match code {
            1 => Ok(PaymentMethod::Cash),
            2 => Ok(PaymentMethod::Card),
            3 => Ok(PaymentMethod::MobileBanking),
            4 => Ok(PaymentMethod::DigitalWallet),
            _ => Err(CoreError::UnknownPaymentMethod { code }),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            PaymentMethod::Cash => 1,
            PaymentMethod::Card => 2,
            PaymentMethod::MobileBanking => 3,
            PaymentMethod::DigitalWallet => 4,
        }
    }

    /// Everything except cash needs a reference (slip number, txn id).
    pub fn requires_reference(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::MobileBanking => "Mobile Banking",
            PaymentMethod::DigitalWallet => "Digital Wallet",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Requests and Entries
// =============================================================================

/// One tender attempt as entered at the till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRequest {
    /// Menu code, 1-4.
    pub method_code: u8,
    pub amount: Money,
    /// Opaque reference; required for non-cash methods.
    pub reference: Option<String>,
}

impl TenderRequest {
    pub fn cash(amount: Money) -> Self {
        TenderRequest {
            method_code: PaymentMethod::Cash.code(),
            amount,
            reference: None,
        }
    }

    pub fn with_reference(method: PaymentMethod, amount: Money, reference: impl Into<String>) -> Self {
        TenderRequest {
            method_code: method.code(),
            amount,
            reference: Some(reference.into()),
        }
    }
}

/// An accepted payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub method: PaymentMethod,
    /// Never more than what was still due when the entry was accepted.
    pub amount: Money,
    pub reference: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Splitter
// =============================================================================

/// Accumulates payment entries against a fixed amount due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSplitter {
    amount_due: Money,
    entries: Vec<PaymentEntry>,
}

impl PaymentSplitter {
    pub fn new(amount_due: Money) -> Self {
        PaymentSplitter {
            amount_due,
            entries: Vec::new(),
        }
    }

    /// Validates and records one tender.
    ///
    /// ## Rules
    /// - Method code must be 1-4
    /// - Amount must be positive
    /// - Non-cash methods need a non-empty reference
    /// - An amount over the remaining balance is clamped to it
    ///
    /// A rejected request leaves the splitter unchanged.
    pub fn tender(&mut self, request: TenderRequest) -> CoreResult<&PaymentEntry> {
        if self.is_settled() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "nothing remains to be paid".to_string(),
            });
        }

        let method = PaymentMethod::from_code(request.method_code)?;
        validate_payment_amount(request.amount)?;

        let reference = request
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if method.requires_reference() && reference.is_none() {
            return Err(CoreError::MissingPaymentReference {
                method: method.to_string(),
            });
        }
        if let Some(ref r) = reference {
            validate_record_text("payment reference", r)?;
        }

        let amount = request.amount.min(self.remaining());
        self.entries.push(PaymentEntry {
            method,
            amount,
            reference,
            timestamp: Utc::now(),
        });

        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn amount_due(&self) -> Money {
        self.amount_due
    }

    pub fn paid(&self) -> Money {
        self.entries.iter().map(|e| e.amount).sum()
    }

    pub fn remaining(&self) -> Money {
        (self.amount_due - self.paid()).max(Money::zero())
    }

    pub fn is_settled(&self) -> bool {
        self.remaining().is_zero()
    }

    pub fn entries(&self) -> &[PaymentEntry] {
        &self.entries
    }

    /// Returns the entries once settled.
    pub fn finish(self) -> CoreResult<Vec<PaymentEntry>> {
        if !self.is_settled() {
            return Err(CoreError::PaymentMismatch {
                paid: self.paid(),
                due: self.amount_due,
            });
        }
        Ok(self.entries)
    }
}

/// Drives a splitter from a source of tender requests until settled.
///
/// Rejected requests are skipped. If the source runs dry first the result is
/// `PaymentMismatch`.
pub fn collect<I>(amount_due: Money, requests: I) -> CoreResult<Vec<PaymentEntry>>
where
    I: IntoIterator<Item = TenderRequest>,
{
    let mut splitter = PaymentSplitter::new(amount_due);
    let mut requests = requests.into_iter();

    while !splitter.is_settled() {
        match requests.next() {
            Some(request) => {
                // Invalid entries are re-prompted, not fatal.
                let _ = splitter.tender(request);
            }
            None => break,
        }
    }

    splitter.finish()
}
