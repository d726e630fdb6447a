//! # Receipts and Reports
//!
//! Structured results handed back to the caller when a transaction ends.
//! Rendering them (printer, screen, JSON) is the caller's business.

use chrono::NaiveDateTime;
use serde::Serialize;
use tally_core::{CartLine, LowStockAlert, LoyaltyPoints, Money, PaymentEntry, SaleLine, Totals};

/// Result of a committed sale.
///
/// ## JSON Shape
/// ```json
/// {
///   "store_name": "Tally Supermarket",
///   "timestamp": "2026-10-17T14:03:55",
///   "customer": null,
///   "lines": [{ "product": { "name": "Rice", ... }, "quantity": 20, "line_amount": 80000 }],
///   "totals": { "subtotal": 80000, "vat": 4000, "threshold_discount": 5000, "net_total": 79000, ... },
///   "payments": [{ "method": "cash", "amount": 79000, ... }],
///   "low_stock": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleReceipt {
    pub store_name: String,
    /// Same second-resolution local time written to the sales ledger.
    pub timestamp: NaiveDateTime,
    /// `None` for a walk-in sale.
    pub customer: Option<CustomerSummary>,
    pub lines: Vec<CartLine>,
    pub totals: Totals,
    pub payments: Vec<PaymentEntry>,
    /// Catalog products at or below their low-stock threshold after the sale.
    pub low_stock: Vec<LowStockAlert>,
}

impl SaleReceipt {
    /// Name recorded in the sales ledger.
    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(tally_core::WALK_IN_CUSTOMER)
    }

    /// Total units sold.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn amount_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

/// Customer state after the sale was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub phone: String,
    /// First sale for a customer created during this transaction.
    pub newly_registered: bool,
    pub points_earned: LoyaltyPoints,
    pub points_redeemed: LoyaltyPoints,
    pub points_balance: LoyaltyPoints,
    pub total_spent: Money,
    pub visit_count: u32,
}

/// Result of cancelling an open transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CancellationReport {
    /// Lines whose stock went back to the catalog.
    pub restored: Vec<SaleLine>,
    /// Lines whose product was no longer in the catalog.
    pub unrestored: Vec<SaleLine>,
    /// Tenders recorded before the cancel; nothing was charged.
    pub discarded_payments: Vec<PaymentEntry>,
}

impl CancellationReport {
    pub fn is_complete(&self) -> bool {
        self.unrestored.is_empty()
    }
}
