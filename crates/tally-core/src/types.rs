//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ CustomerRecord  │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (key)     │   │  id (CUST1001)  │   │  timestamp      │       │
//! │  │  barcode (key2) │   │  phone (lookup) │   │  customer       │       │
//! │  │  price          │   │  points         │   │  net_total      │       │
//! │  │  quantity       │   │  total_spent    │   │  lines          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  LoyaltyPoints  │   │ LowStockAlert   │       │
//! │  │  bps (u32)      │   │  hundredths     │   │  name, qty,     │       │
//! │  │  500 = 5%       │   │  790 = 7.90 pts │   │  threshold      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! A product is identified by its trimmed name. The barcode is a secondary
//! lookup key and may be absent.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{format_hundredths, parse_hundredths, Money};

/// Display name recorded on a sale when no customer was identified.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Wall-clock format used for sale timestamps (second resolution).
pub const SALE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 500 bps = 5% VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for config overrides).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Loyalty Points
// =============================================================================

/// A loyalty point balance in hundredths of a point.
///
/// Points accrue as a fraction of spend (1% of 790.00 is 7.90 points), so a
/// whole-number type would lose the fraction on every sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoyaltyPoints(i64);

impl LoyaltyPoints {
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        LoyaltyPoints(hundredths)
    }

    /// Whole points, e.g. `from_whole(250)` is 250.00 points.
    #[inline]
    pub const fn from_whole(points: i64) -> Self {
        LoyaltyPoints(points * 100)
    }

    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        LoyaltyPoints(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Subtracts, flooring at zero. The balance never goes negative.
    #[inline]
    pub fn saturating_debit(self, debit: LoyaltyPoints) -> LoyaltyPoints {
        LoyaltyPoints((self.0 - debit.0).max(0))
    }
}

impl fmt::Display for LoyaltyPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_hundredths(self.0, f)
    }
}

impl FromStr for LoyaltyPoints {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s).map(LoyaltyPoints)
    }
}

impl Add for LoyaltyPoints {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        LoyaltyPoints(self.0 + other.0)
    }
}

impl AddAssign for LoyaltyPoints {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Primary key: trimmed, non-empty, unique within the catalog.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Quantity on hand. Never negative.
    pub quantity: i64,

    /// Secondary key: 8 to 13 digits.
    pub barcode: Option<String>,

    pub category: Option<String>,

    pub supplier: Option<String>,

    /// Per-product low-stock threshold. `None` (or a stored value <= 0)
    /// falls back to the till-wide default.
    pub low_stock_threshold: Option<i64>,

    /// Last stock change, epoch seconds.
    pub last_updated: Option<i64>,
}

impl Product {
    /// Creates a product with only the required fields set.
    pub fn new(name: impl Into<String>, price: Money, quantity: i64) -> Self {
        Product {
            name: name.into(),
            price,
            quantity,
            barcode: None,
            category: None,
            supplier: None,
            low_stock_threshold: None,
            last_updated: None,
        }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }

    /// Checks whether `quantity` units can be taken from stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && quantity <= self.quantity
    }

    /// The threshold that applies to this product.
    pub fn effective_threshold(&self, default_threshold: i64) -> i64 {
        match self.low_stock_threshold {
            Some(t) if t > 0 => t,
            _ => default_threshold,
        }
    }

    /// Low stock means "some left, but at or under the threshold".
    /// Sold-out products are not reported as low.
    pub fn is_low_stock(&self, default_threshold: i64) -> bool {
        self.quantity > 0 && self.quantity <= self.effective_threshold(default_threshold)
    }
}

// =============================================================================
// Low Stock
// =============================================================================

/// A product that has dropped to or under its low-stock threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub name: String,
    pub quantity: i64,
    pub threshold: i64,
}

/// Lists every low-stock product in catalog order.
pub fn low_stock(products: &[Product], default_threshold: i64) -> Vec<LowStockAlert> {
    products
        .iter()
        .filter(|p| p.is_low_stock(default_threshold))
        .map(|p| LowStockAlert {
            name: p.name.clone(),
            quantity: p.quantity,
            threshold: p.effective_threshold(default_threshold),
        })
        .collect()
}

// =============================================================================
// Customer
// =============================================================================

/// A customer known to the loyalty ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Generated, prefixed identifier (`CUST1001`).
    pub id: String,
    pub name: String,
    /// Lookup key at checkout.
    pub phone: String,
    pub email: Option<String>,
    pub points: LoyaltyPoints,
    pub total_spent: Money,
    pub visit_count: u32,
    /// Epoch seconds of the most recent purchase.
    pub last_visit: Option<i64>,
}

impl CustomerRecord {
    /// A brand-new customer with no history.
    pub fn new(id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        CustomerRecord {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            points: LoyaltyPoints::zero(),
            total_spent: Money::zero(),
            visit_count: 0,
            last_visit: None,
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One `(product name, quantity)` pair on a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub name: String,
    pub quantity: i64,
}

/// Renders as `Rice(20)`, the form used in the sales ledger.
impl fmt::Display for SaleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.quantity)
    }
}

/// A committed sale. Append-only and immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Local wall-clock time of commit, second resolution.
    pub timestamp: NaiveDateTime,
    /// Customer display name, or [`WALK_IN_CUSTOMER`].
    pub customer: String,
    pub net_total: Money,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Unit Tests
// =============================================================================
