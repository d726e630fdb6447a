//! # Pricing
//!
//! Turns a cart subtotal into the amount collected from the customer.
//!
//! ## Price Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gross subtotal (Σ line amounts)                         800.00         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  − loyalty discount (optional, ≤ 10% of gross)            0.00          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal S                                              800.00         │
//! │       │                                                                 │
//! │       ├──► VAT = S × 5%                                  +40.00         │
//! │       │                                                                 │
//! │       ├──► threshold discount = S > 500.00 ? 50.00 : 0   −50.00         │
//! │       ▼                                                                 │
//! │  net total                                               790.00         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loyalty discount reduces the running subtotal *before* VAT and the
//! threshold test, so a discount can drop a sale under the threshold.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{LoyaltyPoints, TaxRate};
use crate::validation::{validate_price, validate_rate_bps, ValidationResult};

/// Default VAT: 5%.
pub const DEFAULT_VAT_BPS: u32 = 500;

/// Sales strictly above this subtotal get the flat discount.
pub const DEFAULT_DISCOUNT_THRESHOLD: Money = Money::from_cents(50000);

/// Flat discount amount once over the threshold.
pub const DEFAULT_DISCOUNT_AMOUNT: Money = Money::from_cents(5000);

// =============================================================================
// Pricing Policy
// =============================================================================

/// VAT and threshold-discount rules for a till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    pub vat_rate: TaxRate,
    pub discount_threshold: Money,
    pub discount_amount: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            vat_rate: TaxRate::from_bps(DEFAULT_VAT_BPS),
            discount_threshold: DEFAULT_DISCOUNT_THRESHOLD,
            discount_amount: DEFAULT_DISCOUNT_AMOUNT,
        }
    }
}

impl PricingPolicy {
    /// Computes the totals for a sale.
    ///
    /// ## Arguments
    /// * `gross_subtotal` - Sum of cart line amounts
    /// * `loyalty_discount` - Accepted loyalty discount, zero if none
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::pricing::PricingPolicy;
    ///
    /// let totals = PricingPolicy::default().price(Money::from_cents(60000), Money::zero());
    /// assert_eq!(totals.vat.cents(), 3000);
    /// assert_eq!(totals.threshold_discount.cents(), 5000);
    /// assert_eq!(totals.net_total.cents(), 58000);
    /// ```
    pub fn price(&self, gross_subtotal: Money, loyalty_discount: Money) -> Totals {
        let subtotal = gross_subtotal - loyalty_discount;
        let vat = subtotal.calculate_tax(self.vat_rate);
        let threshold_discount = if subtotal > self.discount_threshold {
            self.discount_amount
        } else {
            Money::zero()
        };

        Totals {
            gross_subtotal,
            loyalty_discount,
            subtotal,
            vat,
            threshold_discount,
            net_total: subtotal + vat - threshold_discount,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_rate_bps("vat_rate", self.vat_rate.bps())?;
        validate_price(self.discount_threshold)?;
        validate_price(self.discount_amount)?;
        Ok(())
    }
}

/// Totals for one sale. Every field is exact to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line amounts.
    pub gross_subtotal: Money,
    pub loyalty_discount: Money,
    /// `gross_subtotal - loyalty_discount`; the base for VAT and the threshold.
    pub subtotal: Money,
    pub vat: Money,
    pub threshold_discount: Money,
    /// Amount to collect: `subtotal + vat - threshold_discount`.
    pub net_total: Money,
}

// =============================================================================
// Loyalty Policy
// =============================================================================

/// Loyalty accrual and redemption rules.
///
/// ## Defaults
/// - Earn 1% of the net total as points (790.00 → 7.90 points)
/// - One point is worth 0.01 at redemption
/// - A redemption is capped at 10% of the running subtotal
/// - Redeeming a discount burns `discount × 100` points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyPolicy {
    /// Points earned per unit of net spend, in basis points.
    pub accrual_bps: u32,
    /// Cents of discount one whole point is worth.
    pub point_value_cents: i64,
    /// Cap on a redemption as a share of the subtotal, in basis points.
    pub max_discount_bps: u32,
    /// Whole points burned per whole currency unit of discount.
    pub burn_multiplier: i64,
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        LoyaltyPolicy {
            accrual_bps: 100,
            point_value_cents: 1,
            max_discount_bps: 1000,
            burn_multiplier: 100,
        }
    }
}

/// A redemption the customer may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyOffer {
    /// Balance the offer was computed from.
    pub balance: LoyaltyPoints,
    pub discount: Money,
    /// Points that acceptance will burn (capped at the balance on commit).
    pub points_debit: LoyaltyPoints,
}

impl LoyaltyPolicy {
    /// Points earned on a committed net total.
    pub fn accrue(&self, net_total: Money) -> LoyaltyPoints {
        let hundredths = net_total.cents() as i128 * self.accrual_bps as i128 / 10000;
        LoyaltyPoints::from_hundredths(hundredths as i64)
    }

    /// Cash value of a balance, truncated to the cent.
    pub fn redemption_value(&self, balance: LoyaltyPoints) -> Money {
        let cents = balance.hundredths() as i128 * self.point_value_cents as i128 / 100;
        Money::from_cents(cents as i64)
    }

    /// Points burned by a given discount.
    pub fn points_for_discount(&self, discount: Money) -> LoyaltyPoints {
        // discount_cents / 100 currency units × multiplier whole points,
        // expressed in hundredths of a point.
        LoyaltyPoints::from_hundredths(discount.cents() * self.burn_multiplier)
    }

    /// The best discount available for `balance` against `subtotal`.
    ///
    /// Returns `None` when the balance is empty or worth less than a cent, or
    /// when the subtotal is too small for the cap to allow anything.
    pub fn offer(&self, balance: LoyaltyPoints, subtotal: Money) -> Option<LoyaltyOffer> {
        if !balance.is_positive() {
            return None;
        }

        let cap = subtotal.portion_bps(self.max_discount_bps);
        let discount = self.redemption_value(balance).min(cap);
        if !discount.is_positive() {
            return None;
        }

        Some(LoyaltyOffer {
            balance,
            discount,
            points_debit: self.points_for_discount(discount),
        })
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_rate_bps("loyalty accrual", self.accrual_bps)?;
        validate_rate_bps("loyalty max discount", self.max_discount_bps)?;
        if self.point_value_cents < 0 || self.burn_multiplier < 0 {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "loyalty point value".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_600_hits_threshold() {
        let totals = PricingPolicy::default().price(Money::from_cents(60000), Money::zero());
        assert_eq!(totals.subtotal.cents(), 60000);
        assert_eq!(totals.vat.cents(), 3000);
        assert_eq!(totals.threshold_discount.cents(), 5000);
        assert_eq!(totals.net_total.cents(), 58000);
    }

    #[test]
    fn test_price_800_end_to_end_figures() {
        let totals = PricingPolicy::default().price(Money::from_cents(80000), Money::zero());
        assert_eq!(totals.vat.cents(), 4000);
        assert_eq!(totals.net_total.cents(), 79000);
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = PricingPolicy::default();
        let at = policy.price(Money::from_cents(50000), Money::zero());
        assert!(at.threshold_discount.is_zero());
        assert_eq!(at.net_total.cents(), 52500);

        let over = policy.price(Money::from_cents(50001), Money::zero());
        assert_eq!(over.threshold_discount.cents(), 5000);
    }

    #[test]
    fn test_loyalty_discount_applies_before_threshold() {
        // 520.00 with a 30.00 loyalty discount drops to 490.00: no flat discount
        let totals =
            PricingPolicy::default().price(Money::from_cents(52000), Money::from_cents(3000));
        assert_eq!(totals.subtotal.cents(), 49000);
        assert_eq!(totals.vat.cents(), 2450);
        assert!(totals.threshold_discount.is_zero());
        assert_eq!(totals.net_total.cents(), 51450);
    }

    #[test]
    fn test_pricing_is_deterministic() {
        let policy = PricingPolicy::default();
        let a = policy.price(Money::from_cents(123456), Money::from_cents(789));
        let b = policy.price(Money::from_cents(123456), Money::from_cents(789));
        assert_eq!(a, b);
    }

    #[test]
    fn test_accrual_is_one_percent() {
        let policy = LoyaltyPolicy::default();
        assert_eq!(policy.accrue(Money::from_cents(79000)).to_string(), "7.90");
    }

    #[test]
    fn test_offer_limited_by_balance() {
        // 250 points are worth 2.50; 10% of 800.00 is 80.00
        let offer = LoyaltyPolicy::default()
            .offer(LoyaltyPoints::from_whole(250), Money::from_cents(80000))
            .unwrap();
        assert_eq!(offer.discount.cents(), 250);
        assert_eq!(offer.points_debit, LoyaltyPoints::from_whole(250));
    }

    #[test]
    fn test_offer_limited_by_cap() {
        // 5000 points are worth 50.00; 10% of 100.00 is 10.00
        let offer = LoyaltyPolicy::default()
            .offer(LoyaltyPoints::from_whole(5000), Money::from_cents(10000))
            .unwrap();
        assert_eq!(offer.discount.cents(), 1000);
        assert_eq!(offer.points_debit, LoyaltyPoints::from_whole(1000));
    }

    #[test]
    fn test_no_offer_without_points() {
        let policy = LoyaltyPolicy::default();
        assert!(policy.offer(LoyaltyPoints::zero(), Money::from_cents(10000)).is_none());
        // 0.50 points are worth less than a cent
        assert!(policy
            .offer(LoyaltyPoints::from_hundredths(50), Money::from_cents(10000))
            .is_none());
    }

    #[test]
    fn test_policy_validation() {
        assert!(PricingPolicy::default().validate().is_ok());
        assert!(LoyaltyPolicy::default().validate().is_ok());

        let bad = PricingPolicy {
            vat_rate: TaxRate::from_bps(20000),
            ..PricingPolicy::default()
        };
        assert!(bad.validate().is_err());
    }
}
