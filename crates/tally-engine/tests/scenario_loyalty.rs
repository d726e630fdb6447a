//! Loyalty redemption and accrual across a full sale.

mod common;

use common::{ayesha, rice, till_with_customers};
use tally_core::{Money, Product, TenderRequest};
use tally_engine::{CustomerSelection, EngineError, ErrorKind};

const AYESHA_PHONE: &str = "01700000000";

#[test]
fn test_redemption_capped_at_ten_percent() {
    // 10000.00 points are worth 100.00, more than the 80.00 cap.
    let till = till_with_customers(&[rice()], &[ayesha(1_000_000)]);
    let mut sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    sale.add_by_name("Rice", 20).unwrap();

    let offer = sale.loyalty_offer().unwrap().unwrap();
    assert_eq!(offer.discount, Money::from_cents(8000));
    assert_eq!(offer.points_debit.hundredths(), 800_000);

    let applied = sale.apply_loyalty_discount().unwrap();
    assert_eq!(applied, offer);
    assert_eq!(sale.running_subtotal(), Money::from_cents(72000));

    let totals = sale.checkout().unwrap();
    assert_eq!(totals.gross_subtotal, Money::from_cents(80000));
    assert_eq!(totals.loyalty_discount, Money::from_cents(8000));
    assert_eq!(totals.vat, Money::from_cents(3600));
    assert_eq!(totals.threshold_discount, Money::from_cents(5000));
    assert_eq!(totals.net_total, Money::from_cents(70600));

    sale.tender(TenderRequest::cash(totals.net_total)).unwrap();
    let receipt = sale.commit().unwrap();

    let summary = receipt.customer.unwrap();
    assert_eq!(summary.points_redeemed.hundredths(), 800_000);
    assert_eq!(summary.points_earned.hundredths(), 706);
    assert_eq!(summary.points_balance.hundredths(), 200_706);

    let customer = &till.customers()[0];
    assert_eq!(customer.points.hundredths(), 200_706);
    assert_eq!(customer.total_spent, Money::from_cents(150000 + 70600));
    assert_eq!(customer.visit_count, 4);
}

#[test]
fn test_redemption_limited_by_balance() {
    // 500.00 points are worth 5.00 and are burned entirely.
    let till = till_with_customers(&[rice()], &[ayesha(50_000)]);
    let mut sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    sale.add_by_name("Rice", 20).unwrap();

    let offer = sale.apply_loyalty_discount().unwrap();
    assert_eq!(offer.discount, Money::from_cents(500));
    assert_eq!(offer.points_debit.hundredths(), 50_000);

    let totals = sale.checkout().unwrap();
    assert_eq!(totals.net_total, Money::from_cents(79500 + 3975 - 5000));

    sale.tender(TenderRequest::cash(totals.net_total)).unwrap();
    sale.commit().unwrap();

    // Balance burned to zero, then 1% of 784.75 accrued.
    assert_eq!(till.customers()[0].points.hundredths(), 784);
}

#[test]
fn test_discount_can_drop_sale_under_threshold() {
    let tea = Product::new("Tea", Money::from_cents(52000), 3);
    let till = till_with_customers(&[tea], &[ayesha(1_000_000)]);
    let mut sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    sale.add_by_name("Tea", 1).unwrap();

    sale.apply_loyalty_discount().unwrap();
    let totals = sale.checkout().unwrap();

    assert_eq!(totals.subtotal, Money::from_cents(46800));
    assert!(totals.threshold_discount.is_zero());
    assert_eq!(totals.net_total, Money::from_cents(49140));
}

#[test]
fn test_applied_once_per_sale() {
    let till = till_with_customers(&[rice()], &[ayesha(1_000_000)]);
    let mut sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    sale.add_by_name("Rice", 20).unwrap();
    sale.apply_loyalty_discount().unwrap();

    assert_eq!(sale.loyalty_offer().unwrap(), None);
    let again = sale.apply_loyalty_discount().unwrap_err();
    assert!(matches!(again, EngineError::LoyaltyUnavailable { .. }));
    assert!(again.is_recoverable());

    // The accepted discount stays fixed as more items are added.
    sale.add_by_name("Rice", 5).unwrap();
    assert_eq!(sale.running_subtotal(), Money::from_cents(100000 - 8000));
}

#[test]
fn test_no_offer_without_balance() {
    let till = till_with_customers(&[rice()], &[ayesha(0)]);
    let mut sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    sale.add_by_name("Rice", 20).unwrap();

    assert_eq!(sale.loyalty_offer().unwrap(), None);
    let err = sale.apply_loyalty_discount().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(sale.running_subtotal(), Money::from_cents(80000));
}

#[test]
fn test_no_offer_on_empty_cart() {
    let till = till_with_customers(&[rice()], &[ayesha(1_000_000)]);
    let sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    assert_eq!(sale.loyalty_offer().unwrap(), None);
}

#[test]
fn test_new_customer_has_nothing_to_redeem() {
    let till = till_with_customers(&[rice()], &[]);
    let mut sale = till.open(CustomerSelection::phone_or_register("0155", "Karim"));
    sale.add_by_name("Rice", 20).unwrap();
    assert_eq!(sale.loyalty_offer().unwrap(), None);
}

#[test]
fn test_cancel_leaves_points_untouched() {
    let till = till_with_customers(&[rice()], &[ayesha(1_000_000)]);
    let before = till.customers();

    let mut sale = till.open(CustomerSelection::phone(AYESHA_PHONE));
    sale.add_by_name("Rice", 20).unwrap();
    sale.apply_loyalty_discount().unwrap();
    sale.cancel().unwrap();

    assert_eq!(till.customers(), before);
}
