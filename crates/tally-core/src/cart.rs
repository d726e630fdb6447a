//! # Cart
//!
//! Transaction-scoped accumulation of sold lines.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Engine Action             Cart Method            Cart State Change     │
//! │  ─────────────             ───────────            ─────────────────     │
//! │                                                                         │
//! │  add_by_name ────────────► add_line() ──────────► lines.push(line)      │
//! │                                                   subtotal += amount    │
//! │                                                                         │
//! │  cancel ─────────────────► remove_all() ────────► lines drained         │
//! │                                                   subtotal = 0          │
//! │                                                                         │
//! │  checkout ───────────────► subtotal() ──────────► (read only)          │
//! │                                                                         │
//! │  NOTE: The cart never reads or writes the catalog. The engine reserves │
//! │        stock first, then records the line here.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, SaleLine};
use crate::validation::validate_quantity;

/// Largest cart subtotal, 10 trillion. Keeps VAT, totals and customer spend
/// well inside `i64` cents.
pub const MAX_CART_SUBTOTAL: Money = Money::from_cents(1_000_000_000_000_000);

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_CART_SUBTOTAL.cents(),
    }
}

/// A line in the cart.
///
/// ## Design Notes
/// `product` is a frozen copy taken when the line was added. Later catalog
/// edits never change what this line charges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    /// `product.price * quantity`, fixed at add time.
    pub line_amount: Money,
}

impl CartLine {
    /// Creates a line from a product snapshot.
    ///
    /// ## Errors
    /// - `OutOfRange` on `line_amount` if price times quantity exceeds
    ///   [`MAX_CART_SUBTOTAL`]
    pub fn from_product(product: &Product, quantity: i64) -> Result<Self, ValidationError> {
        let line_amount = product
            .price
            .checked_multiply_quantity(quantity)
            .filter(|amount| *amount <= MAX_CART_SUBTOTAL)
            .ok_or_else(|| out_of_range("line_amount"))?;

        Ok(CartLine {
            product: product.clone(),
            quantity,
            line_amount,
        })
    }

    /// Product name at time of adding.
    pub fn name(&self) -> &str {
        &self.product.name
    }

    pub fn unit_price(&self) -> Money {
        self.product.price
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - `subtotal` always equals the sum of `line_amount` over `lines`
/// - Adding the same product twice yields two separate lines
/// - Quantity on each line is > 0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    subtotal: Money,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Builds the line `add_line` would append, without changing the cart.
    ///
    /// ## Errors
    /// - `Validation` if `quantity <= 0`, or the line amount or the new
    ///   subtotal would exceed [`MAX_CART_SUBTOTAL`]
    /// - `InsufficientStock` if `quantity` exceeds the snapshot's stock
    pub fn check_line(&self, product: &Product, quantity: i64) -> CoreResult<CartLine> {
        validate_quantity(quantity)?;

        if !product.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }

        let line = CartLine::from_product(product, quantity)?;
        self.subtotal
            .checked_add(line.line_amount)
            .filter(|subtotal| *subtotal <= MAX_CART_SUBTOTAL)
            .ok_or_else(|| out_of_range("subtotal"))?;
        Ok(line)
    }

    /// Appends a line for `quantity` units of `product`.
    ///
    /// ## Errors
    /// Same as [`check_line`](Self::check_line); the cart is unchanged on error.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<&CartLine> {
        let line = self.check_line(product, quantity)?;
        self.subtotal += line.line_amount;
        self.lines.push(line);

        // Just pushed, so the slice is non-empty.
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Drains the cart, returning every `(name, quantity)` exactly once.
    pub fn remove_all(&mut self) -> Vec<(String, i64)> {
        self.subtotal = Money::zero();
        self.lines
            .drain(..)
            .map(|line| (line.product.name, line.quantity))
            .collect()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of line amounts, before any discount or tax.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not units).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// The `(name, quantity)` pairs recorded on a sale, in add order.
    pub fn sale_lines(&self) -> Vec<SaleLine> {
        self.lines
            .iter()
            .map(|l| SaleLine {
                name: l.product.name.clone(),
                quantity: l.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rice() -> Product {
        Product::new("Rice", Money::from_cents(4000), 100)
    }

    #[test]
    fn test_add_line_accumulates_subtotal() {
        let mut cart = Cart::new();
        cart.add_line(&rice(), 20).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 20);
        assert_eq!(cart.subtotal().cents(), 80000);
    }

    #[test]
    fn test_same_product_twice_is_two_lines() {
        let mut cart = Cart::new();
        cart.add_line(&rice(), 2).unwrap();
        cart.add_line(&rice(), 3).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.subtotal().cents(), 20000);
    }

    #[test]
    fn test_add_line_rejects_bad_quantities() {
        let mut cart = Cart::new();

        assert!(matches!(
            cart.add_line(&rice(), 0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            cart.add_line(&rice(), 101),
            Err(CoreError::InsufficientStock { available: 100, requested: 101, .. })
        ));
        assert!(cart.is_empty());
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_add_line_rejects_amount_overflow() {
        let gold = Product::new("Gold", Money::from_cents(100_000_000_000_000), 1_000_000);
        let mut cart = Cart::new();

        let err = cart.add_line(&gold, 1_000_000).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "line_amount"
        ));
        assert!(cart.is_empty());

        // 6 + 6 lines of 1 trillion each pass the line check but not the subtotal cap
        cart.add_line(&gold, 6).unwrap();
        let err = cart.check_line(&gold, 6).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "subtotal"
        ));
        assert!(cart.add_line(&gold, 6).is_err());
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.subtotal().cents(), 600_000_000_000_000);
    }

    #[test]
    fn test_check_line_leaves_cart_unchanged() {
        let cart = Cart::new();
        let line = cart.check_line(&rice(), 20).unwrap();
        assert_eq!(line.line_amount.cents(), 80000);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut product = rice();
        let mut cart = Cart::new();
        cart.add_line(&product, 1).unwrap();

        product.price = Money::from_cents(9999);
        assert_eq!(cart.lines()[0].unit_price().cents(), 4000);
    }

    #[test]
    fn test_remove_all_returns_each_line_once() {
        let mut cart = Cart::new();
        cart.add_line(&rice(), 2).unwrap();
        cart.add_line(&Product::new("Oil", Money::from_cents(1500), 10), 1).unwrap();
        cart.add_line(&rice(), 3).unwrap();

        let removed = cart.remove_all();
        assert_eq!(
            removed,
            vec![
                ("Rice".to_string(), 2),
                ("Oil".to_string(), 1),
                ("Rice".to_string(), 3)
            ]
        );
        assert!(cart.is_empty());
        assert!(cart.subtotal().is_zero());
        assert!(cart.remove_all().is_empty());
    }

    #[test]
    fn test_sale_lines_keep_add_order() {
        let mut cart = Cart::new();
        cart.add_line(&rice(), 20).unwrap();
        let lines = cart.sale_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), "Rice(20)");
    }
}
