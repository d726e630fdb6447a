//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the **heart** of Tally POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               tally-engine (TransactionEngine)                  │   │
//! │  │    open ──► add ──► checkout ──► tender ──► commit / cancel     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ pricing │ │ payment │  │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │ Totals  │ │Splitter │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO LOGGING • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-store (Flat Files)                     │   │
//! │  │              catalog.txt, customers.txt, sales.txt              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CustomerRecord, SaleRecord, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Transaction-scoped cart
//! - [`pricing`] - VAT, threshold discount and loyalty rules
//! - [`payment`] - Multi-instrument payment splitter
//! - [`ids`] - Customer id generators
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Cart, Money, PricingPolicy, Product};
//!
//! let rice = Product::new("Rice", Money::from_cents(4000), 100);
//! let mut cart = Cart::new();
//! cart.add_line(&rice, 20).unwrap();
//!
//! let totals = PricingPolicy::default().price(cart.subtotal(), Money::zero());
//! assert_eq!(totals.net_total.to_string(), "790.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod ids;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, MAX_CART_SUBTOTAL};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use money::Money;
pub use payment::{PaymentEntry, PaymentMethod, PaymentSplitter, TenderRequest};
pub use pricing::{LoyaltyOffer, LoyaltyPolicy, PricingPolicy, Totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock threshold used when a product has none of its own.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
