//! # tally-engine: Sale Transaction Engine for Tally POS
//!
//! Runs a checkout against the flat-file stores: customer selection, stock
//! reservation, loyalty redemption, pricing, split payment and commit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Layers                                 │
//! │                                                                         │
//! │  Caller (till UI, scripted import, tests)                               │
//! │       │ primitive inputs                ▲ SaleReceipt / EngineError     │
//! │       ▼                                 │                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                tally-engine (THIS CRATE)                        │   │
//! │  │   TransactionEngine   TillConfig   EngineError / ErrorKind      │   │
//! │  └───────────┬─────────────────────────────────┬───────────────────┘   │
//! │              ▼                                 ▼                        │
//! │     tally-core (Cart, Pricing,        tally-store (catalog,            │
//! │     PaymentSplitter, Money)           customers, sales files)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::{SequentialIds, TenderRequest};
//! use tally_engine::{CustomerSelection, TillConfig, TransactionEngine};
//! use tally_store::Stores;
//!
//! let config = TillConfig::load(None)?;
//! let stores = Stores::open(&config.data_dir)?;
//! let existing = stores.customers().load()?;
//! let ids = SequentialIds::default().resume_from(existing.iter().map(|c| c.id.as_str()));
//!
//! let mut sale = TransactionEngine::open(stores, &config, Box::new(ids), CustomerSelection::WalkIn)?;
//! sale.add_by_barcode("8901234567890", 2)?;
//! let totals = sale.checkout()?;
//! sale.tender(TenderRequest::cash(totals.net_total))?;
//! let receipt = sale.commit()?;
//! ```
//!
//! The engine performs no console I/O. Logging goes through `tracing`; the
//! embedding binary installs the subscriber.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod receipt;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::TillConfig;
pub use engine::{CustomerSelection, TransactionEngine};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use receipt::{CancellationReport, CustomerSummary, SaleReceipt};
pub use state::TransactionState;
