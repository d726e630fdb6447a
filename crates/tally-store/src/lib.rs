//! # tally-store: Flat-File Persistence for Tally POS
//!
//! This crate provides durable storage for the till: a product catalog, a
//! customer ledger and an append-only sales history, each a `|`-delimited
//! text file.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  TransactionEngine (add_by_name)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tally-store (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌───────────────┐      │   │
//! │  │   │ CatalogStore  │  │CustomerLedger │  │  SalesLedger  │      │   │
//! │  │   │ load / save   │  │ load / save   │  │ append        │      │   │
//! │  │   │ upsert/remove │  │ register      │  │ load_all      │      │   │
//! │  │   └───────┬───────┘  └───────┬───────┘  └───────┬───────┘      │   │
//! │  │           └──────── codec (tolerant read, atomic write) ──┘     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   <data_dir>/catalog.txt  customers.txt  sales.txt                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`stores`] - The `Stores` handle over a data directory
//! - [`catalog`] - Product catalog
//! - [`customer`] - Customer ledger
//! - [`sales`] - Sales history
//! - [`codec`] - Shared record parsing and atomic writes
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::Stores;
//!
//! let stores = Stores::open("./data")?;
//! let products = stores.catalog().load()?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod codec;
pub mod customer;
pub mod error;
pub mod sales;
pub mod stores;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{find_by_barcode, find_by_name, CatalogStore, UpsertOutcome};
pub use customer::{find_by_id, find_by_phone, next_free_id, CustomerLedger};
pub use error::{StoreError, StoreResult};
pub use sales::{LedgerEntry, SalesLedger};
pub use stores::Stores;
