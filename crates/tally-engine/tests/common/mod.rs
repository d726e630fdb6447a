//! Shared fixtures for the engine scenario tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tally_core::{CustomerRecord, LoyaltyPoints, Money, Product, SequentialIds};
use tally_engine::{CustomerSelection, TillConfig, TransactionEngine};
use tally_store::{find_by_name, Stores};
use tempfile::TempDir;

pub const RICE_BARCODE: &str = "8901234567890";

/// A till over a throwaway store directory.
pub struct Till {
    pub dir: TempDir,
    pub stores: Stores,
}

pub fn till(products: &[Product]) -> Till {
    till_with_customers(products, &[])
}

pub fn till_with_customers(products: &[Product], customers: &[CustomerRecord]) -> Till {
    let dir = tempfile::tempdir().unwrap();
    let stores = Stores::open(dir.path()).unwrap();
    stores.catalog().save(products).unwrap();
    stores.customers().save(customers).unwrap();
    Till { dir, stores }
}

impl Till {
    pub fn config(&self) -> TillConfig {
        TillConfig::with_data_dir(self.dir.path())
    }

    pub fn open(&self, selection: CustomerSelection) -> TransactionEngine {
        self.try_open(selection).unwrap()
    }

    pub fn try_open(
        &self,
        selection: CustomerSelection,
    ) -> tally_engine::EngineResult<TransactionEngine> {
        let existing = self.stores.customers().load().unwrap_or_default();
        let ids = SequentialIds::default().resume_from(existing.iter().map(|c| c.id.as_str()));
        TransactionEngine::open(self.stores.clone(), &self.config(), Box::new(ids), selection)
    }

    pub fn walk_in(&self) -> TransactionEngine {
        self.open(CustomerSelection::WalkIn)
    }

    /// Current on-disk quantity of a product.
    pub fn stock(&self, name: &str) -> i64 {
        let products = self.stores.catalog().load().unwrap();
        let idx = find_by_name(&products, name).unwrap();
        products[idx].quantity
    }

    pub fn customers(&self) -> Vec<CustomerRecord> {
        self.stores.customers().load().unwrap()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Makes the next write to `name` fail by putting a directory where its
    /// temp file goes. Reads of `name` keep working.
    pub fn block_save(&self, name: &str) {
        let tmp = tally_store::codec::temp_path(&self.file(name));
        fs::create_dir_all(tmp).unwrap();
    }
}

pub fn rice() -> Product {
    Product::new("Rice", Money::from_cents(4000), 100)
        .with_barcode(RICE_BARCODE)
        .with_category("Grocery")
}

pub fn oil() -> Product {
    Product::new("Oil", Money::from_cents(6000), 10)
}

pub fn sugar() -> Product {
    Product::new("Sugar", Money::from_cents(5000), 8).with_low_stock_threshold(5)
}

pub fn ayesha(points_hundredths: i64) -> CustomerRecord {
    CustomerRecord {
        points: LoyaltyPoints::from_hundredths(points_hundredths),
        total_spent: Money::from_cents(150000),
        visit_count: 3,
        last_visit: Some(1_760_000_000),
        ..CustomerRecord::new("CUST1001", "Ayesha", "01700000000")
    }
}
