//! # Catalog Store
//!
//! Durable product list backed by `catalog.txt`.
//!
//! ## Record Format
//! ```text
//! name|price|quantity|barcode|category|supplier|low_stock_threshold|last_updated
//! Rice|40.00|100|8901234567890|Grocery|Acme Foods|10|1760688000
//! Salt|0.50|40                                    ← fields 4-8 optional
//! ```
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load()  ─────► fresh Vec<Product> from disk, bad lines skipped         │
//! │                                                                         │
//! │  mutate in memory (engine: decrement / restore stock)                   │
//! │                                                                         │
//! │  save(&products) ─► full replace of catalog.txt, never a merge          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no cache: every logical operation loads fresh.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tally_core::validation::{
    validate_barcode, validate_price, validate_product_name, validate_record_text,
    validate_stock_level,
};
use tally_core::{Money, Product};
use tracing::{debug, info};

use crate::codec::{optional_field, optional_number, or_empty, parse_records, read_or_create, write_atomic};
use crate::error::{StoreError, StoreResult};

/// Header written to a new catalog file.
pub const CATALOG_HEADER: &str =
    "# Tally catalog - Format: Name|Price|Quantity|Barcode|Category|Supplier|LowStockThreshold|LastUpdated";

const MIN_FIELDS: usize = 3;
const MAX_FIELDS: usize = 8;

/// Whether an upsert created or replaced a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Product catalog on disk.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CatalogStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every well-formed product.
    ///
    /// A missing file is created (header only) and yields an empty catalog.
    /// Later duplicates of a name are skipped like any other bad record.
    pub fn load(&self) -> StoreResult<Vec<Product>> {
        let text = read_or_create(&self.path, CATALOG_HEADER)?;

        let mut seen = HashSet::new();
        let (products, _) = parse_records(&self.path, &text, |fields| {
            let product = parse_product(fields)?;
            seen.insert(product.name.clone()).then_some(product)
        });

        debug!(path = %self.path.display(), count = products.len(), "Catalog loaded");
        Ok(products)
    }

    /// Replaces the whole catalog with `products`.
    pub fn save(&self, products: &[Product]) -> StoreResult<()> {
        let mut out = String::with_capacity(64 * (products.len() + 1));
        out.push_str(CATALOG_HEADER);
        out.push('\n');
        for p in products {
            out.push_str(&format_product(p));
            out.push('\n');
        }

        write_atomic(&self.path, &out)?;
        debug!(path = %self.path.display(), count = products.len(), "Catalog saved");
        Ok(())
    }

    /// Adds a product, or replaces the one with the same name.
    ///
    /// ## Validation
    /// - Name trimmed, non-empty, delimiter-safe
    /// - Price and quantity non-negative
    /// - Barcode empty or 8-13 digits, and not used by another product
    pub fn upsert(&self, product: Product) -> StoreResult<UpsertOutcome> {
        let product = validate_product(product)?;
        let mut products = self.load()?;

        if let Some(code) = product.barcode.as_deref() {
            if let Some(other) = find_by_barcode(&products, code) {
                if products[other].name != product.name {
                    return Err(StoreError::duplicate("barcode", code));
                }
            }
        }

        let outcome = match find_by_name(&products, &product.name) {
            Some(idx) => {
                products[idx] = product.clone();
                UpsertOutcome::Updated
            }
            None => {
                products.push(product.clone());
                UpsertOutcome::Inserted
            }
        };

        self.save(&products)?;
        info!(name = %product.name, ?outcome, "Catalog product stored");
        Ok(outcome)
    }

    /// Deletes a product by name and returns it.
    pub fn remove(&self, name: &str) -> StoreResult<Product> {
        let mut products = self.load()?;
        let idx = find_by_name(&products, name)
            .ok_or_else(|| StoreError::not_found("Product", name.trim()))?;

        let removed = products.remove(idx);
        self.save(&products)?;
        info!(name = %removed.name, "Catalog product removed");
        Ok(removed)
    }
}

/// Position of the product whose name equals the trimmed `name`.
pub fn find_by_name(products: &[Product], name: &str) -> Option<usize> {
    let name = name.trim();
    products.iter().position(|p| p.name == name)
}

/// Position of the product with this barcode. An empty code never matches.
pub fn find_by_barcode(products: &[Product], code: &str) -> Option<usize> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    products
        .iter()
        .position(|p| p.barcode.as_deref() == Some(code))
}

fn validate_product(mut product: Product) -> StoreResult<Product> {
    product.name = validate_product_name(&product.name)?;
    validate_price(product.price)?;
    validate_stock_level(product.quantity)?;

    product.barcode = product
        .barcode
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());
    if let Some(code) = product.barcode.as_deref() {
        validate_barcode(code)?;
    }
    if let Some(category) = product.category.as_deref() {
        validate_record_text("category", category)?;
    }
    if let Some(supplier) = product.supplier.as_deref() {
        validate_record_text("supplier", supplier)?;
    }
    Ok(product)
}

fn parse_product(fields: &[&str]) -> Option<Product> {
    if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
        return None;
    }

    let name = fields[0].trim();
    if name.is_empty() {
        return None;
    }

    let price: Money = fields[1].parse().ok()?;
    let quantity: i64 = fields[2].trim().parse().ok()?;
    if price.is_negative() || quantity < 0 {
        return None;
    }

    Some(Product {
        name: name.to_string(),
        price,
        quantity,
        barcode: optional_field(fields.get(3)),
        category: optional_field(fields.get(4)),
        supplier: optional_field(fields.get(5)),
        low_stock_threshold: optional_number(fields.get(6)).ok()?,
        last_updated: optional_number(fields.get(7)).ok()?,
    })
}

fn format_product(p: &Product) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        p.name,
        p.price,
        p.quantity,
        or_empty(&p.barcode),
        or_empty(&p.category),
        or_empty(&p.supplier),
        p.low_stock_threshold.map(|t| t.to_string()).unwrap_or_default(),
        p.last_updated.map(|t| t.to_string()).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, CatalogStore) {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("catalog.txt"));
        (dir, store)
    }

    #[test]
    fn test_load_missing_creates_empty_file() {
        let (_dir, store) = store();
        assert!(store.load().unwrap().is_empty());
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("# Tally catalog"));
    }

    #[test]
    fn test_save_then_load_is_identity() {
        let (_dir, store) = store();
        let products = vec![
            Product::new("Rice", Money::from_cents(4000), 100)
                .with_barcode("8901234567890")
                .with_category("Grocery")
                .with_supplier("Acme Foods")
                .with_low_stock_threshold(10),
            Product::new("Salt", Money::from_cents(50), 0),
        ];

        store.save(&products).unwrap();
        assert_eq!(store.load().unwrap(), products);
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let (_dir, store) = store();
        fs::write(
            store.path(),
            "# header\n\
             Rice|40.00|100\n\
             Oil|abc|5\n\
             |10.00|5\n\
             Neg|-1.00|5\n\
             Short|1.00\n\
             Bad|1.00|5||||x\n\
             Rice|99.00|1\n\
             Too|1|1|||||1|extra\n\
             \n\
             Sugar|2.5|7\n",
        )
        .unwrap();

        let products = store.load().unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Rice", "Sugar"]);
        assert_eq!(products[0].price.cents(), 4000);
        assert_eq!(products[1].price.cents(), 250);
    }

    #[test]
    fn test_names_are_trimmed() {
        let (_dir, store) = store();
        fs::write(store.path(), "  Rice  |40.00|100\n").unwrap();
        let products = store.load().unwrap();
        assert_eq!(find_by_name(&products, " Rice"), Some(0));
    }

    #[test]
    fn test_find_by_barcode_ignores_empty() {
        let products = vec![
            Product::new("NoCode", Money::zero(), 1),
            Product::new("Coded", Money::zero(), 1).with_barcode("12345678"),
        ];
        assert_eq!(find_by_barcode(&products, ""), None);
        assert_eq!(find_by_barcode(&products, "12345678"), Some(1));
        assert_eq!(find_by_barcode(&products, "87654321"), None);
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let (_dir, store) = store();
        let rice = Product::new("Rice", Money::from_cents(4000), 100);

        assert_eq!(store.upsert(rice.clone()).unwrap(), UpsertOutcome::Inserted);
        let cheaper = Product { price: Money::from_cents(3800), ..rice };
        assert_eq!(store.upsert(cheaper).unwrap(), UpsertOutcome::Updated);

        let products = store.load().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price.cents(), 3800);
    }

    #[test]
    fn test_upsert_validates() {
        let (_dir, store) = store();
        assert!(store
            .upsert(Product::new("Bad", Money::zero(), 1).with_barcode("123"))
            .is_err());
        assert!(store.upsert(Product::new("  ", Money::zero(), 1)).is_err());
        assert!(store.upsert(Product::new("Neg", Money::from_cents(-1), 1)).is_err());

        store
            .upsert(Product::new("A", Money::zero(), 1).with_barcode("12345678"))
            .unwrap();
        assert!(matches!(
            store.upsert(Product::new("B", Money::zero(), 1).with_barcode("12345678")),
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let (_dir, store) = store();
        store.upsert(Product::new("Rice", Money::from_cents(4000), 1)).unwrap();

        assert_eq!(store.remove("Rice").unwrap().name, "Rice");
        assert!(store.load().unwrap().is_empty());
        assert!(matches!(store.remove("Rice"), Err(StoreError::NotFound { .. })));
    }
}
