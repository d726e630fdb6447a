//! # Store Directory
//!
//! One handle over the three store files of a till.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <data_dir>/                                                            │
//! │  ├── catalog.txt     ← CatalogStore   (full replace)                   │
//! │  ├── customers.txt   ← CustomerLedger (full replace)                   │
//! │  └── sales.txt       ← SalesLedger    (append only)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalog::CatalogStore;
use crate::customer::CustomerLedger;
use crate::error::{StoreError, StoreResult};
use crate::sales::SalesLedger;

pub const CATALOG_FILE: &str = "catalog.txt";
pub const CUSTOMERS_FILE: &str = "customers.txt";
pub const SALES_FILE: &str = "sales.txt";

/// Main store handle providing access to each store.
///
/// ## Usage
/// ```rust,ignore
/// let stores = Stores::open("./data")?;
/// let products = stores.catalog().load()?;
/// ```
#[derive(Debug, Clone)]
pub struct Stores {
    data_dir: PathBuf,
    catalog: CatalogStore,
    customers: CustomerLedger,
    sales: SalesLedger,
}

impl Stores {
    /// Opens (and if needed creates) the store directory.
    ///
    /// Files themselves are created lazily on first load or write.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| StoreError::io(&data_dir, e))?;

        info!(path = %data_dir.display(), "Opened store directory");

        Ok(Stores {
            catalog: CatalogStore::new(data_dir.join(CATALOG_FILE)),
            customers: CustomerLedger::new(data_dir.join(CUSTOMERS_FILE)),
            sales: SalesLedger::new(data_dir.join(SALES_FILE)),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn customers(&self) -> &CustomerLedger {
        &self.customers
    }

    pub fn sales(&self) -> &SalesLedger {
        &self.sales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("till");

        let stores = Stores::open(&data_dir).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(stores.catalog().path(), data_dir.join("catalog.txt"));
        assert_eq!(stores.customers().path(), data_dir.join("customers.txt"));
        assert_eq!(stores.sales().path(), data_dir.join("sales.txt"));
    }

    #[test]
    fn test_open_fails_when_path_is_a_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        assert!(matches!(Stores::open(&file), Err(StoreError::Io { .. })));
    }
}
