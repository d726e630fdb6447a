//! # Customer Ledger
//!
//! Durable customer records backed by `customers.txt`.
//!
//! ## Record Format
//! ```text
//! id|name|phone|email|points|total_spent|visit_count|last_visit
//! CUST1001|Ayesha|01700000000||7.90|790.00|1|1760688000
//! ```
//!
//! Same contract as the catalog: fresh load, mutate, full-replace save.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tally_core::validation::{validate_customer_name, validate_phone, validate_record_text};
use tally_core::{CustomerRecord, IdGenerator, LoyaltyPoints, Money};
use tracing::{debug, info, warn};

use crate::codec::{optional_field, optional_number, or_empty, parse_records, read_or_create, write_atomic};
use crate::error::{StoreError, StoreResult};

/// Header written to a new customer file.
pub const CUSTOMER_HEADER: &str =
    "# Tally customers - Format: ID|Name|Phone|Email|Points|TotalSpent|VisitCount|LastVisit";

const MIN_FIELDS: usize = 3;
const MAX_FIELDS: usize = 8;

/// Customer records on disk.
#[derive(Debug, Clone)]
pub struct CustomerLedger {
    path: PathBuf,
}

impl CustomerLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CustomerLedger { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every well-formed customer. Records with a repeated id are
    /// skipped.
    pub fn load(&self) -> StoreResult<Vec<CustomerRecord>> {
        let text = read_or_create(&self.path, CUSTOMER_HEADER)?;

        let mut seen = HashSet::new();
        let (customers, _) = parse_records(&self.path, &text, |fields| {
            let customer = parse_customer(fields)?;
            seen.insert(customer.id.clone()).then_some(customer)
        });

        debug!(path = %self.path.display(), count = customers.len(), "Customers loaded");
        Ok(customers)
    }

    /// Replaces the whole ledger with `customers`.
    pub fn save(&self, customers: &[CustomerRecord]) -> StoreResult<()> {
        let mut out = String::with_capacity(64 * (customers.len() + 1));
        out.push_str(CUSTOMER_HEADER);
        out.push('\n');
        for c in customers {
            out.push_str(&format_customer(c));
            out.push('\n');
        }

        write_atomic(&self.path, &out)?;
        debug!(path = %self.path.display(), count = customers.len(), "Customers saved");
        Ok(())
    }

    /// Registers a new customer outside of a checkout.
    ///
    /// ## Errors
    /// - `Duplicate` if the phone number is already registered
    /// - `Validation` for an empty or delimiter-unsafe name, phone or email
    pub fn register(
        &self,
        name: &str,
        phone: &str,
        email: Option<&str>,
        ids: &mut dyn IdGenerator,
    ) -> StoreResult<CustomerRecord> {
        let name = validate_customer_name(name)?;
        let phone = validate_phone(phone)?;
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        if let Some(e) = email {
            validate_record_text("email", e)?;
        }

        let mut customers = self.load()?;
        if find_by_phone(&customers, &phone).is_some() {
            return Err(StoreError::duplicate("phone", phone));
        }

        let id = next_free_id(&customers, ids)?;
        let mut customer = CustomerRecord::new(id, name, phone);
        customer.email = email.map(str::to_string);
        customers.push(customer.clone());
        self.save(&customers)?;

        info!(id = %customer.id, "Customer registered");
        Ok(customer)
    }
}

pub fn find_by_phone(customers: &[CustomerRecord], phone: &str) -> Option<usize> {
    let phone = phone.trim();
    if phone.is_empty() {
        return None;
    }
    customers.iter().position(|c| c.phone == phone)
}

pub fn find_by_id(customers: &[CustomerRecord], id: &str) -> Option<usize> {
    customers.iter().position(|c| c.id == id)
}

/// Draws ids from `ids` until one is not already in `customers`.
///
/// A generator that never repeats itself needs at most `customers.len() + 1`
/// draws, so a sequence that was not resumed past the ledger still lands on
/// a free id.
///
/// ## Errors
/// - `Duplicate` on `id` if every draw is taken
pub fn next_free_id(
    customers: &[CustomerRecord],
    ids: &mut dyn IdGenerator,
) -> StoreResult<String> {
    let mut id = ids.next_id();
    for _ in 0..customers.len() {
        if find_by_id(customers, &id).is_none() {
            return Ok(id);
        }
        warn!(id = %id, "Customer id already taken, drawing another");
        id = ids.next_id();
    }

    if find_by_id(customers, &id).is_none() {
        Ok(id)
    } else {
        Err(StoreError::duplicate("customer id", id))
    }
}

fn parse_customer(fields: &[&str]) -> Option<CustomerRecord> {
    if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
        return None;
    }

    let id = fields[0].trim();
    let phone = fields[2].trim();
    if id.is_empty() || phone.is_empty() {
        return None;
    }

    let points = match optional_field(fields.get(4)) {
        Some(p) => p.parse::<LoyaltyPoints>().ok()?,
        None => LoyaltyPoints::zero(),
    };
    let total_spent = match optional_field(fields.get(5)) {
        Some(s) => s.parse::<Money>().ok()?,
        None => Money::zero(),
    };
    let visit_count = match optional_field(fields.get(6)) {
        Some(v) => v.parse::<u32>().ok()?,
        None => 0,
    };
    if points.hundredths() < 0 || total_spent.is_negative() {
        return None;
    }

    Some(CustomerRecord {
        id: id.to_string(),
        name: fields[1].trim().to_string(),
        phone: phone.to_string(),
        email: optional_field(fields.get(3)),
        points,
        total_spent,
        visit_count,
        last_visit: optional_number(fields.get(7)).ok()?,
    })
}

fn format_customer(c: &CustomerRecord) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        c.id,
        c.name,
        c.phone,
        or_empty(&c.email),
        c.points,
        c.total_spent,
        c.visit_count,
        c.last_visit.map(|t| t.to_string()).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tally_core::SequentialIds;
    use tempfile::tempdir;

    fn ledger() -> (tempfile::TempDir, CustomerLedger) {
        let dir = tempdir().unwrap();
        let ledger = CustomerLedger::new(dir.path().join("customers.txt"));
        (dir, ledger)
    }

    fn ayesha() -> CustomerRecord {
        CustomerRecord {
            id: "CUST1001".to_string(),
            name: "Ayesha".to_string(),
            phone: "01700000000".to_string(),
            email: Some("ayesha@example.com".to_string()),
            points: LoyaltyPoints::from_hundredths(790),
            total_spent: Money::from_cents(79000),
            visit_count: 1,
            last_visit: Some(1_760_688_000),
        }
    }

    #[test]
    fn test_save_then_load_is_identity() {
        let (_dir, ledger) = ledger();
        let customers = vec![ayesha(), CustomerRecord::new("CUST1002", "Rahim", "01800000000")];

        ledger.save(&customers).unwrap();
        assert_eq!(ledger.load().unwrap(), customers);
    }

    #[test]
    fn test_load_drops_non_numeric_fields() {
        let (_dir, ledger) = ledger();
        fs::write(
            ledger.path(),
            "# header\n\
             CUST1001|Ayesha|0170||7.90|790.00|1|1760688000\n\
             CUST1002|Rahim|0180||lots|0|0|\n\
             CUST1003|Karim|0190||0|0|many|\n\
             CUST1004|Nadia|0160\n",
        )
        .unwrap();

        let customers = ledger.load().unwrap();
        let ids: Vec<_> = customers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["CUST1001", "CUST1004"]);
        assert_eq!(customers[1].visit_count, 0);
    }

    #[test]
    fn test_find_by_phone() {
        let customers = vec![ayesha()];
        assert_eq!(find_by_phone(&customers, "01700000000"), Some(0));
        assert_eq!(find_by_phone(&customers, ""), None);
        assert_eq!(find_by_phone(&customers, "999"), None);
        assert_eq!(find_by_id(&customers, "CUST1001"), Some(0));
    }

    #[test]
    fn test_register_rejects_duplicate_phone() {
        let (_dir, ledger) = ledger();
        let mut ids = SequentialIds::default();

        let first = ledger.register("Ayesha", "0170", None, &mut ids).unwrap();
        assert_eq!(first.id, "CUST1001");

        let dup = ledger.register("Someone", "0170", Some("x@y.z"), &mut ids);
        assert!(matches!(dup, Err(StoreError::Duplicate { .. })));
        assert_eq!(ledger.load().unwrap().len(), 1);
    }

    #[test]
    fn test_register_skips_ids_already_in_ledger() {
        let (_dir, ledger) = ledger();
        ledger
            .save(&[ayesha(), CustomerRecord::new("CUST1002", "Karim", "0190")])
            .unwrap();

        // Not resumed past the ledger, so the first two draws clash
        let mut ids = SequentialIds::default();
        let rahim = ledger.register("Rahim", "0180", None, &mut ids).unwrap();
        assert_eq!(rahim.id, "CUST1003");

        let ids: Vec<_> = ledger.load().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["CUST1001", "CUST1002", "CUST1003"]);
    }

    struct StuckIds;

    impl IdGenerator for StuckIds {
        fn next_id(&mut self) -> String {
            "CUST1001".to_string()
        }
    }

    #[test]
    fn test_next_free_id_gives_up_on_repeating_generator() {
        let customers = vec![ayesha()];
        assert!(matches!(
            next_free_id(&customers, &mut StuckIds),
            Err(StoreError::Duplicate { .. })
        ));
        assert_eq!(next_free_id(&[], &mut StuckIds).unwrap(), "CUST1001");
    }

    #[test]
    fn test_register_validates_input() {
        let (_dir, ledger) = ledger();
        let mut ids = SequentialIds::default();
        assert!(ledger.register("", "0170", None, &mut ids).is_err());
        assert!(ledger.register("A|B", "0170", None, &mut ids).is_err());
        assert!(ledger.register("Ayesha", " ", None, &mut ids).is_err());
    }
}
