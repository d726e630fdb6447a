//! # Transaction Engine
//!
//! Drives one sale from customer selection to a committed ledger entry.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open(stores, config, ids, Walk-in)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_by_name("Rice", 20)                                                │
//! │       ├── catalog.load()        fresh, no cache                         │
//! │       ├── stock check           100 ≥ 20                                │
//! │       ├── catalog.save()        Rice now 80 on disk                     │
//! │       └── cart.add_line()       snapshot Rice@40.00 × 20                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout()                     800.00 + 40.00 − 50.00 = 790.00         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tender(Cash 790.00)            settled                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit()                                                               │
//! │       ├── sales.append()        ...|Walk-in Customer|790.00|Rice(20)    │
//! │       └── customers.save()      only when a customer was resolved       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eager Reservation
//! Stock is written to the catalog as each line is added, so the catalog on
//! disk always reflects what open carts hold. `cancel()` gives it back. A
//! cart that is dropped without commit or cancel leaves its stock reserved;
//! the drop is logged at `error` level with the affected lines.
//!
//! ## Failure Handling
//! - Lookup, quantity, stock, loyalty and tender errors are recoverable: the
//!   state does not change.
//! - A store failure while reserving or cancelling aborts the transaction
//!   after a best-effort stock restore.
//! - A ledger append failure at commit aborts without touching stock; the
//!   missing sale is logged for manual reconciliation.

use chrono::{Local, SubsecRound, Utc};
use tally_core::validation::{validate_customer_name, validate_phone, validate_quantity};
use tally_core::{
    low_stock, Cart, CartLine, CoreError, CustomerRecord, IdGenerator, LoyaltyOffer,
    LoyaltyPoints, LoyaltyPolicy, Money, PaymentEntry, PaymentSplitter, PricingPolicy, Product,
    SaleLine, SaleRecord, TenderRequest, Totals, WALK_IN_CUSTOMER,
};
use tally_store::{
    find_by_barcode, find_by_id, find_by_name, find_by_phone, next_free_id, CatalogStore,
    StoreError, StoreResult, Stores,
};
use tracing::{debug, error, info, warn};

use crate::config::TillConfig;
use crate::error::{EngineError, EngineResult};
use crate::receipt::{CancellationReport, CustomerSummary, SaleReceipt};
use crate::state::TransactionState;

// =============================================================================
// Customer Selection
// =============================================================================

/// Who the sale is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerSelection {
    /// Anonymous sale, recorded as "Walk-in Customer".
    WalkIn,

    /// Look the customer up by phone. When nobody has that phone and
    /// `new_name` is given, a new customer is created at commit.
    Phone {
        phone: String,
        new_name: Option<String>,
    },
}

impl CustomerSelection {
    /// Existing customer only.
    pub fn phone(phone: impl Into<String>) -> Self {
        CustomerSelection::Phone {
            phone: phone.into(),
            new_name: None,
        }
    }

    /// Existing customer, or a new one with this name.
    pub fn phone_or_register(phone: impl Into<String>, name: impl Into<String>) -> Self {
        CustomerSelection::Phone {
            phone: phone.into(),
            new_name: Some(name.into()),
        }
    }
}

/// Customer resolved at open time.
#[derive(Debug, Clone)]
enum SaleCustomer {
    Existing(CustomerRecord),
    /// Not in the ledger yet; written on commit only.
    New { name: String, phone: String },
}

impl SaleCustomer {
    fn name(&self) -> &str {
        match self {
            SaleCustomer::Existing(record) => &record.name,
            SaleCustomer::New { name, .. } => name,
        }
    }

    fn balance(&self) -> LoyaltyPoints {
        match self {
            SaleCustomer::Existing(record) => record.points,
            SaleCustomer::New { .. } => LoyaltyPoints::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ProductKey<'a> {
    Name(&'a str),
    Barcode(&'a str),
}

impl ProductKey<'_> {
    fn find(&self, products: &[Product]) -> Option<usize> {
        match self {
            ProductKey::Name(name) => find_by_name(products, name),
            ProductKey::Barcode(code) => find_by_barcode(products, code),
        }
    }

    fn not_found(&self) -> EngineError {
        match self {
            ProductKey::Name(name) => EngineError::not_found("Product", name.trim()),
            ProductKey::Barcode(code) => EngineError::not_found("Barcode", code.trim()),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// A single sale transaction over a store directory.
///
/// ## Usage
/// ```rust,ignore
/// let config = TillConfig::load(None)?;
/// let stores = Stores::open(&config.data_dir)?;
///
/// // Continue the id sequence after the customers already on file
/// let existing = stores.customers().load()?;
/// let ids = SequentialIds::default().resume_from(existing.iter().map(|c| c.id.as_str()));
///
/// let mut sale = TransactionEngine::open(
///     stores,
///     &config,
///     Box::new(ids),
///     CustomerSelection::phone_or_register("01800000000", "Rahim"),
/// )?;
///
/// sale.add_by_name("Rice", 20)?;
/// let totals = sale.checkout()?;
/// sale.tender(TenderRequest::cash(totals.net_total))?;
/// let receipt = sale.commit()?;
/// ```
pub struct TransactionEngine {
    stores: Stores,
    store_name: String,
    pricing: PricingPolicy,
    loyalty: LoyaltyPolicy,
    low_stock_threshold: i64,
    ids: Box<dyn IdGenerator>,

    state: TransactionState,
    customer: Option<SaleCustomer>,
    cart: Cart,
    /// Accepted loyalty redemption, at most one per transaction.
    redemption: Option<LoyaltyOffer>,
    totals: Option<Totals>,
    splitter: Option<PaymentSplitter>,
}

impl TransactionEngine {
    /// Resolves the customer and opens an empty cart.
    ///
    /// ## Errors
    /// - `NotFound` when the phone is unknown and no name was given
    /// - `Validation` for a blank phone or an unusable new-customer name
    /// - `PersistenceFailure` when the customer ledger cannot be read
    pub fn open(
        stores: Stores,
        config: &TillConfig,
        ids: Box<dyn IdGenerator>,
        selection: CustomerSelection,
    ) -> EngineResult<Self> {
        let mut engine = TransactionEngine {
            stores,
            store_name: config.store_name.clone(),
            pricing: config.pricing.clone(),
            loyalty: config.loyalty.clone(),
            low_stock_threshold: config.low_stock_threshold,
            ids,
            state: TransactionState::Idle,
            customer: None,
            cart: Cart::new(),
            redemption: None,
            totals: None,
            splitter: None,
        };

        engine.customer = engine.resolve_customer(selection)?;
        engine.state = TransactionState::Open;

        info!(customer = %engine.customer_name(), "Transaction opened");
        Ok(engine)
    }

    fn resolve_customer(&self, selection: CustomerSelection) -> EngineResult<Option<SaleCustomer>> {
        let (phone, new_name) = match selection {
            CustomerSelection::WalkIn => return Ok(None),
            CustomerSelection::Phone { phone, new_name } => (phone, new_name),
        };

        let phone = validate_phone(&phone)?;
        let customers = self.stores.customers().load()?;

        if let Some(idx) = find_by_phone(&customers, &phone) {
            let record = customers[idx].clone();
            debug!(id = %record.id, "Customer resolved by phone");
            return Ok(Some(SaleCustomer::Existing(record)));
        }

        match new_name {
            Some(name) => {
                let name = validate_customer_name(&name)?;
                info!(phone = %phone, "New customer, will be registered on commit");
                Ok(Some(SaleCustomer::New { name, phone }))
            }
            None => Err(EngineError::not_found("Customer", phone)),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Name the sale is recorded under.
    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .map(SaleCustomer::name)
            .unwrap_or(WALK_IN_CUSTOMER)
    }

    /// Id of an existing customer. `None` for walk-in and new customers.
    pub fn customer_id(&self) -> Option<&str> {
        match &self.customer {
            Some(SaleCustomer::Existing(record)) => Some(&record.id),
            _ => None,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Cart subtotal less any accepted loyalty discount.
    pub fn running_subtotal(&self) -> Money {
        self.cart.subtotal() - self.loyalty_discount()
    }

    pub fn redemption(&self) -> Option<LoyaltyOffer> {
        self.redemption
    }

    /// Tenders accepted so far.
    pub fn payments(&self) -> &[PaymentEntry] {
        self.splitter.as_ref().map(|s| s.entries()).unwrap_or(&[])
    }

    /// Amount still to collect, once checked out.
    pub fn remaining(&self) -> Option<Money> {
        self.splitter.as_ref().map(PaymentSplitter::remaining)
    }

    pub fn is_settled(&self) -> bool {
        self.splitter.as_ref().map_or(false, PaymentSplitter::is_settled)
    }

    fn loyalty_discount(&self) -> Money {
        self.redemption
            .map(|offer| offer.discount)
            .unwrap_or_else(Money::zero)
    }

    fn require(&self, operation: &'static str, allowed: &[TransactionState]) -> EngineResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(EngineError::invalid_state(operation, self.state))
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Reserves stock for `quantity` of the named product and adds a line.
    pub fn add_by_name(&mut self, name: &str, quantity: i64) -> EngineResult<CartLine> {
        self.add(ProductKey::Name(name), quantity)
    }

    /// Same as [`add_by_name`](Self::add_by_name), looked up by barcode.
    pub fn add_by_barcode(&mut self, code: &str, quantity: i64) -> EngineResult<CartLine> {
        self.add(ProductKey::Barcode(code), quantity)
    }

    fn add(&mut self, key: ProductKey<'_>, quantity: i64) -> EngineResult<CartLine> {
        self.require("add items", &[TransactionState::Open])?;
        validate_quantity(quantity)?;

        let mut products = match self.stores.catalog().load() {
            Ok(products) => products,
            Err(e) => return Err(self.abort("add items", e)),
        };

        let idx = key.find(&products).ok_or_else(|| key.not_found())?;
        let snapshot = products[idx].clone();

        if !snapshot.can_sell(quantity) {
            warn!(
                product = %snapshot.name,
                available = snapshot.quantity,
                requested = quantity,
                "Insufficient stock"
            );
            return Err(CoreError::InsufficientStock {
                product: snapshot.name,
                available: snapshot.quantity,
                requested: quantity,
            }
            .into());
        }

        // Rejected lines must leave the catalog untouched.
        self.cart.check_line(&snapshot, quantity)?;

        products[idx].quantity -= quantity;
        products[idx].last_updated = Some(Utc::now().timestamp());
        if let Err(e) = self.stores.catalog().save(&products) {
            return Err(self.abort("add items", e));
        }

        let line = self.cart.add_line(&snapshot, quantity)?.clone();

        info!(
            product = %line.name(),
            quantity,
            line_amount = %line.line_amount,
            stock_left = snapshot.quantity - quantity,
            "Item reserved"
        );
        Ok(line)
    }

    // =========================================================================
    // Loyalty
    // =========================================================================

    /// The redemption the customer could accept right now, if any.
    ///
    /// `None` for walk-in and new customers, an empty balance, an empty cart,
    /// or once a redemption has been accepted.
    pub fn loyalty_offer(&self) -> EngineResult<Option<LoyaltyOffer>> {
        self.require("offer a loyalty discount", &[TransactionState::Open])?;

        if self.redemption.is_some() {
            return Ok(None);
        }

        Ok(self
            .customer
            .as_ref()
            .and_then(|c| self.loyalty.offer(c.balance(), self.running_subtotal())))
    }

    /// Accepts the current loyalty offer.
    ///
    /// The discount comes off the running subtotal before VAT and the
    /// threshold test. The points are debited at commit.
    pub fn apply_loyalty_discount(&mut self) -> EngineResult<LoyaltyOffer> {
        self.require("apply a loyalty discount", &[TransactionState::Open])?;

        if self.redemption.is_some() {
            return Err(EngineError::LoyaltyUnavailable {
                reason: "already applied to this sale".to_string(),
            });
        }

        let customer = self
            .customer
            .as_ref()
            .ok_or_else(|| EngineError::LoyaltyUnavailable {
                reason: "walk-in sale".to_string(),
            })?;

        let offer = self
            .loyalty
            .offer(customer.balance(), self.running_subtotal())
            .ok_or_else(|| EngineError::LoyaltyUnavailable {
                reason: format!(
                    "balance {} points redeems nothing against {}",
                    customer.balance(),
                    self.running_subtotal()
                ),
            })?;

        self.redemption = Some(offer);
        info!(
            discount = %offer.discount,
            points = %offer.points_debit,
            "Loyalty discount applied"
        );
        Ok(offer)
    }

    // =========================================================================
    // Pricing and Payment
    // =========================================================================

    /// Totals as they stand. Final once checked out.
    pub fn preview_totals(&self) -> EngineResult<Totals> {
        self.require(
            "preview totals",
            &[TransactionState::Open, TransactionState::PaymentCollection],
        )?;

        Ok(self
            .totals
            .unwrap_or_else(|| self.pricing.price(self.cart.subtotal(), self.loyalty_discount())))
    }

    /// Prices the cart and starts collecting payment for the net total.
    pub fn checkout(&mut self) -> EngineResult<Totals> {
        self.require("checkout", &[TransactionState::Open])?;

        if self.cart.is_empty() {
            return Err(EngineError::EmptyCart);
        }

        self.state = TransactionState::Pricing;
        let totals = self
            .pricing
            .price(self.cart.subtotal(), self.loyalty_discount());
        debug!(
            subtotal = %totals.subtotal,
            vat = %totals.vat,
            discount = %totals.threshold_discount,
            "Cart priced"
        );

        self.totals = Some(totals);
        self.splitter = Some(PaymentSplitter::new(totals.net_total));
        self.state = TransactionState::PaymentCollection;

        info!(net_total = %totals.net_total, lines = self.cart.line_count(), "Collecting payment");
        Ok(totals)
    }

    /// Records one tender. A rejected tender changes nothing.
    pub fn tender(&mut self, request: TenderRequest) -> EngineResult<PaymentEntry> {
        self.require("take payment", &[TransactionState::PaymentCollection])?;

        let state = self.state;
        let splitter = self
            .splitter
            .as_mut()
            .ok_or(EngineError::invalid_state("take payment", state))?;

        match splitter.tender(request).map(PaymentEntry::clone) {
            Ok(entry) => {
                info!(
                    method = %entry.method,
                    amount = %entry.amount,
                    remaining = %splitter.remaining(),
                    "Payment accepted"
                );
                Ok(entry)
            }
            Err(e) => {
                warn!(error = %e, "Payment rejected");
                Err(e.into())
            }
        }
    }

    /// Tenders requests in order until the sale is settled.
    ///
    /// Rejected requests are skipped. If the requests run out first the
    /// accepted entries stay recorded and `PaymentMismatch` is returned.
    pub fn collect<I>(&mut self, requests: I) -> EngineResult<Vec<PaymentEntry>>
    where
        I: IntoIterator<Item = TenderRequest>,
    {
        self.require("take payment", &[TransactionState::PaymentCollection])?;

        let mut requests = requests.into_iter();
        let mut accepted = Vec::new();

        while !self.is_settled() {
            let Some(request) = requests.next() else {
                break;
            };
            match self.tender(request) {
                Ok(entry) => accepted.push(entry),
                Err(e) if e.is_recoverable() => continue,
                Err(e) => return Err(e),
            }
        }

        if let Some(splitter) = self.splitter.as_ref().filter(|s| !s.is_settled()) {
            return Err(CoreError::PaymentMismatch {
                paid: splitter.paid(),
                due: splitter.amount_due(),
            }
            .into());
        }

        Ok(accepted)
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Records the sale and updates the customer.
    ///
    /// ## Order of Writes
    /// 1. Append to the sales ledger (stock was reserved on add)
    /// 2. Customer ledger: spend, points, visits, last visit
    ///
    /// ## Errors
    /// - `PaymentMismatch` (recoverable) when payments do not cover the total
    /// - `PersistenceFailure` when either write fails; the transaction aborts
    pub fn commit(&mut self) -> EngineResult<SaleReceipt> {
        self.require("commit", &[TransactionState::PaymentCollection])?;

        let (Some(totals), Some(splitter)) = (self.totals, self.splitter.as_ref()) else {
            return Err(EngineError::invalid_state("commit", self.state));
        };

        if !splitter.is_settled() {
            return Err(CoreError::PaymentMismatch {
                paid: splitter.paid(),
                due: splitter.amount_due(),
            }
            .into());
        }
        let payments = splitter.entries().to_vec();

        let timestamp = Local::now().naive_local().trunc_subsecs(0);
        let record = SaleRecord {
            timestamp,
            customer: self.customer_name().to_string(),
            net_total: totals.net_total,
            lines: self.cart.sale_lines(),
        };

        if let Err(e) = self.stores.sales().append(&record) {
            self.state = TransactionState::Aborted;
            error!(
                error = %e,
                customer = %record.customer,
                net_total = %record.net_total,
                lines = ?record.lines,
                "Sale not recorded but its stock stays deducted, reconcile manually"
            );
            return Err(e.into());
        }

        let customer = match self.customer.take() {
            Some(customer) => match self.settle_customer(&customer, totals.net_total) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    self.state = TransactionState::Aborted;
                    error!(
                        error = %e,
                        customer = %customer.name(),
                        net_total = %totals.net_total,
                        redemption = ?self.redemption,
                        "Sale recorded but customer ledger not updated, reconcile manually"
                    );
                    return Err(e.into());
                }
            },
            None => None,
        };

        let alerts = match self.stores.catalog().load() {
            Ok(products) => low_stock(&products, self.low_stock_threshold),
            Err(e) => {
                warn!(error = %e, "Low-stock check skipped");
                Vec::new()
            }
        };
        for alert in &alerts {
            warn!(
                product = %alert.name,
                quantity = alert.quantity,
                threshold = alert.threshold,
                "Low stock"
            );
        }

        self.state = TransactionState::Committed;
        info!(
            customer = %record.customer,
            net_total = %totals.net_total,
            payments = payments.len(),
            "Sale committed"
        );

        Ok(SaleReceipt {
            store_name: self.store_name.clone(),
            timestamp,
            customer,
            lines: self.cart.lines().to_vec(),
            totals,
            payments,
            low_stock: alerts,
        })
    }

    /// Applies the sale to the customer's ledger record.
    fn settle_customer(
        &mut self,
        customer: &SaleCustomer,
        net_total: Money,
    ) -> StoreResult<CustomerSummary> {
        let ledger = self.stores.customers();
        let mut customers = ledger.load()?;

        let (idx, newly_registered) = match customer {
            SaleCustomer::Existing(snapshot) => match find_by_id(&customers, &snapshot.id) {
                Some(idx) => (idx, false),
                None => {
                    warn!(id = %snapshot.id, "Customer left the ledger during the sale, restoring record");
                    customers.push(snapshot.clone());
                    (customers.len() - 1, false)
                }
            },
            SaleCustomer::New { name, phone } => match find_by_phone(&customers, phone) {
                Some(idx) => (idx, false),
                None => {
                    let id = next_free_id(&customers, self.ids.as_mut())?;
                    customers.push(CustomerRecord::new(id, name.clone(), phone.clone()));
                    (customers.len() - 1, true)
                }
            },
        };

        let record = &mut customers[idx];

        let before = record.points;
        if let Some(offer) = self.redemption {
            record.points = before.saturating_debit(offer.points_debit);
        }
        let redeemed = LoyaltyPoints::from_hundredths(before.hundredths() - record.points.hundredths());

        let earned = self.loyalty.accrue(net_total);
        record.points += earned;
        record.total_spent += net_total;
        record.visit_count = record.visit_count.saturating_add(1);
        record.last_visit = Some(Utc::now().timestamp());

        let summary = CustomerSummary {
            id: record.id.clone(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            newly_registered,
            points_earned: earned,
            points_redeemed: redeemed,
            points_balance: record.points,
            total_spent: record.total_spent,
            visit_count: record.visit_count,
        };

        ledger.save(&customers)?;
        info!(
            id = %summary.id,
            earned = %earned,
            redeemed = %redeemed,
            new = newly_registered,
            "Customer updated"
        );
        Ok(summary)
    }

    // =========================================================================
    // Cancel and Abort
    // =========================================================================

    /// Returns every reserved quantity to the catalog and ends the sale.
    ///
    /// Allowed before checkout and while collecting payment. Recorded tenders
    /// are discarded and reported.
    pub fn cancel(&mut self) -> EngineResult<CancellationReport> {
        self.require(
            "cancel",
            &[TransactionState::Open, TransactionState::PaymentCollection],
        )?;

        let discarded_payments = self
            .splitter
            .take()
            .map(|s| s.entries().to_vec())
            .unwrap_or_default();
        if !discarded_payments.is_empty() {
            warn!(count = discarded_payments.len(), "Discarding tenders on cancel");
        }

        let reserved = self.cart.remove_all();
        self.totals = None;
        self.redemption = None;

        match restore_stock(self.stores.catalog(), &reserved) {
            Ok((restored, unrestored)) => {
                for line in &unrestored {
                    warn!(
                        product = %line.name,
                        quantity = line.quantity,
                        "Product no longer in catalog, stock not restored"
                    );
                }
                self.state = TransactionState::Cancelled;
                info!(
                    restored = restored.len(),
                    unrestored = unrestored.len(),
                    "Transaction cancelled"
                );
                Ok(CancellationReport {
                    restored,
                    unrestored,
                    discarded_payments,
                })
            }
            Err(e) => {
                self.state = TransactionState::Aborted;
                error!(
                    error = %e,
                    reserved = ?reserved,
                    "Cancel could not restore reserved stock, reconcile catalog manually"
                );
                Err(e.into())
            }
        }
    }

    /// Ends the transaction after a store failure, restoring what it can.
    fn abort(&mut self, operation: &'static str, cause: StoreError) -> EngineError {
        self.state = TransactionState::Aborted;
        error!(operation, error = %cause, "Store failure, transaction aborted");

        let reserved = self.cart.remove_all();
        if !reserved.is_empty() {
            match restore_stock(self.stores.catalog(), &reserved) {
                Ok((restored, unrestored)) if unrestored.is_empty() => {
                    info!(lines = restored.len(), "Reserved stock restored after abort");
                }
                Ok((_, unrestored)) => {
                    error!(unrestored = ?unrestored, "Reserved stock not restored, products missing from catalog");
                }
                Err(e) => {
                    error!(
                        error = %e,
                        reserved = ?reserved,
                        "Reserved stock could not be restored, reconcile catalog manually"
                    );
                }
            }
        }

        cause.into()
    }
}

impl Drop for TransactionEngine {
    fn drop(&mut self) {
        if !self.state.is_terminal() && !self.cart.is_empty() {
            error!(
                state = %self.state,
                lines = ?self.cart.sale_lines(),
                "Transaction dropped with reserved stock, reconcile catalog manually"
            );
        }
    }
}

/// Adds reserved quantities back to the catalog in one save.
///
/// Returns the restored lines and the lines whose product has disappeared.
fn restore_stock(
    catalog: &CatalogStore,
    reserved: &[(String, i64)],
) -> StoreResult<(Vec<SaleLine>, Vec<SaleLine>)> {
    if reserved.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut products = catalog.load()?;
    let now = Utc::now().timestamp();
    let mut restored = Vec::new();
    let mut unrestored = Vec::new();

    for (name, quantity) in reserved {
        let line = SaleLine {
            name: name.clone(),
            quantity: *quantity,
        };
        match find_by_name(&products, name) {
            Some(idx) => {
                products[idx].quantity += quantity;
                products[idx].last_updated = Some(now);
                restored.push(line);
            }
            None => unrestored.push(line),
        }
    }

    if !restored.is_empty() {
        catalog.save(&products)?;
    }
    Ok((restored, unrestored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::SequentialIds;
    use tempfile::tempdir;

    fn open_walk_in(dir: &std::path::Path, products: &[Product]) -> TransactionEngine {
        let stores = Stores::open(dir).unwrap();
        stores.catalog().save(products).unwrap();
        TransactionEngine::open(
            stores,
            &TillConfig::with_data_dir(dir),
            Box::new(SequentialIds::default()),
            CustomerSelection::WalkIn,
        )
        .unwrap()
    }

    fn rice() -> Product {
        Product::new("Rice", Money::from_cents(4000), 100)
    }

    #[test]
    fn test_open_walk_in() {
        let dir = tempdir().unwrap();
        let engine = open_walk_in(dir.path(), &[rice()]);
        assert_eq!(engine.state(), TransactionState::Open);
        assert_eq!(engine.customer_name(), "Walk-in Customer");
        assert_eq!(engine.customer_id(), None);
        assert!(engine.lines().is_empty());
    }

    #[test]
    fn test_unknown_phone_without_name_is_not_found() {
        let dir = tempdir().unwrap();
        let stores = Stores::open(dir.path()).unwrap();
        let result = TransactionEngine::open(
            stores,
            &TillConfig::with_data_dir(dir.path()),
            Box::new(SequentialIds::default()),
            CustomerSelection::phone("0170"),
        );
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_add_rejections_keep_state_open() {
        let dir = tempdir().unwrap();
        let mut engine = open_walk_in(dir.path(), &[rice()]);

        assert!(matches!(engine.add_by_name("Tea", 1), Err(EngineError::NotFound { .. })));
        assert_eq!(
            engine.add_by_name("Rice", 0).unwrap_err().kind(),
            crate::ErrorKind::Validation
        );
        assert_eq!(
            engine.add_by_name("Rice", 101).unwrap_err().kind(),
            crate::ErrorKind::InsufficientStock
        );
        assert_eq!(engine.state(), TransactionState::Open);
        assert!(engine.lines().is_empty());
    }

    #[test]
    fn test_add_snapshots_pre_decrement_product() {
        let dir = tempdir().unwrap();
        let mut engine = open_walk_in(dir.path(), &[rice()]);

        let line = engine.add_by_name(" Rice ", 20).unwrap();
        assert_eq!(line.product.quantity, 100);
        assert_eq!(line.line_amount, Money::from_cents(80000));
        assert_eq!(engine.running_subtotal(), Money::from_cents(80000));
    }

    #[test]
    fn test_checkout_empty_cart() {
        let dir = tempdir().unwrap();
        let mut engine = open_walk_in(dir.path(), &[rice()]);
        assert!(matches!(engine.checkout(), Err(EngineError::EmptyCart)));
        assert_eq!(engine.state(), TransactionState::Open);
    }

    #[test]
    fn test_operations_checked_against_state() {
        let dir = tempdir().unwrap();
        let mut engine = open_walk_in(dir.path(), &[rice()]);

        assert!(matches!(
            engine.tender(TenderRequest::cash(Money::from_cents(100))),
            Err(EngineError::InvalidState { .. })
        ));
        assert!(matches!(engine.commit(), Err(EngineError::InvalidState { .. })));

        engine.add_by_name("Rice", 1).unwrap();
        engine.checkout().unwrap();
        assert!(matches!(engine.add_by_name("Rice", 1), Err(EngineError::InvalidState { .. })));
        assert!(matches!(engine.loyalty_offer(), Err(EngineError::InvalidState { .. })));
    }

    #[test]
    fn test_walk_in_gets_no_loyalty() {
        let dir = tempdir().unwrap();
        let mut engine = open_walk_in(dir.path(), &[rice()]);
        engine.add_by_name("Rice", 20).unwrap();

        assert_eq!(engine.loyalty_offer().unwrap(), None);
        assert!(matches!(
            engine.apply_loyalty_discount(),
            Err(EngineError::LoyaltyUnavailable { .. })
        ));
    }

    #[test]
    fn test_restore_stock_reports_missing_products() {
        let dir = tempdir().unwrap();
        let catalog = CatalogStore::new(dir.path().join("catalog.txt"));
        catalog.save(&[rice()]).unwrap();

        let (restored, unrestored) = restore_stock(
            &catalog,
            &[("Rice".to_string(), 5), ("Gone".to_string(), 2)],
        )
        .unwrap();

        assert_eq!(restored.len(), 1);
        assert_eq!(unrestored[0].name, "Gone");
        assert_eq!(catalog.load().unwrap()[0].quantity, 105);
    }
}
