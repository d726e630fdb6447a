//! # Sales Ledger
//!
//! Append-only log of committed sales backed by `sales.txt`.
//!
//! ## Record Format
//! ```text
//! # Sales History - Format: DateTime|Customer|Amount|Items
//! 2026-10-17 14:03:55|Walk-in Customer|790.00|Rice(20)
//! 2026-10-17 14:10:02|Ayesha|123.50|Oil(1),Sugar(3)
//! ```
//!
//! Prior entries are never rewritten. Reads are for reporting and tests.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tally_core::{Money, SaleLine, SaleRecord, SALE_TIMESTAMP_FORMAT};
use tracing::{debug, info};

use crate::codec::{parse_records, read_or_create};
use crate::error::{StoreError, StoreResult};

/// Header written when the ledger file is first created.
pub const SALES_HEADER: &str = "# Sales History - Format: DateTime|Customer|Amount|Items";

/// A sale as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// 1-based position in the ledger.
    pub sequence: usize,
    pub record: SaleRecord,
}

/// The sales history file.
#[derive(Debug, Clone)]
pub struct SalesLedger {
    path: PathBuf,
}

impl SalesLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SalesLedger { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one sale, writing the header first if the file is new or empty.
    pub fn append(&self, record: &SaleRecord) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let is_empty = file
            .metadata()
            .map_err(|e| StoreError::io(&self.path, e))?
            .len()
            == 0;

        let mut out = String::new();
        if is_empty {
            out.push_str(SALES_HEADER);
            out.push('\n');
        }
        out.push_str(&format_sale(record));
        out.push('\n');

        file.write_all(out.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::io(&self.path, e))?;

        info!(
            customer = %record.customer,
            net_total = %record.net_total,
            lines = record.lines.len(),
            "Sale appended to ledger"
        );
        Ok(())
    }

    /// Reads every well-formed sale in file order.
    pub fn load_all(&self) -> StoreResult<Vec<LedgerEntry>> {
        let text = read_or_create(&self.path, SALES_HEADER)?;
        let (records, _) = parse_records(&self.path, &text, parse_sale);

        debug!(path = %self.path.display(), count = records.len(), "Sales loaded");
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, record)| LedgerEntry {
                sequence: i + 1,
                record,
            })
            .collect())
    }
}

fn format_sale(record: &SaleRecord) -> String {
    let items = record
        .lines
        .iter()
        .map(SaleLine::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}|{}|{}|{}",
        record.timestamp.format(SALE_TIMESTAMP_FORMAT),
        record.customer,
        record.net_total,
        items
    )
}

fn parse_sale(fields: &[&str]) -> Option<SaleRecord> {
    if fields.len() != 4 {
        return None;
    }

    let timestamp = NaiveDateTime::parse_from_str(fields[0].trim(), SALE_TIMESTAMP_FORMAT).ok()?;
    let net_total: Money = fields[2].parse().ok()?;

    Some(SaleRecord {
        timestamp,
        customer: fields[1].to_string(),
        net_total,
        lines: parse_items(fields[3])?,
    })
}

/// Parses `Name(qty),Name(qty)`. Names may contain commas or parentheses;
/// only a trailing `(digits)` before a `,` separates entries.
fn parse_items(items: &str) -> Option<Vec<SaleLine>> {
    let items = items.trim();
    let mut lines = Vec::new();
    if items.is_empty() {
        return Some(lines);
    }

    let mut rest = items;
    while !rest.is_empty() {
        let entry_end = find_entry_end(rest)?;
        let entry = &rest[..entry_end];
        let (name, qty) = entry.strip_suffix(')')?.rsplit_once('(')?;
        lines.push(SaleLine {
            name: name.to_string(),
            quantity: qty.parse().ok()?,
        });

        rest = &rest[entry_end..];
        rest = match rest.strip_prefix(',') {
            Some(r) if !r.is_empty() => r,
            Some(_) => return None,
            None => rest,
        };
    }

    Some(lines)
}

/// Byte length of the first `Name(digits)` entry in `s`.
fn find_entry_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut search_from = 0;

    while let Some(rel) = s[search_from..].find(')') {
        let close = search_from + rel;
        let end = close + 1;
        let at_boundary = end == bytes.len() || bytes[end] == b',';
        if at_boundary {
            if let Some(open) = s[..close].rfind('(') {
                let digits = &s[open + 1..close];
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Some(end);
                }
            }
        }
        search_from = end;
    }

    None
}
