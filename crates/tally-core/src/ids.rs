//! # Customer Id Generation
//!
//! Customer ids are produced by an injected [`IdGenerator`] so that tests can
//! use a deterministic sequence and a real till can use globally unique ids.

use uuid::Uuid;

/// Default prefix for customer ids.
pub const CUSTOMER_ID_PREFIX: &str = "CUST";

/// Default counter seed; the first sequential id is `CUST1001`.
pub const CUSTOMER_ID_SEED: u64 = 1000;

/// Produces new customer ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// `CUST1001`, `CUST1002`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    counter: u64,
}

impl SequentialIds {
    /// `seed` is the last id already used; the first generated id is `seed + 1`.
    pub fn new(prefix: impl Into<String>, seed: u64) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            counter: seed,
        }
    }

    /// Advances the counter past every existing id with this prefix.
    ///
    /// Ids with a different prefix or a non-numeric suffix are ignored.
    pub fn resume_from<'a, I>(mut self, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in existing {
            if let Some(n) = id
                .strip_prefix(self.prefix.as_str())
                .and_then(|suffix| suffix.parse::<u64>().ok())
            {
                self.counter = self.counter.max(n);
            }
        }
        self
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        SequentialIds::new(CUSTOMER_ID_PREFIX, CUSTOMER_ID_SEED)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.prefix, self.counter)
    }
}

/// `CUST-550e8400-e29b-41d4-a716-446655440000`
#[derive(Debug, Clone)]
pub struct UuidIds {
    prefix: String,
}

impl UuidIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        UuidIds {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidIds {
    fn default() -> Self {
        UuidIds::new(CUSTOMER_ID_PREFIX)
    }
}

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        format!("{}-{}", self.prefix, Uuid::new_v4())
    }
}
