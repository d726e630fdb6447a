//! # Seed Catalog Generator
//!
//! Populates a store directory with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data (default)
//! cargo run -p tally-store --bin seed
//!
//! # Seed another directory
//! cargo run -p tally-store --bin seed -- --dir /tmp/till
//! ```
//!
//! ## Generated Products
//! A small grocery range across a few categories. Every product gets:
//! - A unique 13-digit barcode: `890{category}{index}`
//! - A deterministic price and stock level
//! - A low-stock threshold on every third product

use std::env;

use tally_core::{Money, Product};
use tally_store::{StoreResult, Stores, UpsertOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Categories with product names and base prices in cents
const CATEGORIES: &[(&str, &[(&str, i64)])] = &[
    (
        "Grocery",
        &[
            ("Rice", 4000),
            ("Flour", 3500),
            ("Sugar", 6000),
            ("Salt", 2500),
            ("Lentils", 11000),
            ("Cooking Oil", 18500),
        ],
    ),
    (
        "Beverages",
        &[
            ("Tea", 9500),
            ("Coffee", 32000),
            ("Mineral Water", 2000),
            ("Orange Juice", 12000),
        ],
    ),
    (
        "Dairy",
        &[
            ("Milk", 9000),
            ("Butter", 24000),
            ("Yogurt", 7000),
            ("Cheese", 38000),
        ],
    ),
    (
        "Snacks",
        &[
            ("Biscuits", 3000),
            ("Chips", 2500),
            ("Chocolate", 12000),
        ],
    ),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut data_dir = String::from("./data");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Catalog Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --dir <PATH>   Store directory (default: ./data)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Catalog Generator");
    println!("===================================");
    println!("Store directory: {}", data_dir);
    println!();

    let stores = Stores::open(&data_dir)?;

    let existing = stores.catalog().load()?.len();
    if existing > 0 {
        println!("⚠ Catalog already has {} products", existing);
        println!("  Seeding updates matching names and adds the rest.");
    }

    let (inserted, updated) = seed(&stores)?;

    println!();
    println!("✓ {} products added, {} updated", inserted, updated);
    info!(inserted, updated, "Seed complete");

    Ok(())
}

fn seed(stores: &Stores) -> StoreResult<(usize, usize)> {
    let mut inserted = 0;
    let mut updated = 0;

    for (category_idx, (category, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, (name, price_cents)) in products.iter().enumerate() {
            let product = generate_product(category, name, *price_cents, category_idx, product_idx);
            match stores.catalog().upsert(product)? {
                UpsertOutcome::Inserted => inserted += 1,
                UpsertOutcome::Updated => updated += 1,
            }
        }
    }

    Ok((inserted, updated))
}

/// Builds one demo product.
fn generate_product(
    category: &str,
    name: &str,
    price_cents: i64,
    category_idx: usize,
    product_idx: usize,
) -> Product {
    let seed = category_idx * 10 + product_idx;
    let barcode = format!("890{:02}{:08}", category_idx, product_idx);
    let quantity = 20 + ((seed * 37) % 120) as i64;

    let mut product = Product::new(name, Money::from_cents(price_cents), quantity)
        .with_barcode(barcode)
        .with_category(category)
        .with_supplier(format!("{} Wholesale", category));

    if seed % 3 == 0 {
        product = product.with_low_stock_threshold(10);
    }

    product
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - Default: `info,tally=debug`
/// - Override with `RUST_LOG`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
