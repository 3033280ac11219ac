//! # Seed Data Generator
//!
//! Populates a store with demo inventory and prints a restock sheet as frame
//! texts, ready to be turned into printed codes or piped into the scanner.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockscan_dev.db and print the restock sheet
//! cargo run -p stockscan-db --bin seed
//!
//! # Only print frame texts, 4 items per frame
//! cargo run -p stockscan-db --bin seed -- --codes-only --per-frame 4 > sheet.txt
//! cargo run -p stockscan-scanner -- --db ./stockscan_dev.db --input sheet.txt
//! ```
//!
//! ## Generated Inventory
//! A handful of categories with a few products each. Stock cycles through
//! 0-40 so every stock level band is represented.

use std::path::PathBuf;

use clap::Parser;
use stockscan_core::frame::encode_frames;
use stockscan_core::{RawItem, DEFAULT_ITEMS_PER_FRAME};
use stockscan_db::{Database, DbConfig};

/// Demo categories and their products.
const CATALOG: &[(&str, &[&str])] = &[
    ("Grains", &["Rice", "Beans", "Lentils", "Oats", "Quinoa"]),
    ("Pantry", &["Olive Oil", "Salt", "Sugar", "Flour", "Vinegar"]),
    ("Dairy", &["Whole Milk", "Butter", "Cheddar", "Yogurt"]),
    ("Beverages", &["Coffee", "Green Tea", "Orange Juice", "Sparkling Water"]),
    ("Cleaning", &["Dish Soap", "Bleach", "Sponges"]),
];

/// Items on the restock sheet that the store doesn't carry yet.
const NEW_ITEMS: &[(&str, &str, i64)] = &[
    ("Basmati Rice", "Grains", 30),
    ("Paper Towels", "Household", 18),
    ("Trash Bags", "Household", 6),
];

/// Stockscan seed data generator.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate a demo store and print a restock sheet")]
struct Options {
    /// Database file path
    #[arg(short = 'd', long = "db", value_name = "PATH", default_value = "./stockscan_dev.db")]
    db_path: PathBuf,

    /// Items per printed code
    #[arg(short = 'n', long, value_name = "N", default_value_t = DEFAULT_ITEMS_PER_FRAME)]
    per_frame: usize,

    /// Print only the frame texts
    #[arg(long)]
    codes_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = Options::parse();
    // Progress goes to stderr so --codes-only output can be redirected.
    let say = |line: String| {
        if !options.codes_only {
            eprintln!("{line}");
        }
    };

    say("🌱 Stockscan Seed Data Generator".to_string());
    say("================================".to_string());
    say(format!("Database: {}", options.db_path.display()));

    let db = Database::new(DbConfig::new(options.db_path.clone())).await?;
    say("✓ Connected to database, migrations applied".to_string());

    let existing = db.products().count().await?;
    if existing > 0 {
        say(format!("⚠ Database already has {existing} products, skipping inserts"));
    } else {
        let mut generated = 0;
        for (seed, (category_name, products)) in CATALOG.iter().enumerate() {
            let category = match db.categories().find_by_name(category_name).await? {
                Some(existing) => existing,
                None => db.categories().insert(category_name).await?,
            };
            for (offset, product_name) in products.iter().enumerate() {
                let stock = ((seed * 7 + offset * 9) % 41) as i64;
                if let Err(e) = db
                    .products()
                    .insert(product_name, Some(&category.id), stock)
                    .await
                {
                    eprintln!("Failed to insert {product_name}: {e}");
                    continue;
                }
                generated += 1;
            }
        }
        let categories = db.categories().count().await?;
        say(format!("✓ Generated {generated} products in {categories} categories"));
    }

    // Restock sheet: every known product topped up, plus a few new ones.
    let snapshot = db.snapshot().await?;
    let mut sheet: Vec<RawItem> = snapshot
        .products
        .iter()
        .map(|p| {
            RawItem::new(
                p.name.clone(),
                p.category_name.clone().unwrap_or_else(|| "Uncategorized".to_string()),
                p.stock + 12,
            )
        })
        .collect();
    sheet.extend(
        NEW_ITEMS
            .iter()
            .map(|(name, category, qty)| RawItem::new(*name, *category, *qty)),
    );

    let codes = encode_frames(&sheet, options.per_frame)?;
    say(format!(
        "✓ Restock sheet: {} items in {} code(s)",
        sheet.len(),
        codes.len()
    ));
    say(String::new());

    for code in codes {
        println!("{code}");
    }

    Ok(())
}
