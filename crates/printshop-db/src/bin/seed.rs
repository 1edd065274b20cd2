//! # Seed Data Generator
//!
//! Populates the database with a print shop catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by PRINTSHOP_DB_PATH (default ./printshop.db)
//! cargo run -p printshop-db --bin seed
//!
//! # Specify database path
//! cargo run -p printshop-db --bin seed -- --db ./data/printshop.db
//! ```
//!
//! ## Generated Catalogue
//! - Sizes (A6 .. A2) and printing qualities, each with a multiplier
//! - Categories with subcategories
//! - Variant-priced products (cards, flyers, posters)
//! - Attribute-priced products (banners, mugs) with VAT, design and
//!   delivery charges, some with an option schema

use std::collections::BTreeMap;
use std::env;

use printshop_core::{
    AttributePricing, Money, NewProduct, PricingScheme, Principal, Product,
};
use printshop_db::{Database, ShopConfig};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (label, multiplier as (mantissa, scale))
const SIZES: &[(&str, i64, u32)] = &[
    ("A6", 60, 2),
    ("A5", 80, 2),
    ("A4", 100, 2),
    ("A3", 175, 2),
    ("A2", 300, 2),
];

const PRINTINGS: &[(&str, i64, u32)] = &[
    ("Matte", 100, 2),
    ("Gloss", 115, 2),
    ("Soft Touch", 140, 2),
];

/// (category, subcategories)
const CATEGORIES: &[(&str, &[&str])] = &[
    ("Stationery", &["Business Cards", "Letterheads", "Envelopes"]),
    ("Marketing", &["Flyers", "Posters", "Brochures"]),
    ("Large Format", &["Banners", "Roll-ups"]),
    ("Gifts", &["Mugs", "T-Shirts"]),
];

/// (subcategory, name, base price in cents, minimum, step)
const VARIANT_PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("Business Cards", "Classic Business Cards", 1240, 100, 50),
    ("Business Cards", "Square Business Cards", 1490, 100, 50),
    ("Flyers", "Flyers", 890, 50, 25),
    ("Posters", "Posters", 1900, 1, 1),
    ("Brochures", "Tri-fold Brochures", 2450, 25, 25),
    ("Letterheads", "Letterheads", 990, 100, 100),
];

/// (subcategory, name, base price in cents, vat %, design cents, delivery cents)
const ATTRIBUTE_PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Banners", "PVC Banner", 10000, 18, 500, 1000),
    ("Roll-ups", "Roll-up Stand", 14900, 18, 0, 1500),
    ("Mugs", "Photo Mug", 800, 18, 0, 450),
    ("T-Shirts", "Printed T-Shirt", 1200, 18, 250, 450),
    ("Envelopes", "C5 Envelopes", 50, 0, 0, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ShopConfig::from_env()?;
    init_tracing(&config.log_filter);

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Print Shop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $PRINTSHOP_DB_PATH or ./printshop.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("🌱 Print Shop Seed Data Generator");
    println!("=================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.to_db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let staff = Principal::staff("seed");
    let catalog = db.catalog();
    let start = std::time::Instant::now();

    for (name, mantissa, scale) in SIZES {
        catalog
            .create_size(&staff, name, Decimal::new(*mantissa, *scale))
            .await?;
    }
    for (quality, mantissa, scale) in PRINTINGS {
        catalog
            .create_printing(&staff, quality, Decimal::new(*mantissa, *scale))
            .await?;
    }
    println!("✓ {} sizes, {} printings", SIZES.len(), PRINTINGS.len());

    let mut subcategory_ids = BTreeMap::new();
    for (category, subcategories) in CATEGORIES {
        let category = catalog.create_category(&staff, category, "", "").await?;
        for name in subcategories.iter() {
            let sub = catalog
                .create_subcategory(&staff, &category.id, name, "", "")
                .await?;
            subcategory_ids.insert(*name, sub.id);
        }
    }
    println!(
        "✓ {} categories, {} subcategories",
        CATEGORIES.len(),
        subcategory_ids.len()
    );

    let mut created: Vec<Product> = Vec::new();

    for (subcategory, name, cents, minimum, step) in VARIANT_PRODUCTS {
        let mut input = NewProduct::new(*name, Money::from_cents(*cents));
        input.subcategory_id = subcategory_ids.get(subcategory).cloned();
        input.minimum_qty = *minimum;
        input.qty_step = *step;
        input.pricing = PricingScheme::Variant;
        created.push(db.products().create(&staff, &input).await?);
    }

    for (subcategory, name, cents, vat, design, delivery) in ATTRIBUTE_PRODUCTS {
        let mut input = NewProduct::new(*name, Money::from_cents(*cents));
        input.subcategory_id = subcategory_ids.get(subcategory).cloned();
        input.pricing = PricingScheme::Attribute(AttributePricing {
            vat_percent: Some(Decimal::from(*vat)),
            additional_design_charge: Some(Money::from_cents(*design)),
            delivery_charge: Some(Money::from_cents(*delivery)),
        });
        input.option_schema = option_schema_for(name);
        created.push(db.products().create(&staff, &input).await?);
    }

    for product in &created {
        let slug = product.name.to_lowercase().replace(' ', "-");
        db.products()
            .add_image(
                &staff,
                &product.id,
                &format!("products/{}.jpg", slug),
                &format!("products/thumbs/{}.jpg", slug),
            )
            .await?;
    }

    let elapsed = start.elapsed();
    info!(products = created.len(), elapsed_ms = elapsed.as_millis() as u64, "Seed complete");

    println!("✓ Generated {} products in {:?}", created.len(), elapsed);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn option_schema_for(name: &str) -> Option<BTreeMap<String, serde_json::Value>> {
    let mut schema = BTreeMap::new();
    match name {
        "Photo Mug" => {
            schema.insert("text".to_string(), serde_json::json!({}));
            schema.insert(
                "colour".to_string(),
                serde_json::json!({ "choices": ["white", "black"] }),
            );
        }
        "Printed T-Shirt" => {
            schema.insert(
                "size".to_string(),
                serde_json::json!({ "required": true, "choices": ["S", "M", "L", "XL"] }),
            );
            schema.insert("back_print".to_string(), serde_json::json!({}));
        }
        _ => return None,
    }
    Some(schema)
}
