//! # Seed Data Generator
//!
//! Populates the database with demo products, stock, and sales for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./innoventory.db)
//! cargo run -p innoventory-db --bin seed
//!
//! # Specify database path
//! cargo run -p innoventory-db --bin seed -- --db ./data/innoventory.db
//! ```
//!
//! ## Generated Data
//! - A small grocery catalog with realistic prices
//! - An initial restock movement per product (so stock > 0 and the
//!   high-water mark is set)
//! - A handful of cash sales and one open credit sale

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use innoventory_core::{MovementDirection, NewSale, Product, SaleType};
use innoventory_db::repository::product::generate_product_id;
use innoventory_db::{Database, DbConfig};

/// Demo catalog: (name, price in cents, initial stock).
const CATALOG: &[(&str, i64, i64)] = &[
    ("Rice 5kg", 2500, 40),
    ("Cooking Oil 1L", 1850, 60),
    ("Sugar 2kg", 980, 80),
    ("Wheat Flour 10kg", 4200, 25),
    ("Tea 500g", 3100, 35),
    ("Powdered Milk 900g", 5400, 20),
    ("Lentils 1kg", 720, 90),
    ("Salt 800g", 150, 120),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./innoventory.db".to_string());

    info!(path = %db_path, "Seeding database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let products = db.products();
    let stock_ledger = db.stock_ledger();

    let mut ids = Vec::new();
    let now = chrono::Utc::now();

    for (name, price_cents, initial_stock) in CATALOG {
        let product = Product {
            product_id: generate_product_id(),
            name: name.to_string(),
            description: None,
            category_id: None,
            supplier_id: None,
            price_cents: *price_cents,
            stock_quantity: 0,
            low_threshold: None,
            medium_threshold: None,
            max_stock_recorded: 0,
            created_at: now,
            updated_at: now,
        };
        products.insert(&product).await?;

        // Stock arrives through the ledger so movements and the
        // high-water mark line up
        stock_ledger
            .post_movement(
                &product.product_id,
                MovementDirection::In,
                *initial_stock,
                Some("initial stock"),
            )
            .await?;

        ids.push(product.product_id);
    }
    info!(count = ids.len(), "Seeded products");

    // A few cash sales against the first products
    for (i, product_id) in ids.iter().take(3).enumerate() {
        stock_ledger
            .record_sale(NewSale {
                product_id: product_id.clone(),
                quantity: (i as i64) + 1,
                sale_type: SaleType::Cash,
                sold_by: Some("seed".to_string()),
                due_date: None,
                customer_name: None,
                customer_contact: None,
            })
            .await?;
    }

    // One open credit sale with the default term
    stock_ledger
        .record_sale(NewSale {
            product_id: ids[3].clone(),
            quantity: 2,
            sale_type: SaleType::Credit,
            sold_by: Some("seed".to_string()),
            due_date: None,
            customer_name: Some("Walk-in Customer".to_string()),
            customer_contact: Some("0300-0000000".to_string()),
        })
        .await?;

    info!("Seeded sales");

    let total = products.count().await?;
    info!(products = total, "Seed complete");

    db.close().await;
    Ok(())
}

/// Parses `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
