//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD reads for the catalog
//! - Low-stock listing for the dashboard
//! - Transaction-scoped stock adjustment used by the stock ledger
//!
//! ## The Stock Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read-modify-write in application memory                  │
//! │     let p = get(id); p.stock = p.stock - 3; save(p)                 │
//! │     (two racing sales both read 10, both write 7 — lost update)     │
//! │                                                                     │
//! │  ✅ CORRECT: arithmetic update relative to the stored value         │
//! │     UPDATE products SET stock_quantity = stock_quantity - 3         │
//! │     WHERE product_id = ? AND stock_quantity - 3 >= 0                │
//! │                                                                     │
//! │  The WHERE guard makes "would go negative" an affected-rows = 0     │
//! │  outcome the ledger turns into InsufficientStock, atomically.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use innoventory_core::{Product, StockThresholds};

/// Columns selected for every Product read; must stay in sync with the
/// `Product` struct for FromRow mapping.
const PRODUCT_COLUMNS: &str = "product_id, name, description, category_id, supplier_id, \
     price_cents, stock_quantity, low_threshold, medium_threshold, \
     max_stock_recorded, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("uuid-here").await?;
/// let low = repo.find_low_stock(StockThresholds::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id generated beforehand, see
    ///   [`generate_product_id`])
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.product_id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, name, description, category_id, supplier_id,
                price_cents, stock_quantity, low_threshold, medium_threshold,
                max_stock_recorded, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.product_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.low_threshold)
        .bind(product.medium_threshold)
        .bind(product.max_stock_recorded)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product's catalog details.
    ///
    /// `stock_quantity` and `max_stock_recorded` are deliberately NOT
    /// touched here; only the stock ledger mutates them.
    pub async fn update_details(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.product_id, "Updating product details");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                category_id = ?4,
                supplier_id = ?5,
                price_cents = ?6,
                low_threshold = ?7,
                medium_threshold = ?8,
                updated_at = ?9
            WHERE product_id = ?1
            "#,
        )
        .bind(&product.product_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.price_cents)
        .bind(product.low_threshold)
        .bind(product.medium_threshold)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.product_id));
        }

        Ok(())
    }

    /// Lists products currently classified as low stock.
    ///
    /// Mirrors `innoventory_core::stock::classify` exactly: the explicit
    /// per-product thresholds apply only when BOTH are set; otherwise the
    /// global low percentage of the high-water mark decides, and
    /// never-stocked products count as low.
    pub async fn find_low_stock(&self, thresholds: StockThresholds) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE (low_threshold IS NOT NULL AND medium_threshold IS NOT NULL
                   AND stock_quantity <= low_threshold)
               OR ((low_threshold IS NULL OR medium_threshold IS NULL)
                   AND (max_stock_recorded <= 0
                        OR stock_quantity * 100 <= max_stock_recorded * ?1))
            ORDER BY name
            "#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(thresholds.low_percentage as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transaction-scoped operations (used by the ledgers)
    // =========================================================================

    /// Fetches a product inside an open transaction.
    pub(crate) async fn fetch_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Applies a signed stock delta inside an open transaction.
    ///
    /// The arithmetic runs against the stored value with a non-negative
    /// guard in the WHERE clause; the high-water mark is raised in the
    /// same statement.
    ///
    /// ## Returns
    /// `true` if a row was updated, `false` if the product is missing or
    /// the delta would drive stock negative (the caller distinguishes the
    /// two with a follow-up read).
    pub(crate) async fn adjust_stock_tx(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
    ) -> DbResult<bool> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                stock_quantity = stock_quantity + ?2,
                max_stock_recorded = MAX(max_stock_recorded, stock_quantity + ?2),
                updated_at = ?3
            WHERE product_id = ?1 AND stock_quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use innoventory_core::stock::{classify, StockStatus};

    fn product(name: &str, qty: i64, low: Option<i64>, medium: Option<i64>, max: i64) -> Product {
        let now = Utc::now();
        Product {
            product_id: generate_product_id(),
            name: name.to_string(),
            description: None,
            category_id: None,
            supplier_id: None,
            price_cents: 1000,
            stock_quantity: qty,
            low_threshold: low,
            medium_threshold: medium,
            max_stock_recorded: max,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_low_stock_agrees_with_classify() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let thresholds = StockThresholds::default();

        // Covers every classify branch, including the half-set threshold
        // pair which must fall back to the percentage rule (Medium here,
        // so it must NOT be listed)
        let candidates = vec![
            product("explicit low", 30, Some(50), Some(80), 100),
            product("half threshold pair", 30, Some(50), None, 100),
            product("percentage low", 10, None, None, 100),
            product("percentage high", 60, None, None, 100),
            product("never stocked", 0, None, None, 0),
        ];
        for p in &candidates {
            repo.insert(p).await.unwrap();
        }

        let listed: Vec<String> = repo
            .find_low_stock(thresholds)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        for p in &candidates {
            let is_low = classify(p, thresholds) == StockStatus::Low;
            assert_eq!(
                listed.contains(&p.name),
                is_low,
                "{}: classify low = {}",
                p.name,
                is_low
            );
        }
    }
}
