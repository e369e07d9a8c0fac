//! # Stock Movement Repository
//!
//! Database operations for stock movement rows.
//!
//! Movement rows are the audit ledger behind `Product.stock_quantity`.
//! All mutations here are transaction-scoped: a movement row is only ever
//! written together with the matching stock adjustment, inside one
//! transaction owned by the stock ledger.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use innoventory_core::{MovementDirection, StockMovement};

/// Columns selected for every StockMovement read; must stay in sync with
/// the `StockMovement` struct for FromRow mapping.
const MOVEMENT_COLUMNS: &str =
    "movement_id, product_id, sale_id, direction, qty, remarks, moved_at";

/// Repository for stock movement database operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Gets a movement by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockMovement>> {
        let sql = format!("SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE movement_id = ?1");
        let movement = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(movement)
    }

    /// Lists movements for a product, most recent first.
    pub async fn list_for_product(
        &self,
        product_id: &str,
        limit: u32,
    ) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE product_id = ?1 ORDER BY moved_at DESC LIMIT ?2"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(product_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Net signed quantity over all live movements for a product.
    ///
    /// Diagnostic for the ledger invariant: this must always equal the
    /// product's `stock_quantity`.
    pub async fn net_quantity(&self, product_id: &str) -> DbResult<i64> {
        let net: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(CASE direction WHEN 'in' THEN qty ELSE -qty END)
            FROM stock_movements
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(net.unwrap_or(0))
    }

    // =========================================================================
    // Transaction-scoped operations (used by the stock ledger)
    // =========================================================================

    /// Fetches a movement inside an open transaction.
    pub(crate) async fn fetch_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<StockMovement>> {
        let sql = format!("SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE movement_id = ?1");
        let movement = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(movement)
    }

    /// Fetches the OUT movement a sale posted, inside an open transaction.
    pub(crate) async fn fetch_sale_out_tx(
        conn: &mut SqliteConnection,
        sale_id: &str,
    ) -> DbResult<Option<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE sale_id = ?1 AND direction = 'out'"
        );
        let movement = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(sale_id)
            .fetch_optional(conn)
            .await?;

        Ok(movement)
    }

    /// Inserts a movement row inside an open transaction.
    pub(crate) async fn insert_tx(
        conn: &mut SqliteConnection,
        movement: &StockMovement,
    ) -> DbResult<()> {
        debug!(
            id = %movement.movement_id,
            product_id = %movement.product_id,
            qty = %movement.qty,
            "Inserting stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                movement_id, product_id, sale_id, direction, qty, remarks, moved_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&movement.movement_id)
        .bind(&movement.product_id)
        .bind(&movement.sale_id)
        .bind(movement.direction)
        .bind(movement.qty)
        .bind(&movement.remarks)
        .bind(movement.moved_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Rewrites a movement's direction and quantity inside an open
    /// transaction (the ledger has already adjusted stock to match).
    pub(crate) async fn update_tx(
        conn: &mut SqliteConnection,
        id: &str,
        direction: MovementDirection,
        qty: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE stock_movements SET direction = ?2, qty = ?3 WHERE movement_id = ?1",
        )
        .bind(id)
        .bind(direction)
        .bind(qty)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockMovement", id));
        }

        Ok(())
    }

    /// Deletes a movement row inside an open transaction.
    pub(crate) async fn delete_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM stock_movements WHERE movement_id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockMovement", id));
        }

        Ok(())
    }
}

/// Helper to generate a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}
