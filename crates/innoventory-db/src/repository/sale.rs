//! # Sale Repository
//!
//! Database operations for sales (cash and credit).
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                │
//! │                                                                     │
//! │  1. RECORD (stock ledger)                                           │
//! │     └── insert_tx() + one OUT movement, one transaction             │
//! │         cash   → created settled (paid, balance 0)                  │
//! │         credit → created pending (paid 0, balance = total)          │
//! │                                                                     │
//! │  2. PAYMENTS (credit ledger)                                        │
//! │     └── update_credit_tx() → paid/balance/status/notes rewritten    │
//! │                                                                     │
//! │  3. OVERDUE SWEEP (credit ledger)                                   │
//! │     └── mark_overdue() → one idempotent UPDATE                      │
//! │                                                                     │
//! │  4. (OPTIONAL) EDIT / DELETE (stock ledger)                         │
//! │     └── movement reversal + row update/delete, one transaction      │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use innoventory_core::{PaymentStatus, Sale};

/// Columns selected for every Sale read; must stay in sync with the
/// `Sale` struct for FromRow mapping.
const SALE_COLUMNS: &str = "sale_id, product_id, product_name, quantity, unit_price_cents, \
     total_cents, sale_type, sold_by, sold_at, amount_paid_cents, balance_cents, \
     due_date, payment_status, payment_notes, customer_name, customer_contact, \
     settled_at, created_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sold_at DESC LIMIT ?1");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Lists credit sales with an open balance, soonest due first.
    pub async fn list_outstanding_credit(&self) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE sale_type = 'credit' AND balance_cents > 0 \
             ORDER BY due_date"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Marks open, past-due credit sales as overdue.
    ///
    /// One arithmetic UPDATE, so the sweep is atomic and idempotent:
    /// a second call with the same `as_of` matches zero rows. Paid sales
    /// can never match (`balance_cents > 0`).
    ///
    /// ## Returns
    /// Number of sales transitioned to overdue.
    pub async fn mark_overdue(&self, as_of: NaiveDate) -> DbResult<u64> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                payment_status = 'overdue',
                updated_at = ?2
            WHERE sale_type = 'credit'
              AND balance_cents > 0
              AND due_date < ?1
              AND payment_status != 'overdue'
            "#,
        )
        .bind(as_of)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Transaction-scoped operations (used by the ledgers)
    // =========================================================================

    /// Fetches a sale inside an open transaction.
    pub(crate) async fn fetch_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(sale)
    }

    /// Inserts a sale row inside an open transaction.
    pub(crate) async fn insert_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.sale_id, product = %sale.product_name, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                sale_id, product_id, product_name, quantity, unit_price_cents,
                total_cents, sale_type, sold_by, sold_at, amount_paid_cents,
                balance_cents, due_date, payment_status, payment_notes,
                customer_name, customer_contact, settled_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            "#,
        )
        .bind(&sale.sale_id)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(sale.quantity)
        .bind(sale.unit_price_cents)
        .bind(sale.total_cents)
        .bind(sale.sale_type)
        .bind(&sale.sold_by)
        .bind(sale.sold_at)
        .bind(sale.amount_paid_cents)
        .bind(sale.balance_cents)
        .bind(sale.due_date)
        .bind(sale.payment_status)
        .bind(&sale.payment_notes)
        .bind(&sale.customer_name)
        .bind(&sale.customer_contact)
        .bind(sale.settled_at)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Rewrites a sale's credit ledger state inside an open transaction.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn update_credit_tx(
        conn: &mut SqliteConnection,
        id: &str,
        amount_paid_cents: i64,
        balance_cents: i64,
        payment_status: PaymentStatus,
        payment_notes: &str,
        settled_at: Option<NaiveDate>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                amount_paid_cents = ?2,
                balance_cents = ?3,
                payment_status = ?4,
                payment_notes = ?5,
                settled_at = ?6,
                updated_at = ?7
            WHERE sale_id = ?1
            "#,
        )
        .bind(id)
        .bind(amount_paid_cents)
        .bind(balance_cents)
        .bind(payment_status)
        .bind(payment_notes)
        .bind(settled_at)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Rewrites a sale's quantity, total, paid amount, and balance inside
    /// an open transaction (sale edit; the stock ledger has already
    /// reconciled the movement).
    pub(crate) async fn update_quantity_tx(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
        total_cents: i64,
        amount_paid_cents: i64,
        balance_cents: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                quantity = ?2,
                total_cents = ?3,
                amount_paid_cents = ?4,
                balance_cents = ?5,
                updated_at = ?6
            WHERE sale_id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(total_cents)
        .bind(amount_paid_cents)
        .bind(balance_cents)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Deletes a sale row inside an open transaction.
    ///
    /// Movements referencing this sale keep their rows; the FK nulls
    /// their `sale_id`.
    pub(crate) async fn delete_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE sale_id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }
}

/// Helper to generate a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}
