//! # Credit Ledger
//!
//! Payment and settlement mutations for credit sales.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  record_sale (stock ledger)                                         │
//! │       │  credit → pending, balance = total                          │
//! │       ▼                                                             │
//! │  record_payment ──► partial ──► ... ──► paid (settled_at stamped)   │
//! │       │                                                             │
//! │  mark_fully_paid ──► pays the remaining balance in one step         │
//! │       │                                                             │
//! │  recompute_overdue_statuses ──► sweeps past-due open sales          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status is never trusted from storage: every payment re-derives it from
//! (total, paid, due date, today), so a partial payment on an overdue sale
//! stays overdue and a full payment always lands on paid.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::ledger::LedgerResult;
use crate::repository::sale::SaleRepository;
use innoventory_core::credit::{append_note, apply_payment, derive_status, payment_note_line};
use innoventory_core::{CoreError, Money, Sale, SaleType};

/// Transactional ledger for credit payments and settlement.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.credit_ledger();
///
/// let sale = ledger
///     .record_payment(&sale_id, Money::from_cents(6000), "first installment")
///     .await?;
/// let swept = ledger.recompute_overdue_statuses(today).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CreditLedger {
    pool: SqlitePool,
}

impl CreditLedger {
    /// Creates a new CreditLedger.
    pub fn new(pool: SqlitePool) -> Self {
        CreditLedger { pool }
    }

    /// Records a partial or full payment against a credit sale.
    ///
    /// Appends a dated line to the sale's payment notes, re-derives the
    /// payment status, and stamps `settled_at` when the balance reaches
    /// zero. One transaction.
    ///
    /// ## Errors
    /// - [`CoreError::SaleNotFound`] - unknown sale
    /// - [`CoreError::NotACreditSale`] - cash sales have no balance
    /// - [`CoreError::AlreadySettled`] - balance is already zero
    /// - [`CoreError::InvalidPayment`] - non-positive or over-balance amount
    #[instrument(skip(self, note), fields(sale_id = %sale_id, amount = %amount))]
    pub async fn record_payment(
        &self,
        sale_id: &str,
        amount: Money,
        note: &str,
    ) -> LedgerResult<Sale> {
        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let sale = SaleRepository::fetch_tx(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        let sale = Self::apply_to(&mut tx, sale, amount, note).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(sale_id = %sale_id, balance = %sale.remaining_balance(), "Recorded payment");
        Ok(sale)
    }

    /// Settles a credit sale by paying its entire remaining balance.
    ///
    /// Shorthand for [`record_payment`](Self::record_payment) with the
    /// exact balance; the same guards apply.
    #[instrument(skip(self, note), fields(sale_id = %sale_id))]
    pub async fn mark_fully_paid(&self, sale_id: &str, note: &str) -> LedgerResult<Sale> {
        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let sale = SaleRepository::fetch_tx(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        let balance = sale.remaining_balance();
        let sale = Self::apply_to(&mut tx, sale, balance, note).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(sale_id = %sale_id, "Marked sale fully paid");
        Ok(sale)
    }

    /// Sweeps open credit sales past their due date into overdue.
    ///
    /// A single idempotent UPDATE: re-running with the same date affects
    /// zero rows, and settled sales never match. Returns the number of
    /// sales transitioned.
    #[instrument(skip(self), fields(as_of = %as_of))]
    pub async fn recompute_overdue_statuses(&self, as_of: NaiveDate) -> LedgerResult<u64> {
        let swept = SaleRepository::new(self.pool.clone())
            .mark_overdue(as_of)
            .await?;

        if swept > 0 {
            info!(count = swept, "Marked credit sales overdue");
        }
        Ok(swept)
    }

    /// Shared payment path: validates, re-derives, persists.
    async fn apply_to(
        tx: &mut sqlx::SqliteConnection,
        sale: Sale,
        amount: Money,
        note: &str,
    ) -> LedgerResult<Sale> {
        if sale.sale_type != SaleType::Credit {
            return Err(CoreError::NotACreditSale {
                sale_id: sale.sale_id.clone(),
            }
            .into());
        }
        if sale.is_settled() {
            return Err(CoreError::AlreadySettled {
                sale_id: sale.sale_id.clone(),
            }
            .into());
        }

        let today = Utc::now().date_naive();
        let total = sale.total();

        let amount_paid = apply_payment(total, sale.amount_paid(), amount)?;
        let balance = total.saturating_sub(amount_paid);
        // Credit sales always carry a due date; tolerate a missing one by
        // treating the sale as not yet due
        let status = derive_status(total, amount_paid, sale.due_date.unwrap_or(today), today);

        let notes = append_note(
            &sale.payment_notes,
            &payment_note_line(today, amount, note),
        );
        let settled_at = if balance.is_zero() {
            Some(today)
        } else {
            sale.settled_at
        };

        SaleRepository::update_credit_tx(
            tx,
            &sale.sale_id,
            amount_paid.cents(),
            balance.cents(),
            status,
            &notes,
            settled_at,
        )
        .await?;

        Ok(Sale {
            amount_paid_cents: amount_paid.cents(),
            balance_cents: balance.cents(),
            payment_status: status,
            payment_notes: notes,
            settled_at,
            ..sale
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::ledger::LedgerError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use innoventory_core::{NewSale, PaymentStatus, Product};

    /// In-memory database with one product (50.00 each, 10 on hand) and
    /// one credit sale of 2 units (total 100.00) due on the given date.
    async fn setup_credit_sale(due_in_days: i64) -> (Database, Sale) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let product = Product {
            product_id: generate_product_id(),
            name: "Powdered Milk 900g".to_string(),
            description: None,
            category_id: None,
            supplier_id: None,
            price_cents: 5000,
            stock_quantity: 0,
            low_threshold: None,
            medium_threshold: None,
            max_stock_recorded: 0,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        db.stock_ledger()
            .post_movement(
                &product.product_id,
                innoventory_core::MovementDirection::In,
                10,
                None,
            )
            .await
            .unwrap();

        let due = now.date_naive() + Duration::days(due_in_days);
        let sale = db
            .stock_ledger()
            .record_sale(NewSale {
                product_id: product.product_id.clone(),
                quantity: 2,
                sale_type: SaleType::Credit,
                sold_by: None,
                due_date: Some(due),
                customer_name: Some("Ahmed".to_string()),
                customer_contact: None,
            })
            .await
            .unwrap();

        (db, sale)
    }

    #[tokio::test]
    async fn test_partial_payments_settle_exactly() {
        let (db, sale) = setup_credit_sale(30).await;
        let ledger = db.credit_ledger();

        let sale1 = ledger
            .record_payment(&sale.sale_id, Money::from_cents(6000), "first installment")
            .await
            .unwrap();
        assert_eq!(sale1.payment_status, PaymentStatus::Partial);
        assert_eq!(sale1.balance_cents, 4000);
        assert!(sale1.settled_at.is_none());

        let sale2 = ledger
            .record_payment(&sale.sale_id, Money::from_cents(4000), "rest")
            .await
            .unwrap();
        assert_eq!(sale2.payment_status, PaymentStatus::Paid);
        assert_eq!(sale2.balance_cents, 0);
        assert!(sale2.settled_at.is_some());

        // Both payments logged, in order
        let lines: Vec<&str> = sale2.payment_notes.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("payment 60.00: first installment"));
        assert!(lines[1].contains("payment 40.00: rest"));
    }

    #[tokio::test]
    async fn test_overpayment_is_rejected() {
        let (db, sale) = setup_credit_sale(30).await;

        let err = db
            .credit_ledger()
            .record_payment(&sale.sale_id, Money::from_cents(12000), "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidPayment { .. })
        ));

        let stored = db.sales().get_by_id(&sale.sale_id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid_cents, 0);
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_payment_on_cash_sale_is_rejected() {
        let (db, credit) = setup_credit_sale(30).await;
        let cash = db
            .stock_ledger()
            .record_sale(NewSale {
                product_id: credit.product_id.clone().unwrap(),
                quantity: 1,
                sale_type: SaleType::Cash,
                sold_by: None,
                due_date: None,
                customer_name: None,
                customer_contact: None,
            })
            .await
            .unwrap();

        let err = db
            .credit_ledger()
            .record_payment(&cash.sale_id, Money::from_cents(100), "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::NotACreditSale { .. })
        ));
    }

    #[tokio::test]
    async fn test_mark_fully_paid_settles_once() {
        let (db, sale) = setup_credit_sale(30).await;
        let ledger = db.credit_ledger();

        ledger
            .record_payment(&sale.sale_id, Money::from_cents(2500), "")
            .await
            .unwrap();
        let settled = ledger.mark_fully_paid(&sale.sale_id, "cleared").await.unwrap();
        assert_eq!(settled.payment_status, PaymentStatus::Paid);
        assert_eq!(settled.balance_cents, 0);
        assert_eq!(settled.amount_paid_cents, 10000);

        let err = ledger.mark_fully_paid(&sale.sale_id, "").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::AlreadySettled { .. })
        ));
    }

    #[tokio::test]
    async fn test_payment_on_settled_sale_is_already_settled() {
        let (db, sale) = setup_credit_sale(30).await;
        let ledger = db.credit_ledger();

        ledger
            .record_payment(&sale.sale_id, Money::from_cents(10000), "in full")
            .await
            .unwrap();

        // Settled state wins over the over-balance check
        let err = ledger
            .record_payment(&sale.sale_id, Money::from_cents(100), "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::AlreadySettled { .. })
        ));
    }

    #[tokio::test]
    async fn test_overdue_sweep_is_idempotent() {
        let (db, sale) = setup_credit_sale(-5).await;
        let ledger = db.credit_ledger();
        let today = Utc::now().date_naive();

        assert_eq!(ledger.recompute_overdue_statuses(today).await.unwrap(), 1);
        let stored = db.sales().get_by_id(&sale.sale_id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Overdue);

        // Second run is a no-op
        assert_eq!(ledger.recompute_overdue_statuses(today).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_partial_payment_keeps_overdue_until_settled() {
        let (db, sale) = setup_credit_sale(-5).await;
        let ledger = db.credit_ledger();
        let today = Utc::now().date_naive();

        ledger.recompute_overdue_statuses(today).await.unwrap();

        // A partial payment re-derives, and the due date is still past
        let partial = ledger
            .record_payment(&sale.sale_id, Money::from_cents(6000), "")
            .await
            .unwrap();
        assert_eq!(partial.payment_status, PaymentStatus::Overdue);

        // Full payment always lands on paid
        let paid = ledger
            .record_payment(&sale.sale_id, Money::from_cents(4000), "")
            .await
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        // Settled sales never re-enter the sweep
        assert_eq!(ledger.recompute_overdue_statuses(today).await.unwrap(), 0);
    }
}
