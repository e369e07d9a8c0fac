//! # Stock Ledger
//!
//! Every mutation that touches `Product.stock_quantity` lives here, and
//! each one is a single transaction: the stock adjustment, the movement
//! row, and (for sales) the sale row commit together or not at all.
//!
//! ## The Invariant
//! ```text
//! stock_quantity == Σ(IN movements) − Σ(OUT movements), at all times
//! ```
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  post_movement       insert movement + adjust stock                 │
//! │  edit_movement       undo old effect, redo new, rewrite row         │
//! │  delete_movement     undo effect, delete row                        │
//! │                                                                     │
//! │  record_sale         insert sale + OUT movement + adjust stock      │
//! │  edit_sale_quantity  undo OUT, redo new qty, retotal the sale       │
//! │  delete_sale         compensating IN movement + delete sale row     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Undo-then-redo is the load-bearing rule: edits never apply a blind
//! delta, they reverse the old effect and re-apply the new one, so the
//! insufficient-stock check always runs against the level the product
//! would have had without the movement.

use chrono::{Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument};

use crate::ledger::LedgerResult;
use crate::repository::movement::{generate_movement_id, MovementRepository};
use crate::repository::product::ProductRepository;
use crate::repository::sale::{generate_sale_id, SaleRepository};
use innoventory_core::validation::{validate_quantity, validate_remarks};
use innoventory_core::{
    stock, CoreError, Money, MovementDirection, NewSale, PaymentStatus, Sale, SaleType,
    StockMovement, DEFAULT_CREDIT_TERM_DAYS,
};

/// Remarks stamped on the OUT movement a sale posts.
const SALE_REMARKS: &str = "SOLD";

/// Remarks stamped on the compensating IN movement a sale deletion posts.
const SALE_REVERSAL_REMARKS: &str = "SALE REVERSED";

/// Transactional ledger for all stock-affecting mutations.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.stock_ledger();
///
/// let m = ledger
///     .post_movement(&product_id, MovementDirection::In, 50, Some("restock"))
///     .await?;
/// let sale = ledger.record_sale(new_sale).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Posts a stock movement and applies its effect to the product.
    ///
    /// ## Errors
    /// - [`CoreError::ProductNotFound`] - unknown product
    /// - [`CoreError::InsufficientStock`] - OUT larger than on-hand
    /// - [`CoreError::Validation`] - non-positive/oversized qty, long remarks
    #[instrument(skip(self), fields(product_id = %product_id, qty = %qty))]
    pub async fn post_movement(
        &self,
        product_id: &str,
        direction: MovementDirection,
        qty: i64,
        remarks: Option<&str>,
    ) -> LedgerResult<StockMovement> {
        validate_quantity(qty).map_err(CoreError::from)?;
        if let Some(remarks) = remarks {
            validate_remarks(remarks).map_err(CoreError::from)?;
        }

        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let product = ProductRepository::fetch_tx(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        stock::apply(direction, product.stock_quantity, qty)
            .map_err(|e| named(e, &product.name))?;

        apply_stock_delta(&mut tx, product_id, direction.signed(qty)).await?;

        let movement = StockMovement {
            movement_id: generate_movement_id(),
            product_id: product_id.to_string(),
            sale_id: None,
            direction,
            qty,
            remarks: remarks.map(|r| r.to_string()),
            moved_at: Utc::now(),
        };
        MovementRepository::insert_tx(&mut tx, &movement).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(movement_id = %movement.movement_id, "Posted stock movement");
        Ok(movement)
    }

    /// Edits a movement's direction and/or quantity.
    ///
    /// The old effect is reversed first, then the new effect is applied;
    /// the net delta hits the product in one arithmetic update. If the
    /// redo would drive stock negative, nothing changes.
    #[instrument(skip(self), fields(movement_id = %movement_id))]
    pub async fn edit_movement(
        &self,
        movement_id: &str,
        direction: MovementDirection,
        qty: i64,
    ) -> LedgerResult<StockMovement> {
        validate_quantity(qty).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let movement = MovementRepository::fetch_tx(&mut tx, movement_id)
            .await?
            .ok_or_else(|| CoreError::MovementNotFound(movement_id.to_string()))?;

        let product = ProductRepository::fetch_tx(&mut tx, &movement.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(movement.product_id.clone()))?;

        // Undo, then redo against the undone level
        let undone = stock::reverse(movement.direction, product.stock_quantity, movement.qty);
        let next = stock::apply(direction, undone, qty).map_err(|e| named(e, &product.name))?;

        let delta = next - product.stock_quantity;
        if delta != 0 {
            apply_stock_delta(&mut tx, &movement.product_id, delta).await?;
        }
        MovementRepository::update_tx(&mut tx, movement_id, direction, qty).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(movement_id = %movement_id, "Edited stock movement");
        Ok(StockMovement {
            direction,
            qty,
            ..movement
        })
    }

    /// Deletes a movement and reverses its effect on the product.
    ///
    /// Deleting an IN movement subtracts the quantity back out; if the
    /// stock has since been sold down below that quantity, the delete is
    /// rejected with [`CoreError::InsufficientStock`].
    #[instrument(skip(self), fields(movement_id = %movement_id))]
    pub async fn delete_movement(&self, movement_id: &str) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let movement = MovementRepository::fetch_tx(&mut tx, movement_id)
            .await?
            .ok_or_else(|| CoreError::MovementNotFound(movement_id.to_string()))?;

        let product = ProductRepository::fetch_tx(&mut tx, &movement.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(movement.product_id.clone()))?;

        // Reversal is apply() in the opposite direction, so reversing an
        // IN gets the same negative-stock check as posting an OUT
        stock::apply(
            movement.direction.inverted(),
            product.stock_quantity,
            movement.qty,
        )
        .map_err(|e| named(e, &product.name))?;

        apply_stock_delta(
            &mut tx,
            &movement.product_id,
            movement.direction.inverted().signed(movement.qty),
        )
        .await?;
        MovementRepository::delete_tx(&mut tx, movement_id).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(movement_id = %movement_id, "Deleted stock movement");
        Ok(())
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Records a sale: snapshots the product, posts the OUT movement, and
    /// initializes the payment fields, all in one transaction.
    ///
    /// Cash sales are created settled (paid in full, balance zero).
    /// Credit sales are created pending with the full total outstanding;
    /// the due date defaults to [`DEFAULT_CREDIT_TERM_DAYS`] from the sale
    /// date when not supplied.
    #[instrument(skip(self, new_sale), fields(product_id = %new_sale.product_id, qty = %new_sale.quantity))]
    pub async fn record_sale(&self, new_sale: NewSale) -> LedgerResult<Sale> {
        validate_quantity(new_sale.quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let product = ProductRepository::fetch_tx(&mut tx, &new_sale.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(new_sale.product_id.clone()))?;

        stock::apply(MovementDirection::Out, product.stock_quantity, new_sale.quantity)
            .map_err(|e| named(e, &product.name))?;

        apply_stock_delta(&mut tx, &new_sale.product_id, -new_sale.quantity).await?;

        let now = Utc::now();
        let today = now.date_naive();
        let total = product.price().multiply_quantity(new_sale.quantity);

        let sale = match new_sale.sale_type {
            SaleType::Cash => Sale {
                sale_id: generate_sale_id(),
                product_id: Some(product.product_id.clone()),
                product_name: product.name.clone(),
                quantity: new_sale.quantity,
                unit_price_cents: product.price_cents,
                total_cents: total.cents(),
                sale_type: SaleType::Cash,
                sold_by: new_sale.sold_by,
                sold_at: now,
                amount_paid_cents: total.cents(),
                balance_cents: 0,
                due_date: None,
                payment_status: PaymentStatus::Paid,
                payment_notes: String::new(),
                customer_name: new_sale.customer_name,
                customer_contact: new_sale.customer_contact,
                settled_at: Some(today),
                created_at: now,
                updated_at: now,
            },
            SaleType::Credit => {
                let due_date = new_sale
                    .due_date
                    .unwrap_or(today + Duration::days(DEFAULT_CREDIT_TERM_DAYS));
                Sale {
                    sale_id: generate_sale_id(),
                    product_id: Some(product.product_id.clone()),
                    product_name: product.name.clone(),
                    quantity: new_sale.quantity,
                    unit_price_cents: product.price_cents,
                    total_cents: total.cents(),
                    sale_type: SaleType::Credit,
                    sold_by: new_sale.sold_by,
                    sold_at: now,
                    amount_paid_cents: 0,
                    balance_cents: total.cents(),
                    due_date: Some(due_date),
                    payment_status: PaymentStatus::Pending,
                    payment_notes: String::new(),
                    customer_name: new_sale.customer_name,
                    customer_contact: new_sale.customer_contact,
                    settled_at: None,
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        SaleRepository::insert_tx(&mut tx, &sale).await?;

        let movement = StockMovement {
            movement_id: generate_movement_id(),
            product_id: product.product_id.clone(),
            sale_id: Some(sale.sale_id.clone()),
            direction: MovementDirection::Out,
            qty: new_sale.quantity,
            remarks: Some(SALE_REMARKS.to_string()),
            moved_at: now,
        };
        MovementRepository::insert_tx(&mut tx, &movement).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(sale_id = %sale.sale_id, total = %total, "Recorded sale");
        Ok(sale)
    }

    /// Changes a sale's quantity, reconciling its OUT movement and totals.
    ///
    /// ## Rules
    /// - Credit sales with recorded payments are frozen
    ///   ([`CoreError::SaleNotEditable`]); the paid amount would no longer
    ///   line up with the installment history.
    /// - The movement is undone then redone, so raising the quantity is
    ///   checked against the stock the product would have had without this
    ///   sale.
    /// - Cash sales stay settled: the paid amount follows the new total.
    #[instrument(skip(self), fields(sale_id = %sale_id, qty = %quantity))]
    pub async fn edit_sale_quantity(&self, sale_id: &str, quantity: i64) -> LedgerResult<Sale> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let sale = SaleRepository::fetch_tx(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if sale.sale_type == SaleType::Credit && sale.amount_paid_cents > 0 {
            return Err(CoreError::SaleNotEditable {
                sale_id: sale_id.to_string(),
                reason: "payments have been recorded against it".to_string(),
            }
            .into());
        }

        let product_id = sale.product_id.clone().ok_or_else(|| {
            CoreError::SaleNotEditable {
                sale_id: sale_id.to_string(),
                reason: "the product no longer exists".to_string(),
            }
        })?;

        let product = ProductRepository::fetch_tx(&mut tx, &product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;

        let movement = MovementRepository::fetch_sale_out_tx(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::MovementNotFound(format!("OUT movement of sale {sale_id}")))?;

        let undone = stock::reverse(MovementDirection::Out, product.stock_quantity, movement.qty);
        let next = stock::apply(MovementDirection::Out, undone, quantity)
            .map_err(|e| named(e, &product.name))?;

        let delta = next - product.stock_quantity;
        if delta != 0 {
            apply_stock_delta(&mut tx, &product_id, delta).await?;
        }
        MovementRepository::update_tx(&mut tx, &movement.movement_id, MovementDirection::Out, quantity)
            .await?;

        // Retotal against the frozen unit price
        let total = Money::from_cents(sale.unit_price_cents).multiply_quantity(quantity);
        let (amount_paid, balance) = match sale.sale_type {
            SaleType::Cash => (total.cents(), 0),
            SaleType::Credit => (0, total.cents()),
        };
        SaleRepository::update_quantity_tx(
            &mut tx,
            sale_id,
            quantity,
            total.cents(),
            amount_paid,
            balance,
        )
        .await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(sale_id = %sale_id, "Edited sale quantity");
        Ok(Sale {
            quantity,
            total_cents: total.cents(),
            amount_paid_cents: amount_paid,
            balance_cents: balance,
            ..sale
        })
    }

    /// Deletes a sale, restoring its quantity to stock.
    ///
    /// The original OUT movement is kept (its sale link is nulled by the
    /// schema) and a compensating IN movement is posted, so the audit
    /// trail shows both the sale and its reversal.
    #[instrument(skip(self), fields(sale_id = %sale_id))]
    pub async fn delete_sale(&self, sale_id: &str) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        let sale = SaleRepository::fetch_tx(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        // Restore stock only while both the product and the original OUT
        // movement still exist; otherwise there is nothing to compensate
        let movement = MovementRepository::fetch_sale_out_tx(&mut tx, sale_id).await?;
        if let (Some(product_id), Some(movement)) = (sale.product_id.as_deref(), movement) {
            if ProductRepository::fetch_tx(&mut tx, product_id).await?.is_some() {
                apply_stock_delta(&mut tx, product_id, movement.qty).await?;

                let reversal = StockMovement {
                    movement_id: generate_movement_id(),
                    product_id: product_id.to_string(),
                    sale_id: Some(sale_id.to_string()),
                    direction: MovementDirection::In,
                    qty: movement.qty,
                    remarks: Some(SALE_REVERSAL_REMARKS.to_string()),
                    moved_at: Utc::now(),
                };
                MovementRepository::insert_tx(&mut tx, &reversal).await?;
            }
        }

        SaleRepository::delete_tx(&mut tx, sale_id).await?;

        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(sale_id = %sale_id, "Deleted sale");
        Ok(())
    }
}

/// Applies a signed stock delta, turning a guard miss into a typed error.
///
/// The guarded UPDATE matches zero rows when the product is gone or the
/// delta would drive stock negative. Either way the caller's transaction
/// must abort: committing a movement or sale row without its stock change
/// would break the stock-equals-net-movements invariant. A follow-up read
/// distinguishes the two cases.
async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
) -> LedgerResult<()> {
    if ProductRepository::adjust_stock_tx(&mut *conn, product_id, delta).await? {
        return Ok(());
    }

    match ProductRepository::fetch_tx(&mut *conn, product_id).await? {
        Some(product) => Err(CoreError::InsufficientStock {
            name: product.name,
            available: product.stock_quantity,
            requested: delta.abs(),
        }
        .into()),
        None => Err(CoreError::ProductNotFound(product_id.to_string()).into()),
    }
}

/// Fills the product name into an InsufficientStock error raised by the
/// pure stock math (which doesn't know names).
fn named(err: CoreError, name: &str) -> CoreError {
    match err {
        CoreError::InsufficientStock {
            available,
            requested,
            ..
        } => CoreError::InsufficientStock {
            name: name.to_string(),
            available,
            requested,
        },
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use innoventory_core::Product;

    /// In-memory database with one product at the given stock level,
    /// stocked through the ledger so movements and the high-water mark
    /// line up.
    async fn setup(stock: i64, price_cents: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let product = Product {
            product_id: generate_product_id(),
            name: "Rice 5kg".to_string(),
            description: None,
            category_id: None,
            supplier_id: None,
            price_cents,
            stock_quantity: 0,
            low_threshold: None,
            medium_threshold: None,
            max_stock_recorded: 0,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();

        if stock > 0 {
            db.stock_ledger()
                .post_movement(&product.product_id, MovementDirection::In, stock, Some("initial"))
                .await
                .unwrap();
        }

        (db, product.product_id)
    }

    fn cash_sale(product_id: &str, quantity: i64) -> NewSale {
        NewSale {
            product_id: product_id.to_string(),
            quantity,
            sale_type: SaleType::Cash,
            sold_by: None,
            due_date: None,
            customer_name: None,
            customer_contact: None,
        }
    }

    #[tokio::test]
    async fn test_post_movement_updates_stock_and_high_water_mark() {
        let (db, pid) = setup(0, 2500).await;

        db.stock_ledger()
            .post_movement(&pid, MovementDirection::In, 10, Some("restock"))
            .await
            .unwrap();

        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 10);
        assert_eq!(product.max_stock_recorded, 10);
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_out_movement_exceeding_stock_is_rejected_atomically() {
        let (db, pid) = setup(10, 2500).await;

        let err = db
            .stock_ledger()
            .post_movement(&pid, MovementDirection::Out, 12, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock {
                available: 10,
                requested: 12,
                ..
            })
        ));

        // Nothing changed: no stock delta, no orphan movement row
        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 10);
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_edit_movement_is_undo_then_redo() {
        let (db, pid) = setup(10, 2500).await;
        let ledger = db.stock_ledger();

        let movement = ledger
            .post_movement(&pid, MovementDirection::Out, 3, None)
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &pid).await, 7);

        // OUT 3 → OUT 5: net one more OUT of 2
        ledger
            .edit_movement(&movement.movement_id, MovementDirection::Out, 5)
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &pid).await, 5);

        // OUT 5 → OUT 12 must be checked against the undone level (10)
        let err = ledger
            .edit_movement(&movement.movement_id, MovementDirection::Out, 12)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { available: 10, .. })
        ));
        assert_eq!(stock_of(&db, &pid).await, 5);

        // Direction flip: OUT 5 → IN 5 swings stock by 10
        ledger
            .edit_movement(&movement.movement_id, MovementDirection::In, 5)
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &pid).await, 15);
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_delete_movement_reverses_its_effect() {
        let (db, pid) = setup(10, 2500).await;
        let ledger = db.stock_ledger();

        let out = ledger
            .post_movement(&pid, MovementDirection::Out, 4, None)
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &pid).await, 6);

        ledger.delete_movement(&out.movement_id).await.unwrap();
        assert_eq!(stock_of(&db, &pid).await, 10);
        assert!(db.movements().get_by_id(&out.movement_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_in_movement_cannot_drive_stock_negative() {
        let (db, pid) = setup(0, 2500).await;
        let ledger = db.stock_ledger();

        let restock = ledger
            .post_movement(&pid, MovementDirection::In, 10, None)
            .await
            .unwrap();
        ledger
            .post_movement(&pid, MovementDirection::Out, 8, None)
            .await
            .unwrap();

        // Only 2 on hand; removing the IN of 10 would mean -8
        let err = ledger.delete_movement(&restock.movement_id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(stock_of(&db, &pid).await, 2);
    }

    #[tokio::test]
    async fn test_record_cash_sale_settles_and_posts_out_movement() {
        let (db, pid) = setup(10, 2500).await;

        let sale = db.stock_ledger().record_sale(cash_sale(&pid, 4)).await.unwrap();

        assert_eq!(sale.total_cents, 10000);
        assert_eq!(sale.amount_paid_cents, 10000);
        assert_eq!(sale.balance_cents, 0);
        assert_eq!(sale.payment_status, PaymentStatus::Paid);
        assert!(sale.settled_at.is_some());
        assert!(sale.due_date.is_none());

        assert_eq!(stock_of(&db, &pid).await, 6);
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 6);

        let movements = db.movements().list_for_product(&pid, 10).await.unwrap();
        let out = movements
            .iter()
            .find(|m| m.sale_id.as_deref() == Some(sale.sale_id.as_str()))
            .unwrap();
        assert_eq!(out.direction, MovementDirection::Out);
        assert_eq!(out.qty, 4);
        assert_eq!(out.remarks.as_deref(), Some(SALE_REMARKS));
    }

    #[tokio::test]
    async fn test_record_credit_sale_defaults_due_date() {
        let (db, pid) = setup(10, 2500).await;

        let sale = db
            .stock_ledger()
            .record_sale(NewSale {
                product_id: pid.clone(),
                quantity: 2,
                sale_type: SaleType::Credit,
                sold_by: None,
                due_date: None,
                customer_name: Some("Ali".to_string()),
                customer_contact: None,
            })
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        assert_eq!(sale.payment_status, PaymentStatus::Pending);
        assert_eq!(sale.amount_paid_cents, 0);
        assert_eq!(sale.balance_cents, sale.total_cents);
        assert_eq!(
            sale.due_date,
            Some(today + Duration::days(DEFAULT_CREDIT_TERM_DAYS))
        );
        assert!(sale.settled_at.is_none());
    }

    #[tokio::test]
    async fn test_record_sale_insufficient_stock_changes_nothing() {
        let (db, pid) = setup(10, 2500).await;

        let err = db
            .stock_ledger()
            .record_sale(cash_sale(&pid, 12))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock {
                available: 10,
                requested: 12,
                ..
            })
        ));

        assert_eq!(stock_of(&db, &pid).await, 10);
        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_edit_sale_quantity_reconciles_movement_and_totals() {
        let (db, pid) = setup(10, 2500).await;
        let ledger = db.stock_ledger();

        let sale = ledger.record_sale(cash_sale(&pid, 3)).await.unwrap();
        assert_eq!(stock_of(&db, &pid).await, 7);

        let edited = ledger.edit_sale_quantity(&sale.sale_id, 5).await.unwrap();
        assert_eq!(edited.quantity, 5);
        assert_eq!(edited.total_cents, 12500);
        assert_eq!(edited.amount_paid_cents, 12500);
        assert_eq!(edited.balance_cents, 0);
        assert_eq!(stock_of(&db, &pid).await, 5);
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 5);

        // Raising past the undone level is rejected
        let err = ledger.edit_sale_quantity(&sale.sale_id, 11).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { available: 10, .. })
        ));
        assert_eq!(stock_of(&db, &pid).await, 5);
    }

    #[tokio::test]
    async fn test_credit_sale_with_payments_is_frozen() {
        let (db, pid) = setup(10, 2500).await;
        let ledger = db.stock_ledger();

        let sale = ledger
            .record_sale(NewSale {
                sale_type: SaleType::Credit,
                ..cash_sale(&pid, 2)
            })
            .await
            .unwrap();
        db.credit_ledger()
            .record_payment(&sale.sale_id, Money::from_cents(1000), "")
            .await
            .unwrap();

        let err = ledger.edit_sale_quantity(&sale.sale_id, 3).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::SaleNotEditable { .. })
        ));
    }

    #[tokio::test]
    async fn test_stock_guard_miss_aborts_with_typed_error() {
        let (db, pid) = setup(5, 2500).await;

        // Drive the guarded UPDATE to a zero-row match directly: the
        // helper must surface a typed error, never a silent no-op the
        // surrounding transaction could commit
        let mut tx = db.pool().begin().await.unwrap();
        let err = apply_stock_delta(&mut tx, &pid, -6).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            })
        ));

        let err = apply_stock_delta(&mut tx, "no-such-product", 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ProductNotFound(_))
        ));
        tx.rollback().await.unwrap();

        assert_eq!(stock_of(&db, &pid).await, 5);
    }

    #[tokio::test]
    async fn test_delete_sale_restores_stock_with_audit_trail() {
        let (db, pid) = setup(10, 2500).await;
        let ledger = db.stock_ledger();

        let sale = ledger.record_sale(cash_sale(&pid, 3)).await.unwrap();
        assert_eq!(stock_of(&db, &pid).await, 7);

        ledger.delete_sale(&sale.sale_id).await.unwrap();

        assert_eq!(stock_of(&db, &pid).await, 10);
        assert_eq!(db.movements().net_quantity(&pid).await.unwrap(), 10);
        assert!(db.sales().get_by_id(&sale.sale_id).await.unwrap().is_none());

        // Both the original OUT and the compensating IN survive, unlinked
        let movements = db.movements().list_for_product(&pid, 10).await.unwrap();
        let sold = movements
            .iter()
            .find(|m| m.remarks.as_deref() == Some(SALE_REMARKS))
            .unwrap();
        let reversal = movements
            .iter()
            .find(|m| m.remarks.as_deref() == Some(SALE_REVERSAL_REMARKS))
            .unwrap();
        assert!(sold.sale_id.is_none());
        assert!(reversal.sale_id.is_none());
        assert_eq!(reversal.direction, MovementDirection::In);
        assert_eq!(reversal.qty, 3);
    }

    async fn stock_of(db: &Database, pid: &str) -> i64 {
        db.products()
            .get_by_id(pid)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }
}
