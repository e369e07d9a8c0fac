//! # Domain Types
//!
//! Core domain types used throughout Innoventory.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Product     │   │ StockMovement  │   │      Sale      │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  product_id    │◄──│  product_id    │   │  product_id    │      │
//! │  │  price_cents   │   │  direction     │   │  sale_type     │      │
//! │  │  stock_quantity│   │  qty           │◄──│  quantity      │      │
//! │  │  thresholds    │   │  sale_id (opt) │   │  credit fields │      │
//! │  └────────────────┘   └────────────────┘   └────────────────┘      │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │ MovementDir.   │   │    SaleType    │   │ PaymentStatus  │      │
//! │  │  In | Out      │   │ Cash | Credit  │   │ Pending        │      │
//! │  └────────────────┘   └────────────────┘   │ Partial        │      │
//! │                                            │ Paid | Overdue │      │
//! │                                            └────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived State
//! `Product.stock_quantity` and the credit fields on `Sale` are derived
//! values owned by the ledgers in `innoventory-db`; nothing else may
//! mutate them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Movement Direction
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Inbound: restock, correction, sale reversal.
    In,
    /// Outbound: sale, shrinkage, correction.
    Out,
}

impl MovementDirection {
    /// The opposite direction, used when reversing a movement's effect.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            MovementDirection::In => MovementDirection::Out,
            MovementDirection::Out => MovementDirection::In,
        }
    }

    /// Signed delta this direction applies to a product's stock.
    #[inline]
    pub const fn signed(self, qty: i64) -> i64 {
        match self {
            MovementDirection::In => qty,
            MovementDirection::Out => -qty,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// `stock_quantity` is a derived value: it always equals the net sum of
/// all live stock movements for this product. The ledger enforces this;
/// the database backs it up with a `CHECK (stock_quantity >= 0)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub product_id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Category reference (external catalog, not managed here).
    pub category_id: Option<String>,

    /// Supplier reference (external catalog, not managed here).
    pub supplier_id: Option<String>,

    /// Unit price in cents. Never negative.
    pub price_cents: i64,

    /// Current on-hand quantity. Derived from movements, never negative.
    pub stock_quantity: i64,

    /// Per-product low-stock threshold (absolute units).
    pub low_threshold: Option<i64>,

    /// Per-product medium-stock threshold (absolute units).
    /// When both thresholds are set, `medium_threshold > low_threshold`.
    pub medium_threshold: Option<i64>,

    /// High-water mark: the largest stock level ever recorded.
    /// Basis for percentage classification when no thresholds are set.
    pub max_stock_recorded: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether an outbound quantity can be fulfilled from stock.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity <= self.stock_quantity
    }

    /// Whether this product carries explicit classification thresholds.
    #[inline]
    pub fn has_explicit_thresholds(&self) -> bool {
        self.low_threshold.is_some() && self.medium_threshold.is_some()
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One atomic inbound/outbound adjustment to a product's stock.
///
/// Movements are the single source of truth for stock deltas: posting a
/// movement is the ONLY code path that changes `Product.stock_quantity`.
/// Sales post their own OUT movement through the same path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    /// Unique identifier (UUID v4).
    pub movement_id: String,

    /// The product this movement adjusts.
    pub product_id: String,

    /// Sale that posted this movement, if any. Nulled when the sale is
    /// deleted so the audit trail survives.
    pub sale_id: Option<String>,

    /// Direction of the adjustment.
    pub direction: MovementDirection,

    /// Quantity moved. Always positive; direction carries the sign.
    pub qty: i64,

    /// Free-text remarks ("SOLD", "restock", correction notes).
    pub remarks: Option<String>,

    /// When the movement was recorded.
    pub moved_at: DateTime<Utc>,
}

impl StockMovement {
    /// Signed stock delta this movement applied.
    #[inline]
    pub fn signed_qty(&self) -> i64 {
        self.direction.signed(self.qty)
    }
}

// =============================================================================
// Sale Type
// =============================================================================

/// How a sale was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    /// Paid in full at time of transaction.
    Cash,
    /// Tracked as an installment credit until settled.
    Credit,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Lifecycle status of a credit sale's balance.
///
/// ## State Machine
/// ```text
/// pending ──payment──► partial ──payment──► paid (terminal)
///    │                    │                  ▲
///    └───overdue sweep────┴──► overdue ──full payment
/// ```
/// Overdue overrides pending/partial but never paid, and is recomputed
/// from the due date on every mutation (sticky until settled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No payment recorded yet.
    Pending,
    /// Some, but not all, of the total has been paid.
    Partial,
    /// Fully settled. Terminal.
    Paid,
    /// Unpaid balance past its due date.
    Overdue,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// Product name and unit price are snapshotted at sale time so the sale
/// history survives catalog edits. Quantity, product, and price are
/// immutable once any payment has been recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub sale_id: String,

    /// Product sold. Nulled if the product is later removed.
    pub product_id: Option<String>,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Quantity sold. Positive.
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Total in cents: `unit_price_cents * quantity`.
    pub total_cents: i64,

    /// Cash or credit.
    pub sale_type: SaleType,

    /// Staff member who recorded the sale (external identity).
    pub sold_by: Option<String>,

    /// When the sale happened.
    pub sold_at: DateTime<Utc>,

    /// Amount paid so far, in cents. For cash sales, equals the total.
    pub amount_paid_cents: i64,

    /// Remaining balance in cents: `total_cents - amount_paid_cents`.
    pub balance_cents: i64,

    /// Due date for credit sales. None for cash sales.
    pub due_date: Option<NaiveDate>,

    /// Derived payment status. Recomputed on every mutation.
    pub payment_status: PaymentStatus,

    /// Append-only log of payment note lines.
    pub payment_notes: String,

    /// Customer name for credit sales.
    pub customer_name: Option<String>,

    /// Customer contact for credit sales.
    pub customer_contact: Option<String>,

    /// Date the balance reached zero.
    pub settled_at: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Amount paid as Money.
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Remaining balance as Money.
    #[inline]
    pub fn remaining_balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    /// Whether the sale is fully settled.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.balance_cents == 0
    }

    /// Whether the sale carries an unpaid balance past its due date.
    ///
    /// Pure date comparison; callers supply "today" so the check stays
    /// deterministic and testable.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.is_settled() {
            return false;
        }
        match self.due_date {
            Some(due) => due < today,
            None => false,
        }
    }
}

// =============================================================================
// New Sale Input
// =============================================================================

/// Input for recording a new sale.
///
/// The ledger looks up the product, snapshots name and price, computes
/// the total, and posts the OUT movement; callers supply only intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub product_id: String,
    pub quantity: i64,
    pub sale_type: SaleType,
    /// Staff member recording the sale.
    pub sold_by: Option<String>,
    /// Due date for credit sales. Defaults to the standard credit term
    /// when omitted. Ignored for cash sales.
    pub due_date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn credit_sale(total: i64, paid: i64, due: Option<NaiveDate>) -> Sale {
        let now = Utc::now();
        Sale {
            sale_id: "s1".to_string(),
            product_id: Some("p1".to_string()),
            product_name: "Widget".to_string(),
            quantity: 1,
            unit_price_cents: total,
            total_cents: total,
            sale_type: SaleType::Credit,
            sold_by: None,
            sold_at: now,
            amount_paid_cents: paid,
            balance_cents: total - paid,
            due_date: due,
            payment_status: PaymentStatus::Pending,
            payment_notes: String::new(),
            customer_name: None,
            customer_contact: None,
            settled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_direction_inverted() {
        assert_eq!(MovementDirection::In.inverted(), MovementDirection::Out);
        assert_eq!(MovementDirection::Out.inverted(), MovementDirection::In);
    }

    #[test]
    fn test_direction_signed() {
        assert_eq!(MovementDirection::In.signed(5), 5);
        assert_eq!(MovementDirection::Out.signed(5), -5);
    }

    #[test]
    fn test_is_overdue() {
        let due = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let before = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();

        let sale = credit_sale(1000, 0, Some(due));
        assert!(!sale.is_overdue(before));
        assert!(!sale.is_overdue(due));
        assert!(sale.is_overdue(after));

        // Settled sales are never overdue, no matter the date
        let settled = credit_sale(1000, 1000, Some(due));
        assert!(!settled.is_overdue(after));
    }

    #[test]
    fn test_remaining_balance() {
        let sale = credit_sale(1000, 400, None);
        assert_eq!(sale.remaining_balance(), Money::from_cents(600));
        assert!(!sale.is_settled());
    }
}
