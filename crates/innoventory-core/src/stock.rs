//! # Stock Math
//!
//! Pure stock-quantity arithmetic and classification.
//!
//! ## The One Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  stock_quantity == Σ(IN movements) − Σ(OUT movements)               │
//! │                                                                     │
//! │  ...at all times, including after any sequence of movement          │
//! │  edits and deletes. The ledger in innoventory-db enforces this      │
//! │  transactionally; the functions here are the arithmetic it uses.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Undo Then Redo
//! Editing a movement NEVER applies a blind delta. The old effect is
//! reversed first, then the new effect is applied, so the arithmetic is
//! identical whether the edit changes quantity, direction, or both:
//! ```text
//! edit(movement, new_dir, new_qty):
//!     stock' = reverse(old_dir, stock,  old_qty)   // undo
//!     stock'' = apply(new_dir, stock', new_qty)    // redo (checked)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{MovementDirection, Product};

// =============================================================================
// Apply / Reverse
// =============================================================================

/// Applies a movement to a stock level, returning the new level.
///
/// OUT movements that would drive stock negative are rejected with
/// [`CoreError::InsufficientStock`]; no silent clamping.
///
/// ## Example
/// ```rust
/// use innoventory_core::stock::apply;
/// use innoventory_core::types::MovementDirection;
///
/// assert_eq!(apply(MovementDirection::In, 10, 5).unwrap(), 15);
/// assert_eq!(apply(MovementDirection::Out, 10, 4).unwrap(), 6);
/// assert!(apply(MovementDirection::Out, 10, 12).is_err());
/// ```
pub fn apply(direction: MovementDirection, stock: i64, qty: i64) -> CoreResult<i64> {
    let next = stock + direction.signed(qty);
    if next < 0 {
        return Err(CoreError::InsufficientStock {
            name: String::new(),
            available: stock,
            requested: qty,
        });
    }
    Ok(next)
}

/// Reverses a movement's effect on a stock level.
///
/// The exact inverse of [`apply`]: reversing an IN subtracts, reversing
/// an OUT adds back. Infallible; a reversal can only restore quantity
/// that the original movement legitimately took or gave.
#[inline]
pub fn reverse(direction: MovementDirection, stock: i64, qty: i64) -> i64 {
    stock + direction.inverted().signed(qty)
}

// =============================================================================
// Stock Status Classification
// =============================================================================

/// Low/medium/high classification of a product's on-hand quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Medium,
    High,
}

/// Global classification percentages, applied against a product's
/// high-water mark when it has no explicit thresholds.
///
/// Passed explicitly to [`classify`] — there is no ambient settings
/// singleton to reach into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockThresholds {
    /// At or below this percentage of `max_stock_recorded`: Low.
    pub low_percentage: u32,
    /// At or below this percentage of `max_stock_recorded`: Medium.
    pub medium_percentage: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        StockThresholds {
            low_percentage: 20,
            medium_percentage: 50,
        }
    }
}

/// Classifies a product's stock level.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  Per-product thresholds set?                                        │
/// │    qty <= low_threshold     → Low                                   │
/// │    qty <= medium_threshold  → Medium                                │
/// │    otherwise                → High                                  │
/// │                                                                     │
/// │  No thresholds → percentage of the high-water mark:                 │
/// │    max_stock_recorded == 0            → Low (never stocked)         │
/// │    qty*100 <= max*low_percentage      → Low                         │
/// │    qty*100 <= max*medium_percentage   → Medium                      │
/// │    otherwise                          → High                        │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
pub fn classify(product: &Product, thresholds: StockThresholds) -> StockStatus {
    let qty = product.stock_quantity;

    if let (Some(low), Some(medium)) = (product.low_threshold, product.medium_threshold) {
        return if qty <= low {
            StockStatus::Low
        } else if qty <= medium {
            StockStatus::Medium
        } else {
            StockStatus::High
        };
    }

    let max = product.max_stock_recorded;
    if max <= 0 {
        return StockStatus::Low;
    }

    // Integer comparison of qty/max against pct/100 without division
    if qty * 100 <= max * thresholds.low_percentage as i64 {
        StockStatus::Low
    } else if qty * 100 <= max * thresholds.medium_percentage as i64 {
        StockStatus::Medium
    } else {
        StockStatus::High
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(qty: i64, low: Option<i64>, medium: Option<i64>, max: i64) -> Product {
        let now = Utc::now();
        Product {
            product_id: "p1".to_string(),
            name: "Rice 5kg".to_string(),
            description: None,
            category_id: None,
            supplier_id: None,
            price_cents: 2500,
            stock_quantity: qty,
            low_threshold: low,
            medium_threshold: medium,
            max_stock_recorded: max,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_in_and_out() {
        assert_eq!(apply(MovementDirection::In, 10, 5).unwrap(), 15);
        assert_eq!(apply(MovementDirection::Out, 10, 4).unwrap(), 6);
        assert_eq!(apply(MovementDirection::Out, 10, 10).unwrap(), 0);
    }

    #[test]
    fn test_apply_rejects_negative_stock() {
        let err = apply(MovementDirection::Out, 10, 12).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 10,
                requested: 12,
                ..
            }
        ));
    }

    #[test]
    fn test_reverse_is_inverse_of_apply() {
        let stock = 10;
        for (dir, qty) in [
            (MovementDirection::In, 7),
            (MovementDirection::Out, 3),
        ] {
            let applied = apply(dir, stock, qty).unwrap();
            assert_eq!(reverse(dir, applied, qty), stock);
        }
    }

    #[test]
    fn test_undo_then_redo_edit() {
        // Movement was OUT 3 on stock now at 7; edit to OUT 5
        let stock = 7;
        let undone = reverse(MovementDirection::Out, stock, 3); // 10
        let redone = apply(MovementDirection::Out, undone, 5).unwrap();
        assert_eq!(redone, 5);

        // Edit to OUT 12 must fail against the undone level, not the
        // current one
        let undone = reverse(MovementDirection::Out, stock, 3);
        assert!(apply(MovementDirection::Out, undone, 12).is_err());
    }

    #[test]
    fn test_classify_explicit_thresholds() {
        let p = product(3, Some(5), Some(20), 100);
        assert_eq!(classify(&p, StockThresholds::default()), StockStatus::Low);

        let p = product(12, Some(5), Some(20), 100);
        assert_eq!(classify(&p, StockThresholds::default()), StockStatus::Medium);

        let p = product(30, Some(5), Some(20), 100);
        assert_eq!(classify(&p, StockThresholds::default()), StockStatus::High);
    }

    #[test]
    fn test_classify_percentage_of_high_water_mark() {
        let thresholds = StockThresholds {
            low_percentage: 20,
            medium_percentage: 50,
        };

        // max 100: <=20 Low, <=50 Medium, else High
        assert_eq!(classify(&product(20, None, None, 100), thresholds), StockStatus::Low);
        assert_eq!(classify(&product(21, None, None, 100), thresholds), StockStatus::Medium);
        assert_eq!(classify(&product(50, None, None, 100), thresholds), StockStatus::Medium);
        assert_eq!(classify(&product(51, None, None, 100), thresholds), StockStatus::High);
    }

    #[test]
    fn test_classify_never_stocked_is_low() {
        let p = product(0, None, None, 0);
        assert_eq!(classify(&p, StockThresholds::default()), StockStatus::Low);
    }
}
