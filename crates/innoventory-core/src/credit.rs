//! # Credit State Machine
//!
//! Pure balance/payment/status logic for credit sales.
//!
//! ## Status Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  balance = total − amount_paid   (0 <= balance <= total, always)    │
//! │                                                                     │
//! │  amount_paid >= total            → Paid    (balance forced to 0)    │
//! │  else, due_date < today          → Overdue (overrides the below)    │
//! │  else, amount_paid > 0           → Partial                          │
//! │  else                            → Pending                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The status is never stored-then-trusted: every mutation of a credit
//! sale re-derives it from (total, paid, due date, today). That is what
//! makes the overdue sweep idempotent and "overdue" sticky — a partial
//! payment on an overdue sale re-derives to Overdue because the due date
//! is still in the past.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentStatus;

// =============================================================================
// Status Derivation
// =============================================================================

/// Derives the payment status of a credit sale.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use innoventory_core::credit::derive_status;
/// use innoventory_core::money::Money;
/// use innoventory_core::types::PaymentStatus;
///
/// let total = Money::from_cents(10000);
/// let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
///
/// assert_eq!(derive_status(total, Money::zero(), due, today), PaymentStatus::Pending);
/// assert_eq!(derive_status(total, Money::from_cents(4000), due, today), PaymentStatus::Partial);
/// assert_eq!(derive_status(total, total, due, today), PaymentStatus::Paid);
/// ```
pub fn derive_status(
    total: Money,
    amount_paid: Money,
    due_date: NaiveDate,
    today: NaiveDate,
) -> PaymentStatus {
    if amount_paid >= total {
        return PaymentStatus::Paid;
    }
    if due_date < today {
        return PaymentStatus::Overdue;
    }
    if amount_paid.is_positive() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Payment Application
// =============================================================================

/// Validates a payment and returns the new amount paid.
///
/// ## Error Conditions
/// - `amount <= 0` → [`CoreError::InvalidPayment`]
/// - `amount > total − amount_paid` → [`CoreError::InvalidPayment`]
///
/// The returned value never exceeds `total`, so the derived balance never
/// goes negative.
pub fn apply_payment(total: Money, amount_paid: Money, amount: Money) -> CoreResult<Money> {
    if !amount.is_positive() {
        return Err(CoreError::InvalidPayment {
            reason: "payment amount must be positive".to_string(),
        });
    }

    let balance = total.saturating_sub(amount_paid);
    if amount > balance {
        return Err(CoreError::InvalidPayment {
            reason: format!(
                "payment {} exceeds remaining balance {}",
                amount, balance
            ),
        });
    }

    Ok(amount_paid + amount)
}

// =============================================================================
// Payment Notes
// =============================================================================

/// Formats one payment note line for the sale's append-only notes log.
///
/// ## Format
/// `[2026-02-01] payment 60.00: first installment`
///
/// The free-text note is omitted when empty.
pub fn payment_note_line(date: NaiveDate, amount: Money, note: &str) -> String {
    let note = note.trim();
    if note.is_empty() {
        format!("[{}] payment {}", date.format("%Y-%m-%d"), amount)
    } else {
        format!("[{}] payment {}: {}", date.format("%Y-%m-%d"), amount, note)
    }
}

/// Appends a note line to an existing notes log.
pub fn append_note(notes: &str, line: &str) -> String {
    if notes.is_empty() {
        line.to_string()
    } else {
        format!("{}\n{}", notes, line)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
