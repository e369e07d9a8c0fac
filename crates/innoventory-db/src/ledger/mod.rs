//! # Transactional Ledgers
//!
//! The mutation layer: every operation that changes stock quantities or
//! credit balances goes through a ledger, and every ledger operation is
//! exactly one database transaction.
//!
//! ## Division of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  innoventory-core   pure math: apply/reverse, derive_status, ...    │
//! │        │                                                            │
//! │        ▼                                                            │
//! │  ledgers (here)     own transactions, compose repository *_tx fns,  │
//! │        │            map rule violations to typed errors             │
//! │        ▼                                                            │
//! │  repositories       own the SQL, never open transactions            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`stock`] - Stock ledger: movements, sales, and their edit/delete
//!   reversals
//! - [`credit`] - Credit ledger: payments, settlement, the overdue sweep

pub mod credit;
pub mod stock;

use thiserror::Error;

use crate::error::DbError;
use innoventory_core::CoreError;

/// Errors surfaced by ledger operations.
///
/// A ledger call can fail for a business reason (core) or an
/// infrastructure reason (db); both variants are transparent so callers
/// can match on the underlying error directly.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A business rule rejected the mutation. The transaction rolled back.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database operation itself failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
