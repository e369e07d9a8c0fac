//! # innoventory-core: Pure Business Logic for Innoventory
//!
//! This crate is the **heart** of Innoventory. It contains the stock
//! ledger math and the credit state machine as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Innoventory Architecture                        │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │          Web layer (external: routing, templates, auth)     │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │            ★ innoventory-core (THIS CRATE) ★                │   │
//! │  │                                                             │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────┐ │   │
//! │  │  │  types  │ │  money  │ │  stock  │ │ credit  │ │ valid.│ │   │
//! │  │  │ Product │ │  Money  │ │  apply  │ │ derive_ │ │ rules │ │   │
//! │  │  │  Sale   │ │ (cents) │ │ reverse │ │ status  │ │ checks│ │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └───────┘ │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │               innoventory-db (Database Layer)               │   │
//! │  │    SQLite repositories, transactional stock/credit ledgers  │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockMovement, Sale, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stock`] - Stock apply/reverse math and low/medium/high classification
//! - [`credit`] - Credit payment application and status derivation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic; "today" is a
//!    parameter, never a clock read
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float drift across repeated partial payments
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use innoventory_core::credit::derive_status;
//! use innoventory_core::money::Money;
//! use innoventory_core::types::PaymentStatus;
//!
//! let total = Money::from_cents(10000);
//! let paid = Money::from_cents(6000);
//! let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//!
//! assert_eq!(derive_status(total, paid, due, today), PaymentStatus::Partial);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credit;
pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use innoventory_core::Money` instead of
// `use innoventory_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use stock::{StockStatus, StockThresholds};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default credit term, in days, applied when a credit sale is recorded
/// without an explicit due date.
///
/// ## Business Reason
/// Standard store policy: installment customers get 30 days by default;
/// staff can override per sale.
pub const DEFAULT_CREDIT_TERM_DAYS: i64 = 30;
