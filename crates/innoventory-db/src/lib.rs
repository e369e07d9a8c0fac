//! # innoventory-db: Database Layer for Innoventory
//!
//! SQLite persistence and the transactional stock/credit ledgers.
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
//! │  │              ★ innoventory-db (THIS CRATE) ★                │   │
//! │  │                                                             │   │
//! │  │  ┌──────────┐  ┌─────────────┐  ┌────────────────────────┐  │   │
//! │  │  │   pool   │  │ repository  │  │        ledger          │  │   │
//! │  │  │ Database │  │ product     │  │ StockLedger            │  │   │
//! │  │  │ DbConfig │  │ movement    │  │ CreditLedger           │  │   │
//! │  │  │          │  │ sale        │  │ (one tx per mutation)  │  │   │
//! │  │  └──────────┘  └─────────────┘  └────────────────────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │        innoventory-core (pure logic, no I/O)                │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`pool`] - Connection pool, WAL configuration, the `Database` handle
//! - [`repository`] - Per-aggregate SQL (reads + transaction-scoped writes)
//! - [`ledger`] - Stock and credit ledgers (all mutations, one tx each)
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//!
//! ## Example
//! ```rust,ignore
//! use innoventory_db::{Database, DbConfig};
//! use innoventory_core::MovementDirection;
//!
//! let db = Database::new(DbConfig::new("./innoventory.db")).await?;
//!
//! db.stock_ledger()
//!     .post_movement(&product_id, MovementDirection::In, 50, Some("restock"))
//!     .await?;
//! ```

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// Re-exports for convenience
pub use error::{DbError, DbResult};
pub use ledger::credit::CreditLedger;
pub use ledger::stock::StockLedger;
pub use ledger::{LedgerError, LedgerResult};
pub use pool::{Database, DbConfig};
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
