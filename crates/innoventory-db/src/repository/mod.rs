//! # Repository Implementations
//!
//! One repository per aggregate:
//! - [`product`] - Products (catalog reads, low-stock listing)
//! - [`movement`] - Stock movements (the audit ledger rows)
//! - [`sale`] - Sales (cash and credit)
//!
//! ## Division of Labor
//! Repositories own the SQL. Pool-backed methods serve plain reads;
//! `*_tx` associated functions take a live connection so the ledgers can
//! compose several of them inside one transaction. Repositories never
//! open transactions themselves — atomicity is the ledgers' job.

pub mod movement;
pub mod product;
pub mod sale;
