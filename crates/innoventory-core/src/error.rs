//! # Error Types
//!
//! Domain-specific error types for innoventory-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  innoventory-core errors (this file)                                │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  innoventory-db errors (separate crate)                             │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── LedgerError      - Core ∪ Db at the ledger seam                │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → LedgerError → web layer        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, IDs, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Every ledger mutation
/// that fails with one of these rolls back completely; no partial stock
/// or balance change is ever observable.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Stock movement cannot be found.
    #[error("Stock movement not found: {0}")]
    MovementNotFound(String),

    /// An outbound adjustment would drive stock negative.
    ///
    /// ## When This Occurs
    /// - Posting an OUT movement larger than the available quantity
    /// - Recording a sale for more units than are on hand
    /// - Editing a movement such that the reversed-then-reapplied
    ///   result would be negative
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 12)
    ///      │
    ///      ▼
    /// Check stock: available=10
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Rice 5kg", available: 10, requested: 12 }
    ///      │
    ///      ▼
    /// UI shows: "Only 10 Rice 5kg in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Payment amount is non-positive or exceeds the remaining balance.
    #[error("Invalid payment: {reason}")]
    InvalidPayment { reason: String },

    /// Redundant full-payment action on an already settled sale.
    #[error("Sale {sale_id} is already settled")]
    AlreadySettled { sale_id: String },

    /// A credit-only operation was attempted on a cash sale.
    #[error("Sale {sale_id} is not a credit sale")]
    NotACreditSale { sale_id: String },

    /// The sale cannot be edited in its current state.
    #[error("Sale {sale_id} cannot be edited: {reason}")]
    SaleNotEditable { sale_id: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Rice 5kg".to_string(),
            available: 10,
            requested: 12,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Rice 5kg: available 10, requested 12"
        );

        let err = CoreError::AlreadySettled {
            sale_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Sale abc is already settled");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
