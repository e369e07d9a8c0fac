//! # Validation Module
//!
//! Input validation utilities for Innoventory.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Web layer (external collaborator)                         │
//! │  ├── Form/field format checks                                       │
//! │  └── Immediate user feedback                                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE: business rule validation                     │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  └── Foreign key constraints                                        │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum quantity accepted for a single movement or sale line.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 10000 instead of 100).
pub const MAX_QUANTITY: i64 = 100_000;

/// Maximum length of movement remarks.
pub const MAX_REMARKS_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 255 characters
///
/// ## Example
/// ```rust
/// use innoventory_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Rice 5kg").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates movement remarks.
///
/// ## Rules
/// - May be empty
/// - At most [`MAX_REMARKS_LEN`] characters
pub fn validate_remarks(remarks: &str) -> ValidationResult<()> {
    if remarks.len() > MAX_REMARKS_LEN {
        return Err(ValidationError::TooLong {
            field: "remarks".to_string(),
            max: MAX_REMARKS_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement/sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents.
///
/// ## Rules
/// - Must be positive (> 0)
/// - The over-balance check lives in the credit state machine, which
///   knows the sale's remaining balance
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a per-product threshold pair.
///
/// ## Rules
/// - Both or neither must be set
/// - When set: both non-negative and `medium > low`
pub fn validate_thresholds(low: Option<i64>, medium: Option<i64>) -> ValidationResult<()> {
    match (low, medium) {
        (None, None) => Ok(()),
        (Some(low), Some(medium)) => {
            if low < 0 || medium < 0 {
                return Err(ValidationError::MustBePositive {
                    field: "threshold".to_string(),
                });
            }
            if medium <= low {
                return Err(ValidationError::InvalidFormat {
                    field: "medium_threshold".to_string(),
                    reason: "must be greater than low_threshold".to_string(),
                });
            }
            Ok(())
        }
        _ => Err(ValidationError::Required {
            field: "low_threshold and medium_threshold".to_string(),
        }),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use innoventory_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
