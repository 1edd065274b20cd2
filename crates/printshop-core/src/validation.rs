//! # Validation Module
//!
//! Input validation utilities for the print shop.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP layer, outside this workspace)                  │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  ├── Quantity vs. minimum / step                                       │
//! │  ├── Option selections vs. product option schema                       │
//! │  └── Catalogue input (names, prices, multipliers, VAT)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK / UNIQUE constraints (cart identity tuple)                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use printshop_core::validation::validate_order_quantity;
//! use printshop_core::ValidationError;
//!
//! assert!(validate_order_quantity(100, 50, 50).is_ok());
//! assert_eq!(
//!     validate_order_quantity(3, 5, 1),
//!     Err(ValidationError::BelowMinimum { minimum: 5, requested: 3 })
//! );
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewProduct, OptionSchema, PricingScheme, SelectedOptions};
use crate::{MAX_ITEM_QUANTITY, MAX_MULTIPLIER, MAX_PRICE_MAJOR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted catalogue name.
pub const MAX_NAME_LEN: usize = 255;

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates an order quantity against a product's minimum and step.
///
/// ## Rules
/// ```text
/// quantity <= 0                → MustBePositive
/// quantity >  MAX_ITEM_QUANTITY → OutOfRange
/// quantity <  minimum_qty      → BelowMinimum { minimum, requested }
/// quantity %  step != 0        → StepMismatch { step, requested }
/// ```
///
/// A minimum or step below 1 is treated as 1.
pub fn validate_order_quantity(quantity: i64, minimum_qty: i64, step: i64) -> ValidationResult<()> {
    validate_quantity(quantity)?;

    let minimum = minimum_qty.max(1);
    let step = step.max(1);

    if quantity < minimum {
        return Err(ValidationError::BelowMinimum {
            minimum,
            requested: quantity,
        });
    }

    if quantity % step != 0 {
        return Err(ValidationError::StepMismatch {
            step,
            requested: quantity,
        });
    }

    Ok(())
}

/// Validates a cart or order quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
///
/// ```rust
/// use printshop_core::validation::validate_quantity;
///
/// assert!(validate_quantity(250).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(i64::MAX).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Option Validators
// =============================================================================

/// Validates selected options against a product's option schema.
///
/// Without a schema any selection is accepted; the surcharge only counts
/// populated values.
///
/// ## Rules (per schema entry)
/// - selected name not in schema → `UnknownOption`
/// - `"required": true` and no non-empty value → `Required`
/// - `"choices": [..]` and a non-empty value outside it → `NotAllowed`
pub fn validate_options(
    schema: Option<&OptionSchema>,
    selected: &SelectedOptions,
) -> ValidationResult<()> {
    let Some(schema) = schema else {
        return Ok(());
    };

    if let Some(name) = selected.keys().find(|name| !schema.contains_key(*name)) {
        return Err(ValidationError::UnknownOption { name: name.clone() });
    }

    for (name, definition) in schema {
        let value = selected.get(name).filter(|v| !v.is_empty());

        let required = definition
            .get("required")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if required && value.is_none() {
            return Err(ValidationError::Required {
                field: name.clone(),
            });
        }

        let choices = definition
            .get("choices")
            .and_then(serde_json::Value::as_array)
            .map(|choices| {
                choices
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            });
        if let (Some(value), Some(allowed)) = (value, choices) {
            if !allowed.iter().any(|c| c == value) {
                return Err(ValidationError::NotAllowed {
                    field: name.clone(),
                    allowed,
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Catalogue Validators
// =============================================================================

/// Validates a display name (product, category, size label...).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price or charge (zero allowed, at most [`MAX_PRICE_MAJOR`]).
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    if amount > Money::from_major(MAX_PRICE_MAJOR) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_MAJOR,
        });
    }

    Ok(())
}

/// Validates a size or printing multiplier (zero allowed, at most
/// [`MAX_MULTIPLIER`]).
pub fn validate_multiplier(multiplier: Decimal) -> ValidationResult<()> {
    if multiplier.is_sign_negative() && !multiplier.is_zero() {
        return Err(ValidationError::InvalidFormat {
            field: "price_multiplier".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    if multiplier > Decimal::from(MAX_MULTIPLIER) {
        return Err(ValidationError::OutOfRange {
            field: "price_multiplier".to_string(),
            min: 0,
            max: MAX_MULTIPLIER,
        });
    }

    Ok(())
}

/// Validates a VAT percentage (0 to 100).
pub fn validate_vat_percent(percent: Decimal) -> ValidationResult<()> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "vat_percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a product before insert or update.
pub fn validate_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_price("base_price", product.base_price)?;

    if !(1..=MAX_ITEM_QUANTITY).contains(&product.minimum_qty) {
        return Err(ValidationError::OutOfRange {
            field: "minimum_qty".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    if !(1..=MAX_ITEM_QUANTITY).contains(&product.qty_step) {
        return Err(ValidationError::OutOfRange {
            field: "qty_step".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    if let Some(id) = &product.subcategory_id {
        validate_uuid(id)?;
    }

    if let PricingScheme::Attribute(attr) = &product.pricing {
        if let Some(vat) = attr.vat_percent {
            validate_vat_percent(vat)?;
        }
        if let Some(design) = attr.additional_design_charge {
            validate_price("additional_design_charge", design)?;
        }
        if let Some(delivery) = attr.delivery_charge {
            validate_price("delivery_charge", delivery)?;
        }
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use printshop_core::validation::validate_uuid;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePricing;
    use serde_json::json;

    #[test]
    fn test_quantity_below_minimum() {
        assert_eq!(
            validate_order_quantity(3, 5, 1),
            Err(ValidationError::BelowMinimum {
                minimum: 5,
                requested: 3
            })
        );
    }

    #[test]
    fn test_quantity_step_mismatch() {
        assert_eq!(
            validate_order_quantity(7, 1, 3),
            Err(ValidationError::StepMismatch {
                step: 3,
                requested: 7
            })
        );
    }

    #[test]
    fn test_quantity_valid() {
        assert!(validate_order_quantity(1, 1, 1).is_ok());
        assert!(validate_order_quantity(9, 3, 3).is_ok());
        assert!(validate_order_quantity(500, 100, 50).is_ok());
    }

    #[test]
    fn test_quantity_non_positive() {
        assert!(matches!(
            validate_order_quantity(0, 1, 1),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_order_quantity(-6, 1, 3),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_quantity_upper_bound() {
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            })
        );
        assert!(matches!(
            validate_order_quantity(i64::MAX, 1, 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_step_treated_as_one() {
        assert!(validate_order_quantity(7, 0, 0).is_ok());
    }

    #[test]
    fn test_options_without_schema() {
        let mut selected = SelectedOptions::new();
        selected.insert("anything".to_string(), "goes".to_string());
        assert!(validate_options(None, &selected).is_ok());
    }

    #[test]
    fn test_options_against_schema() {
        let schema: OptionSchema = serde_json::from_value(json!({
            "finish": { "choices": ["matte", "gloss"] },
            "name_on_card": { "required": true },
            "notes": {}
        }))
        .unwrap();

        let mut selected = SelectedOptions::new();
        selected.insert("name_on_card".to_string(), "Ada".to_string());
        selected.insert("finish".to_string(), "gloss".to_string());
        assert!(validate_options(Some(&schema), &selected).is_ok());

        selected.insert("finish".to_string(), "satin".to_string());
        assert!(matches!(
            validate_options(Some(&schema), &selected),
            Err(ValidationError::NotAllowed { .. })
        ));

        selected.insert("finish".to_string(), String::new());
        selected.insert("name_on_card".to_string(), String::new());
        assert_eq!(
            validate_options(Some(&schema), &selected),
            Err(ValidationError::Required {
                field: "name_on_card".to_string()
            })
        );

        let mut unknown = SelectedOptions::new();
        unknown.insert("name_on_card".to_string(), "Ada".to_string());
        unknown.insert("foil".to_string(), "gold".to_string());
        assert_eq!(
            validate_options(Some(&schema), &unknown),
            Err(ValidationError::UnknownOption {
                name: "foil".to_string()
            })
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Business Cards").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_vat_and_multiplier() {
        assert!(validate_vat_percent(Decimal::from(18)).is_ok());
        assert!(validate_vat_percent(Decimal::ZERO).is_ok());
        assert!(validate_vat_percent(Decimal::from(101)).is_err());
        assert!(validate_multiplier(Decimal::ZERO).is_ok());
        assert!(validate_multiplier(Decimal::new(-1, 1)).is_err());
        assert!(validate_multiplier(Decimal::from(MAX_MULTIPLIER)).is_ok());
        assert!(matches!(
            validate_multiplier(Decimal::from(MAX_MULTIPLIER + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price("base_price", Money::zero()).is_ok());
        assert!(validate_price("base_price", Money::from_major(MAX_PRICE_MAJOR)).is_ok());
        assert!(matches!(
            validate_price("base_price", Money::from_cents(MAX_PRICE_MAJOR * 100 + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_price("base_price", Money::from_cents(-1)),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_product() {
        let mut product = NewProduct::new("Flyer", Money::from_cents(40));
        assert!(validate_product(&product).is_ok());

        product.qty_step = 0;
        assert!(validate_product(&product).is_err());

        product.qty_step = 1;
        product.base_price = Money::from_major(MAX_PRICE_MAJOR + 1);
        assert!(validate_product(&product).is_err());
        product.base_price = Money::from_cents(40);

        product.qty_step = 1;
        product.pricing = PricingScheme::Attribute(AttributePricing {
            delivery_charge: Some(Money::from_cents(-100)),
            ..Default::default()
        });
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
