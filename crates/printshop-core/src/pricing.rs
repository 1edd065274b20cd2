//! # Pricing Module
//!
//! Derives order totals from product parameters. Pure: no I/O, no clock,
//! never mutates the product.
//!
//! ## Two Product Families
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PricingScheme::Variant                                                 │
//! │    total = base_price × size.multiplier × printing.multiplier × qty    │
//! │                                                                         │
//! │  PricingScheme::Attribute                                               │
//! │    base          = base_price × qty                                     │
//! │    design        = additional_design_charge × qty                       │
//! │    vat           = (vat_percent / 100) × base                           │
//! │    customization = unit charge × (options with a non-empty value)      │
//! │    total         = base + design + delivery + vat + customization      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Intermediate terms are exact; only `total` is rounded to currency
//! precision.
//!
//! ## Usage
//! ```rust
//! use printshop_core::pricing::{compute_total, PricingPolicy};
//! use printshop_core::{AttributePricing, Money, PricingScheme, SelectedOptions};
//! # use printshop_core::Product;
//! # use rust_decimal::Decimal;
//! # let product = Product {
//! #     id: "p".into(), subcategory_id: None, name: "Flyer".into(),
//! #     base_price: Money::from_major(100), minimum_qty: 1, qty_step: 1,
//! #     option_schema: None,
//! #     pricing: PricingScheme::Attribute(AttributePricing {
//! #         vat_percent: Some(Decimal::from(18)),
//! #         additional_design_charge: Some(Money::from_major(5)),
//! #         delivery_charge: Some(Money::from_major(10)),
//! #     }),
//! #     created_at: chrono::Utc::now(), updated_at: chrono::Utc::now(),
//! # };
//! let total = compute_total(
//!     &product, 3, &SelectedOptions::new(), None, None, &PricingPolicy::default(),
//! ).unwrap();
//! assert_eq!(total, Money::from_major(379));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{AttributePricing, CartLine, PricingScheme, Printing, Product, SelectedOptions, Size};
use crate::validation::{validate_options, validate_order_quantity};

// =============================================================================
// Policy
// =============================================================================

/// Shop-wide pricing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Flat surcharge per populated option.
    pub customization_charge: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            customization_charge: Money::from_cents(100),
        }
    }
}

// =============================================================================
// Breakdown
// =============================================================================

/// Every term of a computed total.
///
/// Variant-priced products only populate `base` (already multiplied) and
/// `total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base: Money,
    pub design: Money,
    pub delivery: Money,
    pub vat: Money,
    pub customization: Money,
    pub total: Money,
}

impl PriceBreakdown {
    fn from_terms(
        base: Money,
        design: Money,
        delivery: Money,
        vat: Money,
        customization: Money,
    ) -> PricingResult<Self> {
        let total = [design, delivery, vat, customization]
            .into_iter()
            .try_fold(base, |acc, term| acc.checked_add(term))
            .ok_or_else(overflow)?
            .round_currency();
        Ok(PriceBreakdown {
            base,
            design,
            delivery,
            vat,
            customization,
            total,
        })
    }
}

/// Calculator result; the only failure is arithmetic overflow.
pub type PricingResult<T> = Result<T, ValidationError>;

// =============================================================================
// Calculators
// =============================================================================

/// `base_price × size × printing × quantity`.
pub fn variant_total(
    base_price: Money,
    size_multiplier: Decimal,
    printing_multiplier: Decimal,
    quantity: i64,
) -> PricingResult<PriceBreakdown> {
    let base = base_price
        .checked_scale(size_multiplier)
        .and_then(|m| m.checked_scale(printing_multiplier))
        .and_then(|m| m.checked_mul_quantity(quantity))
        .ok_or_else(overflow)?;
    PriceBreakdown::from_terms(base, Money::zero(), Money::zero(), Money::zero(), Money::zero())
}

/// Attribute-family total. Missing charges count as zero.
pub fn attribute_total(
    base_price: Money,
    attributes: &AttributePricing,
    quantity: i64,
    options: &SelectedOptions,
    policy: &PricingPolicy,
) -> PricingResult<PriceBreakdown> {
    let base = base_price.checked_mul_quantity(quantity).ok_or_else(overflow)?;
    let design = attributes
        .additional_design_charge
        .unwrap_or_default()
        .checked_mul_quantity(quantity)
        .ok_or_else(overflow)?;
    let delivery = attributes.delivery_charge.unwrap_or_default();
    let vat = base
        .checked_percentage(attributes.vat_percent.unwrap_or_default())
        .ok_or_else(overflow)?;
    let customization = policy
        .customization_charge
        .checked_mul_quantity(populated_options(options))
        .ok_or_else(overflow)?;

    PriceBreakdown::from_terms(base, design, delivery, vat, customization)
}

/// Number of options carrying a non-empty value.
pub fn populated_options(options: &SelectedOptions) -> i64 {
    options.values().filter(|v| !v.is_empty()).count() as i64
}

/// Full price breakdown for an order, after validating quantity and options.
///
/// ## Errors
/// - `Validation(BelowMinimum | StepMismatch | MustBePositive)` - quantity
/// - `Validation(UnknownOption | Required | NotAllowed)` - options
/// - `Validation(Required { field: "size" | "printing" })` - variant family
///   without a complete selection
/// - `Validation(OutOfRange { field: "total" })` - the total does not fit a
///   decimal
pub fn price_order(
    product: &Product,
    quantity: i64,
    options: &SelectedOptions,
    size: Option<&Size>,
    printing: Option<&Printing>,
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, CoreError> {
    validate_order_quantity(quantity, product.minimum_qty, product.qty_step)?;
    validate_options(product.option_schema.as_ref(), options)?;

    match &product.pricing {
        PricingScheme::Variant => {
            let size = size.ok_or_else(|| required("size"))?;
            let printing = printing.ok_or_else(|| required("printing"))?;
            Ok(variant_total(
                product.base_price,
                size.price_multiplier,
                printing.price_multiplier,
                quantity,
            )?)
        }
        PricingScheme::Attribute(attributes) => Ok(attribute_total(
            product.base_price,
            attributes,
            quantity,
            options,
            policy,
        )?),
    }
}

/// Validated order total. See [`price_order`].
pub fn compute_total(
    product: &Product,
    quantity: i64,
    options: &SelectedOptions,
    size: Option<&Size>,
    printing: Option<&Printing>,
    policy: &PricingPolicy,
) -> Result<Money, CoreError> {
    price_order(product, quantity, options, size, printing, policy).map(|b| b.total)
}

/// Current price of a cart line (no options, no quantity rules).
///
/// `Ok(None)` for a variant-priced line that has no size or printing.
pub fn quote_cart_line(
    product: &Product,
    line: &CartLine,
    size: Option<&Size>,
    printing: Option<&Printing>,
    policy: &PricingPolicy,
) -> PricingResult<Option<Money>> {
    let breakdown = match &product.pricing {
        PricingScheme::Variant => {
            let (Some(size), Some(printing)) = (size, printing) else {
                return Ok(None);
            };
            variant_total(
                product.base_price,
                size.price_multiplier,
                printing.price_multiplier,
                line.quantity,
            )?
        }
        PricingScheme::Attribute(attributes) => attribute_total(
            product.base_price,
            attributes,
            line.quantity,
            &SelectedOptions::new(),
            policy,
        )?,
    };
    Ok(Some(breakdown.total))
}

fn required(field: &str) -> CoreError {
    CoreError::Validation(ValidationError::Required {
        field: field.to_string(),
    })
}

fn overflow() -> ValidationError {
    ValidationError::OutOfRange {
        field: "total".to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(pricing: PricingScheme, base_cents: i64) -> Product {
        Product {
            id: "p1".to_string(),
            subcategory_id: None,
            name: "Business Cards".to_string(),
            base_price: Money::from_cents(base_cents),
            minimum_qty: 1,
            qty_step: 1,
            option_schema: None,
            pricing,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn size(multiplier: Decimal) -> Size {
        Size {
            id: "s1".to_string(),
            name: "A4".to_string(),
            price_multiplier: multiplier,
        }
    }

    fn printing(multiplier: Decimal) -> Printing {
        Printing {
            id: "pr1".to_string(),
            quality: "Premium".to_string(),
            price_multiplier: multiplier,
        }
    }

    fn vat_product() -> Product {
        product(
            PricingScheme::Attribute(AttributePricing {
                vat_percent: Some(Decimal::from(18)),
                additional_design_charge: Some(Money::from_major(5)),
                delivery_charge: Some(Money::from_major(10)),
            }),
            10_000,
        )
    }

    #[test]
    fn test_attribute_total_worked_example() {
        // 300 + 15 + 10 + 54 = 379
        let breakdown = price_order(
            &vat_product(),
            3,
            &SelectedOptions::new(),
            None,
            None,
            &PricingPolicy::default(),
        )
        .unwrap();

        assert_eq!(breakdown.base, Money::from_major(300));
        assert_eq!(breakdown.design, Money::from_major(15));
        assert_eq!(breakdown.delivery, Money::from_major(10));
        assert_eq!(breakdown.vat, Money::from_major(54));
        assert!(breakdown.customization.is_zero());
        assert_eq!(breakdown.total, Money::from_major(379));
    }

    #[test]
    fn test_customization_counts_only_populated_options() {
        let mut options = SelectedOptions::new();
        options.insert("finish".to_string(), "gloss".to_string());
        options.insert("corners".to_string(), "rounded".to_string());
        options.insert("notes".to_string(), String::new());

        let total = compute_total(&vat_product(), 3, &options, None, None, &PricingPolicy::default()).unwrap();
        assert_eq!(total, Money::from_major(381));
    }

    #[test]
    fn test_customization_charge_follows_policy() {
        let mut options = SelectedOptions::new();
        options.insert("finish".to_string(), "gloss".to_string());
        let policy = PricingPolicy {
            customization_charge: Money::from_cents(250),
        };

        let total = compute_total(&vat_product(), 3, &options, None, None, &policy).unwrap();
        assert_eq!(total, Money::from_cents(38150));
    }

    #[test]
    fn test_variant_total_is_exact() {
        let cases = [
            (1240, Decimal::new(125, 2), Decimal::new(11, 1), 250),
            (99, Decimal::new(15, 1), Decimal::ONE, 4),
            (1000, Decimal::new(2, 0), Decimal::new(75, 2), 7),
        ];

        for (base_cents, s, p, qty) in cases {
            let expected = Decimal::new(base_cents, 2) * s * p * Decimal::from(qty);
            let total = compute_total(
                &product(PricingScheme::Variant, base_cents),
                qty,
                &SelectedOptions::new(),
                Some(&size(s)),
                Some(&printing(p)),
                &PricingPolicy::default(),
            )
            .unwrap();
            assert_eq!(total.amount(), expected);
        }
    }

    #[test]
    fn test_variant_family_ignores_vat_and_options() {
        let mut options = SelectedOptions::new();
        options.insert("finish".to_string(), "gloss".to_string());

        let total = compute_total(
            &product(PricingScheme::Variant, 1000),
            2,
            &options,
            Some(&size(Decimal::ONE)),
            Some(&printing(Decimal::new(15, 1))),
            &PricingPolicy::default(),
        )
        .unwrap();
        assert_eq!(total, Money::from_major(30));
    }

    #[test]
    fn test_variant_family_requires_size_and_printing() {
        let err = compute_total(
            &product(PricingScheme::Variant, 1000),
            2,
            &SelectedOptions::new(),
            None,
            Some(&printing(Decimal::ONE)),
            &PricingPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { ref field }) if field == "size"
        ));
    }

    #[test]
    fn test_zero_terms_are_not_errors() {
        let free_vat = product(
            PricingScheme::Attribute(AttributePricing {
                vat_percent: Some(Decimal::ZERO),
                ..Default::default()
            }),
            500,
        );
        let total = compute_total(&free_vat, 4, &SelectedOptions::new(), None, None, &PricingPolicy::default()).unwrap();
        assert_eq!(total, Money::from_major(20));

        let total = compute_total(
            &product(PricingScheme::Variant, 500),
            4,
            &SelectedOptions::new(),
            Some(&size(Decimal::ZERO)),
            Some(&printing(Decimal::ONE)),
            &PricingPolicy::default(),
        )
        .unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_quantity_rules_surface_distinct_errors() {
        let mut p = vat_product();
        p.minimum_qty = 5;
        let err = compute_total(&p, 3, &SelectedOptions::new(), None, None, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::BelowMinimum { .. })));

        let mut p = vat_product();
        p.qty_step = 3;
        let err = compute_total(&p, 7, &SelectedOptions::new(), None, None, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::StepMismatch { .. })));
    }

    #[test]
    fn test_pure_and_non_mutating() {
        let p = vat_product();
        let before = p.clone();
        let a = compute_total(&p, 3, &SelectedOptions::new(), None, None, &PricingPolicy::default()).unwrap();
        let b = compute_total(&p, 3, &SelectedOptions::new(), None, None, &PricingPolicy::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(p, before);
    }

    #[test]
    fn test_total_rounds_to_currency() {
        // 0.33 × 1.5 = 0.495 → 0.50
        let total = compute_total(
            &product(PricingScheme::Variant, 33),
            1,
            &SelectedOptions::new(),
            Some(&size(Decimal::new(15, 1))),
            Some(&printing(Decimal::ONE)),
            &PricingPolicy::default(),
        )
        .unwrap();
        assert_eq!(total, Money::from_cents(50));
    }

    #[test]
    fn test_quote_cart_line() {
        let line = CartLine {
            id: "l1".to_string(),
            user_id: "u1".to_string(),
            product_id: "p1".to_string(),
            size_id: None,
            printing_id: None,
            quantity: 2,
            added_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let policy = PricingPolicy::default();

        let variant = product(PricingScheme::Variant, 1000);
        assert_eq!(quote_cart_line(&variant, &line, None, None, &policy), Ok(None));
        assert_eq!(
            quote_cart_line(
                &variant,
                &line,
                Some(&size(Decimal::from(2))),
                Some(&printing(Decimal::ONE)),
                &policy
            ),
            Ok(Some(Money::from_major(40)))
        );

        assert_eq!(
            quote_cart_line(&vat_product(), &line, None, None, &policy),
            Ok(Some(Money::from_cents(25600))) // 200 + 10 + 10 + 36
        );
    }

    #[test]
    fn test_oversized_quantity_is_rejected_before_pricing() {
        let p = product(PricingScheme::Variant, 10_000_000_000);
        let err = compute_total(
            &p,
            i64::MAX,
            &SelectedOptions::new(),
            Some(&size(Decimal::from(999))),
            Some(&printing(Decimal::from(999))),
            &PricingPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "quantity"
        ));
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let huge = Money::from_decimal(Decimal::MAX);

        let err = variant_total(huge, Decimal::from(999), Decimal::ONE, 2).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "total"));

        let attributes = AttributePricing {
            delivery_charge: Some(huge),
            ..Default::default()
        };
        let err = attribute_total(
            huge,
            &attributes,
            1,
            &SelectedOptions::new(),
            &PricingPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));

        let mut big = product(PricingScheme::Variant, 1000);
        big.base_price = huge;
        let err = compute_total(
            &big,
            1_000,
            &SelectedOptions::new(),
            Some(&size(Decimal::from(999))),
            Some(&printing(Decimal::from(999))),
            &PricingPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
    }
}
