//! # Domain Types
//!
//! Core domain types used throughout the print shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Category ──► Subcategory ──► Product ──► ProductImage                  │
//! │                                  │                                      │
//! │                           PricingScheme                                 │
//! │                        ┌─────────┴──────────┐                           │
//! │                     Variant            Attribute                        │
//! │               (Size × Printing)   (VAT, design, delivery)               │
//! │                                                                         │
//! │  Principal ──► CartLine   (unique by user, product, size, printing)    │
//! │            └─► Order      (total derived, never mutated)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are UUID v4 strings, as stored in SQLite.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Principal
// =============================================================================

/// The authenticated caller of an operation.
///
/// Session handling lives outside this workspace; whoever authenticated the
/// request builds a `Principal` and passes it into every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    /// Staff flag: may manage the catalogue and read every order.
    pub is_authorized: bool,
}

impl Principal {
    /// A regular customer.
    pub fn customer(user_id: impl Into<String>) -> Self {
        Principal {
            user_id: user_id.into(),
            is_authorized: false,
        }
    }

    /// A staff member.
    pub fn staff(user_id: impl Into<String>) -> Self {
        Principal {
            user_id: user_id.into(),
            is_authorized: true,
        }
    }

    /// Fails with [`CoreError::Forbidden`] unless the principal is staff.
    pub fn require_authorized(&self, action: &str) -> Result<(), CoreError> {
        if self.is_authorized {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "user {} may not {}",
                self.user_id, action
            )))
        }
    }
}

// =============================================================================
// Catalogue
// =============================================================================

/// Top-level product grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Storage path of the category image (uploads are handled elsewhere).
    pub image: String,
    pub thumbnail: String,
}

/// Second-level grouping under a [`Category`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    pub parent_category_id: String,
    pub image: String,
    pub thumbnail: String,
}

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: String,
    pub product_id: String,
    pub image: String,
    pub thumbnail: String,
}

// =============================================================================
// Variant Axes
// =============================================================================

/// Paper size; multiplies the base price of variant-priced products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub id: String,
    pub name: String,
    pub price_multiplier: Decimal,
}

/// Printing quality; multiplies the base price of variant-priced products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printing {
    pub id: String,
    pub quality: String,
    pub price_multiplier: Decimal,
}

// =============================================================================
// Product
// =============================================================================

/// Extra charges of an attribute-priced product. Absent values count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributePricing {
    /// Human-readable percentage: 18 means 18%.
    pub vat_percent: Option<Decimal>,
    /// Charged once per unit ordered.
    pub additional_design_charge: Option<Money>,
    /// Charged once per order.
    pub delivery_charge: Option<Money>,
}

/// How a product's total is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingScheme {
    /// `base × size multiplier × printing multiplier × quantity`.
    Variant,
    /// `base + design + delivery + VAT + customization`.
    Attribute(AttributePricing),
}

impl PricingScheme {
    /// Storage tag of the scheme.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingScheme::Variant => "variant",
            PricingScheme::Attribute(_) => "attribute",
        }
    }
}

impl Default for PricingScheme {
    fn default() -> Self {
        PricingScheme::Attribute(AttributePricing::default())
    }
}

/// Free-form option schema: option name → definition.
///
/// Definitions are arbitrary JSON. Two keys are understood by validation:
/// `"required": true` and `"choices": [..]`.
pub type OptionSchema = BTreeMap<String, serde_json::Value>;

/// Options chosen for an order: option name → value.
pub type SelectedOptions = BTreeMap<String, String>;

/// A product available for order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub subcategory_id: Option<String>,
    pub name: String,
    /// Price of one unit before multipliers and charges.
    pub base_price: Money,
    /// Smallest quantity that may be ordered.
    pub minimum_qty: i64,
    /// Ordered quantity must be a multiple of this.
    pub qty_step: i64,
    pub option_schema: Option<OptionSchema>,
    pub pricing: PricingScheme,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub subcategory_id: Option<String>,
    pub name: String,
    pub base_price: Money,
    #[serde(default = "default_one")]
    pub minimum_qty: i64,
    #[serde(default = "default_one")]
    pub qty_step: i64,
    #[serde(default)]
    pub option_schema: Option<OptionSchema>,
    #[serde(default)]
    pub pricing: PricingScheme,
}

fn default_one() -> i64 {
    1
}

impl NewProduct {
    /// Attribute-priced product with no extra charges and default quantities.
    pub fn new(name: impl Into<String>, base_price: Money) -> Self {
        NewProduct {
            subcategory_id: None,
            name: name.into(),
            base_price,
            minimum_qty: 1,
            qty_step: 1,
            option_schema: None,
            pricing: PricingScheme::default(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One product + variant selection in a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub size_id: Option<String>,
    pub printing_id: Option<String>,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of adding to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartAddOutcome {
    pub line: CartLine,
    /// `true` when a new line was inserted, `false` when an existing one grew.
    pub created: bool,
}

/// A cart line together with its current price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedCartLine {
    pub line: CartLine,
    /// `None` when a variant-priced line has no size or printing yet.
    pub line_total: Option<Money>,
}

/// A user's cart with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<PricedCartLine>,
    pub total_quantity: i64,
    /// Sum of all priced lines.
    pub total: Money,
}

impl CartSummary {
    pub fn from_lines(lines: Vec<PricedCartLine>) -> Self {
        let total_quantity: i64 = lines.iter().map(|l| l.line.quantity).sum();
        let total: Money = lines.iter().filter_map(|l| l.line_total).sum();
        CartSummary {
            lines,
            total_quantity,
            total,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// Status every order is placed with.
pub const ORDER_STATUS_PENDING: &str = "Pending";

/// How the customer hands over their design files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOption {
    /// Files attached to the order (see [`Order::files`]).
    Online,
    /// Files sent separately by email.
    Email,
}

impl FileOption {
    pub const ALL: [FileOption; 2] = [FileOption::Online, FileOption::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileOption::Online => "online",
            FileOption::Email => "email",
        }
    }
}

impl fmt::Display for FileOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileOption::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "file_option".to_string(),
                allowed: FileOption::ALL.iter().map(|o| o.as_str().to_string()).collect(),
            })
    }
}

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub size_id: Option<String>,
    pub printing_id: Option<String>,
    pub quantity: i64,
    pub options: SelectedOptions,
    pub shipping_address: Option<serde_json::Value>,
    pub billing_address: Option<serde_json::Value>,
    /// References to uploaded design files.
    pub files: Vec<String>,
    pub special_remark: Option<String>,
    pub file_option: Option<FileOption>,
    /// Always computed by the pricing module.
    pub total_amount: Money,
    /// [`ORDER_STATUS_PENDING`] when placed.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Checkout request. Deliberately has no total: the total is derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: String,
    pub size_id: Option<String>,
    pub printing_id: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub options: SelectedOptions,
    #[serde(default)]
    pub shipping_address: Option<serde_json::Value>,
    #[serde(default)]
    pub billing_address: Option<serde_json::Value>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub special_remark: Option<String>,
    #[serde(default)]
    pub file_option: Option<FileOption>,
}

// =============================================================================
// Unit Tests
// =============================================================================
