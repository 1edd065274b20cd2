//! # Repository Module
//!
//! Database repository implementations for the print shop.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Caller (HTTP handler, job, seed binary)                               │
//! │       │                                                                 │
//! │       │  db.carts().add(&principal, product, size, printing, 2)        │
//! │       ▼                                                                 │
//! │  ┌───────────────┐ ┌───────────────┐ ┌───────────────┐ ┌────────────┐ │
//! │  │ CatalogRepo   │ │ ProductRepo   │ │ CartRepo      │ │ OrderRepo  │ │
//! │  │ categories    │ │ products      │ │ add (upsert)  │ │ place      │ │
//! │  │ subcategories │ │ images        │ │ update/merge  │ │ get        │ │
//! │  │ sizes         │ │ pagination    │ │ remove/list   │ │ list       │ │
//! │  │ printings     │ │               │ │               │ │            │ │
//! │  └───────────────┘ └───────────────┘ └───────┬───────┘ └─────┬──────┘ │
//! │                                              │               │         │
//! │                                  printshop_core::pricing ◄───┘         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row structs are private to each repository. Decimal columns are TEXT
//! and JSON columns are TEXT; both are decoded here and a value that
//! fails to decode surfaces as [`DbError::Corrupt`].

use std::str::FromStr;

use printshop_core::Money;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

pub mod cart;
pub mod catalog;
pub mod order;
pub mod product;

/// Generates a new row ID.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| DbError::corrupt(column, e))
}

pub(crate) fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    parse_decimal(column, raw).map(Money::from_decimal)
}

pub(crate) fn parse_json<T: DeserializeOwned>(column: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::corrupt(column, e))
}

/// Replaces the generic unique-violation detail with the offending value.
pub(crate) fn duplicate_or(err: sqlx::Error, field: &str, value: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate(field, value),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use printshop_core::{
        AttributePricing, Money, NewProduct, PricingScheme, Principal, Printing, Product, Size,
    };
    use rust_decimal::Decimal;

    use crate::pool::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn staff() -> Principal {
        Principal::staff("staff-1")
    }

    /// A variant-priced business card product at 12.40.
    pub async fn variant_product(db: &Database) -> Product {
        let mut input = NewProduct::new("Business Cards", Money::from_cents(1240));
        input.pricing = PricingScheme::Variant;
        db.products().create(&staff(), &input).await.unwrap()
    }

    /// An attribute-priced product: 100.00, 18% VAT, 5 design, 10 delivery.
    pub async fn attribute_product(db: &Database) -> Product {
        let mut input = NewProduct::new("Roll-up Banner", Money::from_major(100));
        input.pricing = PricingScheme::Attribute(AttributePricing {
            vat_percent: Some(Decimal::from(18)),
            additional_design_charge: Some(Money::from_major(5)),
            delivery_charge: Some(Money::from_major(10)),
        });
        db.products().create(&staff(), &input).await.unwrap()
    }

    pub async fn size(db: &Database, name: &str, multiplier: Decimal) -> Size {
        db.catalog()
            .create_size(&staff(), name, multiplier)
            .await
            .unwrap()
    }

    pub async fn printing(db: &Database, quality: &str, multiplier: Decimal) -> Printing {
        db.catalog()
            .create_printing(&staff(), quality, multiplier)
            .await
            .unwrap()
    }
}
