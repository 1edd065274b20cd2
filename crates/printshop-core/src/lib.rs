//! # printshop-core: Pure Business Logic for the Print Shop
//!
//! This crate contains the pricing and validation rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Printshop Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        HTTP / session layer (outside this workspace)            │   │
//! │  │    builds a Principal, calls repositories, maps errors          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ printshop-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  compute_ │  │ quantity  │  │   │
//! │  │   │ CartLine  │  │ (Decimal) │  │   total   │  │  options  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 printshop-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, cart upsert, orders          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, Order, Principal, ...)
//! - [`money`] - Money type over exact decimals (no floating point!)
//! - [`pricing`] - Order total computation for both product families
//! - [`validation`] - Quantity, option and catalogue validation
//! - [`pagination`] - Page requests and pages
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use printshop_core::validation::validate_order_quantity;
//! use printshop_core::Money;
//! use rust_decimal::Decimal;
//!
//! validate_order_quantity(250, 50, 50).unwrap();
//!
//! let unit = Money::from_cents(1240);
//! let total = unit
//!     .checked_scale(Decimal::new(125, 2))
//!     .and_then(|m| m.checked_mul_quantity(250))
//!     .unwrap();
//! assert_eq!(total.round_currency().to_string(), "3875.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pagination;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pagination::{Page, PageRequest};
pub use pricing::{compute_total, PriceBreakdown, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a list request does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 20;

/// Largest quantity of one cart line or order.
///
/// Also enforced by the `cart_lines` CHECK constraint.
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;

/// Largest base price or per-product charge, in whole currency units.
pub const MAX_PRICE_MAJOR: i64 = 1_000_000;

/// Largest size or printing multiplier.
pub const MAX_MULTIPLIER: i64 = 1_000;
