//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Fixed-Point Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Print pricing multiplies by fractional factors:                        │
//! │    12.40 × 1.25 (A3) × 1.10 (premium) × 250 copies                     │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Every intermediate value is exact; only the final total is rounded  │
//! │    to currency precision (2 dp, round half to even).                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use printshop_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line, Money::from_cents(3297));
//!
//! let scaled = price.checked_scale(Decimal::new(15, 1)).unwrap(); // × 1.5
//! assert_eq!(scaled.round_currency(), Money::from_cents(1648));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Number of fractional digits of a stored amount.
pub const CURRENCY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value held as an exact decimal.
///
/// ## Design Decisions
/// - **Decimal, not cents**: multipliers (1.25) and percentages (18%) are
///   applied exactly before the total is rounded once
/// - **Serialized as a string**: `"12.50"` survives JSON untouched
///
/// ## Where Money flows
/// ```text
/// Product.base_price ──┬──► PriceBreakdown.base ──► PriceBreakdown.total
///                      │                                   │
///  design / delivery ──┘                                   ▼
///                                                   Order.total_amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ```rust
    /// use printshop_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_DECIMALS))
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ```rust
    /// use printshop_core::money::Money;
    ///
    /// let unit = Money::from_cents(299);
    /// assert_eq!(unit.checked_mul_quantity(3), Some(Money::from_cents(897)));
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Multiplies money by an exact factor (size or printing multiplier).
    /// `None` on overflow.
    #[inline]
    pub fn checked_scale(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Returns `percent`% of this amount, where `percent` is human-readable
    /// (18 means 18%). `None` on overflow.
    ///
    /// ```rust
    /// use printshop_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let base = Money::from_major(300);
    /// assert_eq!(base.checked_percentage(Decimal::from(18)), Some(Money::from_major(54)));
    /// ```
    #[inline]
    pub fn checked_percentage(&self, percent: Decimal) -> Option<Self> {
        (percent / Decimal::ONE_HUNDRED).checked_mul(self.0).map(Money)
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Rounds to currency precision using round half to even.
    ///
    /// ```text
    /// 0.125 → 0.12     0.135 → 0.14     (ties go to the even cent)
    /// ```
    pub fn round_currency(&self) -> Self {
        let mut rounded = self
            .0
            .round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(CURRENCY_DECIMALS);
        Money(rounded)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two fractional digits, no currency symbol (the symbol is a display concern).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.round_currency().0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
