//! # Money Module
//!
//! Decimal helpers for monetary values.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Rounding once at the end only hides this for small values.            │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal from the first multiplication     │
//! │    0.1 + 0.2 = 0.3 exactly                                             │
//! │    Rounding to the minor unit happens once, on the final figures       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use homebase_core::money::{percent_of, round_minor};
//! use rust_decimal::Decimal;
//!
//! let amount = Decimal::new(99999, 2); // 999.99
//! let vat = percent_of(amount, Decimal::from(25));
//! assert_eq!(round_minor(vat), Decimal::new(25000, 2)); // 249.9975 → 250.00
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in the currency minor unit (öre, cents).
pub const MINOR_UNIT_DP: u32 = 2;

/// Rounds a value to the currency minor unit.
///
/// Midpoints round away from zero, so `0.125 → 0.13` and `-0.125 → -0.13`.
#[inline]
pub fn round_minor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `amount × percent / 100` without any rounding.
///
/// ## Example
/// ```rust
/// use homebase_core::money::percent_of;
/// use rust_decimal::Decimal;
///
/// assert_eq!(percent_of(Decimal::from(1000), Decimal::from(10)), Decimal::from(100));
/// ```
#[inline]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

/// One minor unit (0.01).
#[inline]
pub fn minor_unit() -> Decimal {
    Decimal::new(1, MINOR_UNIT_DP)
}

/// Checks that two amounts differ by at most one minor unit.
pub fn within_minor_unit(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= minor_unit()
}

// =============================================================================
// Unit Tests
// =============================================================================
