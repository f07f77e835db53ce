// ============================================================================
// Fixed-Point Decimal
// Integer-backed decimal with compile-time precision
// ============================================================================

use super::errors::{NumericError, NumericResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed-point decimal number with compile-time precision.
///
/// Internally stores `value × 10^DECIMALS` as an i64, so comparison and
/// ordering are plain integer operations.
///
/// # Example
/// ```
/// use order_match::numeric::Price;
///
/// let price: Price = "100.25".parse().unwrap();
/// assert_eq!(price.raw_value(), 10_025);
/// assert_eq!(price.to_string(), "100.25");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[repr(transparent)]
pub struct FixedDecimal<const DECIMALS: u8 = 2>(i64);

/// Compute 10^n at compile time
const fn pow10(n: u8) -> i64 {
    let mut result: i64 = 1;
    let mut i = 0;
    while i < n {
        result *= 10;
        i += 1;
    }
    result
}

impl<const D: u8> FixedDecimal<D> {
    /// The scale factor (10^DECIMALS)
    pub const SCALE: i64 = pow10(D);

    pub const ZERO: Self = Self(0);

    pub const ONE: Self = Self(pow10(D));

    pub const MAX: Self = Self(i64::MAX);

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create from a value already expressed in minor units.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from a whole number of major units.
    #[inline]
    pub fn from_integer(value: i64) -> NumericResult<Self> {
        value
            .checked_mul(Self::SCALE)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Create from integer and fractional parts, e.g. `(12, 5)` is `12.05`
    /// with two decimals. The fraction must be below `SCALE`.
    #[inline]
    pub fn from_parts(integer: i64, fraction: u64) -> NumericResult<Self> {
        if fraction >= Self::SCALE as u64 {
            return Err(NumericError::InvalidInput);
        }

        let int_scaled = integer
            .checked_mul(Self::SCALE)
            .ok_or(NumericError::Overflow)?;

        let frac_signed = if integer < 0 {
            -(fraction as i64)
        } else {
            fraction as i64
        };

        int_scaled
            .checked_add(frac_signed)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The value in minor units.
    #[inline]
    pub const fn raw_value(self) -> i64 {
        self.0
    }

    /// Integer part, truncated toward zero.
    #[inline]
    const fn integer_part(self) -> i64 {
        self.0 / Self::SCALE
    }

    #[inline]
    const fn fractional_part(self) -> u64 {
        (self.0 % Self::SCALE).unsigned_abs()
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True when `self` lies on the grid spanned by `step`.
    /// A non-positive step has no grid and always returns false.
    #[inline]
    pub fn is_multiple_of(self, step: Self) -> bool {
        step.0 > 0 && self.0 % step.0 == 0
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    #[inline]
    pub fn checked_add(self, rhs: Self) -> NumericResult<Self> {
        self.0.checked_add(rhs.0).map(Self).ok_or({
            if rhs.0 > 0 {
                NumericError::Overflow
            } else {
                NumericError::Underflow
            }
        })
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> NumericResult<Self> {
        self.0.checked_sub(rhs.0).map(Self).ok_or({
            if rhs.0 < 0 {
                NumericError::Overflow
            } else {
                NumericError::Underflow
            }
        })
    }

    /// Multiply by a whole number (a volume, typically). No rescaling needed.
    #[inline]
    pub fn checked_mul_int(self, rhs: u64) -> NumericResult<Self> {
        let rhs = i64::try_from(rhs).map_err(|_| NumericError::Overflow)?;
        self.0
            .checked_mul(rhs)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    // ========================================================================
    // rust_decimal conversion (API boundary only)
    // ========================================================================

    /// Convert from `rust_decimal::Decimal`.
    ///
    /// # Errors
    /// - `PrecisionLoss` if `d` has more fractional digits than `DECIMALS`
    /// - `Overflow` if the scaled value does not fit in an i64
    pub fn from_decimal(d: Decimal) -> NumericResult<Self> {
        if d.round_dp(D as u32) != d {
            return Err(NumericError::PrecisionLoss);
        }

        d.checked_mul(Decimal::from(Self::SCALE))
            .and_then(|scaled| scaled.to_i64())
            .map(Self)
            .ok_or(NumericError::Overflow)
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl<const D: u8> Default for FixedDecimal<D> {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const D: u8> fmt::Debug for FixedDecimal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedDecimal<{}>({})", D, self)
    }
}

impl<const D: u8> fmt::Display for FixedDecimal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int_part = self.integer_part();
        let frac_part = self.fractional_part();

        if D == 0 {
            write!(f, "{}", int_part)
        } else if self.0 < 0 && int_part == 0 {
            write!(f, "-0.{:0>width$}", frac_part, width = D as usize)
        } else {
            write!(f, "{}.{:0>width$}", int_part, frac_part, width = D as usize)
        }
    }
}

impl<const D: u8> FromStr for FixedDecimal<D> {
    type Err = NumericError;

    /// Parse a plain decimal string such as `"100"`, `"99.5"` or `"-0.01"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s.trim()).map_err(|_| NumericError::InvalidInput)?;
        Self::from_decimal(d)
    }
}

// ============================================================================
// Type Aliases
// ============================================================================

/// Price in minor units with two decimal places (cents).
pub type Price = FixedDecimal<2>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Price::SCALE, 100);
        assert_eq!(Price::ONE.raw_value(), 100);
        assert_eq!(FixedDecimal::<4>::SCALE, 10_000);
    }

    #[test]
    fn test_from_integer_and_parts() {
        let x = Price::from_integer(100).unwrap();
        assert_eq!(x.raw_value(), 10_000);

        let y = Price::from_parts(3, 40).unwrap();
        assert_eq!(y.to_string(), "3.40");

        let neg = Price::from_parts(-5, 50).unwrap();
        assert_eq!(neg.raw_value(), -550);

        assert_eq!(Price::from_parts(1, 100), Err(NumericError::InvalidInput));
        assert_eq!(Price::from_integer(i64::MAX), Err(NumericError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_integer(100).unwrap().to_string(), "100.00");
        assert_eq!(Price::from_raw(5).to_string(), "0.05");
        assert_eq!(Price::from_raw(-5).to_string(), "-0.05");
        assert_eq!(FixedDecimal::<0>::from_raw(42).to_string(), "42");
    }

    #[test]
    fn test_from_str() {
        let p: Price = "105".parse().unwrap();
        assert_eq!(p, Price::from_integer(105).unwrap());

        let p: Price = " 3.4 ".parse().unwrap();
        assert_eq!(p.raw_value(), 340);

        let p: Price = "-0.01".parse().unwrap();
        assert!(!p.is_positive());
        assert_eq!(p.raw_value(), -1);
    }

    #[test]
    fn test_from_str_invalid() {
        assert_eq!("abc".parse::<Price>(), Err(NumericError::InvalidInput));
        assert_eq!("".parse::<Price>(), Err(NumericError::InvalidInput));
        assert_eq!("1.234".parse::<Price>(), Err(NumericError::PrecisionLoss));
        // Trailing zeros beyond the scale carry no information
        assert_eq!("1.2300".parse::<Price>().unwrap().raw_value(), 123);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Price::from_integer(100).unwrap();
        let b = Price::from_integer(30).unwrap();
        assert_eq!(a.checked_sub(b).unwrap(), Price::from_integer(70).unwrap());
        assert_eq!(a.checked_add(b).unwrap(), Price::from_integer(130).unwrap());
        assert_eq!(Price::MAX.checked_add(Price::ONE), Err(NumericError::Overflow));
        assert_eq!(
            Price::from_raw(i64::MIN).checked_sub(Price::ONE),
            Err(NumericError::Underflow)
        );

        let notional = Price::from_parts(2, 50).unwrap().checked_mul_int(4).unwrap();
        assert_eq!(notional, Price::from_integer(10).unwrap());
        assert_eq!(Price::MAX.checked_mul_int(2), Err(NumericError::Overflow));
    }

    #[test]
    fn test_ordering() {
        let low = Price::from_integer(99).unwrap();
        let high = Price::from_integer(100).unwrap();
        assert!(low < high);
        assert_eq!(low.max(high), high);
    }

    #[test]
    fn test_tick_grid() {
        let tick = Price::from_parts(0, 5).unwrap();
        assert!(Price::from_parts(1, 15).unwrap().is_multiple_of(tick));
        assert!(!Price::from_parts(1, 12).unwrap().is_multiple_of(tick));
        assert!(!Price::ONE.is_multiple_of(Price::ZERO));
    }

    #[test]
    fn test_from_decimal() {
        let d = Decimal::new(12345, 2);
        let p = Price::from_decimal(d).unwrap();
        assert_eq!(p.raw_value(), 12345);
        assert_eq!(
            Price::from_decimal(Decimal::new(12345, 3)),
            Err(NumericError::PrecisionLoss)
        );
    }
}
