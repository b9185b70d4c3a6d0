use std::fmt;
use std::ops::{Add, Sub};

use super::error::DomainError;

/// Trait representing a monetary amount with fixed precision
pub trait AmountType:
    Copy
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Default
    + Send
    + Sync
    + fmt::Debug
    + fmt::Display
    + 'static
{
    /// Parse from decimal string (e.g., "1.5000")
    fn from_decimal_str(s: &str) -> Result<Self, DomainError>;

    /// Convert to decimal string with 4 decimal places
    fn to_decimal_string(&self) -> String;

    /// Whole currency units (fees are configured this way)
    fn from_units(units: i64) -> Self;

    /// Checked addition, returns None on overflow
    fn checked_add(&self, other: Self) -> Option<Self>;

    /// Checked subtraction, returns None on underflow
    fn checked_sub(&self, other: Self) -> Option<Self>;

    /// Divide by a count, rounding half away from zero. None when `count` is zero.
    fn checked_div_count(&self, count: usize) -> Option<Self>;

    /// Zero value
    fn zero() -> Self;
}

/// Fixed-point decimal representation using i64 (multiply by 10,000)
/// Represents amounts with 4 decimal places of precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct FixedPoint(i64);

impl FixedPoint {
    const SCALE: i64 = 10_000;

    /// Create from raw scaled value (for internal use)
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Get raw scaled value
    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl AmountType for FixedPoint {
    fn from_decimal_str(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        let invalid = || DomainError::InvalidAmount(s.to_string());

        let (is_negative, digits) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };

        let (integer_part, decimal_part) = match digits.split_once('.') {
            Some((int, dec)) if !dec.contains('.') => (int, dec),
            Some(_) => return Err(invalid()),
            None => (digits, ""),
        };

        if integer_part.is_empty() || decimal_part.len() > 4 {
            return Err(invalid());
        }
        if !integer_part.bytes().all(|b| b.is_ascii_digit())
            || !decimal_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let integer: i64 = integer_part.parse().map_err(|_| DomainError::Overflow)?;
        let decimal: i64 = format!("{:0<4}", decimal_part)
            .parse()
            .map_err(|_| invalid())?;

        let scaled = integer
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(decimal))
            .ok_or(DomainError::Overflow)?;

        Ok(Self(if is_negative { -scaled } else { scaled }))
    }

    fn to_decimal_string(&self) -> String {
        let abs_value = self.0.unsigned_abs();
        let scale = Self::SCALE as u64;
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:04}", sign, abs_value / scale, abs_value % scale)
    }

    fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(Self::SCALE))
    }

    fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    fn checked_div_count(&self, count: usize) -> Option<Self> {
        let divisor = i128::try_from(count).ok().filter(|d| *d > 0)?;
        let raw = i128::from(self.0);
        let half = divisor / 2;
        let rounded = if raw >= 0 {
            (raw + half) / divisor
        } else {
            (raw - half) / divisor
        };
        i64::try_from(rounded).ok().map(Self)
    }

    fn zero() -> Self {
        Self(0)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for FixedPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_balances_as_stored() {
        assert_eq!(
            FixedPoint::from_decimal_str("587").unwrap(),
            FixedPoint(5_870_000)
        );
        assert_eq!(
            FixedPoint::from_decimal_str("1234.5").unwrap(),
            FixedPoint(12_345_000)
        );
        assert_eq!(
            FixedPoint::from_decimal_str("0.0001").unwrap(),
            FixedPoint(1)
        );
        assert_eq!(
            FixedPoint::from_decimal_str("  20.25 ").unwrap(),
            FixedPoint(202_500)
        );
    }

    #[test]
    fn parse_negative_amounts() {
        assert_eq!(
            FixedPoint::from_decimal_str("-10").unwrap(),
            FixedPoint(-100_000)
        );
    }

    #[test]
    fn reject_malformed_amounts() {
        for input in ["", "abc", "1.2.3", "1..2", ".5", "1.00001", "+5", "1e3"] {
            assert!(
                matches!(
                    FixedPoint::from_decimal_str(input),
                    Err(DomainError::InvalidAmount(_))
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn reject_out_of_range_amounts() {
        assert_eq!(
            FixedPoint::from_decimal_str("922337203685478"),
            Err(DomainError::Overflow)
        );
    }

    #[test]
    fn display_uses_four_decimal_places() {
        assert_eq!(FixedPoint(720_000).to_string(), "72.0000");
        assert_eq!(FixedPoint(1).to_string(), "0.0001");
        assert_eq!(FixedPoint(-15_000).to_string(), "-1.5000");
        assert_eq!(FixedPoint(i64::MIN).to_string(), "-922337203685477.5808");
    }

    #[test]
    fn from_units_scales_whole_amounts() {
        assert_eq!(FixedPoint::from_units(1), FixedPoint(10_000));
        assert_eq!(FixedPoint::from_units(8), FixedPoint(80_000));
    }

    #[test]
    fn checked_arithmetic_detects_overflow() {
        assert_eq!(FixedPoint(i64::MAX).checked_add(FixedPoint(1)), None);
        assert_eq!(FixedPoint(i64::MIN).checked_sub(FixedPoint(1)), None);
        assert_eq!(
            FixedPoint(10_000).checked_sub(FixedPoint(2_500)),
            Some(FixedPoint(7_500))
        );
    }

    #[test]
    fn division_rounds_half_away_from_zero() {
        assert_eq!(FixedPoint(10).checked_div_count(4), Some(FixedPoint(3)));
        assert_eq!(FixedPoint(9).checked_div_count(4), Some(FixedPoint(2)));
        assert_eq!(FixedPoint(-10).checked_div_count(4), Some(FixedPoint(-3)));
        assert_eq!(
            FixedPoint(1_000_000).checked_div_count(3),
            Some(FixedPoint(333_333))
        );
    }

    #[test]
    fn division_by_zero_count_is_none() {
        assert_eq!(FixedPoint(10_000).checked_div_count(0), None);
    }

    #[test]
    fn ordering_works() {
        assert!(FixedPoint(10_000) > FixedPoint(5_000));
        assert_eq!(FixedPoint::default(), FixedPoint::zero());
    }
}
