//! Exact decimal arithmetic for exchange prices
//!
//! Prices arrive as unsigned decimal literals (`"0.01234"`, `"65000.50"`). They
//! are held as a scaled integer so that the product of two prices is exact and
//! can be rendered back with exactly as many fractional digits as both inputs
//! carried together.

use ethers::types::{U256, U512};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Significand width accepted for a parsed price.
///
/// [`DecimalValue`] carries 512 bits, so the product of two parsed prices is
/// always exact.
pub const WORKING_PRECISION_BITS: usize = 256;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecimalError {
    #[error("contains characters other than ASCII digits and a single '.'")]
    NotNumeric,
    #[error("has no digits")]
    NoDigits,
    #[error("exceeds the {}-bit working precision", WORKING_PRECISION_BITS)]
    PrecisionExceeded,
    #[error("is not strictly positive")]
    NonPositive,
    #[error("cannot be rendered with {0} fractional digits")]
    Unrenderable(u32),
}

/// Rejects anything but ASCII digits with at most one `.`.
///
/// Runs before numeric parsing so signs, exponents, whitespace and unicode
/// digits never reach the parser.
pub fn validate_literal(literal: &str) -> Result<(), DecimalError> {
    let mut seen_point = false;
    for byte in literal.bytes() {
        match byte {
            b'0'..=b'9' => {}
            b'.' if !seen_point => seen_point = true,
            _ => return Err(DecimalError::NotNumeric),
        }
    }
    Ok(())
}

/// Number of fractional digits carried into the rendered result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PrecisionBudget(u32);

impl PrecisionBudget {
    /// Characters after the `.` of a literal, 0 when there is none
    pub fn of_literal(literal: &str) -> Self {
        let digits = literal
            .split_once('.')
            .map_or(0, |(_, fraction)| fraction.len());
        Self(u32::try_from(digits).unwrap_or(u32::MAX))
    }

    pub fn digits(self) -> u32 {
        self.0
    }
}

impl Add for PrecisionBudget {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

/// Unsigned decimal number, `significand / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValue {
    significand: U512,
    scale: u32,
}

impl DecimalValue {
    /// Parses a validated decimal literal without rounding.
    pub fn parse(literal: &str) -> Result<Self, DecimalError> {
        validate_literal(literal)?;

        let (integer, fraction) = literal.split_once('.').unwrap_or((literal, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(DecimalError::NoDigits);
        }

        let digits = [integer, fraction].concat();
        let digits = digits.trim_start_matches('0');
        let significand = if digits.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(digits).map_err(|_| DecimalError::PrecisionExceeded)?
        };
        if significand.bits() > WORKING_PRECISION_BITS {
            return Err(DecimalError::PrecisionExceeded);
        }

        let scale = u32::try_from(fraction.len()).map_err(|_| DecimalError::PrecisionExceeded)?;
        Ok(Self {
            significand: U512::from(significand),
            scale,
        })
    }

    /// [`parse`](Self::parse), additionally requiring a value above zero.
    pub fn parse_positive(literal: &str) -> Result<Self, DecimalError> {
        let value = Self::parse(literal)?;
        if !value.is_positive() {
            return Err(DecimalError::NonPositive);
        }
        Ok(value)
    }

    pub fn is_positive(&self) -> bool {
        !self.significand.is_zero()
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Exact product.
    ///
    /// Two parsed prices always multiply; `None` only when an operand is itself
    /// a product wide enough to leave 512 bits.
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        let significand = self.significand.checked_mul(rhs.significand)?;
        Some(Self {
            significand,
            scale: self.scale.checked_add(rhs.scale)?,
        })
    }

    /// Fixed-point rendering with exactly `frac_digits` fractional digits.
    ///
    /// Dropped digits are rounded half to even; missing ones are zero-filled.
    pub fn to_fixed(&self, frac_digits: u32) -> Result<String, DecimalError> {
        let significand = match frac_digits.cmp(&self.scale) {
            Ordering::Equal => self.significand,
            Ordering::Greater => pow10(frac_digits - self.scale)
                .and_then(|factor| self.significand.checked_mul(factor))
                .ok_or(DecimalError::Unrenderable(frac_digits))?,
            Ordering::Less => match pow10(self.scale - frac_digits) {
                Some(divisor) => round_half_even(self.significand, divisor),
                // divisor is wider than any significand, which rounds to zero
                None => U512::zero(),
            },
        };

        let digits = significand.to_string();
        if frac_digits == 0 {
            return Ok(digits);
        }

        let frac = usize::try_from(frac_digits).map_err(|_| DecimalError::Unrenderable(frac_digits))?;
        let padded = format!("{:0>width$}", digits, width = frac + 1);
        let (integer, fraction) = padded.split_at(padded.len() - frac);
        Ok(format!("{integer}.{fraction}"))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_fixed(self.scale) {
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Strips trailing fractional zeros and a dangling `.`.
///
/// Only the fractional part is touched; `"0"` and integer renderings are
/// returned as they are.
pub fn canonicalize(rendered: &str) -> &str {
    if rendered == "0" || !rendered.contains('.') {
        return rendered;
    }
    let trimmed = rendered.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed)
}

fn pow10(exponent: u32) -> Option<U512> {
    (0..exponent).try_fold(U512::one(), |acc, _| acc.checked_mul(U512::from(10u8)))
}

fn round_half_even(value: U512, divisor: U512) -> U512 {
    let (quotient, remainder) = value.div_mod(divisor);
    match remainder.cmp(&(divisor - remainder)) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + U512::one(),
        Ordering::Equal if quotient.low_u64() & 1 == 1 => quotient + U512::one(),
        Ordering::Equal => quotient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(literal: &str) -> DecimalValue {
        DecimalValue::parse(literal).unwrap()
    }

    #[test]
    fn test_validate_literal() {
        for ok in ["0", "12", "1.5", ".5", "5.", "000.000", ""] {
            assert!(validate_literal(ok).is_ok(), "{ok}");
        }
        for bad in ["-1", "+1", "1e5", "1.2.3", " 1", "1,5", "١", "0x10", "NaN"] {
            assert_eq!(validate_literal(bad), Err(DecimalError::NotNumeric), "{bad}");
        }
    }

    #[test]
    fn test_parse_rejects_before_numeric_parsing() {
        assert_eq!(DecimalValue::parse("1.0.0"), Err(DecimalError::NotNumeric));
        assert_eq!(DecimalValue::parse(""), Err(DecimalError::NoDigits));
        assert_eq!(DecimalValue::parse("."), Err(DecimalError::NoDigits));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(DecimalValue::parse_positive("0"), Err(DecimalError::NonPositive));
        assert_eq!(DecimalValue::parse_positive("0.000"), Err(DecimalError::NonPositive));
        assert!(DecimalValue::parse_positive("0.00000001").is_ok());
        assert!(DecimalValue::parse_positive(".5").is_ok());
        assert!(DecimalValue::parse_positive("5.").is_ok());
    }

    #[test]
    fn test_parse_keeps_literal_scale() {
        assert_eq!(dec("65000.50").scale(), 2);
        assert_eq!(dec("1").scale(), 0);
        assert_eq!(dec("5.").scale(), 0);
        assert_eq!(dec("65000.50").to_string(), "65000.50");
        assert_eq!(dec("007.10").to_string(), "7.10");
        assert_eq!(dec(".5").to_string(), "0.5");
    }

    #[test]
    fn test_parse_working_precision_limit() {
        // 2^256 - 1 has 78 digits and still fits
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert!(DecimalValue::parse(max).is_ok());
        let over = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_eq!(DecimalValue::parse(over), Err(DecimalError::PrecisionExceeded));
        // leading zeros do not count against the significand
        let padded = format!("0000000000{max}");
        assert!(DecimalValue::parse(&padded).is_ok());
    }

    #[test]
    fn test_precision_budget() {
        assert_eq!(PrecisionBudget::of_literal("0.01234").digits(), 5);
        assert_eq!(PrecisionBudget::of_literal("65000.50").digits(), 2);
        assert_eq!(PrecisionBudget::of_literal("100").digits(), 0);
        assert_eq!(PrecisionBudget::of_literal("100.").digits(), 0);
        let total = PrecisionBudget::of_literal("0.01234") + PrecisionBudget::of_literal("65000.50");
        assert_eq!(total.digits(), 7);
    }

    #[test]
    fn test_product_is_exact() {
        let product = dec("0.01234").checked_mul(&dec("65000.50")).unwrap();
        assert_eq!(product.scale(), 7);
        assert_eq!(product.to_fixed(7).unwrap(), "802.1061700");

        let product = dec("1.00").checked_mul(&dec("1")).unwrap();
        assert_eq!(product.to_fixed(2).unwrap(), "1.00");
    }

    #[test]
    fn test_product_of_widest_inputs_is_exact() {
        // (2^256 - 1)^2
        let max = dec("115792089237316195423570985008687907853269984665640564039457584007913129639935");
        let square = max.checked_mul(&max).unwrap();
        assert_eq!(
            square.to_string(),
            "13407807929942597099574024998205846127479365820592393377723561443721764030073315392623399665776056285720014482370779510884422601683867654778417822746804225"
        );
        assert!(square.checked_mul(&max).is_none());
    }

    #[test]
    fn test_to_fixed_pads_small_values() {
        assert_eq!(dec("0.00000001").to_fixed(8).unwrap(), "0.00000001");
        assert_eq!(dec("0.5").to_fixed(3).unwrap(), "0.500");
        assert_eq!(dec("12").to_fixed(2).unwrap(), "12.00");
        assert_eq!(dec("12").to_fixed(0).unwrap(), "12");
    }

    #[test]
    fn test_to_fixed_rounds_half_to_even() {
        assert_eq!(dec("0.125").to_fixed(2).unwrap(), "0.12");
        assert_eq!(dec("0.135").to_fixed(2).unwrap(), "0.14");
        assert_eq!(dec("0.1251").to_fixed(2).unwrap(), "0.13");
        assert_eq!(dec("2.5").to_fixed(0).unwrap(), "2");
        assert_eq!(dec("3.5").to_fixed(0).unwrap(), "4");
        assert_eq!(dec("0.4").to_fixed(0).unwrap(), "0");
    }

    #[test]
    fn test_to_fixed_far_below_precision_rounds_to_zero() {
        let tiny = format!("0.{}1", "0".repeat(100));
        assert_eq!(dec(&tiny).to_fixed(2).unwrap(), "0.00");
    }

    #[test]
    fn test_to_fixed_unrenderable() {
        assert_eq!(
            dec("1").to_fixed(200),
            Err(DecimalError::Unrenderable(200))
        );
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("802.1061700"), "802.10617");
        assert_eq!(canonicalize("1.00"), "1");
        assert_eq!(canonicalize("10.0"), "10");
        assert_eq!(canonicalize("100"), "100");
        assert_eq!(canonicalize("0"), "0");
        assert_eq!(canonicalize("0.000"), "0");
        assert_eq!(canonicalize("0.50"), "0.5");
    }

    #[test]
    fn test_canonicalize_idempotent() {
        for rendered in ["802.1061700", "1.00", "100", "0", "0.0001", "3.14159"] {
            let once = canonicalize(rendered);
            assert_eq!(canonicalize(once), once);
        }
    }
}
