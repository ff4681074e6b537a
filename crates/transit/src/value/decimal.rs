use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_integer::Integer;

use crate::error::{Result, TransitError};

/// Beyond this many padding zeros `Display` switches to exponent notation.
const MAX_PADDING: usize = 16;

/// Arbitrary-precision decimal: `unscaled * 10^-scale`.
///
/// Always stored without trailing zeros, so `1.50` and `1.5` are equal and
/// hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i64,
}

impl BigDecimal {
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        if unscaled.sign() == Sign::NoSign {
            return BigDecimal { unscaled, scale: 0 };
        }
        let ten = BigInt::from(10u8);
        let mut unscaled = unscaled;
        let mut scale = scale;
        loop {
            let (q, r) = unscaled.div_rem(&ten);
            if r.sign() != Sign::NoSign {
                break;
            }
            unscaled = q;
            scale -= 1;
        }
        BigDecimal { unscaled, scale }
    }

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`, surrounding ASCII
    /// whitespace ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let err = || TransitError::format("big decimal", text);
        let s = text.trim();
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&body[..i], body[i + 1..].parse::<i64>().map_err(|_| err())?),
            None => (body, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }
        let mut unscaled: BigInt = format!("{int_part}{frac_part}").parse().map_err(|_| err())?;
        if negative {
            unscaled = -unscaled;
        }
        let scale = i64::try_from(frac_part.len())
            .ok()
            .and_then(|n| n.checked_sub(exponent))
            .ok_or_else(err)?;
        Ok(BigDecimal::new(unscaled, scale))
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }
}

impl FromStr for BigDecimal {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self> {
        BigDecimal::parse(s)
    }
}

impl From<BigInt> for BigDecimal {
    fn from(n: BigInt) -> Self {
        BigDecimal::new(n, 0)
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled.sign() == Sign::Minus { "-" } else { "" };
        let digits = self.unscaled.magnitude().to_string();
        let shift = self.scale.unsigned_abs() as usize;
        if self.scale == 0 {
            write!(f, "{sign}{digits}")
        } else if self.scale < 0 {
            if shift <= MAX_PADDING {
                write!(f, "{sign}{digits}{}", "0".repeat(shift))
            } else {
                write!(f, "{sign}{digits}E{shift}")
            }
        } else if shift < digits.len() {
            let (int_part, frac_part) = digits.split_at(digits.len() - shift);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else if shift - digits.len() <= MAX_PADDING {
            write!(f, "{sign}0.{}{digits}", "0".repeat(shift - digits.len()))
        } else {
            write!(f, "{sign}{digits}E-{shift}")
        }
    }
}
