//! Numeric domains for equilibrium computation.
//!
//! The enumeration algorithm is written once against [`Scalar`] and compiled
//! for both `f64` and `BigRational`. The only place the two domains differ is
//! in deciding whether a value is zero: rationals decide it exactly, floats
//! within [`FLOAT_EPSILON`].

use std::fmt::{Debug, Display};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, Signed, ToPrimitive, Zero};

/// Values with absolute value below this are treated as zero in `f64` mode.
pub const FLOAT_EPSILON: f64 = 1e-9;

/// A field the solvers can compute in.
pub trait Scalar: Num + Signed + Clone + PartialOrd + Debug + Display + Send + Sync + 'static {
    /// Whether this value is zero in this domain.
    fn is_negligible(&self) -> bool;

    /// Whether this value is a usable number (always true for rationals).
    fn is_finite_value(&self) -> bool {
        true
    }

    /// Convert an exact payoff into this domain.
    fn from_rational(value: &BigRational) -> Self;

    /// Convert this value into an exact rational, if it is finite.
    fn to_rational(&self) -> Option<BigRational>;

    /// Approximate this value as a float.
    fn as_f64(&self) -> f64;

    /// Format for output. Floats use `decimals` digits; rationals print exactly.
    fn render(&self, decimals: usize) -> String;

    /// Strictly positive, beyond the domain's zero tolerance.
    fn is_strictly_positive(&self) -> bool {
        !self.is_negligible() && self.is_positive()
    }

    /// Strictly negative, beyond the domain's zero tolerance.
    fn is_strictly_negative(&self) -> bool {
        !self.is_negligible() && self.is_negative()
    }

    /// Equal within the domain's zero tolerance.
    fn approx_eq(&self, other: &Self) -> bool {
        (self.clone() - other.clone()).is_negligible()
    }
}

impl Scalar for f64 {
    fn is_negligible(&self) -> bool {
        self.abs() < FLOAT_EPSILON
    }

    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }

    fn from_rational(value: &BigRational) -> Self {
        value.to_f64().unwrap_or(f64::NAN)
    }

    fn to_rational(&self) -> Option<BigRational> {
        BigRational::from_float(*self)
    }

    fn as_f64(&self) -> f64 {
        *self
    }

    fn render(&self, decimals: usize) -> String {
        format!("{:.*}", decimals, self)
    }
}

impl Scalar for BigRational {
    fn is_negligible(&self) -> bool {
        self.is_zero()
    }

    fn from_rational(value: &BigRational) -> Self {
        value.clone()
    }

    fn to_rational(&self) -> Option<BigRational> {
        Some(self.clone())
    }

    fn as_f64(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    fn render(&self, _decimals: usize) -> String {
        self.to_string()
    }
}

/// Parse a rational from text.
///
/// Accepts integers (`"-3"`), fractions (`"2/3"`), exact decimals (`"0.125"`)
/// and scientific notation, which goes through `f64`.
pub fn parse_rational(text: &str) -> Option<BigRational> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((numer, denom)) = text.split_once('/') {
        let numer: BigInt = numer.trim().parse().ok()?;
        let denom: BigInt = denom.trim().parse().ok()?;
        if denom.is_zero() {
            return None;
        }
        return Some(BigRational::new(numer, denom));
    }

    if text.contains(['e', 'E']) {
        let value: f64 = text.parse().ok()?;
        return BigRational::from_float(value);
    }

    match text.split_once('.') {
        Some((whole, frac)) => {
            let negative = whole.starts_with('-');
            let digits = format!("{}{}", whole.trim_start_matches(['-', '+']), frac);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let mut numer: BigInt = digits.parse().ok()?;
            if negative {
                numer = -numer;
            }
            let denom = num_traits::pow(BigInt::from(10), frac.len());
            Some(BigRational::new(numer, denom))
        }
        None => {
            let numer: BigInt = text.parse().ok()?;
            Some(BigRational::from_integer(numer))
        }
    }
}

/// Shorthand for an integer-valued rational.
pub fn rational(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// Shorthand for `numer / denom` as a rational.
pub fn ratio(numer: i64, denom: i64) -> BigRational {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Sum of a slice of scalars.
pub fn sum<T: Scalar>(values: &[T]) -> T {
    values.iter().fold(T::zero(), |acc, v| acc + v.clone())
}

/// Whether every entry is zero in the domain.
pub fn all_negligible<T: Scalar>(values: &[T]) -> bool {
    values.iter().all(Scalar::is_negligible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rational_forms() {
        assert_eq!(parse_rational("3"), Some(rational(3)));
        assert_eq!(parse_rational(" -2/4 "), Some(ratio(-1, 2)));
        assert_eq!(parse_rational("0.125"), Some(ratio(1, 8)));
        assert_eq!(parse_rational("-1.5"), Some(ratio(-3, 2)));
        assert_eq!(parse_rational("2.5e1"), Some(rational(25)));
        assert_eq!(parse_rational("1/0"), None);
        assert_eq!(parse_rational("abc"), None);
        assert_eq!(parse_rational(""), None);
    }

    #[test]
    fn test_zero_semantics() {
        assert!(1e-12_f64.is_negligible());
        assert!(!1e-6_f64.is_negligible());
        assert!(!ratio(1, 1_000_000_000_000).is_negligible());
        assert!(BigRational::zero().is_negligible());
    }

    #[test]
    fn test_render() {
        assert_eq!(0.5_f64.render(3), "0.500");
        assert_eq!(ratio(2, 6).render(3), "1/3");
        assert_eq!(rational(1).render(3), "1");
    }

    #[test]
    fn test_sign_helpers() {
        assert!(ratio(1, 3).is_strictly_positive());
        assert!(!1e-11_f64.is_strictly_positive());
        assert!((-0.5_f64).is_strictly_negative());
        assert!(0.1_f64.approx_eq(&(0.1 + 1e-12)));
        assert_eq!(sum(&[ratio(1, 2), ratio(1, 3)]), ratio(5, 6));
    }
}
