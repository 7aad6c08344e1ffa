//! An exact signed fraction for metadata values.
//!
//! Ratio-valued metadata fields, such as exposure times or GPS coordinates,
//! must survive round-trips without the drift of a binary float. [`Rational`]
//! stores them as a numerator/denominator pair and keeps all arithmetic and
//! comparison exact by cross-multiplying in a wider integer type.
//!
//! Malformed files produce pairs with a zero denominator. Those are not an
//! error here: a zero-denominator value compares and converts as numeric
//! zero everywhere, so a bad field degrades instead of trapping.
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Add, Div, Mul, Neg, Rem, Sub};
use core::str::FromStr;

/// An exact signed fraction.
///
/// A pair given to [`Rational::new`] is preserved verbatim; only arithmetic
/// results are reduced. Equality and ordering compare the represented
/// value, so `1/2 == 2/4` and any `n/0` equals zero.
#[derive(Clone, Copy, Debug)]
pub struct Rational {
    numer: i64,
    denom: i64,
}

impl Rational {
    pub const ZERO: Self = Rational { numer: 0, denom: 1 };
    pub const ONE: Self = Rational { numer: 1, denom: 1 };

    /// A fraction from a raw pair, stored exactly as given.
    ///
    /// The pair is not reduced and its signs are not normalized. A zero
    /// denominator is tolerated; the value behaves as zero.
    pub const fn new(numer: i64, denom: i64) -> Self {
        Rational { numer, denom }
    }

    pub const fn numer(self) -> i64 {
        self.numer
    }

    pub const fn denom(self) -> i64 {
        self.denom
    }

    /// An exact fraction from a scaled decimal, `unscaled · 10^-scale`.
    ///
    /// The denominator is the literal decimal scale before reduction, so
    /// `from_decimal(75, 2)` is `3/4` and `from_decimal(33, 2)` stays
    /// `33/100`. Exact for any decimal of up to 15 significant digits.
    pub fn from_decimal(unscaled: i128, scale: u32) -> Self {
        match 10i128.checked_pow(scale) {
            Some(denom) => Self::from_wide(unscaled, denom),
            // A scale beyond i128 leaves a magnitude below 2^-127·|unscaled|;
            // the narrowing fallback approximates it.
            None => Self::from_wide(unscaled, i128::MAX),
        }
    }

    /// A best-effort fraction from a binary float.
    ///
    /// Finite floats are dyadic, `m · 2^e`, and convert exactly whenever
    /// that pair fits 64 bits. Otherwise a bounded continued-fraction
    /// expansion picks the closest representable fraction; the quotient
    /// still round-trips through [`Self::to_f64`] within ULP tolerance,
    /// but exactness is not guaranteed on that path. Non-finite input
    /// converts to zero.
    pub fn from_f64(value: f64) -> Self {
        if value == 0.0 || !value.is_finite() {
            return Self::ZERO;
        }

        match Self::dyadic(value) {
            Some(exact) => exact,
            None => Self::approximate(value),
        }
    }

    fn dyadic(value: f64) -> Option<Self> {
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1u64 << 52) - 1);

        let (mantissa, exponent) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1 << 52), biased - 1075)
        };

        let trailing = mantissa.trailing_zeros();
        let mantissa = mantissa >> trailing;
        let exponent = exponent + trailing as i32;

        let (numer, denom) = if exponent >= 0 {
            if exponent > 62 {
                return None;
            }
            let numer = (mantissa as i128) << exponent;
            (i64::try_from(numer).ok()?, 1)
        } else {
            if exponent < -62 {
                return None;
            }
            (mantissa as i64, 1i64 << -exponent)
        };

        Some(Rational {
            numer: if negative { -numer } else { numer },
            denom,
        })
    }

    /// Continued-fraction expansion, convergents bounded to 64 bits.
    fn approximate(value: f64) -> Self {
        let negative = value < 0.0;
        let mut rest = value.abs();

        // Convergent recurrence p_k = a_k·p_{k-1} + p_{k-2}.
        let (mut p_prev, mut p) = (0i128, 1i128);
        let (mut q_prev, mut q) = (1i128, 0i128);

        for _ in 0..64 {
            let term = rest.floor();
            if term >= i64::MAX as f64 {
                break;
            }

            let next_p = term as i128 * p + p_prev;
            let next_q = term as i128 * q + q_prev;
            if next_p > i64::MAX as i128 || next_q > i64::MAX as i128 {
                break;
            }
            (p_prev, p) = (p, next_p);
            (q_prev, q) = (q, next_q);

            if q != 0 && p as f64 / q as f64 == value.abs() {
                break;
            }

            let fraction = rest - term;
            if fraction <= f64::EPSILON * rest.max(1.0) {
                break;
            }
            rest = fraction.recip();
        }

        if q == 0 {
            // Magnitude beyond any convergent, saturate.
            return Rational {
                numer: if negative { i64::MIN } else { i64::MAX },
                denom: 1,
            };
        }

        Rational {
            numer: if negative { -(p as i64) } else { p as i64 },
            denom: q as i64,
        }
    }

    /// The pair coerced for computation: zero-denominator becomes `0/1`.
    const fn parts(self) -> (i128, i128) {
        if self.denom == 0 {
            (0, 1)
        } else {
            (self.numer as i128, self.denom as i128)
        }
    }

    /// The pair with the denominator made positive.
    const fn parts_norm(self) -> (i128, i128) {
        let (numer, denom) = self.parts();
        if denom < 0 {
            (-numer, -denom)
        } else {
            (numer, denom)
        }
    }

    /// Reduce a widened pair back into a fraction.
    ///
    /// The result is in lowest terms with a positive denominator. A pair
    /// too large for 64 bits is scaled down to the closest fit, the one
    /// lossy step in otherwise exact arithmetic.
    fn from_wide(numer: i128, denom: i128) -> Self {
        debug_assert!(denom != 0);
        if numer == 0 {
            return Self::ZERO;
        }

        let negative = (numer < 0) != (denom < 0);
        let mut n = numer.unsigned_abs();
        let mut d = denom.unsigned_abs();

        let g = gcd(n, d);
        n /= g;
        d /= g;

        let over = significant_bits(n).max(significant_bits(d)).saturating_sub(63);
        if over > 0 {
            n >>= over;
            d >>= over;
            if d == 0 {
                return Rational {
                    numer: if negative { i64::MIN } else { i64::MAX },
                    denom: 1,
                };
            }
            if n == 0 {
                return Self::ZERO;
            }
            let g = gcd(n, d);
            n /= g;
            d /= g;
        }

        let numer = n as i64;
        Rational {
            numer: if negative { -numer } else { numer },
            denom: d as i64,
        }
    }

    /// The value reduced to canonical form.
    ///
    /// Lowest terms, positive denominator; zero-denominator input becomes
    /// `0/1`.
    pub fn reduced(self) -> Self {
        let (numer, denom) = self.parts();
        Self::from_wide(numer, denom)
    }

    /// Swap numerator and denominator.
    ///
    /// Unlike the arithmetic operators this preserves the raw pair, only
    /// normalizing the sign onto the numerator. The reciprocal of a
    /// zero-valued fraction has a zero denominator and again behaves as
    /// zero.
    pub fn recip(self) -> Self {
        if self.numer < 0 && self.numer != i64::MIN && self.denom != i64::MIN {
            Rational {
                numer: -self.denom,
                denom: -self.numer,
            }
        } else {
            Rational {
                numer: self.denom,
                denom: self.numer,
            }
        }
    }

    /// The next value up by one denominator unit, `(n + 1)/d`.
    pub fn succ(self) -> Self {
        let (numer, denom) = self.parts_norm();
        Self::from_wide(numer + 1, denom)
    }

    /// The next value down by one denominator unit, `(n - 1)/d`.
    pub fn pred(self) -> Self {
        let (numer, denom) = self.parts_norm();
        Self::from_wide(numer - 1, denom)
    }

    /// Whether the denominator divides the numerator exactly.
    ///
    /// True for every integer-valued fraction including the zero-denominator
    /// zero.
    pub const fn is_integer(self) -> bool {
        match self.denom {
            0 => true,
            -1 | 1 => true,
            denom => self.numer % denom == 0,
        }
    }

    /// Integer division toward zero.
    pub fn trunc(self) -> i64 {
        if self.denom == 0 {
            return 0;
        }
        // None only for i64::MIN / -1.
        self.numer.checked_div(self.denom).unwrap_or(i64::MAX)
    }

    /// The quotient as a binary float, zero for a zero denominator.
    pub fn to_f64(self) -> f64 {
        if self.denom == 0 {
            return 0.0;
        }
        self.numer as f64 / self.denom as f64
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }
}

fn significant_bits(value: u128) -> u32 {
    128 - value.leading_zeros()
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational {
            numer: value,
            denom: 1,
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (an, ad) = self.parts();
        let (bn, bd) = rhs.parts();
        Self::from_wide((an * bd).saturating_add(bn * ad), ad * bd)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let (an, ad) = self.parts();
        let (bn, bd) = rhs.parts();
        Self::from_wide((an * bd).saturating_sub(bn * ad), ad * bd)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let (an, ad) = self.parts();
        let (bn, bd) = rhs.parts();
        Self::from_wide(an * bn, ad * bd)
    }
}

impl Div for Rational {
    type Output = Self;

    /// Division by a zero-valued fraction yields zero, the same tolerance
    /// as the zero denominator itself.
    fn div(self, rhs: Self) -> Self {
        let (an, ad) = self.parts();
        let (bn, bd) = rhs.parts();
        if bn == 0 {
            return Self::ZERO;
        }
        Self::from_wide(an * bd, ad * bn)
    }
}

impl Rem for Rational {
    type Output = Self;

    /// The remainder of truncating division, `(a·d mod c·b) / (b·d)`.
    /// Remainder by a zero-valued fraction yields zero.
    fn rem(self, rhs: Self) -> Self {
        let (an, ad) = self.parts();
        let (bn, bd) = rhs.parts();
        if bn == 0 {
            return Self::ZERO;
        }
        Self::from_wide((an * bd) % (bn * ad), ad * bd)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        let (numer, denom) = self.parts();
        Self::from_wide(-numer, denom)
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let (an, ad) = self.parts_norm();
        let (bn, bd) = other.parts_norm();
        // Exact, i64-range factors cannot overflow the i128 products.
        (an * bd).cmp(&(bn * ad))
    }
}

impl Hash for Rational {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let canonical = self.reduced();
        canonical.numer.hash(state);
        canonical.denom.hash(state);
    }
}

impl PartialEq<i64> for Rational {
    fn eq(&self, other: &i64) -> bool {
        let (numer, denom) = self.parts_norm();
        numer == i128::from(*other) * denom
    }
}

impl PartialOrd<i64> for Rational {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        let (numer, denom) = self.parts_norm();
        Some(numer.cmp(&(i128::from(*other) * denom)))
    }
}

impl PartialEq<f64> for Rational {
    /// Exact whenever the float's dyadic form fits 64 bits, which holds for
    /// every float a metadata field can plausibly store; see
    /// [`Rational::from_f64`].
    fn eq(&self, other: &f64) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<f64> for Rational {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        if other.is_nan() {
            return None;
        }
        if other.is_infinite() {
            return Some(if *other > 0.0 {
                Ordering::Less
            } else {
                Ordering::Greater
            });
        }
        Some(self.cmp(&Rational::from_f64(*other)))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

/// Error from parsing a decimal literal into a [`Rational`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseRationalError {
    inner: ParseErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseErrorKind {
    Empty,
    InvalidDigit,
    OutOfRange,
}

impl ParseRationalError {
    const EMPTY: Self = ParseRationalError {
        inner: ParseErrorKind::Empty,
    };
    const INVALID_DIGIT: Self = ParseRationalError {
        inner: ParseErrorKind::InvalidDigit,
    };
    const OUT_OF_RANGE: Self = ParseRationalError {
        inner: ParseErrorKind::OutOfRange,
    };
}

impl fmt::Display for ParseRationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.inner {
            ParseErrorKind::Empty => "no digits in decimal literal",
            ParseErrorKind::InvalidDigit => "invalid digit in decimal literal",
            ParseErrorKind::OutOfRange => "decimal literal out of range",
        })
    }
}

impl std::error::Error for ParseRationalError {}

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Parse a decimal literal, `[sign] digits [ '.' digits ]`.
    ///
    /// The denominator is taken from the literal scale, so `"0.75"` parses
    /// to `3/4` and `"0.33"` to `33/100`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match input.as_bytes() {
            [b'-', ..] => (true, &input[1..]),
            [b'+', ..] => (false, &input[1..]),
            _ => (false, input),
        };

        let (integral, fractional) = match digits.split_once('.') {
            Some((integral, fractional)) => (integral, fractional),
            None => (digits, ""),
        };
        if integral.is_empty() && fractional.is_empty() {
            return Err(ParseRationalError::EMPTY);
        }

        let mut unscaled: i128 = 0;
        for byte in integral.bytes().chain(fractional.bytes()) {
            let digit = match byte {
                b'0'..=b'9' => i128::from(byte - b'0'),
                _ => return Err(ParseRationalError::INVALID_DIGIT),
            };
            unscaled = unscaled
                .checked_mul(10)
                .and_then(|value| value.checked_add(digit))
                .ok_or(ParseRationalError::OUT_OF_RANGE)?;
        }

        if negative {
            unscaled = -unscaled;
        }

        Ok(Self::from_decimal(unscaled, fractional.len() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::{gcd, ParseRationalError, Rational};
    use core::cmp::Ordering;

    #[test]
    fn raw_pairs_are_preserved() {
        let raw = Rational::new(2, 4);
        assert_eq!((raw.numer(), raw.denom()), (2, 4));
        // Value equality still sees through the representation.
        assert_eq!(raw, Rational::new(1, 2));

        let reduced = raw.reduced();
        assert_eq!((reduced.numer(), reduced.denom()), (1, 2));
    }

    #[test]
    fn decimal_scale_is_literal() {
        let threequarters = "0.75".parse::<Rational>().unwrap();
        assert_eq!((threequarters.numer(), threequarters.denom()), (3, 4));

        let point33 = "0.33".parse::<Rational>().unwrap();
        assert_eq!((point33.numer(), point33.denom()), (33, 100));

        let exposure = "0.0125".parse::<Rational>().unwrap();
        assert_eq!((exposure.numer(), exposure.denom()), (1, 80));

        let negative = "-73.0975".parse::<Rational>().unwrap();
        assert_eq!(negative.to_f64(), -73.0975);
        assert_eq!(
            negative,
            Rational::from_decimal(-730_975, 4),
        );
    }

    #[test]
    fn decimal_round_trips_exactly() {
        // 15 significant digits survive the pair and come back out.
        let value = Rational::from_decimal(123_456_789_012_345, 9);
        assert_eq!(value * Rational::from(1_000_000_000), 123_456_789_012_345);
    }

    #[test]
    fn parse_rejects_junk() {
        assert_eq!("".parse::<Rational>(), Err(ParseRationalError::EMPTY));
        assert_eq!("-".parse::<Rational>(), Err(ParseRationalError::EMPTY));
        assert_eq!(".".parse::<Rational>(), Err(ParseRationalError::EMPTY));
        assert_eq!(
            "1.2.3".parse::<Rational>(),
            Err(ParseRationalError::INVALID_DIGIT)
        );
        assert_eq!(
            "12a".parse::<Rational>(),
            Err(ParseRationalError::INVALID_DIGIT)
        );
        assert!("0.5".parse::<Rational>().is_ok());
        assert!("-.5".parse::<Rational>().is_ok());
        assert!("5.".parse::<Rational>().is_ok());
    }

    #[test]
    fn operators_reduce() {
        let pairs = [
            (1i64, 3i64),
            (2, 4),
            (-3, 7),
            (5, -10),
            (0, 9),
            (22, 7),
            (-9, -12),
        ];
        for &(an, ad) in &pairs {
            for &(bn, bd) in &pairs {
                let a = Rational::new(an, ad);
                let b = Rational::new(bn, bd);
                for result in [a + b, a - b, a * b, a / b, a % b, -a] {
                    assert!(
                        result.denom() > 0,
                        "{a} op {b} gave denominator {}",
                        result.denom()
                    );
                    let g = gcd(
                        result.numer().unsigned_abs().into(),
                        result.denom().unsigned_abs().into(),
                    );
                    assert_eq!(g, 1, "{a} op {b} gave unreduced {result}");
                }
            }
        }
    }

    #[test]
    fn sub_then_add_round_trips() {
        let pairs = [(1i64, 3i64), (7, 2), (-5, 8), (355, 113), (0, 1)];
        for &(rn, rd) in &pairs {
            for &(sn, sd) in &pairs {
                let r = Rational::new(rn, rd);
                let s = Rational::new(sn, sd);
                assert_eq!(r - s + s, r, "{r} via {s}");
            }
        }
    }

    #[test]
    fn arithmetic_is_exact() {
        let third = Rational::new(1, 3);
        let sixth = Rational::new(1, 6);
        assert_eq!(third + sixth, Rational::new(1, 2));
        assert_eq!(third - sixth, sixth);
        assert_eq!(third * sixth, Rational::new(1, 18));
        assert_eq!(third / sixth, Rational::from(2));
        assert_eq!(Rational::new(7, 2) % Rational::from(3), Rational::new(1, 2));
    }

    #[test]
    fn zero_denominator_behaves_as_zero() {
        let broken = Rational::new(42, 0);
        assert_eq!(broken, Rational::ZERO);
        assert_eq!(broken, 0i64);
        assert_eq!(broken.to_f64(), 0.0);
        assert_eq!(broken.trunc(), 0);
        assert!(broken.is_integer());
        assert_eq!(broken.cmp(&Rational::new(-1, 2)), Ordering::Greater);
        assert_eq!(broken + Rational::ONE, Rational::ONE);
        assert_eq!(Rational::ONE / broken, Rational::ZERO);
        assert_eq!(broken.succ(), Rational::ONE);
    }

    #[test]
    fn comparison_is_cross_multiplied() {
        assert!(Rational::new(1, 3) < Rational::new(1, 2));
        assert!(Rational::new(-1, 2) < Rational::new(-1, 3));
        // Negative denominators order by value.
        assert!(Rational::new(1, -2) < Rational::new(1, 3));
        assert_eq!(Rational::new(2, -4), Rational::new(-1, 2));
        // Near-equal large pairs that float division would conflate.
        let a = Rational::new(i64::MAX, i64::MAX - 1);
        let b = Rational::new(i64::MAX - 1, i64::MAX - 2);
        assert!(a < b);
    }

    #[test]
    fn mixed_comparisons() {
        let half = Rational::new(1, 2);
        assert!(half < 1i64);
        assert!(half > 0i64);
        assert_eq!(Rational::new(14, 7), 2i64);
        assert_eq!(half, 0.5f64);
        assert!(half < 0.6f64);
        assert!(half > f64::NEG_INFINITY);
        assert!(half < f64::INFINITY);
        assert_ne!(half, f64::NAN);
    }

    #[test]
    fn recip_swaps_the_raw_pair() {
        let raw = Rational::new(2, 4);
        assert_eq!((raw.recip().numer(), raw.recip().denom()), (4, 2));

        let negative = Rational::new(-3, 4);
        assert_eq!((negative.recip().numer(), negative.recip().denom()), (-4, 3));

        // Reciprocal of zero behaves as zero again.
        assert_eq!(Rational::ZERO.recip(), Rational::ZERO);
    }

    #[test]
    fn unit_steps() {
        let third = Rational::new(1, 3);
        assert_eq!(third.succ(), Rational::new(2, 3));
        assert_eq!(third.pred(), Rational::ZERO);
        assert_eq!(third.succ().succ(), Rational::ONE);
        // Stepping reduces like any other arithmetic.
        assert_eq!(Rational::new(1, 2).succ(), Rational::ONE);
    }

    #[test]
    fn integer_queries() {
        assert!(Rational::new(6, 3).is_integer());
        assert!(Rational::new(5, 1).is_integer());
        assert!(!Rational::new(5, 3).is_integer());
        assert_eq!(Rational::new(7, 2).trunc(), 3);
        assert_eq!(Rational::new(-7, 2).trunc(), -3);
        assert_eq!(Rational::new(i64::MIN, -1).trunc(), i64::MAX);
    }

    #[test]
    fn float_conversion_round_trips() {
        for value in [0.5, 0.1, -0.0125, 3.75, 123456.789, 1.0 / 3.0] {
            let converted = Rational::from_f64(value);
            assert_eq!(converted.to_f64(), value, "{value}");
        }

        assert_eq!(Rational::from_f64(0.5), Rational::new(1, 2));
        assert_eq!(Rational::from_f64(-2.25), Rational::new(-9, 4));
        assert_eq!(Rational::from_f64(f64::NAN), Rational::ZERO);
        assert_eq!(Rational::from_f64(f64::INFINITY), Rational::ZERO);
        assert_eq!(Rational::from_f64(0.0), Rational::ZERO);
    }

    #[test]
    fn huge_floats_are_best_effort() {
        // 2^100 cannot be represented; the result saturates near i64::MAX.
        let huge = Rational::from_f64(2f64.powi(100));
        assert!(huge > 0i64);
        assert!(huge.denom() > 0);

        let tiny = Rational::from_f64(2f64.powi(-100));
        assert!(tiny >= Rational::ZERO);
        assert!(tiny < Rational::new(1, 1_000_000));
    }

    #[test]
    fn display_shows_the_raw_pair() {
        assert_eq!(Rational::new(2, 4).to_string(), "2/4");
        assert_eq!(Rational::new(-3, 0).to_string(), "-3/0");
    }

    #[test]
    fn hash_matches_value_equality() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        seen.insert(Rational::new(1, 2));
        assert!(seen.contains(&Rational::new(2, 4)));
        seen.insert(Rational::new(0, 0));
        assert!(seen.contains(&Rational::ZERO));
    }
}
