//! The exact numeric contract the topple rule runs on.
//!
//! [`Value`] is implemented for `i32`, `i64`, [`BigInt`] and
//! [`BigRational`]. Fixed-width integers additionally implement
//! [`FixedWidth`], which is what the file-backed grid stores.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::Zero;

use crate::error::ValueError;
use crate::limits;

// ── ValueKind ──────────────────────────────────────────────────────

/// Identifies the concrete representation behind a [`Value`].
///
/// Recorded in checkpoints so a grid is only ever restored into an
/// engine using the same representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Arbitrary-precision integer.
    BigInt,
    /// Exact arbitrary-precision fraction.
    Rational,
}

impl ValueKind {
    /// Stable one-byte code used on disk.
    pub fn code(self) -> u8 {
        match self {
            Self::I32 => 1,
            Self::I64 => 2,
            Self::BigInt => 3,
            Self::Rational => 4,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::I32),
            2 => Some(Self::I64),
            3 => Some(Self::BigInt),
            4 => Some(Self::Rational),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::BigInt => "big integer",
            Self::Rational => "big rational",
        };
        f.write_str(name)
    }
}

// ── Value ──────────────────────────────────────────────────────────

/// An exact, totally ordered number the topple rule can redistribute.
///
/// Every operation must be exact: mass conservation depends on
/// `quotient * divisor + remainder == self` holding for
/// [`div_rem`](Value::div_rem) without rounding loss.
///
/// Fixed-width integers wrap on [`add`](Value::add),
/// [`subtract`](Value::subtract) and [`times`](Value::times). A share
/// scaled by its multiplier can leave the type's range while the cell
/// it lands on cannot, as long as the source is at least
/// [`min_single_source`](Value::min_single_source). Two's complement
/// sums come out exact once every delta has been added.
pub trait Value: Clone + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Representation tag recorded in checkpoints.
    const KIND: ValueKind;

    /// The additive identity.
    fn zero() -> Self;

    /// Whether `self` equals [`zero`](Value::zero).
    fn is_zero(&self) -> bool;

    /// `self + other`.
    fn add(&self, other: &Self) -> Self;

    /// `self - other`.
    fn subtract(&self, other: &Self) -> Self;

    /// Divide by a small positive integer, returning `(quotient, remainder)`.
    ///
    /// Integers truncate toward zero, so the remainder keeps the sign of
    /// the dividend. Exact fractions return a zero remainder.
    fn div_rem(&self, divisor: u32) -> (Self, Self);

    /// `self * factor`.
    fn times(&self, factor: u32) -> Self;

    /// Exact conversion into a fraction, used for overflow-free sums.
    fn to_rational(&self) -> BigRational;

    /// Smallest single-source value that cannot overflow over a run in
    /// `dimension` dimensions, or `None` for unbounded types.
    fn min_single_source(dimension: usize) -> Option<Self>;

    /// Append the checkpoint encoding of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Decode a value from the front of `bytes`, returning it together
    /// with the number of bytes consumed.
    fn decode(bytes: &[u8]) -> Result<(Self, usize), ValueError>;
}

/// A [`Value`] with a fixed-width little-endian record encoding.
pub trait FixedWidth: Value + Copy {
    /// Record width in bytes.
    const WIDTH: usize;

    /// Write `self` into `out`, which must be exactly [`WIDTH`](Self::WIDTH) bytes.
    fn write_le(&self, out: &mut [u8]);

    /// Read a value from `bytes`, which must be exactly [`WIDTH`](Self::WIDTH) bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

fn take<const N: usize>(bytes: &[u8]) -> Result<[u8; N], ValueError> {
    match bytes.get(..N) {
        Some(head) => {
            let mut buf = [0u8; N];
            buf.copy_from_slice(head);
            Ok(buf)
        }
        None => Err(ValueError::Truncated {
            needed: N,
            available: bytes.len(),
        }),
    }
}

// ── Fixed-width integers ───────────────────────────────────────────

impl Value for i32 {
    const KIND: ValueKind = ValueKind::I32;

    fn zero() -> Self {
        0
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn add(&self, other: &Self) -> Self {
        self.wrapping_add(*other)
    }

    fn subtract(&self, other: &Self) -> Self {
        self.wrapping_sub(*other)
    }

    fn div_rem(&self, divisor: u32) -> (Self, Self) {
        let wide = i64::from(*self);
        let divisor = i64::from(divisor);
        // |quotient| and |remainder| never exceed |self|.
        ((wide / divisor) as i32, (wide % divisor) as i32)
    }

    fn times(&self, factor: u32) -> Self {
        self.wrapping_mul(factor as i32)
    }

    fn to_rational(&self) -> BigRational {
        BigRational::from_integer(BigInt::from(*self))
    }

    fn min_single_source(dimension: usize) -> Option<Self> {
        let min = limits::min_single_source(dimension, i128::from(i32::MAX));
        i32::try_from(min).ok()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<(Self, usize), ValueError> {
        Ok((i32::from_le_bytes(take::<4>(bytes)?), 4))
    }
}

impl FixedWidth for i32 {
    const WIDTH: usize = 4;

    fn write_le(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        i32::from_le_bytes(buf)
    }
}

impl Value for i64 {
    const KIND: ValueKind = ValueKind::I64;

    fn zero() -> Self {
        0
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn add(&self, other: &Self) -> Self {
        self.wrapping_add(*other)
    }

    fn subtract(&self, other: &Self) -> Self {
        self.wrapping_sub(*other)
    }

    fn div_rem(&self, divisor: u32) -> (Self, Self) {
        let wide = i128::from(*self);
        let divisor = i128::from(divisor);
        ((wide / divisor) as i64, (wide % divisor) as i64)
    }

    fn times(&self, factor: u32) -> Self {
        self.wrapping_mul(i64::from(factor))
    }

    fn to_rational(&self) -> BigRational {
        BigRational::from_integer(BigInt::from(*self))
    }

    fn min_single_source(dimension: usize) -> Option<Self> {
        let min = limits::min_single_source(dimension, i128::from(i64::MAX));
        i64::try_from(min).ok()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<(Self, usize), ValueError> {
        Ok((i64::from_le_bytes(take::<8>(bytes)?), 8))
    }
}

impl FixedWidth for i64 {
    const WIDTH: usize = 8;

    fn write_le(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        i64::from_le_bytes(buf)
    }
}

// ── Unbounded values ───────────────────────────────────────────────

/// Append a `u32`-length-prefixed two's complement encoding.
fn encode_big(value: &BigInt, out: &mut Vec<u8>) {
    let bytes = value.to_signed_bytes_le();
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&bytes);
}

fn decode_big(bytes: &[u8]) -> Result<(BigInt, usize), ValueError> {
    let len = u32::from_le_bytes(take::<4>(bytes)?) as usize;
    let body = bytes.get(4..4 + len).ok_or(ValueError::Truncated {
        needed: 4 + len,
        available: bytes.len(),
    })?;
    Ok((BigInt::from_signed_bytes_le(body), 4 + len))
}

impl Value for BigInt {
    const KIND: ValueKind = ValueKind::BigInt;

    fn zero() -> Self {
        Zero::zero()
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn subtract(&self, other: &Self) -> Self {
        self - other
    }

    fn div_rem(&self, divisor: u32) -> (Self, Self) {
        Integer::div_rem(self, &BigInt::from(divisor))
    }

    fn times(&self, factor: u32) -> Self {
        self * factor
    }

    fn to_rational(&self) -> BigRational {
        BigRational::from_integer(self.clone())
    }

    fn min_single_source(_dimension: usize) -> Option<Self> {
        None
    }

    fn encode(&self, out: &mut Vec<u8>) {
        encode_big(self, out);
    }

    fn decode(bytes: &[u8]) -> Result<(Self, usize), ValueError> {
        decode_big(bytes)
    }
}

impl Value for BigRational {
    const KIND: ValueKind = ValueKind::Rational;

    fn zero() -> Self {
        Zero::zero()
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn subtract(&self, other: &Self) -> Self {
        self - other
    }

    fn div_rem(&self, divisor: u32) -> (Self, Self) {
        let divisor = BigRational::from_integer(BigInt::from(divisor));
        (self / divisor, Zero::zero())
    }

    fn times(&self, factor: u32) -> Self {
        self * BigRational::from_integer(BigInt::from(factor))
    }

    fn to_rational(&self) -> BigRational {
        self.clone()
    }

    fn min_single_source(_dimension: usize) -> Option<Self> {
        None
    }

    fn encode(&self, out: &mut Vec<u8>) {
        encode_big(self.numer(), out);
        encode_big(self.denom(), out);
    }

    fn decode(bytes: &[u8]) -> Result<(Self, usize), ValueError> {
        let (numer, used) = decode_big(bytes)?;
        let (denom, used_denom) = decode_big(&bytes[used..])?;
        if Zero::is_zero(&denom) {
            return Err(ValueError::Invalid {
                detail: "zero denominator".to_string(),
            });
        }
        Ok((BigRational::new(numer, denom), used + used_denom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn round_trip<V: Value>(v: V) -> V {
        let mut buf = Vec::new();
        v.encode(&mut buf);
        let (back, used) = V::decode(&buf).unwrap();
        assert_eq!(used, buf.len());
        back
    }

    #[test]
    fn kind_codes_are_stable() {
        for kind in [ValueKind::I32, ValueKind::I64, ValueKind::BigInt, ValueKind::Rational] {
            assert_eq!(ValueKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ValueKind::from_code(0), None);
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        assert_eq!(Value::div_rem(&4i64, 3), (1, 1));
        assert_eq!(Value::div_rem(&-4i64, 3), (-1, -1));
        assert_eq!(Value::div_rem(&-4i32, 3), (-1, -1));
        let (q, r) = Value::div_rem(&BigInt::from(-7), 2);
        assert_eq!((q, r), (BigInt::from(-3), BigInt::from(-1)));
    }

    #[test]
    fn rational_division_is_exact() {
        let four = BigRational::from_integer(BigInt::from(4));
        let (q, r) = Value::div_rem(&four, 3);
        assert_eq!(q, BigRational::new(BigInt::from(4), BigInt::from(3)));
        assert!(Value::is_zero(&r));
        assert_eq!(q.times(3), four);
    }

    #[test]
    fn unbounded_types_have_no_minimum() {
        assert_eq!(<BigInt as Value>::min_single_source(2), None);
        assert_eq!(<BigRational as Value>::min_single_source(5), None);
        assert_eq!(<i64 as Value>::min_single_source(1), Some(-i64::MAX));
    }

    #[test]
    fn big_values_survive_encoding() {
        let big = BigInt::from(i64::MIN) * BigInt::from(1_000_003);
        assert_eq!(round_trip(big.clone()), big);
        let frac = BigRational::new(BigInt::from(-22), BigInt::from(7));
        assert_eq!(round_trip(frac.clone()), frac);
    }

    #[test]
    fn truncated_decode_is_reported() {
        let err = <i64 as Value>::decode(&[1, 2, 3]).unwrap_err();
        assert_eq!(err, ValueError::Truncated { needed: 8, available: 3 });
        let err = <BigInt as Value>::decode(&[9, 0, 0, 0, 1]).unwrap_err();
        assert!(matches!(err, ValueError::Truncated { .. }));
    }

    #[test]
    fn scaled_shares_wrap_back_into_range() {
        // 2D origin at the i32 minimum: the (1, 0) cell's share reaches
        // the origin four times and only the final sum fits.
        let origin = -1_431_655_765i32;
        let share = 715_827_882i32;
        let delta = share.times(4);
        assert_eq!(origin.add(&delta), 1_431_655_763);
        assert_eq!(0i64.subtract(&i64::MIN).add(&i64::MIN), 0);
    }

    #[test]
    fn fixed_width_records() {
        let mut buf = [0u8; 8];
        (-5i64).write_le(&mut buf);
        assert_eq!(i64::read_le(&buf), -5);
        let mut buf = [0u8; 4];
        123_456i32.write_le(&mut buf);
        assert_eq!(i32::read_le(&buf), 123_456);
    }

    proptest! {
        #[test]
        fn div_rem_reconstructs_i64(v in any::<i64>(), d in 1u32..32) {
            let (q, r) = Value::div_rem(&v, d);
            prop_assert_eq!(i128::from(q) * i128::from(d) + i128::from(r), i128::from(v));
            prop_assert!(r.unsigned_abs() < u64::from(d));
        }

        #[test]
        fn div_rem_reconstructs_bigint(v in any::<i64>(), d in 1u32..32) {
            let v = BigInt::from(v) * BigInt::from(977);
            let (q, r) = Value::div_rem(&v, d);
            prop_assert_eq!(q.times(d).add(&r), v);
        }
    }
}
