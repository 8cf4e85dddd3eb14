//! Owned scalar vectors for the range-proof algebra.
//!
//! Binary operations compare lengths once and fail with [`Error::LengthMismatch`] instead of
//! panicking or silently truncating.

use alloc::vec::Vec;
use core::ops::Index;

use curve25519_dalek::scalar::Scalar;

use crate::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScalarVector(Vec<Scalar>);

impl ScalarVector {
    pub fn zeros(n: usize) -> Self {
        Self(alloc::vec![Scalar::ZERO; n])
    }

    /// `[1, base, base^2, ..., base^(n-1)]`
    pub fn powers(base: Scalar, n: usize) -> Self {
        let mut out = Vec::with_capacity(n);
        let mut acc = Scalar::ONE;
        for _ in 0..n {
            out.push(acc);
            acc *= base;
        }
        Self(out)
    }

    /// Little-endian bit decomposition of `value` into `bits` scalars in `{0, 1}`.
    pub fn from_bits(value: u64, bits: usize) -> Self {
        (0..bits)
            .map(|i| {
                if i < 64 && (value >> i) & 1 == 1 {
                    Scalar::ONE
                } else {
                    Scalar::ZERO
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Scalar> {
        self.0
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Scalar> {
        self.0.iter()
    }

    /// Halves for one folding round; `mid` past the end is an error.
    pub fn split_at(&self, mid: usize) -> Result<(&[Scalar], &[Scalar]), Error> {
        if mid > self.len() {
            return Err(Error::LengthMismatch {
                expected: mid,
                actual: self.len(),
            });
        }
        Ok(self.0.split_at(mid))
    }

    fn check_len(&self, other: &Self) -> Result<(), Error> {
        if self.len() != other.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Self) -> Result<Self, Error> {
        self.check_len(other)?;
        Ok(self.0.iter().zip(other.iter()).map(|(a, b)| a + b).collect())
    }

    pub fn hadamard(&self, other: &Self) -> Result<Self, Error> {
        self.check_len(other)?;
        Ok(self.0.iter().zip(other.iter()).map(|(a, b)| a * b).collect())
    }

    pub fn inner_product(&self, other: &Self) -> Result<Scalar, Error> {
        inner_product(&self.0, &other.0)
    }

    pub fn add_scalar(&self, s: &Scalar) -> Self {
        self.0.iter().map(|a| a + s).collect()
    }

    pub fn mul_scalar(&self, s: &Scalar) -> Self {
        self.0.iter().map(|a| a * s).collect()
    }

    pub fn sum(&self) -> Scalar {
        self.0.iter().sum()
    }
}

/// `<a, b>` over equal-length slices.
pub fn inner_product(a: &[Scalar], b: &[Scalar]) -> Result<Scalar, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

impl FromIterator<Scalar> for ScalarVector {
    fn from_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Scalar>> for ScalarVector {
    fn from(inner: Vec<Scalar>) -> Self {
        Self(inner)
    }
}

impl AsRef<[Scalar]> for ScalarVector {
    fn as_ref(&self) -> &[Scalar] {
        &self.0
    }
}

impl Index<usize> for ScalarVector {
    type Output = Scalar;

    fn index(&self, i: usize) -> &Scalar {
        &self.0[i]
    }
}
