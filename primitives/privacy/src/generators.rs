//! Generator vectors for the aggregated range proof.
//!
//! `g[i]`, `h[i]` and `u` are labelled hash-to-point outputs, so a prefix of a larger set is the
//! same as a smaller set built from scratch. The transcript binds `n` and `m`, which pins the
//! prefix actually used.

use alloc::vec::Vec;

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use sha2::Sha512;

use crate::{Error, MAX_EXP, MAX_OUTPUT_COIN, round_up_pow_two, vector::ScalarVector};

pub const G_LABEL: &[u8] = b"privacy/bulletproof/G";
pub const H_LABEL: &[u8] = b"privacy/bulletproof/H";
pub const U_LABEL: &[u8] = b"privacy/bulletproof/U";

fn labelled_point(label: &[u8], index: u64) -> RistrettoPoint {
    let mut buf = Vec::with_capacity(label.len() + 8);
    buf.extend_from_slice(label);
    buf.extend_from_slice(&index.to_le_bytes());
    RistrettoPoint::hash_from_bytes::<Sha512>(&buf)
}

#[derive(Clone, Debug)]
pub struct BulletproofGens {
    g: Vec<RistrettoPoint>,
    h: Vec<RistrettoPoint>,
    u: RistrettoPoint,
}

impl BulletproofGens {
    pub fn new(capacity: usize) -> Self {
        let g = (0..capacity as u64).map(|i| labelled_point(G_LABEL, i)).collect();
        let h = (0..capacity as u64).map(|i| labelled_point(H_LABEL, i)).collect();
        Self {
            g,
            h,
            u: labelled_point(U_LABEL, 0),
        }
    }

    /// Capacity for the largest proof: `MAX_EXP` bits for `MAX_OUTPUT_COIN` coins padded to a
    /// power of two.
    pub fn max_capacity() -> usize {
        MAX_EXP * round_up_pow_two(MAX_OUTPUT_COIN)
    }

    /// Process-wide generators sized by [`Self::max_capacity`]. Built on first use, read-only
    /// afterwards.
    #[cfg(feature = "std")]
    pub fn shared() -> &'static Self {
        static GENS: std::sync::OnceLock<BulletproofGens> = std::sync::OnceLock::new();
        GENS.get_or_init(|| Self::new(Self::max_capacity()))
    }

    pub fn capacity(&self) -> usize {
        self.g.len()
    }

    /// Borrow the first `n` generators of each vector.
    pub fn params(&self, n: usize) -> Result<AggregateParams<'_>, Error> {
        if n > self.capacity() {
            return Err(Error::InvalidInput("proof dimension exceeds generator capacity"));
        }
        Ok(AggregateParams {
            g: &self.g[..n],
            h: &self.h[..n],
            u: &self.u,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AggregateParams<'a> {
    pub g: &'a [RistrettoPoint],
    pub h: &'a [RistrettoPoint],
    pub u: &'a RistrettoPoint,
}

impl AggregateParams<'_> {
    pub fn n(&self) -> usize {
        self.g.len()
    }

    /// `h'[i] = y^(-i)·h[i]`
    pub fn h_prime(&self, y: &Scalar) -> Vec<RistrettoPoint> {
        let y_inv_powers = ScalarVector::powers(y.invert(), self.n());
        y_inv_powers
            .iter()
            .zip(self.h.iter())
            .map(|(s, h)| s * h)
            .collect()
    }
}
