//! # privacy-verifier — no_std range proof verification
//!
//! Two interchangeable verifiers for [`RangeProof`]s built by `privacy-prover`:
//!
//! - [`verify`] folds the generator vectors round by round and opens the final inner-product
//!   claim directly.
//! - [`verify_faster`] recomputes every folding coefficient from the round challenges and checks
//!   the same claim with one multiscalar multiplication.
//!
//! Both replay the transcript from the proof itself, so no challenge is ever trusted from the
//! wire. They accept and reject exactly the same inputs and report which check failed:
//!
//! - [`VerifierError::Statement1`]: `tHat·T + tauX·H != Σ z^(2+j)·V_j + δ(y,z)·T + x·T1 + x²·T2`
//! - [`VerifierError::Statement2`]: the inner-product commitment `p` does not match `A`, `S` and
//!   `mu`, or the argument for `<l, r> = tHat` does not open.
//!
//! The asset tag `T` is an argument. Verifying proofs for different tags concurrently is safe.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod inner_product;

use alloc::vec::Vec;

use curve25519_dalek::{
    ristretto::RistrettoPoint,
    scalar::Scalar,
    traits::{IsIdentity, VartimeMultiscalarMul},
};
use log::debug;
use merlin::Transcript;
use thiserror::Error;

use privacy_primitives::{
    AggregateParams, BulletproofGens, MAX_EXP, MAX_OUTPUT_COIN, PedersenBasis, RangeProof,
    ScalarVector, round_up_pow_two,
    transcript::{challenges_xw, challenges_yz, new_range_transcript},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("statement 1 failed: commitment does not open to tHat")]
    Statement1,
    #[error("statement 2 failed: inner product argument rejected")]
    Statement2,
}

impl From<privacy_primitives::Error> for VerifierError {
    fn from(e: privacy_primitives::Error) -> Self {
        use privacy_primitives::Error;
        match e {
            Error::InvalidInput(m) | Error::InvalidPoint(m) => Self::InvalidInput(m),
            Error::LengthMismatch { .. } => Self::InvalidInput("vector length mismatch"),
            Error::UnsupportedPrivacyType(_) => Self::InvalidInput("unsupported privacy type"),
        }
    }
}

/// Selects one of the two verification strategies behind a common interface.
pub trait RangeProofVerifier {
    fn verify_range(
        gens: &BulletproofGens,
        proof: &RangeProof,
        asset_tag: &RistrettoPoint,
    ) -> Result<(), VerifierError>;
}

/// Generator-folding verifier.
pub struct DirectVerifier;

/// Single multiscalar-multiplication verifier.
pub struct BatchedVerifier;

impl RangeProofVerifier for DirectVerifier {
    fn verify_range(
        gens: &BulletproofGens,
        proof: &RangeProof,
        asset_tag: &RistrettoPoint,
    ) -> Result<(), VerifierError> {
        verify_with_gens(gens, proof, asset_tag)
    }
}

impl RangeProofVerifier for BatchedVerifier {
    fn verify_range(
        gens: &BulletproofGens,
        proof: &RangeProof,
        asset_tag: &RistrettoPoint,
    ) -> Result<(), VerifierError> {
        verify_faster_with_gens(gens, proof, asset_tag)
    }
}

#[cfg(feature = "std")]
pub fn verify(proof: &RangeProof, asset_tag: &RistrettoPoint) -> Result<(), VerifierError> {
    verify_with_gens(BulletproofGens::shared(), proof, asset_tag)
}

#[cfg(feature = "std")]
pub fn verify_faster(proof: &RangeProof, asset_tag: &RistrettoPoint) -> Result<(), VerifierError> {
    verify_faster_with_gens(BulletproofGens::shared(), proof, asset_tag)
}

pub fn verify_with_gens(
    gens: &BulletproofGens,
    proof: &RangeProof,
    asset_tag: &RistrettoPoint,
) -> Result<(), VerifierError> {
    let mut replay = Replay::new(gens, proof, asset_tag)?;
    replay.check_statement1(proof)?;
    replay.check_commitment(proof)?;

    let h_prime = replay.params.h_prime(&replay.y);
    inner_product::verify(
        &mut replay.transcript,
        replay.params.g,
        &h_prime,
        &replay.u_prime,
        &proof.inner_product_proof,
    )
    .inspect_err(|e| debug!(target: "privacy", "direct verifier rejected proof: {e}"))
}

pub fn verify_faster_with_gens(
    gens: &BulletproofGens,
    proof: &RangeProof,
    asset_tag: &RistrettoPoint,
) -> Result<(), VerifierError> {
    let mut replay = Replay::new(gens, proof, asset_tag)?;
    replay.check_statement1(proof)?;
    replay.check_commitment(proof)?;

    let ipp = &proof.inner_product_proof;
    let scalars = inner_product::verification_scalars(&mut replay.transcript, ipp, replay.n)?;

    // h'[i] = y^(-i)·h[i], folded into the h coefficients
    let y_inv = ScalarVector::powers(replay.y.invert(), replay.n);
    let ab = ipp.a * ipp.b;
    let g_coeffs = scalars.s.iter().map(|s| -(ipp.a * s));
    let h_coeffs = scalars
        .s
        .iter()
        .rev()
        .zip(y_inv.iter())
        .map(|(s_inv, yi)| -(ipp.b * s_inv * yi));

    let check = RistrettoPoint::vartime_multiscalar_mul(
        core::iter::once(Scalar::ONE)
            .chain(core::iter::once(-ab))
            .chain(scalars.u_sq.iter().copied())
            .chain(scalars.u_inv_sq.iter().copied())
            .chain(g_coeffs)
            .chain(h_coeffs),
        core::iter::once(&ipp.p)
            .chain(core::iter::once(&replay.u_prime))
            .chain(ipp.l.iter())
            .chain(ipp.r.iter())
            .chain(replay.params.g.iter())
            .chain(replay.params.h.iter()),
    );

    if !check.is_identity() {
        debug!(target: "privacy", "batched verifier rejected proof: inner product does not open");
        return Err(VerifierError::Statement2);
    }
    Ok(())
}

/// Transcript state and challenges shared by both verifiers.
struct Replay<'g> {
    params: AggregateParams<'g>,
    basis: PedersenBasis,
    transcript: Transcript,
    n: usize,
    y: Scalar,
    z: Scalar,
    x: Scalar,
    u_prime: RistrettoPoint,
    /// `z^(2+j)` per padded coin.
    z_coin: ScalarVector,
}

impl<'g> Replay<'g> {
    fn new(
        gens: &'g BulletproofGens,
        proof: &RangeProof,
        asset_tag: &RistrettoPoint,
    ) -> Result<Self, VerifierError> {
        let num_value = proof.cms_value.len();
        if num_value == 0 || num_value > MAX_OUTPUT_COIN {
            return Err(VerifierError::InvalidInput("number of value commitments out of range"));
        }
        let num_value_pad = round_up_pow_two(num_value);
        let n = MAX_EXP * num_value_pad;
        let rounds = n.trailing_zeros() as usize;
        let ipp = &proof.inner_product_proof;
        if ipp.l.len() != rounds || ipp.r.len() != rounds {
            return Err(VerifierError::InvalidInput(
                "inner product rounds do not match proof size",
            ));
        }
        let params = gens.params(n)?;

        let mut transcript =
            new_range_transcript(MAX_EXP, num_value_pad, asset_tag, &proof.cms_value);
        let (y, z) = challenges_yz(&mut transcript, &proof.a, &proof.s);
        let (x, w) = challenges_xw(&mut transcript, &proof.t1, &proof.t2);
        if [y, z, x, w].contains(&Scalar::ZERO) {
            return Err(VerifierError::InvalidInput("zero challenge"));
        }

        Ok(Self {
            u_prime: w * params.u,
            params,
            basis: PedersenBasis::standard().with_asset_tag(*asset_tag),
            transcript,
            n,
            y,
            z,
            x,
            z_coin: ScalarVector::powers(z, num_value_pad).mul_scalar(&(z * z)),
        })
    }

    /// `δ(y, z) = (z - z²)·<1, y^n> - Σ_j z^(3+j)·<1, 2^64>`
    fn delta(&self) -> Scalar {
        let sum_y = ScalarVector::powers(self.y, self.n).sum();
        let sum_two = Scalar::from(u64::MAX);
        let z_sq = self.z * self.z;
        (self.z - z_sq) * sum_y - self.z * self.z_coin.sum() * sum_two
    }

    fn check_statement1(&self, proof: &RangeProof) -> Result<(), VerifierError> {
        let lhs = self.basis.commit(&proof.t_hat, &proof.tau_x);

        // Padded coins commit to the identity and drop out of the sum.
        let rhs = RistrettoPoint::vartime_multiscalar_mul(
            self.z_coin
                .iter()
                .take(proof.cms_value.len())
                .copied()
                .chain([self.delta(), self.x, self.x * self.x]),
            proof
                .cms_value
                .iter()
                .chain([&self.basis.value_generator(), &proof.t1, &proof.t2]),
        );

        if lhs != rhs {
            debug!(target: "privacy", "range proof rejected: statement 1");
            return Err(VerifierError::Statement1);
        }
        Ok(())
    }

    /// `p == A + x·S - z·Σg + Σ(z + z^(2+j)·2^k·y^(-i))·h - mu·H + tHat·u'`
    fn check_commitment(&self, proof: &RangeProof) -> Result<(), VerifierError> {
        let y_inv = ScalarVector::powers(self.y.invert(), self.n);
        let two_pow = ScalarVector::powers(Scalar::from(2u64), MAX_EXP);
        let h_coeffs: Vec<Scalar> = (0..self.n)
            .map(|i| self.z + self.z_coin[i / MAX_EXP] * two_pow[i % MAX_EXP] * y_inv[i])
            .collect();
        let minus_z = -self.z;

        let expected = RistrettoPoint::vartime_multiscalar_mul(
            [Scalar::ONE, self.x, -proof.mu, proof.t_hat]
                .into_iter()
                .chain(core::iter::repeat(minus_z).take(self.n))
                .chain(h_coeffs),
            [
                &proof.a,
                &proof.s,
                &self.basis.randomness_generator(),
                &self.u_prime,
            ]
            .into_iter()
            .chain(self.params.g.iter())
            .chain(self.params.h.iter()),
        );

        if expected != proof.inner_product_proof.p {
            debug!(target: "privacy", "range proof rejected: inner product commitment mismatch");
            return Err(VerifierError::Statement2);
        }
        Ok(())
    }
}
