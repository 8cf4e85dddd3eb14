use alloc::vec::Vec;

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar, traits::VartimeMultiscalarMul};
use merlin::Transcript;

use privacy_primitives::{
    InnerProductProof,
    transcript::{inner_product_domain_sep, round_challenge},
};

use crate::VerifierError;

fn challenges(
    transcript: &mut Transcript,
    proof: &InnerProductProof,
    n: usize,
) -> Result<Vec<Scalar>, VerifierError> {
    if proof.l.len() != proof.r.len() || 1usize.checked_shl(proof.l.len() as u32) != Some(n) {
        return Err(VerifierError::InvalidInput("inner product rounds do not match length"));
    }
    inner_product_domain_sep(transcript, n);
    proof
        .l
        .iter()
        .zip(&proof.r)
        .map(|(l, r)| {
            let u = round_challenge(transcript, l, r);
            if u == Scalar::ZERO {
                return Err(VerifierError::InvalidInput("zero folding challenge"));
            }
            Ok(u)
        })
        .collect()
}

/// Fold `g`, `h` and `p` one round at a time, then open `p == a·g + b·h + ab·u`.
pub(crate) fn verify(
    transcript: &mut Transcript,
    g: &[RistrettoPoint],
    h: &[RistrettoPoint],
    u: &RistrettoPoint,
    proof: &InnerProductProof,
) -> Result<(), VerifierError> {
    if g.len() != h.len() {
        return Err(VerifierError::InvalidInput("generator vectors differ in length"));
    }
    let us = challenges(transcript, proof, g.len())?;

    let mut g = g.to_vec();
    let mut h = h.to_vec();
    let mut p = proof.p;
    for ((u_k, l), r) in us.iter().zip(&proof.l).zip(&proof.r) {
        let u_inv = u_k.invert();
        let half = g.len() / 2;
        let (g_lo, g_hi) = g.split_at(half);
        let (h_lo, h_hi) = h.split_at(half);
        let g_next: Vec<RistrettoPoint> = g_lo
            .iter()
            .zip(g_hi)
            .map(|(lo, hi)| RistrettoPoint::vartime_multiscalar_mul([u_inv, *u_k], [lo, hi]))
            .collect();
        let h_next: Vec<RistrettoPoint> = h_lo
            .iter()
            .zip(h_hi)
            .map(|(lo, hi)| RistrettoPoint::vartime_multiscalar_mul([*u_k, u_inv], [lo, hi]))
            .collect();
        g = g_next;
        h = h_next;
        p = RistrettoPoint::vartime_multiscalar_mul(
            [u_k * u_k, Scalar::ONE, u_inv * u_inv],
            [l, &p, r],
        );
    }

    let expected = RistrettoPoint::vartime_multiscalar_mul(
        [proof.a, proof.b, proof.a * proof.b],
        [&g[0], &h[0], u],
    );
    if expected != p {
        return Err(VerifierError::Statement2);
    }
    Ok(())
}

/// Coefficients for checking the argument in one multiscalar multiplication.
pub(crate) struct VerificationScalars {
    pub u_sq: Vec<Scalar>,
    pub u_inv_sq: Vec<Scalar>,
    /// Coefficient of `g[i]` in the fully folded generator; `h[i]` takes `s[n - 1 - i]`.
    pub s: Vec<Scalar>,
}

pub(crate) fn verification_scalars(
    transcript: &mut Transcript,
    proof: &InnerProductProof,
    n: usize,
) -> Result<VerificationScalars, VerifierError> {
    let lg_n = proof.l.len();
    let us = challenges(transcript, proof, n)?;

    let mut inv = us.clone();
    let all_inv = Scalar::batch_invert(&mut inv);

    let u_sq: Vec<Scalar> = us.iter().map(|u| u * u).collect();
    let u_inv_sq: Vec<Scalar> = inv.iter().map(|u| u * u).collect();

    // s[i] flips the challenge of every round whose bit is set in i; the first round owns the
    // most significant bit.
    let mut s = Vec::with_capacity(n);
    s.push(all_inv);
    for i in 1..n {
        let lg_i = (usize::BITS - 1 - i.leading_zeros()) as usize;
        let k = 1 << lg_i;
        let u_lg_i_sq = u_sq[(lg_n - 1) - lg_i];
        s.push(s[i - k] * u_lg_i_sq);
    }

    Ok(VerificationScalars { u_sq, u_inv_sq, s })
}
