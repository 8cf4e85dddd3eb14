use curve25519_dalek::{
    ristretto::RistrettoPoint,
    scalar::Scalar,
    traits::{MultiscalarMul, VartimeMultiscalarMul},
};
use merlin::Transcript;

use privacy_primitives::{
    InnerProductProof, ScalarVector,
    transcript::{inner_product_domain_sep, round_challenge},
    vector::inner_product,
};

use crate::ProverError;

/// Prove `p = <a, g> + <b, h> + <a, b>·u` in `log2(n)` folding rounds.
///
/// Each round halves the vectors:
///
/// ```text
/// L  = <a_lo, g_hi> + <b_hi, h_lo> + <a_lo, b_hi>·u
/// R  = <a_hi, g_lo> + <b_lo, h_hi> + <a_hi, b_lo>·u
/// a' = x·a_lo + x⁻¹·a_hi        b' = x⁻¹·b_lo + x·b_hi
/// g' = x⁻¹·g_lo + x·g_hi        h' = x·h_lo + x⁻¹·h_hi
/// ```
pub(crate) fn prove(
    transcript: &mut Transcript,
    g: &[RistrettoPoint],
    h: &[RistrettoPoint],
    u: &RistrettoPoint,
    a: ScalarVector,
    b: ScalarVector,
    p: RistrettoPoint,
) -> Result<InnerProductProof, ProverError> {
    let mut n = a.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(ProverError::ProofConstruction(
            "inner product length must be a power of two",
        ));
    }
    if b.len() != n || g.len() != n || h.len() != n {
        return Err(ProverError::ProofConstruction(
            "inner product vectors and generators differ in length",
        ));
    }

    inner_product_domain_sep(transcript, n);

    let rounds = n.trailing_zeros() as usize;
    let mut l_vec = Vec::with_capacity(rounds);
    let mut r_vec = Vec::with_capacity(rounds);
    let mut a = a;
    let mut b = b;
    let mut g = g.to_vec();
    let mut h = h.to_vec();

    while n > 1 {
        n /= 2;
        let (a_lo, a_hi) = a.split_at(n)?;
        let (b_lo, b_hi) = b.split_at(n)?;
        let (g_lo, g_hi) = g.split_at(n);
        let (h_lo, h_hi) = h.split_at(n);

        let c_l = inner_product(a_lo, b_hi)?;
        let c_r = inner_product(a_hi, b_lo)?;

        let l = RistrettoPoint::multiscalar_mul(
            a_lo.iter().chain(b_hi).chain(core::iter::once(&c_l)),
            g_hi.iter().chain(h_lo).chain(core::iter::once(u)),
        );
        let r = RistrettoPoint::multiscalar_mul(
            a_hi.iter().chain(b_lo).chain(core::iter::once(&c_r)),
            g_lo.iter().chain(h_hi).chain(core::iter::once(u)),
        );

        let x = round_challenge(transcript, &l, &r);
        if x == Scalar::ZERO {
            return Err(ProverError::ProofConstruction("zero folding challenge"));
        }
        let x_inv = x.invert();

        let a_next: ScalarVector = a_lo
            .iter()
            .zip(a_hi)
            .map(|(lo, hi)| x * lo + x_inv * hi)
            .collect();
        let b_next: ScalarVector = b_lo
            .iter()
            .zip(b_hi)
            .map(|(lo, hi)| x_inv * lo + x * hi)
            .collect();
        let g_next: Vec<RistrettoPoint> = g_lo
            .iter()
            .zip(g_hi)
            .map(|(lo, hi)| RistrettoPoint::vartime_multiscalar_mul([x_inv, x], [lo, hi]))
            .collect();
        let h_next: Vec<RistrettoPoint> = h_lo
            .iter()
            .zip(h_hi)
            .map(|(lo, hi)| RistrettoPoint::vartime_multiscalar_mul([x, x_inv], [lo, hi]))
            .collect();

        a = a_next;
        b = b_next;
        g = g_next;
        h = h_next;
        l_vec.push(l);
        r_vec.push(r);
    }

    Ok(InnerProductProof {
        l: l_vec,
        r: r_vec,
        a: a[0],
        b: b[0],
        p,
    })
}
