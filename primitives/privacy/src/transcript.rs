//! Fiat-Shamir transcript shared by the range prover and both verifiers.
//!
//! Order: domain separator, `n`, `m`, asset tag, value commitments, `A`, `S` → `y`, `z`;
//! `T1`, `T2` → `x`, `w`; then one `(L, R)` → `u_k` per inner-product round.

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use merlin::Transcript;

pub mod labels {
    pub const PROTOCOL: &[u8] = b"privacy/ca-bulletproof";
    pub const PROTOCOL_V: &[u8] = b"v2";
    pub const DOMAIN_SEP: &[u8] = b"dom-sep";
    pub const RANGE_PROOF: &[u8] = b"aggregated-rangeproof";
    pub const INNER_PRODUCT: &[u8] = b"inner-product";

    pub const CHAL_Y: &[u8] = b"y";
    pub const CHAL_Z: &[u8] = b"z";
    pub const CHAL_X: &[u8] = b"x";
    pub const CHAL_W: &[u8] = b"w";
    pub const CHAL_U: &[u8] = b"u";
}

pub fn append_point(t: &mut Transcript, label: &'static [u8], p: &RistrettoPoint) {
    t.append_message(label, p.compress().as_bytes());
}

pub fn challenge_scalar(t: &mut Transcript, label: &'static [u8]) -> Scalar {
    let mut wide = [0u8; 64];
    t.challenge_bytes(label, &mut wide);
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Fresh transcript bound to the proof shape, the asset tag and every per-coin commitment.
pub fn new_range_transcript(
    max_exp: usize,
    num_value_pad: usize,
    asset_tag: &RistrettoPoint,
    value_commitments: &[RistrettoPoint],
) -> Transcript {
    let mut t = Transcript::new(labels::PROTOCOL);
    t.append_message(b"proto", labels::PROTOCOL_V);
    t.append_message(labels::DOMAIN_SEP, labels::RANGE_PROOF);
    t.append_u64(b"n", max_exp as u64);
    t.append_u64(b"m", num_value_pad as u64);
    append_point(&mut t, b"asset_tag", asset_tag);
    t.append_u64(b"num_value", value_commitments.len() as u64);
    for v in value_commitments {
        append_point(&mut t, b"V", v);
    }
    t
}

/// Absorb `A`, `S` and squeeze `(y, z)`.
pub fn challenges_yz(
    t: &mut Transcript,
    a: &RistrettoPoint,
    s: &RistrettoPoint,
) -> (Scalar, Scalar) {
    append_point(t, b"A", a);
    append_point(t, b"S", s);
    let y = challenge_scalar(t, labels::CHAL_Y);
    let z = challenge_scalar(t, labels::CHAL_Z);
    log::trace!(target: "privacy", "derived range challenges y, z");
    (y, z)
}

/// Absorb `T1`, `T2` and squeeze `x` and the `u`-rescaling factor `w`.
pub fn challenges_xw(
    t: &mut Transcript,
    t1: &RistrettoPoint,
    t2: &RistrettoPoint,
) -> (Scalar, Scalar) {
    append_point(t, b"T1", t1);
    append_point(t, b"T2", t2);
    let x = challenge_scalar(t, labels::CHAL_X);
    let w = challenge_scalar(t, labels::CHAL_W);
    log::trace!(target: "privacy", "derived range challenges x, w");
    (x, w)
}

pub fn inner_product_domain_sep(t: &mut Transcript, n: usize) {
    t.append_message(labels::DOMAIN_SEP, labels::INNER_PRODUCT);
    t.append_u64(b"n", n as u64);
}

/// Absorb one folding round and squeeze its challenge.
pub fn round_challenge(t: &mut Transcript, l: &RistrettoPoint, r: &RistrettoPoint) -> Scalar {
    append_point(t, b"L", l);
    append_point(t, b"R", r);
    challenge_scalar(t, labels::CHAL_U)
}
