//! # privacy-primitives — shared types for confidential outputs
//!
//! Everything the prover and the verifier must agree on byte-for-byte lives here:
//!
//! - [`PedersenBasis`]: the `(value, randomness)` generator pair. Confidential-asset proofs swap
//!   the value generator for a coin's asset tag with [`PedersenBasis::with_asset_tag`], which
//!   returns a new basis instead of mutating a shared one.
//! - [`BulletproofGens`] / [`AggregateParams`]: the `g`, `h` vectors and the `u` point used by the
//!   aggregated range proof and its inner-product argument.
//! - [`ScalarVector`]: owned, length-checked scalar vectors.
//! - [`transcript`]: the Fiat-Shamir transcript layout (labels and challenge order).
//! - [`RangeProof`] / [`InnerProductProof`]: the public proof artifact and its byte codec.
//! - [`ota`]: one-time stealth addresses (`PaymentAddress`, `TxRandom`, `OtaReceiver`) together with
//!   the shard/privacy-type bucket encoded in a key's last byte.
//!
//! ## Group
//!
//! Ristretto255 from `curve25519-dalek`. Points travel as 32-byte compressed encodings; a point is
//! valid iff its encoding decompresses.
//!
//! ## Range Proof Byte Layout
//!
//! ```text
//! num_value(1) || V_0..V_k(32 each) || A || S || T1 || T2 || tau_x || t_hat || mu ||
//! rounds(1) || L_0..L_r || R_0..R_r || a || b || p
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod generators;
pub mod ota;
pub mod pedersen;
pub mod proof;
pub mod transcript;
pub mod vector;

#[cfg(test)]
mod tests;

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use sha2::Sha512;
use thiserror::Error;

pub use generators::{AggregateParams, BulletproofGens};
pub use ota::{
    CoinPrivacyType, CoinShardInfo, OtaReceiver, PaymentAddress, TxRandom, one_time_public_key,
};
pub use pedersen::{GeneratorRole, PedersenBasis, asset_tag_from_id};
pub use proof::{InnerProductProof, RangeProof};
pub use transcript::{append_point, challenge_scalar, labels};
pub use vector::ScalarVector;

/// Bit width of every proven value.
pub const MAX_EXP: usize = 64;
/// Largest number of coins one aggregated proof may cover.
pub const MAX_OUTPUT_COIN: usize = 30;
/// Default bound of the one-time address search.
pub const MAX_TRIES_OTA: u32 = 50_000;
/// Number of shards addresses and coins are partitioned into.
pub const MAX_SHARD_NUMBER: u8 = 8;

pub const POINT_SIZE: usize = 32;
pub const SCALAR_SIZE: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid point: {0}")]
    InvalidPoint(&'static str),
    #[error("unsupported coin privacy type {0}")]
    UnsupportedPrivacyType(u8),
}

pub fn point_to_bytes(p: &RistrettoPoint) -> [u8; POINT_SIZE] {
    p.compress().to_bytes()
}

/// Decompress a 32-byte Ristretto encoding, rejecting anything off the group.
pub fn point_from_bytes(bytes: &[u8; POINT_SIZE]) -> Result<RistrettoPoint, Error> {
    CompressedRistretto(*bytes)
        .decompress()
        .ok_or(Error::InvalidPoint("bytes do not decode to a Ristretto point"))
}

pub fn point_from_slice(bytes: &[u8]) -> Result<RistrettoPoint, Error> {
    let arr: [u8; POINT_SIZE] = bytes
        .try_into()
        .map_err(|_| Error::InvalidInput("point encoding must be 32 bytes"))?;
    point_from_bytes(&arr)
}

/// Parse a canonical scalar encoding (`< ℓ`).
pub fn scalar_from_bytes(bytes: &[u8; SCALAR_SIZE]) -> Result<Scalar, Error> {
    Option::from(Scalar::from_canonical_bytes(*bytes))
        .ok_or(Error::InvalidInput("non-canonical scalar encoding"))
}

pub fn hash_to_scalar(data: &[u8]) -> Scalar {
    Scalar::hash_from_bytes::<Sha512>(data)
}

/// Smallest power of two `>= n`, with `0` and `1` both mapping to `1`.
pub fn round_up_pow_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}
