//! # privacy-prover — stealth outputs and aggregated range proofs
//!
//! Everything here consumes randomness. Verification lives in `privacy-verifier`, which shares
//! the transcript layout and proof types from `privacy-primitives`.
//!
//! ## Stealth Outputs
//!
//! - [`derive_ota`] searches the derivation index until the one-time key lands in the requested
//!   `(sender shard, receiver shard, privacy type)` bucket. The search is an explicit bounded
//!   iterator ([`OtaCandidates`]) capped by [`OtaConfig::max_tries`].
//! - [`derive_mint_ota`] is the mint flavour: both shards are the recipient's own.
//!
//! ## Range Proofs
//!
//! - [`prove`] builds one aggregated proof that every value of a [`Witness`] lies in
//!   `[0, 2^64)`, bound to the asset tag passed in. Nothing global is mutated, so proofs for
//!   different tags can run on different threads.
//! - [`transform_witness_to_ca_witness`] rewrites the blindings of coins whose tags share a base
//!   asset but carry different tag blinders, so one proof under the first coin's tag covers all.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use privacy_prover::{prove, Witness};
//! use privacy_primitives::asset_tag_from_id;
//!
//! let tag = asset_tag_from_id(b"PRV");
//! let witness = Witness::with_random_blindings(vec![5, 10], &mut rand::rng())?;
//! let proof = prove(&witness, &tag)?;
//! let bytes = proof.to_bytes()?;
//! ```
//!
//! ## Security Notes
//!
//! - Blinding scalars use full 256-bit entropy and are drawn fresh for every proof and every
//!   derivation.
//! - The `*_with_rng` entry points exist for seeded tests; production callers should use the
//!   thread-local CSPRNG through [`prove`] and [`derive_ota`].

mod inner_product;
pub mod ota;
pub mod range;

use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

pub use ota::{OtaCandidates, OtaConfig, derive_mint_ota, derive_ota, derive_ota_with_rng};
pub use range::{
    Witness, prove, prove_with_gens, prove_with_rng, transform_witness_to_ca_witness,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProverError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("no one-time key matched the target bucket after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
    #[error("proof construction failed: {0}")]
    ProofConstruction(&'static str),
    #[error(transparent)]
    Primitives(#[from] privacy_primitives::Error),
}

/// Generate a random scalar with full 256-bit entropy.
pub(crate) fn random_scalar<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}
