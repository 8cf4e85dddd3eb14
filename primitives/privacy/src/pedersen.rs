//! Pedersen commitment basis.
//!
//! `Com(v, r) = v·value + r·randomness`. For confidential assets the value generator is the coin's
//! asset tag; a tag-specific basis is a fresh copy built per call.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
    traits::MultiscalarMul,
};
use sha2::Sha512;

pub const PEDERSEN_RANDOMNESS_LABEL: &[u8] = b"privacy/PedersenRandomness";
pub const ASSET_TAG_LABEL: &[u8] = b"privacy/AssetTag";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorRole {
    Value,
    Randomness,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PedersenBasis {
    value: RistrettoPoint,
    randomness: RistrettoPoint,
}

impl Default for PedersenBasis {
    fn default() -> Self {
        Self::standard()
    }
}

impl PedersenBasis {
    /// Ristretto base point for values, a labelled hash-to-point for blinding.
    pub fn standard() -> Self {
        Self {
            value: G,
            randomness: pedersen_randomness_generator(),
        }
    }

    /// Same randomness generator, `tag` in the value slot.
    pub fn with_asset_tag(&self, tag: RistrettoPoint) -> Self {
        Self {
            value: tag,
            randomness: self.randomness,
        }
    }

    pub fn generator(&self, role: GeneratorRole) -> RistrettoPoint {
        match role {
            GeneratorRole::Value => self.value,
            GeneratorRole::Randomness => self.randomness,
        }
    }

    pub fn value_generator(&self) -> RistrettoPoint {
        self.value
    }

    pub fn randomness_generator(&self) -> RistrettoPoint {
        self.randomness
    }

    pub fn commit(&self, value: &Scalar, randomness: &Scalar) -> RistrettoPoint {
        RistrettoPoint::multiscalar_mul([value, randomness], [&self.value, &self.randomness])
    }

    pub fn commit_u64(&self, value: u64, randomness: &Scalar) -> RistrettoPoint {
        self.commit(&Scalar::from(value), randomness)
    }

    /// `tag + blinder·randomness`. Coins carrying tags blinded this way can share one aggregated
    /// proof once their witnesses are rewritten against the first coin's tag.
    pub fn blind_asset_tag(&self, tag: &RistrettoPoint, blinder: &Scalar) -> RistrettoPoint {
        tag + blinder * self.randomness
    }
}

pub fn pedersen_randomness_generator() -> RistrettoPoint {
    RistrettoPoint::hash_from_bytes::<Sha512>(PEDERSEN_RANDOMNESS_LABEL)
}

/// Unblinded asset tag of a token id.
pub fn asset_tag_from_id(asset_id: &[u8]) -> RistrettoPoint {
    let mut buf = alloc::vec::Vec::with_capacity(ASSET_TAG_LABEL.len() + asset_id.len());
    buf.extend_from_slice(ASSET_TAG_LABEL);
    buf.extend_from_slice(asset_id);
    RistrettoPoint::hash_from_bytes::<Sha512>(&buf)
}
