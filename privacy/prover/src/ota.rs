//! One-time address derivation.

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use log::{debug, warn};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use privacy_primitives::{
    CoinPrivacyType, CoinShardInfo, MAX_TRIES_OTA, OtaReceiver, PaymentAddress, TxRandom,
    one_time_public_key,
};

use crate::{ProverError, random_scalar};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtaConfig {
    /// Highest derivation index tried before giving up.
    pub max_tries: u32,
}

impl Default for OtaConfig {
    fn default() -> Self {
        Self {
            max_tries: MAX_TRIES_OTA,
        }
    }
}

/// Candidate one-time keys `(index, key)` for `index = 1..=max_tries`.
#[derive(Clone, Debug)]
pub struct OtaCandidates {
    shared: RistrettoPoint,
    public_spend: RistrettoPoint,
    next: u32,
    max_tries: u32,
}

impl OtaCandidates {
    pub fn new(shared: RistrettoPoint, public_spend: RistrettoPoint, config: &OtaConfig) -> Self {
        Self {
            shared,
            public_spend,
            next: 1,
            max_tries: config.max_tries,
        }
    }
}

impl Iterator for OtaCandidates {
    type Item = (u32, RistrettoPoint);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 || self.next > self.max_tries {
            return None;
        }
        let index = self.next;
        // wraps to 0 only after u32::MAX, which also ends the search
        self.next = self.next.wrapping_add(1);
        Some((
            index,
            one_time_public_key(&self.shared, index, &self.public_spend),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.next == 0 {
            0
        } else {
            self.max_tries.saturating_sub(self.next - 1) as usize
        };
        (left, Some(left))
    }
}

/// Derive a one-time receiver for `address` with the thread-local CSPRNG and the default bound.
///
/// `target_sender_shard = None` means the recipient's own shard. Without `with_conceal` the
/// conceal point is the identity.
pub fn derive_ota(
    address: &PaymentAddress,
    target_sender_shard: Option<u8>,
    privacy_type: CoinPrivacyType,
    with_conceal: bool,
) -> Result<OtaReceiver, ProverError> {
    derive_ota_with_rng(
        &OtaConfig::default(),
        &mut rand::rng(),
        address,
        target_sender_shard,
        privacy_type,
        with_conceal,
    )
}

/// Mint output: sender and receiver shard are both the recipient's, with real concealment.
pub fn derive_mint_ota(address: &PaymentAddress) -> Result<OtaReceiver, ProverError> {
    derive_ota(address, None, CoinPrivacyType::Mint, true)
}

pub fn derive_ota_with_rng<R: RngCore + CryptoRng + ?Sized>(
    config: &OtaConfig,
    rng: &mut R,
    address: &PaymentAddress,
    target_sender_shard: Option<u8>,
    privacy_type: CoinPrivacyType,
    with_conceal: bool,
) -> Result<OtaReceiver, ProverError> {
    let receiver_shard = address.shard_id();
    let target = CoinShardInfo {
        sender_shard: target_sender_shard.unwrap_or(receiver_shard),
        receiver_shard,
        privacy_type,
    };

    let ota_rand = random_scalar(rng);
    let conceal_rand = if with_conceal {
        random_scalar(rng)
    } else {
        Scalar::ZERO
    };
    let shared = ota_rand * address.public_ota;

    let found = OtaCandidates::new(shared, address.public_spend, config).find(|(_, key)| {
        CoinShardInfo::from_public_key(key).is_ok_and(|info| info == target)
    });

    let Some((index, public_key)) = found else {
        warn!(
            target: "privacy",
            "one-time key search exhausted after {} tries for {:?}", config.max_tries, target
        );
        return Err(ProverError::ExhaustedRetries {
            attempts: config.max_tries,
        });
    };
    debug!(target: "privacy", "derived one-time key at index {index} for {target:?}");

    Ok(OtaReceiver {
        public_key,
        tx_random: TxRandom::new(
            &RistrettoPoint::mul_base(&ota_rand),
            &RistrettoPoint::mul_base(&conceal_rand),
            index,
        ),
    })
}
