//! One-time stealth addresses.
//!
//! A sender picks `r`, computes the shared point `rK` from the recipient's OTA key `K`, and for
//! derivation index `i` gets the one-time key
//!
//! ```text
//! P_i = H(rK || be32(i))·G + S
//! ```
//!
//! where `S` is the recipient's spend key. The last byte of `compress(P_i)` encodes the
//! `(sender shard, receiver shard, privacy type)` bucket of the coin; the sender searches over `i`
//! until the key lands in the bucket it needs. The recipient recomputes `rK = k·(r·G)` from the
//! published `TxRandom`.
//!
//! ## Encodings
//!
//! ```text
//! TxRandom    = ota_random_point(32) || index(be32) || conceal_random_point(32)
//! OtaReceiver = PRIVATE_RECEIVING_ADDRESS_TYPE(1) || public_key(32) || TxRandom(68)
//! ```
//!
//! The text form is base58-check with version [`BASE58_VERSION`]; JSON uses the same string.

use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use subtle::ConstantTimeEq;

use crate::{Error, MAX_SHARD_NUMBER, POINT_SIZE, hash_to_scalar, point_from_slice, point_to_bytes};

pub const PRIVATE_RECEIVING_ADDRESS_TYPE: u8 = 0x4;
pub const BASE58_VERSION: u8 = 0x00;
pub const TX_RANDOM_SIZE: usize = POINT_SIZE * 2 + 4;
pub const OTA_RECEIVER_SIZE: usize = 1 + POINT_SIZE + TX_RANDOM_SIZE;

const INDEX_OFFSET: usize = POINT_SIZE;
const CONCEAL_OFFSET: usize = POINT_SIZE + 4;

/// Shard of an address, read from the last byte of its spend key.
pub fn shard_id_from_last_byte(b: u8) -> u8 {
    b % MAX_SHARD_NUMBER
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CoinPrivacyType {
    Transfer = 0,
    Mint = 1,
}

impl TryFrom<u8> for CoinPrivacyType {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(Self::Transfer),
            1 => Ok(Self::Mint),
            other => Err(Error::UnsupportedPrivacyType(other)),
        }
    }
}

/// Bucket a coin public key falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoinShardInfo {
    pub sender_shard: u8,
    pub receiver_shard: u8,
    pub privacy_type: CoinPrivacyType,
}

impl CoinShardInfo {
    /// Decode the bucket from the low 7 bits of the key's last byte: receiver shard in bits
    /// 0..3, sender shard in bits 3..6, privacy type in bit 6.
    pub fn from_public_key_bytes(pk: &[u8; POINT_SIZE]) -> Result<Self, Error> {
        let n = pk[POINT_SIZE - 1] % 128;
        let receiver_shard = n % MAX_SHARD_NUMBER;
        let n = n / MAX_SHARD_NUMBER;
        let sender_shard = n % MAX_SHARD_NUMBER;
        let privacy_type = CoinPrivacyType::try_from(n / MAX_SHARD_NUMBER)?;
        Ok(Self {
            sender_shard,
            receiver_shard,
            privacy_type,
        })
    }

    pub fn from_public_key(pk: &RistrettoPoint) -> Result<Self, Error> {
        Self::from_public_key_bytes(&point_to_bytes(pk))
    }
}

/// Long-term receiving keys of a recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentAddress {
    pub public_spend: RistrettoPoint,
    pub public_ota: RistrettoPoint,
}

impl PaymentAddress {
    pub fn new(public_spend: RistrettoPoint, public_ota: RistrettoPoint) -> Self {
        Self {
            public_spend,
            public_ota,
        }
    }

    pub fn from_secrets(spend_secret: &Scalar, ota_secret: &Scalar) -> Self {
        Self {
            public_spend: RistrettoPoint::mul_base(spend_secret),
            public_ota: RistrettoPoint::mul_base(ota_secret),
        }
    }

    pub fn shard_id(&self) -> u8 {
        shard_id_from_last_byte(self.public_spend.compress().as_bytes()[POINT_SIZE - 1])
    }
}

fn one_time_scalar(shared: &RistrettoPoint, index: u32) -> Scalar {
    let mut buf = [0u8; POINT_SIZE + 4];
    buf[..POINT_SIZE].copy_from_slice(shared.compress().as_bytes());
    buf[POINT_SIZE..].copy_from_slice(&index.to_be_bytes());
    hash_to_scalar(&buf)
}

/// `H(shared || be32(index))·G + public_spend`
pub fn one_time_public_key(
    shared: &RistrettoPoint,
    index: u32,
    public_spend: &RistrettoPoint,
) -> RistrettoPoint {
    RistrettoPoint::mul_base(&one_time_scalar(shared, index)) + public_spend
}

/// Randomness a recipient needs to recognise and spend an output.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TxRandom([u8; TX_RANDOM_SIZE]);

impl Default for TxRandom {
    fn default() -> Self {
        Self([0u8; TX_RANDOM_SIZE])
    }
}

impl fmt::Debug for TxRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxRandom")
            .field("ota_random_point", &&self.0[..INDEX_OFFSET])
            .field("index", &self.index())
            .field("conceal_random_point", &&self.0[CONCEAL_OFFSET..])
            .finish()
    }
}

impl TxRandom {
    pub fn new(ota_random: &RistrettoPoint, conceal_random: &RistrettoPoint, index: u32) -> Self {
        let mut t = Self::default();
        t.set_ota_random_point(ota_random);
        t.set_conceal_random_point(conceal_random);
        t.set_index(index);
        t
    }

    /// Points are not decoded here; the getters validate them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let arr: [u8; TX_RANDOM_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidInput("tx random must be 68 bytes"))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; TX_RANDOM_SIZE] {
        &self.0
    }

    pub fn ota_random_point(&self) -> Result<RistrettoPoint, Error> {
        point_from_slice(&self.0[..INDEX_OFFSET])
    }

    pub fn set_ota_random_point(&mut self, p: &RistrettoPoint) {
        self.0[..INDEX_OFFSET].copy_from_slice(p.compress().as_bytes());
    }

    pub fn conceal_random_point(&self) -> Result<RistrettoPoint, Error> {
        point_from_slice(&self.0[CONCEAL_OFFSET..])
    }

    pub fn set_conceal_random_point(&mut self, p: &RistrettoPoint) {
        self.0[CONCEAL_OFFSET..].copy_from_slice(p.compress().as_bytes());
    }

    pub fn index(&self) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.0[INDEX_OFFSET..CONCEAL_OFFSET]);
        u32::from_be_bytes(b)
    }

    pub fn set_index(&mut self, index: u32) {
        self.0[INDEX_OFFSET..CONCEAL_OFFSET].copy_from_slice(&index.to_be_bytes());
    }
}

/// One-time receiving address for a single output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OtaReceiver {
    pub public_key: RistrettoPoint,
    pub tx_random: TxRandom,
}

impl OtaReceiver {
    /// Both randomness points must decode. `public_key` is a group element by construction.
    pub fn is_valid(&self) -> bool {
        self.tx_random.ota_random_point().is_ok() && self.tx_random.conceal_random_point().is_ok()
    }

    pub fn derive_shard_info(&self) -> Result<CoinShardInfo, Error> {
        CoinShardInfo::from_public_key(&self.public_key)
    }

    /// `(sender shard, receiver shard)`; the privacy-type bit is ignored.
    pub fn shard_ids(&self) -> (u8, u8) {
        let last = self.public_key.compress().as_bytes()[POINT_SIZE - 1] % 128;
        let receiver = last % MAX_SHARD_NUMBER;
        let sender = (last / MAX_SHARD_NUMBER) % MAX_SHARD_NUMBER;
        (sender, receiver)
    }

    fn shared_secret(&self, ota_secret: &Scalar) -> Result<RistrettoPoint, Error> {
        Ok(ota_secret * self.tx_random.ota_random_point()?)
    }

    /// Recipient-side check that this output was derived for `(ota_secret, public_spend)`.
    pub fn is_owned_by(&self, ota_secret: &Scalar, public_spend: &RistrettoPoint) -> bool {
        let Ok(shared) = self.shared_secret(ota_secret) else {
            return false;
        };
        let expected = one_time_public_key(&shared, self.tx_random.index(), public_spend);
        expected.ct_eq(&self.public_key).into()
    }

    /// Private key of the one-time output: `H(rK || be32(i)) + spend_secret`.
    pub fn spending_key(
        &self,
        ota_secret: &Scalar,
        spend_secret: &Scalar,
    ) -> Result<Scalar, Error> {
        let shared = self.shared_secret(ota_secret)?;
        Ok(one_time_scalar(&shared, self.tx_random.index()) + spend_secret)
    }

    pub fn to_bytes(&self) -> [u8; OTA_RECEIVER_SIZE] {
        let mut out = [0u8; OTA_RECEIVER_SIZE];
        out[0] = PRIVATE_RECEIVING_ADDRESS_TYPE;
        out[1..1 + POINT_SIZE].copy_from_slice(&point_to_bytes(&self.public_key));
        out[1 + POINT_SIZE..].copy_from_slice(self.tx_random.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (&prefix, rest) = bytes
            .split_first()
            .ok_or(Error::InvalidInput("not enough bytes to parse receiving address"))?;
        if prefix != PRIVATE_RECEIVING_ADDRESS_TYPE {
            return Err(Error::InvalidInput("unrecognized prefix for receiving address"));
        }
        if rest.len() < POINT_SIZE {
            return Err(Error::InvalidInput("not enough bytes to parse receiving address"));
        }
        let (pk, tx_random) = rest.split_at(POINT_SIZE);
        Ok(Self {
            public_key: point_from_slice(pk)?,
            tx_random: TxRandom::from_bytes(tx_random)?,
        })
    }

    /// Base58-check of the one-time public key alone.
    pub fn encoded_public_key(&self) -> String {
        bs58::encode(self.public_key.compress().as_bytes())
            .with_check_version(BASE58_VERSION)
            .into_string()
    }

    /// Base58-check of the 68 `TxRandom` bytes alone.
    pub fn encoded_tx_random(&self) -> String {
        bs58::encode(self.tx_random.as_bytes())
            .with_check_version(BASE58_VERSION)
            .into_string()
    }
}

impl fmt::Display for OtaReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = bs58::encode(self.to_bytes())
            .with_check_version(BASE58_VERSION)
            .into_string();
        f.write_str(&s)
    }
}

impl FromStr for OtaReceiver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let raw: Vec<u8> = bs58::decode(s)
            .with_check(Some(BASE58_VERSION))
            .into_vec()
            .map_err(|_| Error::InvalidInput("malformed base58-check receiving address"))?;
        // decoded payload still carries the version byte
        let payload = raw
            .get(1..)
            .ok_or(Error::InvalidInput("malformed base58-check receiving address"))?;
        Self::from_bytes(payload)
    }
}

impl Serialize for OtaReceiver {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OtaReceiver {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
