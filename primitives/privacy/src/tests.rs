use crate::*;
use crate::ota::{OTA_RECEIVER_SIZE, PRIVATE_RECEIVING_ADDRESS_TYPE, TX_RANDOM_SIZE};
use crate::vector::inner_product;
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
    traits::Identity,
};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_scalar_test<R: RngCore>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}

fn point(k: u64) -> RistrettoPoint {
    Scalar::from(k) * G
}

fn sample_proof(num_value: usize, rounds: usize) -> RangeProof {
    RangeProof {
        cms_value: (0..num_value as u64).map(|i| point(100 + i)).collect(),
        a: point(1),
        s: point(2),
        t1: point(3),
        t2: point(4),
        tau_x: Scalar::from(5u64),
        t_hat: Scalar::from(6u64),
        mu: Scalar::from(7u64),
        inner_product_proof: InnerProductProof {
            l: (0..rounds as u64).map(|i| point(200 + i)).collect(),
            r: (0..rounds as u64).map(|i| point(300 + i)).collect(),
            a: Scalar::from(8u64),
            b: Scalar::from(9u64),
            p: point(10),
        },
    }
}

#[test]
fn padding_rounds_up_to_power_of_two() {
    assert_eq!(round_up_pow_two(0), 1);
    assert_eq!(round_up_pow_two(1), 1);
    assert_eq!(round_up_pow_two(3), 4);
    assert_eq!(round_up_pow_two(4), 4);
    assert_eq!(round_up_pow_two(MAX_OUTPUT_COIN), 32);
}

#[test]
fn bit_decomposition_recomposes_value() {
    let value = 0xdead_beef_u64;
    let bits = ScalarVector::from_bits(value, MAX_EXP);
    let twos = ScalarVector::powers(Scalar::from(2u64), MAX_EXP);
    assert_eq!(bits.inner_product(&twos).expect("same length"), Scalar::from(value));
    assert!(bits.iter().all(|b| *b == Scalar::ZERO || *b == Scalar::ONE));
}

#[test]
fn vector_ops_reject_length_mismatch() {
    let a = ScalarVector::zeros(4);
    let b = ScalarVector::zeros(3);
    assert_eq!(
        a.add(&b),
        Err(Error::LengthMismatch {
            expected: 4,
            actual: 3
        })
    );
    assert!(a.hadamard(&b).is_err());
    assert!(inner_product(a.as_slice(), b.as_slice()).is_err());

    let (lo, hi) = a.split_at(1).expect("in range");
    assert_eq!((lo.len(), hi.len()), (1, 3));
    assert!(a.split_at(5).is_err());
}

#[test]
fn powers_vector_starts_at_one() {
    let y = Scalar::from(3u64);
    let p = ScalarVector::powers(y, 4);
    assert_eq!(p.as_slice(), &[
        Scalar::ONE,
        Scalar::from(3u64),
        Scalar::from(9u64),
        Scalar::from(27u64)
    ]);
    assert_eq!(p.sum(), Scalar::from(40u64));
}

#[test]
fn asset_tag_basis_is_a_copy() {
    let standard = PedersenBasis::standard();
    let tag = asset_tag_from_id(b"token-a");
    let tagged = standard.with_asset_tag(tag);

    assert_eq!(standard.value_generator(), G);
    assert_eq!(tagged.generator(GeneratorRole::Value), tag);
    assert_eq!(
        tagged.generator(GeneratorRole::Randomness),
        standard.randomness_generator()
    );
}

#[test]
fn commitments_are_additive() {
    let basis = PedersenBasis::standard().with_asset_tag(asset_tag_from_id(b"token"));
    let (r1, r2) = (Scalar::from(11u64), Scalar::from(13u64));
    let sum = basis.commit_u64(5, &r1) + basis.commit_u64(7, &r2);
    assert_eq!(sum, basis.commit_u64(12, &(r1 + r2)));
}

#[test]
fn blinded_tag_moves_blinding_into_randomness() {
    let basis = PedersenBasis::standard();
    let tag = asset_tag_from_id(b"token");
    let blinder = Scalar::from(21u64);
    let blinded = basis.blind_asset_tag(&tag, &blinder);
    let r = Scalar::from(4u64);

    let lhs = basis.with_asset_tag(blinded).commit_u64(3, &r);
    let rhs = basis
        .with_asset_tag(tag)
        .commit(&Scalar::from(3u64), &(r + blinder * Scalar::from(3u64)));
    assert_eq!(lhs, rhs);
}

#[test]
fn generator_prefix_is_stable() {
    let small = BulletproofGens::new(8);
    let big = BulletproofGens::new(16);
    let ps = small.params(8).expect("fits");
    let pb = big.params(8).expect("fits");
    assert_eq!(ps.g, pb.g);
    assert_eq!(ps.h, pb.h);
    assert_eq!(ps.u, pb.u);
    assert!(small.params(9).is_err());
}

#[test]
fn h_prime_rescales_by_inverse_powers() {
    let gens = BulletproofGens::new(4);
    let params = gens.params(4).expect("fits");
    let y = Scalar::from(5u64);
    let hp = params.h_prime(&y);
    for (i, (h, h_prime)) in params.h.iter().zip(hp.iter()).enumerate() {
        let y_i = ScalarVector::powers(y, i + 1)[i];
        assert_eq!(y_i * h_prime, *h);
    }
}

#[test]
fn shared_generators_cover_the_largest_proof() {
    let gens = BulletproofGens::shared();
    assert_eq!(gens.capacity(), MAX_EXP * 32);
    assert!(core::ptr::eq(gens, BulletproofGens::shared()));
}

#[test]
fn range_proof_codec_round_trip() {
    let proof = sample_proof(3, 8);
    let bytes = proof.to_bytes().expect("encode");
    assert_eq!(bytes.len(), 1 + 3 * 32 + 4 * 32 + 3 * 32 + 1 + 16 * 32 + 3 * 32);
    assert_eq!(RangeProof::from_bytes(&bytes).expect("decode"), proof);
}

#[test]
fn range_proof_codec_rejects_malformed_input() {
    let bytes = sample_proof(2, 7).to_bytes().expect("encode");

    assert!(RangeProof::from_bytes(&bytes[..bytes.len() - 1]).is_err());

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert_eq!(
        RangeProof::from_bytes(&trailing),
        Err(Error::InvalidInput("trailing bytes after range proof"))
    );

    let mut no_coins = bytes.clone();
    no_coins[0] = 0;
    assert!(RangeProof::from_bytes(&no_coins).is_err());

    let mut too_many = bytes.clone();
    too_many[0] = (MAX_OUTPUT_COIN + 1) as u8;
    assert!(RangeProof::from_bytes(&too_many).is_err());

    // 0xff.. is not a valid Ristretto encoding
    let mut bad_point = bytes.clone();
    bad_point[1..33].copy_from_slice(&[0xff; 32]);
    assert!(matches!(
        RangeProof::from_bytes(&bad_point),
        Err(Error::InvalidPoint(_))
    ));

    // all-ones tau_x is above the group order
    let mut bad_scalar = bytes;
    let tau_off = 1 + 2 * 32 + 4 * 32;
    bad_scalar[tau_off..tau_off + 32].copy_from_slice(&[0xff; 32]);
    assert!(RangeProof::from_bytes(&bad_scalar).is_err());
}

#[test]
fn range_proof_codec_refuses_lengths_past_one_byte() {
    let wide = sample_proof(256, 1);
    assert_eq!(
        wide.to_bytes(),
        Err(Error::InvalidInput("number of value commitments out of range"))
    );

    let deep = sample_proof(1, 256);
    assert_eq!(
        deep.to_bytes(),
        Err(Error::InvalidInput("inner product proof has too many rounds"))
    );

    let mut uneven = sample_proof(1, 3);
    uneven.inner_product_proof.r.pop();
    let mut out = alloc::vec::Vec::new();
    assert_eq!(
        uneven.inner_product_proof.write_to(&mut out),
        Err(Error::LengthMismatch {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn point_slices_must_be_exactly_one_encoding() {
    let p = point(23);
    let bytes = point_to_bytes(&p);
    assert_eq!(point_from_slice(&bytes), Ok(p));
    assert_eq!(point_from_bytes(&bytes), Ok(p));
    assert_eq!(
        point_from_slice(&bytes[..31]),
        Err(Error::InvalidInput("point encoding must be 32 bytes"))
    );
    let mut long = [0u8; 33];
    long[..32].copy_from_slice(&bytes);
    assert!(point_from_slice(&long).is_err());
    assert!(matches!(point_from_slice(&[0xff; 32]), Err(Error::InvalidPoint(_))));
}

#[test]
fn shard_info_layout() {
    let mut pk = [0u8; 32];
    // receiver 5, sender 3, mint
    pk[31] = 5 + 3 * 8 + 64;
    let info = CoinShardInfo::from_public_key_bytes(&pk).expect("decodes");
    assert_eq!(info.receiver_shard, 5);
    assert_eq!(info.sender_shard, 3);
    assert_eq!(info.privacy_type, CoinPrivacyType::Mint);

    // the high bit is masked off
    pk[31] |= 0x80;
    assert_eq!(CoinShardInfo::from_public_key_bytes(&pk).expect("decodes"), info);

    assert_eq!(CoinPrivacyType::try_from(2), Err(Error::UnsupportedPrivacyType(2)));
}

#[test]
fn tx_random_accessors() {
    let ota = point(17);
    let conceal = point(19);
    let mut txr = TxRandom::new(&ota, &conceal, 42);
    assert_eq!(txr.ota_random_point(), Ok(ota));
    assert_eq!(txr.conceal_random_point(), Ok(conceal));
    assert_eq!(txr.index(), 42);

    txr.set_index(u32::MAX);
    assert_eq!(txr.index(), u32::MAX);
    assert_eq!(&txr.as_bytes()[32..36], &[0xff; 4]);

    assert!(TxRandom::from_bytes(&[0u8; TX_RANDOM_SIZE - 1]).is_err());
    let mut raw = *txr.as_bytes();
    raw[..32].copy_from_slice(&[0xff; 32]);
    let broken = TxRandom::from_bytes(&raw).expect("length ok");
    assert!(broken.ota_random_point().is_err());
}

fn receiver_for(spend: &Scalar, ota: &Scalar, r: &Scalar, index: u32) -> OtaReceiver {
    let addr = PaymentAddress::from_secrets(spend, ota);
    let shared = r * addr.public_ota;
    OtaReceiver {
        public_key: one_time_public_key(&shared, index, &addr.public_spend),
        tx_random: TxRandom::new(&(r * G), &RistrettoPoint::identity(), index),
    }
}

#[test]
fn recipient_recognises_and_spends_output() {
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let spend = random_scalar_test(&mut rng);
    let ota = random_scalar_test(&mut rng);
    let r = random_scalar_test(&mut rng);
    let recv = receiver_for(&spend, &ota, &r, 7);

    let addr = PaymentAddress::from_secrets(&spend, &ota);
    assert!(recv.is_valid());
    assert!(recv.is_owned_by(&ota, &addr.public_spend));
    assert!(!recv.is_owned_by(&(ota + Scalar::ONE), &addr.public_spend));

    let sk = recv.spending_key(&ota, &spend).expect("points decode");
    assert_eq!(sk * G, recv.public_key);
}

#[test]
fn ota_receiver_byte_and_text_encodings() {
    let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
    let recv = receiver_for(
        &random_scalar_test(&mut rng),
        &random_scalar_test(&mut rng),
        &random_scalar_test(&mut rng),
        3,
    );

    let bytes = recv.to_bytes();
    assert_eq!(bytes.len(), OTA_RECEIVER_SIZE);
    assert_eq!(bytes[0], PRIVATE_RECEIVING_ADDRESS_TYPE);
    assert_eq!(OtaReceiver::from_bytes(&bytes), Ok(recv));

    let text = recv.to_string();
    assert_eq!(text.parse::<OtaReceiver>(), Ok(recv));

    let json = serde_json::to_string(&recv).expect("serialize");
    assert_eq!(json, format!("\"{text}\""));
    let back: OtaReceiver = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, recv);

    assert!(!recv.encoded_public_key().is_empty());
    assert!(!recv.encoded_tx_random().is_empty());
}

#[test]
fn ota_receiver_rejects_bad_encodings() {
    let recv = receiver_for(&Scalar::from(2u64), &Scalar::from(3u64), &Scalar::from(4u64), 1);
    let bytes = recv.to_bytes();

    assert!(OtaReceiver::from_bytes(&[]).is_err());
    assert!(OtaReceiver::from_bytes(&bytes[..20]).is_err());
    assert!(OtaReceiver::from_bytes(&bytes[..bytes.len() - 1]).is_err());

    let mut wrong_prefix = bytes;
    wrong_prefix[0] = 0x1;
    assert_eq!(
        OtaReceiver::from_bytes(&wrong_prefix),
        Err(Error::InvalidInput("unrecognized prefix for receiving address"))
    );

    let mut text = recv.to_string();
    let last = text.pop().expect("non-empty");
    text.push(if last == '2' { '3' } else { '2' });
    assert!(text.parse::<OtaReceiver>().is_err());
    assert!(serde_json::from_str::<OtaReceiver>("\"not-base58-0OIl\"").is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: every last byte below 128 decodes to a bucket that re-encodes to the same byte.
    #[test]
    fn prop_shard_info_re_encodes(last in 0u8..128) {
        let mut pk = [0u8; 32];
        pk[31] = last;
        let info = CoinShardInfo::from_public_key_bytes(&pk).expect("below 128");
        let re = info.receiver_shard + info.sender_shard * 8 + (info.privacy_type as u8) * 64;
        prop_assert_eq!(re, last);
    }

    /// Property: TxRandom index accessors round-trip any u32.
    #[test]
    fn prop_tx_random_index(index in any::<u32>()) {
        let mut txr = TxRandom::default();
        txr.set_index(index);
        prop_assert_eq!(txr.index(), index);
    }
}
