//! Aggregated range prover over a confidential-asset commitment basis.

use core::fmt;

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar, traits::MultiscalarMul};
use log::debug;
use rand::{CryptoRng, RngCore};

use privacy_primitives::{
    BulletproofGens, Error, MAX_EXP, MAX_OUTPUT_COIN, PedersenBasis, RangeProof, ScalarVector,
    round_up_pow_two,
    transcript::{challenges_xw, challenges_yz, new_range_transcript},
};

use crate::{ProverError, inner_product, random_scalar};

/// Secret opening of the coins one proof covers: `values[j]` blinded by `rands[j]`.
#[derive(Clone, PartialEq, Eq)]
pub struct Witness {
    values: Vec<u64>,
    rands: Vec<Scalar>,
}

// Blindings never reach logs or panic messages.
impl fmt::Debug for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Witness")
            .field("values", &self.values)
            .field("rands", &format_args!("<{} redacted>", self.rands.len()))
            .finish()
    }
}

impl Witness {
    pub fn new(values: Vec<u64>, rands: Vec<Scalar>) -> Result<Self, ProverError> {
        if values.len() != rands.len() {
            return Err(Error::LengthMismatch {
                expected: values.len(),
                actual: rands.len(),
            }
            .into());
        }
        if values.is_empty() {
            return Err(ProverError::InvalidInput("witness has no values"));
        }
        if values.len() > MAX_OUTPUT_COIN {
            return Err(ProverError::InvalidInput("too many values for one proof"));
        }
        Ok(Self { values, rands })
    }

    pub fn with_random_blindings<R: RngCore + CryptoRng + ?Sized>(
        values: Vec<u64>,
        rng: &mut R,
    ) -> Result<Self, ProverError> {
        let rands = values.iter().map(|_| random_scalar(rng)).collect();
        Self::new(values, rands)
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn rands(&self) -> &[Scalar] {
        &self.rands
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `Com_tag(values[j], rands[j])` for every coin.
    pub fn commitments(&self, asset_tag: &RistrettoPoint) -> Vec<RistrettoPoint> {
        let basis = PedersenBasis::standard().with_asset_tag(*asset_tag);
        self.values
            .iter()
            .zip(&self.rands)
            .map(|(v, r)| basis.commit_u64(*v, r))
            .collect()
    }
}

/// Rewrite each blinding as `rands[i] + (blinders[i] - blinders[0])·values[i]`.
///
/// A coin committed under its own blinded tag `T + b_i·H` then opens to the same point under the
/// first coin's tag `T + b_0·H`.
pub fn transform_witness_to_ca_witness(
    witness: &Witness,
    asset_tag_blinders: &[Scalar],
) -> Result<Witness, ProverError> {
    if asset_tag_blinders.len() != witness.len() {
        return Err(Error::LengthMismatch {
            expected: witness.len(),
            actual: asset_tag_blinders.len(),
        }
        .into());
    }
    let first = asset_tag_blinders[0];
    let rands = witness
        .values
        .iter()
        .zip(&witness.rands)
        .zip(asset_tag_blinders)
        .map(|((v, r), b)| r + (b - first) * Scalar::from(*v))
        .collect();
    Witness::new(witness.values.clone(), rands)
}

/// Prove with the process-wide generators and the thread-local CSPRNG.
pub fn prove(witness: &Witness, asset_tag: &RistrettoPoint) -> Result<RangeProof, ProverError> {
    prove_with_gens(BulletproofGens::shared(), witness, asset_tag, &mut rand::rng())
}

pub fn prove_with_rng<R: RngCore + CryptoRng + ?Sized>(
    witness: &Witness,
    asset_tag: &RistrettoPoint,
    rng: &mut R,
) -> Result<RangeProof, ProverError> {
    prove_with_gens(BulletproofGens::shared(), witness, asset_tag, rng)
}

pub fn prove_with_gens<R: RngCore + CryptoRng + ?Sized>(
    gens: &BulletproofGens,
    witness: &Witness,
    asset_tag: &RistrettoPoint,
    rng: &mut R,
) -> Result<RangeProof, ProverError> {
    let num_value = witness.len();
    if num_value == 0 || num_value > MAX_OUTPUT_COIN {
        return Err(ProverError::InvalidInput("number of values out of range"));
    }
    let num_value_pad = round_up_pow_two(num_value);
    let n = MAX_EXP * num_value_pad;
    let params = gens.params(n)?;

    let basis = PedersenBasis::standard().with_asset_tag(*asset_tag);
    let h_rand = basis.randomness_generator();

    let cms_value = witness.commitments(asset_tag);
    let mut transcript = new_range_transcript(MAX_EXP, num_value_pad, asset_tag, &cms_value);

    // Padded coins are zero values with zero blinding.
    let a_l: ScalarVector = (0..num_value_pad)
        .flat_map(|j| {
            let v = witness.values.get(j).copied().unwrap_or(0);
            ScalarVector::from_bits(v, MAX_EXP).into_inner()
        })
        .collect();
    let a_r = a_l.add_scalar(&-Scalar::ONE);
    check_len(&a_l, n)?;

    let alpha = random_scalar(rng);
    let a_commit = RistrettoPoint::multiscalar_mul(
        core::iter::once(&alpha).chain(a_l.iter()).chain(a_r.iter()),
        core::iter::once(&h_rand).chain(params.g).chain(params.h),
    );

    let s_l: ScalarVector = (0..n).map(|_| random_scalar(rng)).collect();
    let s_r: ScalarVector = (0..n).map(|_| random_scalar(rng)).collect();
    let rho = random_scalar(rng);
    let s_commit = RistrettoPoint::multiscalar_mul(
        core::iter::once(&rho).chain(s_l.iter()).chain(s_r.iter()),
        core::iter::once(&h_rand).chain(params.g).chain(params.h),
    );

    let (y, z) = challenges_yz(&mut transcript, &a_commit, &s_commit);

    let y_pow = ScalarVector::powers(y, n);
    let two_pow = ScalarVector::powers(Scalar::from(2u64), MAX_EXP);
    // z^(2+j) for every padded coin j
    let z_sq = z * z;
    let z_coin = ScalarVector::powers(z, num_value_pad).mul_scalar(&z_sq);
    let zz: ScalarVector = (0..n)
        .map(|i| z_coin[i / MAX_EXP] * two_pow[i % MAX_EXP])
        .collect();

    // l(X) = l0 + l1·X, r(X) = r0 + r1·X
    let l0 = a_l.add_scalar(&-z);
    let l1 = s_l;
    let r0 = y_pow.hadamard(&a_r.add_scalar(&z))?.add(&zz)?;
    let r1 = y_pow.hadamard(&s_r)?;

    let t1 = l0.inner_product(&r1)? + l1.inner_product(&r0)?;
    let t2 = l1.inner_product(&r1)?;

    let tau1 = random_scalar(rng);
    let tau2 = random_scalar(rng);
    let t1_commit = basis.commit(&t1, &tau1);
    let t2_commit = basis.commit(&t2, &tau2);

    let (x, w) = challenges_xw(&mut transcript, &t1_commit, &t2_commit);

    let l = l0.add(&l1.mul_scalar(&x))?;
    let r = r0.add(&r1.mul_scalar(&x))?;
    let t_hat = l.inner_product(&r)?;

    let blinding_sum: Scalar = witness
        .rands
        .iter()
        .zip(z_coin.iter())
        .map(|(rand, zj)| rand * zj)
        .sum();
    let tau_x = tau2 * x * x + tau1 * x + blinding_sum;
    let mu = alpha + rho * x;

    let u_prime = w * params.u;
    let h_prime = params.h_prime(&y);
    let p = RistrettoPoint::multiscalar_mul(
        l.iter().chain(r.iter()).chain(core::iter::once(&t_hat)),
        params.g.iter().chain(&h_prime).chain(core::iter::once(&u_prime)),
    );

    let inner_product_proof =
        inner_product::prove(&mut transcript, params.g, &h_prime, &u_prime, l, r, p)?;

    debug!(
        target: "privacy",
        "built range proof: coins={num_value} n={n} rounds={}",
        inner_product_proof.rounds()
    );

    Ok(RangeProof {
        cms_value,
        a: a_commit,
        s: s_commit,
        t1: t1_commit,
        t2: t2_commit,
        tau_x,
        t_hat,
        mu,
        inner_product_proof,
    })
}

fn check_len(v: &ScalarVector, n: usize) -> Result<(), ProverError> {
    if v.len() != n {
        return Err(ProverError::ProofConstruction("bit vector has the wrong length"));
    }
    Ok(())
}
