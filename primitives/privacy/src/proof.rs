//! Range proof and inner-product proof artifacts.

use alloc::vec::Vec;

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};

use crate::{Error, MAX_OUTPUT_COIN, POINT_SIZE, SCALAR_SIZE, point_from_slice, scalar_from_bytes};

// N never exceeds 2^31.
const MAX_ROUNDS: usize = 31;

/// Compressed claim `<a, b> = c`: `log2(N)` folding rounds plus the final scalars.
///
/// `p` is the commitment the argument opens; the range verifiers recompute it from the outer
/// proof and reject a mismatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerProductProof {
    pub l: Vec<RistrettoPoint>,
    pub r: Vec<RistrettoPoint>,
    pub a: Scalar,
    pub b: Scalar,
    pub p: RistrettoPoint,
}

impl InnerProductProof {
    pub fn rounds(&self) -> usize {
        self.l.len()
    }

    pub fn encoded_len(&self) -> usize {
        1 + 2 * self.l.len() * POINT_SIZE + 2 * SCALAR_SIZE + POINT_SIZE
    }

    /// Appends the encoding to `out`; fails when the round count does not fit the length byte.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let rounds = u8::try_from(self.l.len())
            .map_err(|_| Error::InvalidInput("inner product proof has too many rounds"))?;
        if self.r.len() != self.l.len() {
            return Err(Error::LengthMismatch {
                expected: self.l.len(),
                actual: self.r.len(),
            });
        }
        out.push(rounds);
        for p in self.l.iter().chain(self.r.iter()) {
            out.extend_from_slice(p.compress().as_bytes());
        }
        out.extend_from_slice(self.a.as_bytes());
        out.extend_from_slice(self.b.as_bytes());
        out.extend_from_slice(self.p.compress().as_bytes());
        Ok(())
    }

    fn read_from(rd: &mut Reader<'_>) -> Result<Self, Error> {
        let rounds = rd.u8()? as usize;
        if rounds > MAX_ROUNDS {
            return Err(Error::InvalidInput("inner product proof has too many rounds"));
        }
        let l = (0..rounds).map(|_| rd.point()).collect::<Result<Vec<_>, _>>()?;
        let r = (0..rounds).map(|_| rd.point()).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            l,
            r,
            a: rd.scalar()?,
            b: rd.scalar()?,
            p: rd.point()?,
        })
    }
}

/// Aggregated range proof over `cms_value.len()` coins, bound to one asset tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeProof {
    pub cms_value: Vec<RistrettoPoint>,
    pub a: RistrettoPoint,
    pub s: RistrettoPoint,
    pub t1: RistrettoPoint,
    pub t2: RistrettoPoint,
    pub tau_x: Scalar,
    pub t_hat: Scalar,
    pub mu: Scalar,
    pub inner_product_proof: InnerProductProof,
}

impl RangeProof {
    pub fn value_commitments(&self) -> &[RistrettoPoint] {
        &self.cms_value
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let num_value = u8::try_from(self.cms_value.len())
            .map_err(|_| Error::InvalidInput("number of value commitments out of range"))?;
        let mut out = Vec::with_capacity(
            1 + self.cms_value.len() * POINT_SIZE
                + 4 * POINT_SIZE
                + 3 * SCALAR_SIZE
                + self.inner_product_proof.encoded_len(),
        );
        out.push(num_value);
        for v in &self.cms_value {
            out.extend_from_slice(v.compress().as_bytes());
        }
        for p in [&self.a, &self.s, &self.t1, &self.t2] {
            out.extend_from_slice(p.compress().as_bytes());
        }
        for x in [&self.tau_x, &self.t_hat, &self.mu] {
            out.extend_from_slice(x.as_bytes());
        }
        self.inner_product_proof.write_to(&mut out)?;
        Ok(out)
    }

    /// Length-checked parse; every point must decompress and every scalar must be canonical.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut rd = Reader { buf: bytes };
        let num_value = rd.u8()? as usize;
        if num_value == 0 || num_value > MAX_OUTPUT_COIN {
            return Err(Error::InvalidInput("number of value commitments out of range"));
        }
        let cms_value = (0..num_value)
            .map(|_| rd.point())
            .collect::<Result<Vec<_>, _>>()?;
        let a = rd.point()?;
        let s = rd.point()?;
        let t1 = rd.point()?;
        let t2 = rd.point()?;
        let tau_x = rd.scalar()?;
        let t_hat = rd.scalar()?;
        let mu = rd.scalar()?;
        let inner_product_proof = InnerProductProof::read_from(&mut rd)?;
        rd.finish()?;
        Ok(Self {
            cms_value,
            a,
            s,
            t1,
            t2,
            tau_x,
            t_hat,
            mu,
            inner_product_proof,
        })
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.buf.len() < n {
            return Err(Error::InvalidInput("range proof encoding truncated"));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn point(&mut self) -> Result<RistrettoPoint, Error> {
        point_from_slice(self.take(POINT_SIZE)?)
    }

    fn scalar(&mut self) -> Result<Scalar, Error> {
        let mut b = [0u8; SCALAR_SIZE];
        b.copy_from_slice(self.take(SCALAR_SIZE)?);
        scalar_from_bytes(&b)
    }

    fn finish(self) -> Result<(), Error> {
        if !self.buf.is_empty() {
            return Err(Error::InvalidInput("trailing bytes after range proof"));
        }
        Ok(())
    }
}
