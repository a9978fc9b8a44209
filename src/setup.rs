use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, PrimeGroup, ScalarMul};
use ark_ff::Field;
use ark_serialize::*;
use ark_std::{end_timer, rand::RngCore, start_timer, Zero};
use rayon::prelude::*;
use tracing::debug;
use zeroize::Zeroize;

use crate::error::BeError;
use crate::security::{SensitiveScalar, Trapdoor};
use crate::utils::validate_party_id;

/// Public parameters of the broadcast encryption scheme.
///
/// Holds the ladder `g^(alpha^i)` in both source groups with the exponent
/// `n + 1` left out, so position `k` carries `alpha^k` for `k <= n` and
/// `alpha^(k+1)` above (see [`crate::utils::dense_index`]).
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct PublicKey<E: Pairing> {
    /// Party capacity N
    pub n: usize,
    /// `p1[0] = g1`, then the G1 ladder (length 2N)
    pub p1: Vec<E::G1Affine>,
    /// `p2[0] = g2`, then the G2 ladder (length 2N)
    pub p2: Vec<E::G2Affine>,
    /// `g2^x` for the key-blinding scalar x
    pub q: E::G2,
}

/// Secret decryption key of one party.
///
/// `dk = q^(alpha^party_id)`. The group element is cleared on drop.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone)]
pub struct DecryptionKey<E: Pairing> {
    party_id: usize,
    dk: E::G2,
}

impl<E: Pairing> PublicKey<E> {
    /// Builds the public key from the trapdoor scalars.
    ///
    /// The stored exponents are exactly `1, ..., n, n+2, ..., 2n`.
    ///
    /// # Arguments
    /// * `n` - The party capacity (must be at least 1)
    /// * `g1`, `g2` - Generators of the source groups
    /// * `alpha` - The master exponent
    /// * `x` - The key-blinding scalar
    ///
    /// # Errors
    /// Returns `InvalidCapacity` if n is zero
    pub fn generate(
        n: usize,
        g1: E::G1,
        g2: E::G2,
        alpha: &E::ScalarField,
        x: &E::ScalarField,
    ) -> Result<Self, BeError> {
        if n == 0 {
            return Err(BeError::InvalidCapacity);
        }
        let timer = start_timer!(|| format!("PublicKey::generate(n = {})", n));

        // alphas[i] is the exponent stored at position i + 1
        let mut alphas = Vec::with_capacity(2 * n - 1);
        let mut cur = *alpha;
        alphas.push(cur);
        for i in 1..(2 * n - 1) {
            cur *= alpha;
            if i == n {
                // position n+1 holds alpha^(n+2)
                cur *= alpha;
            }
            alphas.push(cur);
        }
        cur.zeroize();

        let mut p1 = Vec::with_capacity(2 * n);
        p1.push(g1.into_affine());
        p1.extend(g1.batch_mul(&alphas));

        let mut p2 = Vec::with_capacity(2 * n);
        p2.push(g2.into_affine());
        p2.extend(g2.batch_mul(&alphas));

        alphas.zeroize();

        let q = g2 * *x;
        end_timer!(timer);

        Ok(PublicKey { n, p1, p2, q })
    }

    /// Checks the shape of the key: capacity and array lengths.
    ///
    /// Cheap enough to run on every encryption and decryption.
    pub(crate) fn check_shape(&self) -> Result<(), BeError> {
        if self.n == 0 {
            return Err(BeError::MalformedPublicKey("capacity is zero".to_string()));
        }
        let expected = self.n.checked_mul(2).ok_or_else(|| {
            BeError::MalformedPublicKey(format!("capacity {} overflows the ladder length", self.n))
        })?;
        if self.p1.len() != expected || self.p2.len() != expected {
            return Err(BeError::MalformedPublicKey(format!(
                "expected {} elements per group, got {} and {}",
                expected,
                self.p1.len(),
                self.p2.len()
            )));
        }
        Ok(())
    }

    /// Verifies the exponent structure of a public key obtained from elsewhere.
    ///
    /// Checks that both ladders carry the same exponents, that consecutive
    /// positions differ by one power of alpha, and that positions `n` and
    /// `n + 1` differ by two.
    ///
    /// # Errors
    /// Returns `MalformedPublicKey` describing the first failed check
    pub fn verify(&self) -> Result<(), BeError> {
        self.check_shape()?;
        let n = self.n;

        if self.p1[0].is_zero() || self.p2[0].is_zero() {
            return Err(BeError::MalformedPublicKey("identity generator".to_string()));
        }
        if self.p1[1].is_zero() || self.q.is_zero() {
            return Err(BeError::MalformedPublicKey("degenerate trapdoor".to_string()));
        }

        let g1 = self.p1[0];
        let g2 = self.p2[0];

        for k in 1..2 * n {
            if E::pairing(self.p1[k], g2) != E::pairing(g1, self.p2[k]) {
                return Err(BeError::MalformedPublicKey(format!(
                    "G1 and G2 ladders disagree at position {}",
                    k
                )));
            }
        }

        for k in 1..2 * n - 1 {
            // across the gap the step is alpha^2
            let step = if k == n { self.p2[2] } else { self.p2[1] };
            if E::pairing(self.p1[k], step) != E::pairing(self.p1[k + 1], g2) {
                return Err(BeError::MalformedPublicKey(format!(
                    "ladder step broken between positions {} and {}",
                    k,
                    k + 1
                )));
            }
        }

        Ok(())
    }
}

impl<E: Pairing> DecryptionKey<E> {
    /// Derives the decryption key of `party_id`: `q^(alpha^party_id)`.
    ///
    /// # Errors
    /// Returns `InvalidPartyId` if party_id is outside [1, n]
    pub fn derive(
        party_id: usize,
        n: usize,
        q: &E::G2,
        alpha: &E::ScalarField,
    ) -> Result<Self, BeError> {
        validate_party_id(party_id, n)?;

        let exponent = SensitiveScalar::new(alpha.pow([party_id as u64]));
        let dk = *q * *exponent.expose_secret();

        Ok(DecryptionKey { party_id, dk })
    }

    pub fn party_id(&self) -> usize {
        self.party_id
    }

    pub(crate) fn element(&self) -> &E::G2 {
        &self.dk
    }
}

impl<E: Pairing> Zeroize for DecryptionKey<E> {
    fn zeroize(&mut self) {
        self.dk = E::G2::zero();
    }
}

impl<E: Pairing> Drop for DecryptionKey<E> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<E: Pairing> std::fmt::Debug for DecryptionKey<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("party_id", &self.party_id)
            .field("dk", &"[REDACTED]")
            .finish()
    }
}

/// Issues the decryption keys of parties `1..=pk.n` from a trapdoor.
///
/// # Errors
/// Propagates `InvalidPartyId` from key derivation
pub fn issue_keys<E: Pairing>(
    pk: &PublicKey<E>,
    trapdoor: &Trapdoor<E::ScalarField>,
) -> Result<Vec<DecryptionKey<E>>, BeError> {
    (1..=pk.n)
        .into_par_iter()
        .map(|party_id| DecryptionKey::derive(party_id, pk.n, &pk.q, trapdoor.alpha()))
        .collect()
}

/// Runs a full key-issuance epoch for `n` parties.
///
/// Samples the trapdoor, builds the public key over the standard generators,
/// derives one decryption key per party, and erases the trapdoor.
///
/// # Errors
/// `InvalidCapacity` if n is zero, `ParameterGenerationFailure` if the RNG fails
pub fn key_gen_all<E: Pairing, R: RngCore>(
    n: usize,
    rng: &mut R,
) -> Result<(PublicKey<E>, Vec<DecryptionKey<E>>), BeError> {
    if n == 0 {
        return Err(BeError::InvalidCapacity);
    }

    let trapdoor = Trapdoor::<E::ScalarField>::sample(rng)?;
    let pk = PublicKey::generate(
        n,
        E::G1::generator(),
        E::G2::generator(),
        trapdoor.alpha(),
        trapdoor.x(),
    )?;
    let keys = issue_keys(&pk, &trapdoor)?;
    drop(trapdoor);

    debug!(n, "issued public key and {} decryption keys", keys.len());
    Ok((pk, keys))
}
