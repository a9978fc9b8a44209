//! Secret handling for the broadcast encryption scheme
//!
//! This module provides:
//! - A zeroizing wrapper for secret scalars (trapdoor exponents, ephemeral randomness)
//! - The trapdoor holder that owns the master exponent and the key-blinding scalar
//! - Uniform scalar sampling from a caller-supplied RNG

use ark_ff::{Field, PrimeField, Zero};
use ark_std::rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{BeError, Result};

/// Number of random bytes drawn per scalar before reduction.
///
/// Twice the size of a 256-bit scalar so the modular reduction is
/// statistically uniform over the field.
pub const SCALAR_SAMPLE_BYTES: usize = 64;

/// Wrapper for sensitive scalar field elements that ensures zeroization on drop
///
/// # Security
/// - Automatically zeroizes memory when dropped
/// - Prevents accidental leakage through Debug trait
#[derive(Clone)]
pub struct SensitiveScalar<F: Field> {
    value: F,
}

impl<F: Field> SensitiveScalar<F> {
    /// Create a new sensitive scalar from a field element
    pub fn new(value: F) -> Self {
        Self { value }
    }

    /// Get a reference to the inner value
    ///
    /// # Security Warning
    /// The caller must ensure this reference is not used to leak the value
    pub fn expose_secret(&self) -> &F {
        &self.value
    }
}

impl<F: Field> Zeroize for SensitiveScalar<F> {
    fn zeroize(&mut self) {
        self.value = F::zero();
    }
}

impl<F: Field> ZeroizeOnDrop for SensitiveScalar<F> {}

impl<F: Field> Drop for SensitiveScalar<F> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// Prevent debug output from leaking sensitive data
impl<F: Field> std::fmt::Debug for SensitiveScalar<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SensitiveScalar([REDACTED])")
    }
}

/// Samples a uniform, non-zero scalar.
///
/// Draws [`SCALAR_SAMPLE_BYTES`] bytes and reduces them modulo the field order.
/// Zero is rejected and resampled.
///
/// # Errors
/// Returns `ParameterGenerationFailure` if the RNG fails to fill the buffer
pub fn sample_scalar<F: PrimeField, R: RngCore>(rng: &mut R) -> Result<SensitiveScalar<F>> {
    let mut buf = [0u8; SCALAR_SAMPLE_BYTES];
    loop {
        rng.try_fill_bytes(&mut buf).map_err(|e| {
            BeError::ParameterGenerationFailure(format!("randomness source failed: {}", e))
        })?;
        let candidate = SensitiveScalar::new(F::from_le_bytes_mod_order(&buf));
        buf.zeroize();
        if !candidate.expose_secret().is_zero() {
            return Ok(candidate);
        }
    }
}

/// Constant-time byte slice comparison
///
/// Returns true if slices are equal, false otherwise.
/// Lengths are not secret and are compared first.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

/// The trapdoor secrets of one key-issuance epoch.
///
/// `alpha` is the master exponent behind the public ladder and every
/// decryption key; `x` blinds the decryption keys. Both are erased when the
/// trapdoor is dropped, on every exit path.
pub struct Trapdoor<F: PrimeField> {
    alpha: SensitiveScalar<F>,
    x: SensitiveScalar<F>,
}

impl<F: PrimeField> Trapdoor<F> {
    /// Samples a fresh trapdoor.
    ///
    /// # Errors
    /// Returns `ParameterGenerationFailure` if the RNG fails
    pub fn sample<R: RngCore>(rng: &mut R) -> Result<Self> {
        let alpha = sample_scalar(rng)?;
        let x = sample_scalar(rng)?;
        Ok(Trapdoor { alpha, x })
    }

    /// Builds a trapdoor from known scalars. Test vectors only need this.
    pub fn from_scalars(alpha: F, x: F) -> Self {
        Trapdoor {
            alpha: SensitiveScalar::new(alpha),
            x: SensitiveScalar::new(x),
        }
    }

    pub fn alpha(&self) -> &F {
        self.alpha.expose_secret()
    }

    pub fn x(&self) -> &F {
        self.x.expose_secret()
    }
}

impl<F: PrimeField> std::fmt::Debug for Trapdoor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Trapdoor([REDACTED])")
    }
}

/// An RNG whose every fill fails.
#[cfg(test)]
pub(crate) struct BrokenRng;

#[cfg(test)]
impl RngCore for BrokenRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), ark_std::rand::Error> {
        let code = std::num::NonZeroU32::new(ark_std::rand::Error::CUSTOM_START).unwrap();
        Err(ark_std::rand::Error::from(code))
    }
}
