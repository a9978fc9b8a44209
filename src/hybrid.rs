//! Hybrid layer: session keys from pairing values, and payload sealing.
//!
//! The key encapsulation yields an element of the target group. Its canonical
//! compressed encoding is hashed with BLAKE2b-512 under a domain tag and the
//! first 32 bytes become an XChaCha20-Poly1305 key. A sealed payload is laid
//! out as `nonce || ciphertext || tag`.

use ark_ec::pairing::{Pairing, PairingOutput};
use ark_serialize::CanonicalSerialize;
use ark_std::rand::RngCore;
use blake2::{Blake2b512, Digest};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{BeError, Result};
use crate::security::constant_time_eq;

/// Domain separation tag for session-key derivation.
pub const KDF_DOMAIN: &[u8] = b"broadcast-encryption::session-key::v1";

/// Length of a session key in bytes.
pub const SESSION_KEY_LEN: usize = 32;

/// XChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// A one-time symmetric key recovered from the encapsulated pairing value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.0
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for SessionKey {}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

/// Derives the session key `K = Hash(serialize(omega))`.
///
/// # Errors
/// Returns an error if the target-group element cannot be serialized
pub fn derive_session_key<E: Pairing>(omega: &PairingOutput<E>) -> Result<SessionKey> {
    let mut omega_bytes = Vec::with_capacity(omega.compressed_size());
    omega.serialize_compressed(&mut omega_bytes)?;

    let mut hasher = Blake2b512::new();
    hasher.update(KDF_DOMAIN);
    hasher.update(&omega_bytes);
    let mut digest = hasher.finalize();

    let mut key = [0u8; SESSION_KEY_LEN];
    key.copy_from_slice(&digest[..SESSION_KEY_LEN]);

    omega_bytes.zeroize();
    digest.as_mut_slice().zeroize();

    Ok(SessionKey(key))
}

/// Seals `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
/// `ParameterGenerationFailure` if the RNG cannot supply a nonce,
/// `MessageTooLong` if the plaintext exceeds the XChaCha20-Poly1305 limit
pub fn seal<R: RngCore>(key: &SessionKey, plaintext: &[u8], rng: &mut R) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce).map_err(|e| {
        BeError::ParameterGenerationFailure(format!("randomness source failed: {}", e))
    })?;

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let body = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| BeError::MessageTooLong(plaintext.len()))?;

    let mut payload = Vec::with_capacity(NONCE_LEN + body.len());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// Opens a payload produced by [`seal`].
///
/// # Errors
/// `AuthenticationFailure` for a wrong key, a modified payload, or a payload
/// too short to hold a nonce and tag
pub fn open(key: &SessionKey, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() < NONCE_LEN + TAG_LEN {
        return Err(BeError::AuthenticationFailure);
    }
    let (nonce, body) = payload.split_at(NONCE_LEN);

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(XNonce::from_slice(nonce), body)
        .map_err(|_| BeError::AuthenticationFailure)
}
