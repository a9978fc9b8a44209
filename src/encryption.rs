use ark_ec::{pairing::Pairing, AffineRepr};
use ark_serialize::*;
use ark_std::rand::RngCore;
use tracing::debug;

use crate::error::BeError;
use crate::hybrid::{derive_session_key, seal, SessionKey, NONCE_LEN, TAG_LEN};
use crate::security::sample_scalar;
use crate::setup::PublicKey;
use crate::utils::validate_recipients;

/// The key-encapsulation part of a ciphertext.
///
/// Two group elements, whatever the size of the recipient set.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct Header<E: Pairing> {
    /// `g1^r`
    pub h1: E::G1,
    /// `(q * prod_{j in R} p2[n+1-j])^r`
    pub h2: E::G2,
}

/// A broadcast ciphertext: header plus sealed payload.
#[derive(Clone, Debug)]
pub struct Ciphertext<E: Pairing> {
    pub h1: E::G1,
    pub h2: E::G2,
    /// `nonce || AEAD ciphertext || tag`
    pub payload: Vec<u8>,
}

impl<E: Pairing> PartialEq for Header<E> {
    fn eq(&self, other: &Self) -> bool {
        self.h1 == other.h1 && self.h2 == other.h2
    }
}

impl<E: Pairing> Eq for Header<E> {}

impl<E: Pairing> PartialEq for Ciphertext<E> {
    fn eq(&self, other: &Self) -> bool {
        self.h1 == other.h1 && self.h2 == other.h2 && self.payload == other.payload
    }
}

impl<E: Pairing> Eq for Ciphertext<E> {}

impl<E: Pairing> Ciphertext<E> {
    /// Creates a new ciphertext.
    pub fn new(header: Header<E>, payload: Vec<u8>) -> Self {
        Ciphertext {
            h1: header.h1,
            h2: header.h2,
            payload,
        }
    }

    pub fn header(&self) -> Header<E> {
        Header {
            h1: self.h1,
            h2: self.h2,
        }
    }

    /// Encodes the ciphertext as `compressed(h1) || compressed(h2) || payload`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BeError> {
        let header_len = self.h1.compressed_size() + self.h2.compressed_size();
        let mut bytes = Vec::with_capacity(header_len + self.payload.len());
        self.h1.serialize_compressed(&mut bytes)?;
        self.h2.serialize_compressed(&mut bytes)?;
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }

    /// Parses the encoding produced by [`Ciphertext::to_bytes`].
    ///
    /// # Errors
    /// Returns `Serialization` if a group element is invalid or the payload is
    /// too short to carry a nonce and tag
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BeError> {
        let mut reader = bytes;
        let h1 = E::G1::deserialize_compressed(&mut reader)?;
        let h2 = E::G2::deserialize_compressed(&mut reader)?;

        if reader.len() < NONCE_LEN + TAG_LEN {
            return Err(BeError::Serialization(format!(
                "payload of {} bytes is shorter than nonce and tag ({} bytes)",
                reader.len(),
                NONCE_LEN + TAG_LEN
            )));
        }

        Ok(Ciphertext {
            h1,
            h2,
            payload: reader.to_vec(),
        })
    }
}

/// Encapsulates a fresh session key for the recipient set.
///
/// # Arguments
/// * `pk` - The public key
/// * `recipients` - Distinct party ids in [1, n]
/// * `rng` - A random number generator
///
/// # Errors
/// Returns an error if the recipient set is empty, holds duplicates or an id
/// outside [1, n]; all checks run before any randomness is drawn
pub fn encapsulate<E: Pairing, R: RngCore>(
    pk: &PublicKey<E>,
    recipients: &[usize],
    rng: &mut R,
) -> Result<(Header<E>, SessionKey), BeError> {
    pk.check_shape()?;
    validate_recipients(recipients, pk.n)?;
    let n = pk.n;

    let r = sample_scalar::<E::ScalarField, _>(rng)?;
    let r = r.expose_secret();

    let h1 = pk.p1[0] * *r;

    // n+1-j stays in [1, n], below the gap
    let mut aggregate = pk.q;
    for &j in recipients {
        aggregate += pk.p2[n + 1 - j].into_group();
    }
    let h2 = aggregate * *r;

    // e(g1, g2)^(alpha^(n+1) r)
    let omega = E::pairing(pk.p1[1] * *r, pk.p2[n]);
    let key = derive_session_key::<E>(&omega)?;

    Ok((Header { h1, h2 }, key))
}

/// Encrypts `message` to the recipient set.
///
/// # Errors
/// Same as [`encapsulate`], plus RNG failure while drawing the nonce
pub fn encrypt<E: Pairing, R: RngCore>(
    pk: &PublicKey<E>,
    message: &[u8],
    recipients: &[usize],
    rng: &mut R,
) -> Result<Ciphertext<E>, BeError> {
    let (header, key) = encapsulate(pk, recipients, rng)?;
    let payload = seal(&key, message, rng)?;

    debug!(
        n = pk.n,
        recipients = recipients.len(),
        payload_len = payload.len(),
        "encrypted broadcast message"
    );
    Ok(Ciphertext::new(header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::BrokenRng;
    use crate::setup::key_gen_all;

    type E = ark_bls12_381::Bls12_381;

    #[test]
    fn test_encryption() {
        let mut rng = ark_std::test_rng();
        let (pk, _) = key_gen_all::<E, _>(8, &mut rng).unwrap();

        let ct = encrypt(&pk, b"Hello World", &[2, 5, 7], &mut rng).unwrap();
        assert_eq!(ct.payload.len(), NONCE_LEN + 11 + TAG_LEN);

        let bytes = ct.to_bytes().unwrap();
        println!("Ciphertext: {} bytes", bytes.len());
    }

    #[test]
    fn test_header_size_independent_of_recipients() {
        let mut rng = ark_std::test_rng();
        let n = 8;
        let (pk, _) = key_gen_all::<E, _>(n, &mut rng).unwrap();

        let all: Vec<usize> = (1..=n).collect();
        let small = encrypt(&pk, b"m", &[4], &mut rng).unwrap();
        let large = encrypt(&pk, b"m", &all, &mut rng).unwrap();

        assert_eq!(
            small.to_bytes().unwrap().len(),
            large.to_bytes().unwrap().len()
        );
    }

    #[test]
    fn test_encryption_is_fresh() {
        let mut rng = ark_std::test_rng();
        let (pk, _) = key_gen_all::<E, _>(5, &mut rng).unwrap();

        let ct1 = encrypt(&pk, b"Hello World", &[1, 3], &mut rng).unwrap();
        let ct2 = encrypt(&pk, b"Hello World", &[1, 3], &mut rng).unwrap();

        assert_ne!(ct1.h1, ct2.h1);
        assert_ne!(ct1.h2, ct2.h2);
        assert_ne!(ct1.payload, ct2.payload);
    }

    #[test]
    fn test_encrypt_rejects_bad_sets_before_sampling() {
        let mut rng = ark_std::test_rng();
        let n = 5;
        let (pk, _) = key_gen_all::<E, _>(n, &mut rng).unwrap();

        // a broken RNG would surface as ParameterGenerationFailure if reached
        for (set, expected) in [
            (vec![0, 1], BeError::IndexOutOfRange { index: 0, n }),
            (vec![1, n + 1], BeError::IndexOutOfRange { index: n + 1, n }),
            (vec![], BeError::EmptyRecipientSet),
            (vec![3, 3], BeError::DuplicateRecipient(3)),
        ] {
            let err = encrypt(&pk, b"m", &set, &mut BrokenRng).unwrap_err();
            assert_eq!(err, expected);
        }

        let err = encrypt(&pk, b"m", &[1], &mut BrokenRng).unwrap_err();
        assert!(matches!(err, BeError::ParameterGenerationFailure(_)));
    }

    #[test]
    fn test_encrypt_rejects_malformed_public_key() {
        let mut rng = ark_std::test_rng();
        let (mut pk, _) = key_gen_all::<E, _>(3, &mut rng).unwrap();
        pk.p2.truncate(3);

        let err = encrypt(&pk, b"m", &[1], &mut rng).unwrap_err();
        assert!(matches!(err, BeError::MalformedPublicKey(_)));
    }

    #[test]
    fn test_ciphertext_wire_format() {
        let mut rng = ark_std::test_rng();
        let (pk, _) = key_gen_all::<E, _>(4, &mut rng).unwrap();
        let ct = encrypt(&pk, b"wire format", &[1, 2], &mut rng).unwrap();

        let bytes = ct.to_bytes().unwrap();
        let header_len = ct.h1.compressed_size() + ct.h2.compressed_size();
        assert_eq!(bytes.len(), header_len + ct.payload.len());
        assert_eq!(&bytes[header_len..], &ct.payload[..]);

        let parsed = Ciphertext::<E>::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, ct);

        assert!(matches!(
            Ciphertext::<E>::from_bytes(&bytes[..header_len + NONCE_LEN]),
            Err(BeError::Serialization(_))
        ));
        assert!(matches!(
            Ciphertext::<E>::from_bytes(&bytes[..10]),
            Err(BeError::Serialization(_))
        ));
    }
}
