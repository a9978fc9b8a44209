use ark_ec::{pairing::Pairing, AffineRepr};
use tracing::{debug, trace};

use crate::encryption::{Ciphertext, Header};
use crate::error::Result;
use crate::hybrid::{derive_session_key, open, SessionKey};
use crate::setup::{DecryptionKey, PublicKey};
use crate::utils::{dense_index, validate_party_id, validate_recipients};

/// Recovers the session key encapsulated in `header` for the recipient set.
///
/// The caller's party must belong to `recipients`. Membership is not checked
/// here: a non-member obtains an unrelated key, which only shows up as an
/// authentication failure when the payload is opened.
///
/// # Errors
/// `InvalidPartyId` if the key's party id is outside [1, n], and the
/// recipient-set errors of [`validate_recipients`]; both are checked before
/// any group operation
pub fn decapsulate<E: Pairing>(
    pk: &PublicKey<E>,
    dk: &DecryptionKey<E>,
    header: &Header<E>,
    recipients: &[usize],
) -> Result<SessionKey> {
    pk.check_shape()?;
    let n = pk.n;
    let i = dk.party_id();
    validate_party_id(i, n)?;
    validate_recipients(recipients, n)?;

    // aux = dk * prod_{j != i} g2^(alpha^(n+1+i-j))
    let mut aux = *dk.element();
    for &j in recipients.iter().filter(|&&j| j != i) {
        aux += pk.p2[dense_index(n + 1 + i - j, n)].into_group();
    }

    // e(p1[i], h2) / e(h1, aux) as one multi-pairing
    let omega = E::multi_pairing(
        [pk.p1[i].into_group(), -header.h1],
        [header.h2, aux],
    );
    trace!(party_id = i, "recovered pairing value");

    derive_session_key::<E>(&omega)
}

/// Decrypts a broadcast ciphertext with the key of one recipient.
///
/// # Errors
/// Validation errors as in [`decapsulate`]; `AuthenticationFailure` when the
/// payload does not open, whether the party is outside the recipient set or
/// the ciphertext was modified
pub fn decrypt<E: Pairing>(
    pk: &PublicKey<E>,
    dk: &DecryptionKey<E>,
    ct: &Ciphertext<E>,
    recipients: &[usize],
) -> Result<Vec<u8>> {
    let key = decapsulate(pk, dk, &ct.header(), recipients)?;
    let message = open(&key, &ct.payload)?;

    debug!(
        party_id = dk.party_id(),
        recipients = recipients.len(),
        "decrypted broadcast message"
    );
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encryption::{encapsulate, encrypt},
        error::BeError,
        setup::key_gen_all,
    };
    use ark_ec::{AdditiveGroup, PrimeGroup};
    use ark_std::rand::RngCore;

    type E = ark_bls12_381::Bls12_381;
    type G1 = <E as Pairing>::G1;

    /// All non-empty subsets of [1, n].
    fn subsets(n: usize) -> Vec<Vec<usize>> {
        (1u32..(1 << n))
            .map(|mask| (1..=n).filter(|&j| mask & (1 << (j - 1)) != 0).collect())
            .collect()
    }

    #[test]
    fn test_decryption() {
        let mut rng = ark_std::test_rng();
        let (pk, dks) = key_gen_all::<E, _>(5, &mut rng).unwrap();
        let recipients = [1, 3];

        let ct = encrypt(&pk, b"Hello World", &recipients, &mut rng).unwrap();

        assert_eq!(decrypt(&pk, &dks[0], &ct, &recipients).unwrap(), b"Hello World");
        assert_eq!(decrypt(&pk, &dks[2], &ct, &recipients).unwrap(), b"Hello World");
        assert_eq!(
            decrypt(&pk, &dks[1], &ct, &recipients),
            Err(BeError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_decapsulation_matches_for_every_subset() {
        let mut rng = ark_std::test_rng();
        for n in 1..=4 {
            let (pk, dks) = key_gen_all::<E, _>(n, &mut rng).unwrap();
            for set in subsets(n) {
                let (header, key) = encapsulate(&pk, &set, &mut rng).unwrap();
                for dk in &dks {
                    let recovered = decapsulate(&pk, dk, &header, &set).unwrap();
                    if set.contains(&dk.party_id()) {
                        assert_eq!(recovered, key, "n={} set={:?} party={}", n, set, dk.party_id());
                    } else {
                        assert_ne!(recovered, key, "n={} set={:?} party={}", n, set, dk.party_id());
                    }
                }
            }
        }
    }

    #[test]
    fn test_recipient_order_does_not_matter() {
        let mut rng = ark_std::test_rng();
        let (pk, dks) = key_gen_all::<E, _>(6, &mut rng).unwrap();

        let ct = encrypt(&pk, b"order", &[6, 2, 4], &mut rng).unwrap();
        assert_eq!(decrypt(&pk, &dks[3], &ct, &[2, 4, 6]).unwrap(), b"order");
    }

    #[test]
    fn test_decrypt_with_wrong_recipient_set_fails() {
        let mut rng = ark_std::test_rng();
        let (pk, dks) = key_gen_all::<E, _>(5, &mut rng).unwrap();

        let ct = encrypt(&pk, b"Hello World", &[1, 3], &mut rng).unwrap();
        assert_eq!(
            decrypt(&pk, &dks[0], &ct, &[1, 3, 4]),
            Err(BeError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut rng = ark_std::test_rng();
        let (pk, dks) = key_gen_all::<E, _>(4, &mut rng).unwrap();
        let recipients = [2, 3];
        let ct = encrypt(&pk, b"integrity", &recipients, &mut rng).unwrap();

        let mut bad_h1 = ct.clone();
        bad_h1.h1 += G1::generator();
        assert_eq!(
            decrypt(&pk, &dks[1], &bad_h1, &recipients),
            Err(BeError::AuthenticationFailure)
        );

        let mut bad_h2 = ct.clone();
        bad_h2.h2 = bad_h2.h2.double();
        assert_eq!(
            decrypt(&pk, &dks[1], &bad_h2, &recipients),
            Err(BeError::AuthenticationFailure)
        );

        let mut bad_payload = ct.clone();
        let idx = bad_payload.payload.len() / 2;
        bad_payload.payload[idx] ^= 0x80;
        assert_eq!(
            decrypt(&pk, &dks[1], &bad_payload, &recipients),
            Err(BeError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_decrypt_rejects_out_of_range_indices() {
        let mut rng = ark_std::test_rng();
        let n = 5;
        let (pk, dks) = key_gen_all::<E, _>(n, &mut rng).unwrap();
        let ct = encrypt(&pk, b"bounds", &[1, 3], &mut rng).unwrap();

        assert_eq!(
            decrypt(&pk, &dks[0], &ct, &[0, 1, 3]),
            Err(BeError::IndexOutOfRange { index: 0, n })
        );
        assert_eq!(
            decrypt(&pk, &dks[0], &ct, &[1, 3, n + 1]),
            Err(BeError::IndexOutOfRange { index: n + 1, n })
        );

        // a key issued for a larger epoch does not fit this public key
        let (_, big_dks) = key_gen_all::<E, _>(n + 1, &mut rng).unwrap();
        assert_eq!(
            decrypt(&pk, &big_dks[n], &ct, &[1, 3]),
            Err(BeError::InvalidPartyId { party_id: n + 1, n })
        );
    }

    #[test]
    fn test_many_messages_roundtrip() {
        let mut rng = ark_std::test_rng();
        let (pk, dks) = key_gen_all::<E, _>(3, &mut rng).unwrap();

        for len in [0usize, 1, 31, 32, 33, 1024] {
            let mut message = vec![0u8; len];
            rng.fill_bytes(&mut message);
            let ct = encrypt(&pk, &message, &[1, 2, 3], &mut rng).unwrap();
            for dk in &dks {
                assert_eq!(decrypt(&pk, dk, &ct, &[1, 2, 3]).unwrap(), message);
            }
        }
    }
}
