//! Broadcast Encryption
//!
//! This library implements a pairing-based broadcast encryption scheme with
//! constant-size headers, in the style of Boneh–Gentry–Waters.
//!
//! ## Overview
//!
//! A trusted authority fixes a capacity `n` and issues one decryption key per
//! party. A broadcaster then encrypts a message to any subset `R` of
//! `[1, n]`; every member of `R` decrypts with its own key, while parties
//! outside `R`, even colluding, learn nothing. The header is two group
//! elements regardless of `|R|`.
//!
//! ## Key Components
//!
//! - **Setup**: Build the public key and issue the decryption keys
//! - **Encryption**: Encapsulate a session key for `R` and seal the payload
//! - **Decryption**: Recover the session key with a member's key and open the payload
//! - **Hybrid**: Session-key derivation and XChaCha20-Poly1305 sealing
//!
//! ## Example
//!
//! ```rust,no_run
//! use ark_bls12_381::Bls12_381;
//! use broadcast_encryption::{
//!     decryption::decrypt,
//!     encryption::encrypt,
//!     setup::key_gen_all,
//!     BeError,
//! };
//!
//! type E = Bls12_381;
//!
//! let mut rng = ark_std::test_rng();
//! let n = 5;
//!
//! // Setup: public key and one decryption key per party (party i holds keys[i - 1])
//! let (pk, keys) = key_gen_all::<E, _>(n, &mut rng).unwrap();
//!
//! // Encryption to parties 1 and 3
//! let recipients = [1, 3];
//! let ct = encrypt(&pk, b"Hello World", &recipients, &mut rng).unwrap();
//!
//! // Members decrypt
//! assert_eq!(decrypt(&pk, &keys[0], &ct, &recipients).unwrap(), b"Hello World");
//! assert_eq!(decrypt(&pk, &keys[2], &ct, &recipients).unwrap(), b"Hello World");
//!
//! // Non-members only see an authentication failure
//! assert_eq!(
//!     decrypt(&pk, &keys[1], &ct, &recipients),
//!     Err(BeError::AuthenticationFailure)
//! );
//! ```

pub mod decryption;
pub mod encryption;
pub mod error;
pub mod hybrid;
pub mod security;
pub mod setup;
pub mod utils;

pub use error::{BeError, Result};
