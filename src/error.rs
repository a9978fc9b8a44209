//! Error types for the broadcast encryption library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeError {
    /// The party capacity N must be at least 1
    #[error("invalid capacity: number of parties must be at least 1")]
    InvalidCapacity,
    /// A decryption key was requested or used for a party outside [1, N]
    #[error("invalid party id {party_id}: must be in [1, {n}]")]
    InvalidPartyId { party_id: usize, n: usize },
    /// A recipient set element lies outside [1, N]
    #[error("recipient index {index} out of range [1, {n}]")]
    IndexOutOfRange { index: usize, n: usize },
    /// The recipient set is empty
    #[error("recipient set must not be empty")]
    EmptyRecipientSet,
    /// The recipient set lists the same party more than once
    #[error("recipient {0} appears more than once")]
    DuplicateRecipient(usize),
    /// The randomness source could not supply a scalar
    #[error("parameter generation failed: {0}")]
    ParameterGenerationFailure(String),
    /// The payload did not open under the recovered key.
    ///
    /// Wrong key, non-membership and tampering all end up here.
    #[error("authentication failure")]
    AuthenticationFailure,
    /// The plaintext is longer than the AEAD can seal under one nonce
    #[error("message of {0} bytes exceeds the AEAD length limit")]
    MessageTooLong(usize),
    /// A public key failed its structural checks
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),
    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<ark_serialize::SerializationError> for BeError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        BeError::Serialization(format!("{:?}", err))
    }
}
