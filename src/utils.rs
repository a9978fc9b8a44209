use std::collections::HashSet;

use crate::error::{BeError, Result};

/// Maps an exponent of `alpha` to its position in the dense public-key arrays.
///
/// The ladder stores `alpha^1..alpha^n` at positions `1..=n` and
/// `alpha^(n+2)..alpha^(2n)` at positions `n+1..=2n-1`; the exponent `n+1` has
/// no position. Exponents above `n` therefore shift down by one.
///
/// # Arguments
/// * `e` - The exponent (must not be `n + 1`)
/// * `n` - The party capacity
pub fn dense_index(e: usize, n: usize) -> usize {
    debug_assert!(e != n + 1, "exponent n+1 is never stored");
    if e <= n {
        e
    } else {
        e - 1
    }
}

/// Inverse of [`dense_index`]: the exponent of `alpha` held at `position`.
#[cfg(test)]
pub(crate) fn exponent_at(position: usize, n: usize) -> usize {
    if position <= n {
        position
    } else {
        position + 1
    }
}

/// Checks a recipient set against the capacity `n`.
///
/// Every id must lie in `[1, n]` and appear once; the set must not be empty.
///
/// # Errors
/// `EmptyRecipientSet`, `IndexOutOfRange` or `DuplicateRecipient`
pub fn validate_recipients(recipients: &[usize], n: usize) -> Result<()> {
    if recipients.is_empty() {
        return Err(BeError::EmptyRecipientSet);
    }

    let mut seen = HashSet::with_capacity(recipients.len());
    for &index in recipients {
        if index == 0 || index > n {
            return Err(BeError::IndexOutOfRange { index, n });
        }
        if !seen.insert(index) {
            return Err(BeError::DuplicateRecipient(index));
        }
    }
    Ok(())
}

/// Checks that a party id lies in `[1, n]`.
pub fn validate_party_id(party_id: usize, n: usize) -> Result<()> {
    if party_id == 0 || party_id > n {
        return Err(BeError::InvalidPartyId { party_id, n });
    }
    Ok(())
}
