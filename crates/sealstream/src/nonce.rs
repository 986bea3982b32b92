//! Counter-derived nonces
//!
//! One random "prime" nonce is drawn per container; chunk `i` is sealed
//! under `counted_nonce(prime, i)`. The counter is XORed into the first
//! eight bytes least-significant-byte first, so for a fixed base the
//! mapping counter → nonce is injective over the whole u64 range and
//! counter 0 is the identity. No (key, nonce) pair can repeat within a
//! container as long as the counter only moves forward.

use crate::error::{Result, SealError};

/// Bytes of the base nonce the counter is folded into.
const COUNTER_BYTES: usize = 8;

/// Derive the nonce for chunk `counter` from a base nonce.
///
/// The base must be at least 8 bytes; the output has the same length as
/// the base. Pure function: equal inputs give equal outputs.
pub fn counted_nonce(base: &[u8], counter: u64) -> Result<Vec<u8>> {
    if base.len() < COUNTER_BYTES {
        return Err(SealError::NonceTooShort {
            min: COUNTER_BYTES,
            actual: base.len(),
        });
    }
    let mut derived = base.to_vec();
    let mut remaining = counter;
    for byte in derived.iter_mut().take(COUNTER_BYTES) {
        *byte ^= (remaining & 0xff) as u8;
        remaining >>= 8;
    }
    Ok(derived)
}
