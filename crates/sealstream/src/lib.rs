//! sealstream: streaming authenticated encryption with addressed key envelopes
//!
//! Two cooperating pieces:
//!
//! - A chunked **stream container**: arbitrarily large payloads are sealed
//!   under a 256-bit key as a sequence of independently authenticated
//!   ChaCha20-Poly1305 chunks, each at most 5 MiB of plaintext, followed by
//!   an explicit zero terminator. Opening needs only the symmetric key —
//!   every chunk carries its own nonce.
//! - A **key envelope**: the symmetric key is sealed to one recipient's
//!   X25519 public key with a NaCl box and shipped as a small JSON record
//!   `{holder, encrypter, cipher}`.
//!
//! Nonces never repeat under a key: one random prime nonce is drawn per
//! container and each chunk's nonce is derived from it by XORing the chunk
//! counter into the first eight bytes (see [`nonce::counted_nonce`]).
//!
//! ```text
//! container := chunk* terminator
//! chunk     := len_be64 | nonce(12) | ciphertext+tag(len)
//! terminator:= 0u64 (big-endian)
//! ```

pub mod envelope;
pub mod error;
pub mod key;
pub mod nonce;
pub mod stream;

// Convenience re-exports for the most common operations
pub use envelope::{public_key_from_hex, Envelope, KeyPair, PublicKey};
pub use error::{Result, SealError};
pub use key::SymmetricKey;
pub use nonce::counted_nonce;
pub use stream::{open, open_bytes, seal, seal_bytes, seal_bytes_parallel};

/// Size of a symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of a ChaCha20-Poly1305 nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Maximum plaintext bytes per chunk (5 MiB)
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;
