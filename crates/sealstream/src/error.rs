use thiserror::Error;

pub type Result<T> = std::result::Result<T, SealError>;

/// Failure modes of the stream engine and the key envelope.
///
/// Authentication failures are deliberately coarse: an AEAD or box that
/// fails to verify cannot tell tampering apart from a wrong key, and the
/// error must not pretend otherwise.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("key is not hex: {0}")]
    InvalidKeyEncoding(String),

    #[error("nonce too short: need at least {min} bytes, got {actual}")]
    NonceTooShort { min: usize, actual: usize },

    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    #[error("truncated container: {context} (expected {expected} bytes, got {actual})")]
    Truncated {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("chunk length {declared} exceeds maximum {max}")]
    ChunkTooLarge { declared: u64, max: u64 },

    #[error("authentication failed: corrupted data or wrong key")]
    Authentication,

    #[error("envelope addressed to holder {holder}, own public key is {own}")]
    WrongHolder { holder: String, own: String },

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}
