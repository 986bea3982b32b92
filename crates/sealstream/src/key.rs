//! The 256-bit symmetric key a stream container is sealed under

use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{Result, SealError};
use crate::KEY_SIZE;

/// A 256-bit symmetric encryption key. Zeroized on drop.
///
/// A key is only ever persisted inside an [`Envelope`](crate::Envelope);
/// the hex form exists for operator tooling, not for storage.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Construct a key from raw bytes; must be exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(SealError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Construct a key from a hex string (64 hex digits).
    pub fn from_hex(hexstring: &str) -> Result<Self> {
        let mut decoded =
            hex::decode(hexstring).map_err(|e| SealError::InvalidKeyEncoding(e.to_string()))?;
        let result = Self::from_bytes(&decoded);
        decoded.zeroize();
        result
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Hex encoding of the key material. Handle with care.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keys_differ() {
        let k1 = SymmetricKey::generate();
        let k2 = SymmetricKey::generate();
        assert_ne!(k1.as_bytes(), k2.as_bytes(), "random keys must differ");
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = SymmetricKey::generate();
        let restored = SymmetricKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn test_short_key_rejected() {
        let result = SymmetricKey::from_bytes(&[0u8; 31]);
        assert!(matches!(
            result,
            Err(SealError::InvalidKeyLength {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn test_long_key_rejected() {
        let result = SymmetricKey::from_bytes(&[0u8; 33]);
        assert!(matches!(result, Err(SealError::InvalidKeyLength { .. })));
    }

    #[test]
    fn test_bad_hex_rejected() {
        // a decode failure names the encoding, not a phantom byte length
        let result = SymmetricKey::from_hex("not-hex-at-all");
        assert!(matches!(result, Err(SealError::InvalidKeyEncoding(_))));

        // valid hex, wrong length
        let result = SymmetricKey::from_hex("deadbeef");
        assert!(matches!(
            result,
            Err(SealError::InvalidKeyLength {
                expected: 32,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_debug_redacts_material() {
        let key = SymmetricKey::generate();
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains(&key.to_hex()));
    }
}
