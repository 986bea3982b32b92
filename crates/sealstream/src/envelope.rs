//! Addressed key envelopes
//!
//! A symmetric key travels between parties inside a small JSON record:
//!
//! ```json
//! { "holder": "<recipient public key, hex>",
//!   "encrypter": "<sender public key, hex>",
//!   "cipher": "<base64: 24-byte box nonce || sealed key>" }
//! ```
//!
//! The payload is sealed with an X25519 NaCl box keyed by the sender's
//! secret and the recipient's public key, so one envelope addresses
//! exactly one recipient. Opening checks the `holder` field against the
//! caller's own public key before touching any cryptography — that check
//! is the authorization gate, not a courtesy.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::{Aead, AeadCore};
use crypto_box::{SalsaBox, SecretKey};
pub use crypto_box::PublicKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{Result, SealError};
use crate::key::SymmetricKey;
use crate::TAG_SIZE;

/// Size of an X25519 key (secret scalar or public point)
const BOX_KEY_SIZE: usize = 32;

/// Size of a NaCl box nonce (192-bit)
const BOX_NONCE_SIZE: usize = 24;

/// Decode a hex-encoded X25519 public key, as handed out by an identity
/// collaborator or printed by `public_hex`.
pub fn public_key_from_hex(hexstring: &str) -> Result<PublicKey> {
    let decoded =
        hex::decode(hexstring).map_err(|e| SealError::InvalidKeyEncoding(e.to_string()))?;
    if decoded.len() != BOX_KEY_SIZE {
        return Err(SealError::InvalidKeyLength {
            expected: BOX_KEY_SIZE,
            actual: decoded.len(),
        });
    }
    let mut point = [0u8; BOX_KEY_SIZE];
    point.copy_from_slice(&decoded);
    Ok(PublicKey::from(point))
}

/// An X25519 key pair identifying one party.
///
/// The public key is always recomputed from the secret scalar, never
/// accepted from external input alongside it; a mismatched pair supplied
/// by a caller would otherwise open the door to key-confusion attacks.
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Load a key pair from a hex-encoded secret scalar.
    pub fn from_private_hex(hexstring: &str) -> Result<Self> {
        let mut decoded =
            hex::decode(hexstring).map_err(|e| SealError::InvalidKeyEncoding(e.to_string()))?;
        if decoded.len() != BOX_KEY_SIZE {
            let actual = decoded.len();
            decoded.zeroize();
            return Err(SealError::InvalidKeyLength {
                expected: BOX_KEY_SIZE,
                actual,
            });
        }
        let mut scalar = [0u8; BOX_KEY_SIZE];
        scalar.copy_from_slice(&decoded);
        decoded.zeroize();

        let secret = SecretKey::from(scalar);
        scalar.zeroize();
        let public = secret.public_key();
        Ok(Self { secret, public })
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Hex encoding of the public key; this is the party's identity.
    pub fn public_hex(&self) -> String {
        hex::encode(self.public.as_bytes())
    }

    /// Hex encoding of the secret scalar, for controlled export only.
    pub fn private_hex(&self) -> String {
        hex::encode(self.secret.to_bytes())
    }

    /// Seal a symmetric key into an envelope addressed to `recipient`.
    pub fn seal_key(&self, recipient: &PublicKey, key: &SymmetricKey) -> Result<Envelope> {
        let sbox = SalsaBox::new(recipient, &self.secret);
        let nonce = SalsaBox::generate_nonce(&mut OsRng);

        // encrypt only fails past the cipher's message-length bound,
        // unreachable for a 32-byte payload
        let sealed = sbox
            .encrypt(&nonce, key.as_bytes().as_ref())
            .map_err(|_| SealError::Authentication)?;

        let mut cipher = Vec::with_capacity(BOX_NONCE_SIZE + sealed.len());
        cipher.extend_from_slice(&nonce);
        cipher.extend_from_slice(&sealed);

        Ok(Envelope {
            holder: hex::encode(recipient.as_bytes()),
            encrypter: self.public_hex(),
            cipher: STANDARD.encode(&cipher),
        })
    }

    /// Open an envelope and recover the symmetric key inside.
    ///
    /// The `holder` field must equal this pair's public key; envelopes
    /// addressed to anyone else are rejected before any decoding or
    /// decryption is attempted.
    pub fn open_key(&self, envelope: &Envelope) -> Result<SymmetricKey> {
        let own = self.public_hex();
        if envelope.holder != own {
            return Err(SealError::WrongHolder {
                holder: envelope.holder.clone(),
                own,
            });
        }

        let cipher = STANDARD
            .decode(&envelope.cipher)
            .map_err(|e| SealError::MalformedEnvelope(format!("cipher is not base64: {e}")))?;
        if cipher.len() < BOX_NONCE_SIZE + TAG_SIZE {
            return Err(SealError::MalformedEnvelope(format!(
                "cipher too short: {} bytes",
                cipher.len()
            )));
        }

        let encrypter_bytes = hex::decode(&envelope.encrypter)
            .map_err(|e| SealError::MalformedEnvelope(format!("encrypter is not hex: {e}")))?;
        if encrypter_bytes.len() != BOX_KEY_SIZE {
            return Err(SealError::MalformedEnvelope(format!(
                "encrypter key is {} bytes, expected {BOX_KEY_SIZE}",
                encrypter_bytes.len()
            )));
        }
        let mut encrypter = [0u8; BOX_KEY_SIZE];
        encrypter.copy_from_slice(&encrypter_bytes);
        let encrypter = PublicKey::from(encrypter);

        let (nonce, sealed) = cipher.split_at(BOX_NONCE_SIZE);
        let sbox = SalsaBox::new(&encrypter, &self.secret);
        let mut plain = sbox
            .decrypt(GenericArray::from_slice(nonce), sealed)
            .map_err(|_| SealError::Authentication)?;

        let key = SymmetricKey::from_bytes(&plain);
        plain.zeroize();
        key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_hex())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// One symmetric key, sealed for exactly one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Public key of the intended recipient (hex)
    pub holder: String,
    /// Public key of the sealing party (hex)
    pub encrypter: String,
    /// Box nonce and sealed key bytes (base64)
    pub cipher: String,
}

impl Envelope {
    /// Serialize to the flat JSON transport form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SealError::MalformedEnvelope(e.to_string()))
    }

    /// Parse an envelope from its JSON transport form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SealError::MalformedEnvelope(e.to_string()))
    }
}
