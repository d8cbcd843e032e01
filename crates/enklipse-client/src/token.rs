//! Viewer identity sealing for status stream URLs.
//!
//! The stream endpoint receives the viewer identity as a query token
//! encrypted with a passphrase shared with the backend. Tokens use the
//! OpenSSL salted format that CryptoJS produces for a passphrase:
//! `base64("Salted__" || salt || AES-256-CBC(identity))`, with key and IV
//! derived from the passphrase and salt by MD5 `EVP_BytesToKey`.

use std::fmt;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use md5::{Digest, Md5};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const MAGIC: &[u8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Key used when no shared secret is configured.
pub const FALLBACK_KEY: &str = "default-key";

/// Seals and opens viewer identity tokens with one shared passphrase.
#[derive(Clone)]
pub struct IdentitySealer {
    passphrase: Vec<u8>,
}

impl IdentitySealer {
    /// Create a sealer. An empty secret falls back to [`FALLBACK_KEY`].
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        if secret.is_empty() {
            warn!("No identity secret configured, using the fallback key");
            return Self {
                passphrase: FALLBACK_KEY.as_bytes().to_vec(),
            };
        }
        Self {
            passphrase: secret.to_vec(),
        }
    }

    /// Create from an optional configured secret.
    pub fn from_secret(secret: Option<&str>) -> Self {
        Self::new(secret.unwrap_or_default())
    }

    /// Encrypt an identity into a token with a fresh random salt.
    pub fn seal(&self, identity: &str) -> ClientResult<String> {
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&Uuid::new_v4().as_bytes()[..SALT_LEN]);
        self.seal_with_salt(identity, &salt)
    }

    fn seal_with_salt(&self, identity: &str, salt: &[u8; SALT_LEN]) -> ClientResult<String> {
        let (key, iv) = self.derive(salt);
        let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
            .map_err(|e| ClientError::Config(format!("Invalid cipher parameters: {}", e)))?
            .encrypt_padded_vec_mut::<Pkcs7>(identity.as_bytes());

        let mut out = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(salt);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    /// Decrypt a salted token.
    ///
    /// Returns `None` if the token is malformed or was sealed with another key.
    pub fn open(&self, token: &str) -> ClientResult<Option<String>> {
        let raw = match STANDARD.decode(token) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(None),
        };
        let header = MAGIC.len() + SALT_LEN;
        if raw.len() <= header || !raw.starts_with(MAGIC) {
            return Ok(None);
        }

        let (salt, ciphertext) = raw[MAGIC.len()..].split_at(SALT_LEN);
        let (key, iv) = self.derive(salt);
        let plaintext = match Aes256CbcDec::new_from_slices(&key, &iv)
            .map_err(|e| ClientError::Config(format!("Invalid cipher parameters: {}", e)))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        {
            Ok(bytes) => bytes,
            Err(_) => return Ok(None),
        };
        Ok(String::from_utf8(plaintext).ok())
    }

    /// MD5 `EVP_BytesToKey` with a single iteration.
    fn derive(&self, salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
        let mut material = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
        let mut block: Vec<u8> = Vec::new();
        while material.len() < KEY_LEN + IV_LEN {
            let mut hasher = Md5::new();
            hasher.update(&block);
            hasher.update(&self.passphrase);
            hasher.update(salt);
            block = hasher.finalize().to_vec();
            material.extend_from_slice(&block);
        }

        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        key.copy_from_slice(&material[..KEY_LEN]);
        iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
        (key, iv)
    }
}

impl fmt::Debug for IdentitySealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySealer").finish_non_exhaustive()
    }
}
