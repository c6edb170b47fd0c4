//! Console shared secret

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use crate::{CryptoError, CryptoResult, KEY_SIZE};

/// The 32-byte key configured with dnsdist's `setKey()`
#[derive(Clone)]
pub struct SharedKey(Zeroizing<[u8; KEY_SIZE]>);

impl SharedKey {
    /// Decode a base64 secret
    pub fn from_base64(secret: &str) -> CryptoResult<Self> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(secret.trim())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );

        Self::from_slice(&decoded)
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Generate a random key
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(&mut *key);
        Self(key)
    }

    /// Encode for use in a dnsdist configuration
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&*self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_secret() {
        let key = SharedKey::from_base64("FUih6Cj9mNbrHWavhyhUrUhsuWK0pXSXc/d10WeV3h4=").unwrap();
        assert_eq!(key.as_bytes()[0], 0x15);
        assert_eq!(
            key.to_base64(),
            "FUih6Cj9mNbrHWavhyhUrUhsuWK0pXSXc/d10WeV3h4="
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        // 16 bytes
        let err = SharedKey::from_base64("AAAAAAAAAAAAAAAAAAAAAA==").unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            SharedKey::from_base64("not base64!"),
            Err(CryptoError::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let key = SharedKey::generate();
        assert_eq!(format!("{:?}", key), "SharedKey(..)");
        assert_eq!(SharedKey::from_base64(&key.to_base64()).unwrap().as_bytes(), key.as_bytes());
    }
}
