//! Secretbox channel with per-direction nonce sequencing

use crypto_secretbox::{
    Key, Nonce as BoxNonce, XSalsa20Poly1305,
    aead::{Aead, KeyInit},
};
use tracing::debug;

use crate::{CryptoError, CryptoResult, NoncePair, SharedKey, TAG_SIZE};

/// Established secure channel
///
/// Every seal advances the writing nonce and every open attempt advances the
/// reading nonce, successful or not, so both ends stay in step with the
/// number of messages exchanged.
pub struct SecureChannel {
    /// Cipher for encryption/decryption
    cipher: XSalsa20Poly1305,
    /// Current reading and writing nonces
    nonces: NoncePair,
    /// Messages sealed so far
    sent_counter: u64,
    /// Open attempts so far
    received_counter: u64,
}

impl SecureChannel {
    /// Create a channel from the shared key and the derived nonces
    pub fn new(key: &SharedKey, nonces: NoncePair) -> Self {
        let cipher = XSalsa20Poly1305::new(Key::from_slice(key.as_bytes()));

        Self {
            cipher,
            nonces,
            sent_counter: 0,
            received_counter: 0,
        }
    }

    /// Encrypt an outgoing message
    ///
    /// Returns: [16-byte auth tag][ciphertext]
    pub fn seal_outgoing(&mut self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce = BoxNonce::from_slice(self.nonces.writing.as_bytes());

        let sealed = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()));

        self.nonces.writing.increment();
        self.sent_counter += 1;

        sealed
    }

    /// Decrypt and verify an incoming message
    pub fn open_incoming(&mut self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce = BoxNonce::from_slice(self.nonces.reading.as_bytes());

        let opened = if ciphertext.len() < TAG_SIZE {
            Err(CryptoError::DecryptionFailed)
        } else {
            self.cipher
                .decrypt(nonce, ciphertext)
                .map_err(|_| CryptoError::DecryptionFailed)
        };

        self.nonces.reading.increment();
        self.received_counter += 1;

        if opened.is_err() {
            debug!(
                len = ciphertext.len(),
                attempt = self.received_counter,
                "Incoming message failed authentication"
            );
        }

        opened
    }

    /// Consume the reading nonce for a reply that never arrived
    pub fn skip_incoming(&mut self) {
        self.nonces.reading.increment();
        self.received_counter += 1;
    }

    /// Current nonces (the next ones to be used)
    pub fn nonces(&self) -> &NoncePair {
        &self.nonces
    }

    /// Get the number of messages sealed (for debugging/stats)
    pub fn sent_count(&self) -> u64 {
        self.sent_counter
    }

    /// Get the number of open attempts (for debugging/stats)
    pub fn received_count(&self) -> u64 {
        self.received_counter
    }
}
