//! Handshake seeds and per-direction nonces

use rand::{RngCore, rngs::OsRng};
use tracing::warn;

use crate::{CryptoError, CryptoResult, HALF_NONCE_SIZE, NONCE_COUNTER_SIZE, NONCE_SIZE};

/// Random material one party contributes during the nonce exchange
#[derive(Clone, PartialEq, Eq)]
pub struct NonceSeed([u8; NONCE_SIZE]);

impl NonceSeed {
    /// Generate a fresh seed from the OS CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Accept a seed received from the peer
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let seed: [u8; NONCE_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidNonceLength {
                expected: NONCE_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(seed))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl From<[u8; NONCE_SIZE]> for NonceSeed {
    fn from(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for NonceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NonceSeed(..)")
    }
}

/// A 24-byte secretbox nonce
///
/// Nonce format: [4 bytes big-endian counter][20 bytes fixed]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }

    /// Current value of the counter field
    pub fn counter(&self) -> u32 {
        let mut counter = [0u8; NONCE_COUNTER_SIZE];
        counter.copy_from_slice(&self.0[..NONCE_COUNTER_SIZE]);
        u32::from_be_bytes(counter)
    }

    /// Advance the counter field by one, wrapping at 2^32
    pub fn increment(&mut self) {
        let (next, wrapped) = self.counter().overflowing_add(1);
        if wrapped {
            warn!("Nonce counter wrapped; nonces from this point repeat earlier ones");
        }
        self.0[..NONCE_COUNTER_SIZE].copy_from_slice(&next.to_be_bytes());
    }
}

impl From<[u8; NONCE_SIZE]> for Nonce {
    fn from(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }
}

/// The two nonces one end of a connection uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoncePair {
    /// Used to open messages from the peer
    pub reading: Nonce,
    /// Used to seal messages to the peer
    pub writing: Nonce,
}

impl NoncePair {
    /// Combine our seed and the peer's seed
    ///
    /// `reading = local[..12] ++ peer[12..]`, `writing = peer[..12] ++ local[12..]`.
    /// Both ends run this with their own seed as `local`, so one end's reading
    /// nonce is the other end's writing nonce.
    pub fn derive(local: &NonceSeed, peer: &NonceSeed) -> CryptoResult<Self> {
        let mut reading = [0u8; NONCE_SIZE];
        reading[..HALF_NONCE_SIZE].copy_from_slice(&local.0[..HALF_NONCE_SIZE]);
        reading[HALF_NONCE_SIZE..].copy_from_slice(&peer.0[HALF_NONCE_SIZE..]);

        let mut writing = [0u8; NONCE_SIZE];
        writing[..HALF_NONCE_SIZE].copy_from_slice(&peer.0[..HALF_NONCE_SIZE]);
        writing[HALF_NONCE_SIZE..].copy_from_slice(&local.0[HALF_NONCE_SIZE..]);

        // Only happens when the peer reflects our own seed
        if reading == writing {
            return Err(CryptoError::NonceCollision);
        }

        Ok(Self {
            reading: Nonce(reading),
            writing: Nonce(writing),
        })
    }
}
