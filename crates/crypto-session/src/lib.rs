//! Crypto Session - secretbox channel for the dnsdist console
//!
//! Derives per-direction nonces from the two handshake seeds and seals or
//! opens console messages with XSalsa20-Poly1305 (NaCl secretbox).

mod error;
mod key;
mod nonce;
mod session;

pub use error::*;
pub use key::*;
pub use nonce::*;
pub use session::*;

pub use console_protocol::{KEY_SIZE, NONCE_SIZE};

/// Authentication tag size (128 bits / 16 bytes)
pub const TAG_SIZE: usize = 16;

/// Bytes of each seed that go into each derived nonce
pub const HALF_NONCE_SIZE: usize = NONCE_SIZE / 2;

/// Bytes at the front of a nonce used as the message counter
pub const NONCE_COUNTER_SIZE: usize = 4;
