//! Shared Protocol Definitions for the dnsdist console
//!
//! Wire constants, length-prefixed framing and the session state machine
//! shared by the transport and client crates.

mod error;
mod frame;
mod session;

pub use error::*;
pub use frame::*;
pub use session::*;

/// Default console port used by dnsdist's `controlSocket()`
pub const DEFAULT_CONSOLE_PORT: u16 = 5199;

/// Default console address
pub const DEFAULT_CONSOLE_ADDR: &str = "127.0.0.1:5199";

/// Size of each handshake seed and of every nonce (192 bits / 24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Shared key size (256 bits / 32 bytes)
pub const KEY_SIZE: usize = 32;

/// Size of the big-endian frame length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default upper bound on a received frame payload (16 MiB)
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;
