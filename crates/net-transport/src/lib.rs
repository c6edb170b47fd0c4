//! Network Transport - byte stream plumbing for the dnsdist console
//!
//! Exact-length reads, whole writes and length-prefixed frames over TCP or
//! any other tokio byte stream.

mod error;
mod transport;

pub use error::*;
pub use transport::*;
