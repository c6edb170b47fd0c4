//! Console client error types

use console_protocol::{ProtocolError, SessionState};
use crypto_session::CryptoError;
use net_transport::TransportError;
use thiserror::Error;

/// Errors returned to users of a console session
///
/// None of these are retried internally. After a failed command both nonces
/// have already advanced, so retrying means deciding whether to keep using the
/// session or to close it and dial again.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Authentication failure: console response could not be verified")]
    Authentication,

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Session is {state}: {reason}")]
    State {
        state: SessionState,
        reason: &'static str,
    },
}

impl From<TransportError> for ConsoleError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Protocol(err) => err.into(),
            TransportError::AddressParse(msg) => ConsoleError::Configuration(msg),
            other => ConsoleError::Transport(other),
        }
    }
}

impl From<ProtocolError> for ConsoleError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidStateTransition { from, .. } => ConsoleError::State {
                state: from,
                reason: "invalid state transition",
            },
            other => ConsoleError::Protocol(other.to_string()),
        }
    }
}

impl From<CryptoError> for ConsoleError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::DecryptionFailed => ConsoleError::Authentication,
            CryptoError::InvalidKeyEncoding(_) | CryptoError::InvalidKeyLength { .. } => {
                ConsoleError::Configuration(err.to_string())
            }
            CryptoError::InvalidNonceLength { .. }
            | CryptoError::NonceCollision
            | CryptoError::Encryption(_) => ConsoleError::Protocol(err.to_string()),
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
