//! Console session state machine

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, ProtocolResult};

/// Session state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Connected, nonce exchange or handshake confirmation not yet complete
    #[default]
    Unestablished,
    /// Handshake confirmed, commands may be sent
    Ready,
    /// Transport released, no further commands
    Closed,
}

impl SessionState {
    /// Validate a move to `to`
    ///
    /// Closing is always allowed (and idempotent); the only forward step is
    /// `Unestablished -> Ready`.
    pub fn transition(self, to: SessionState) -> ProtocolResult<SessionState> {
        match (self, to) {
            (SessionState::Unestablished, SessionState::Ready) => Ok(to),
            (_, SessionState::Closed) => Ok(to),
            (from, to) => Err(ProtocolError::InvalidStateTransition { from, to }),
        }
    }

    pub fn is_ready(self) -> bool {
        self == SessionState::Ready
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Unestablished => "unestablished",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Unestablished);

        let state = state.transition(SessionState::Ready).unwrap();
        assert!(state.is_ready());

        let state = state.transition(SessionState::Closed).unwrap();
        assert!(state.is_closed());

        // closing twice is fine
        assert!(state.transition(SessionState::Closed).unwrap().is_closed());
        assert!(SessionState::Unestablished
            .transition(SessionState::Closed)
            .is_ok());
    }

    #[test]
    fn test_closed_session_cannot_reopen() {
        let err = SessionState::Closed
            .transition(SessionState::Ready)
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidStateTransition {
                from: SessionState::Closed,
                to: SessionState::Ready
            }
        ));

        assert!(SessionState::Ready.transition(SessionState::Ready).is_err());
        assert!(SessionState::Ready
            .transition(SessionState::Unestablished)
            .is_err());
    }
}
