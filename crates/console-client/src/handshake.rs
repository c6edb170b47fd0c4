//! Nonce exchange run at the start of every console connection

use console_protocol::NONCE_SIZE;
use crypto_session::{NoncePair, NonceSeed};
use net_transport::Transport;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::ConsoleResult;

/// One side of the seed swap
///
/// Each end sends 24 random bytes unframed, reads the peer's 24 bytes and
/// derives its reading and writing nonces from both. The exchange is the same
/// on either end of the connection.
pub struct NonceExchange {
    local: NonceSeed,
}

impl NonceExchange {
    pub fn new() -> Self {
        Self::with_seed(NonceSeed::generate())
    }

    pub fn with_seed(local: NonceSeed) -> Self {
        Self { local }
    }

    /// Swap seeds over `transport` and derive this end's nonces
    pub async fn run<S>(self, transport: &mut Transport<S>) -> ConsoleResult<NoncePair>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        transport.write_all(self.local.as_bytes()).await?;

        let peer = transport.read_exact(NONCE_SIZE).await?;
        let peer = NonceSeed::from_slice(&peer)?;

        let nonces = NoncePair::derive(&self.local, &peer)?;
        debug!("Nonce exchange complete");

        Ok(nonces)
    }
}

impl Default for NonceExchange {
    fn default() -> Self {
        Self::new()
    }
}
