//! Console session - handshake confirmation and the command round trip

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use console_protocol::SessionState;
use crypto_session::{SecureChannel, SharedKey};
use net_transport::{ConnectionStats, Transport, TransportError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{ConsoleConfig, ConsoleError, ConsoleResult, NonceExchange, SessionOptions};

/// A session shared between tasks; the mutex serializes commands
pub type SharedSession<S = TcpStream> = Arc<Mutex<ConsoleSession<S>>>;

/// Connect to the console described by `config`
///
/// The secret is decoded before any connection is attempted, so a bad key
/// never reaches the network.
pub async fn dial(config: &ConsoleConfig) -> ConsoleResult<ConsoleSession<TcpStream>> {
    let key = config.validate()?;
    let transport = Transport::connect_timeout(&config.target, config.connect_timeout()).await?;

    ConsoleSession::establish(transport, &key, config.session_options()).await
}

/// Connect with default settings
pub async fn dial_with(target: &str, secret: &str) -> ConsoleResult<ConsoleSession<TcpStream>> {
    dial(&ConsoleConfig::new(target, secret)).await
}

/// An established console session
///
/// Owns the transport exclusively. `command` takes `&mut self`, so at most one
/// request is in flight; wrap the session in a [`SharedSession`] to use it
/// from several tasks.
pub struct ConsoleSession<S = TcpStream> {
    transport: Option<Transport<S>>,
    channel: SecureChannel,
    state: SessionState,
    options: SessionOptions,
    /// Set while a round trip is underway; still set afterwards means the
    /// caller dropped the command future midway
    in_flight: bool,
    /// A failed write or read left part of a frame on the stream
    misaligned: bool,
}

impl<S> ConsoleSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Run the nonce exchange and the empty-command confirmation
    ///
    /// A console that answers the empty command with anything other than an
    /// empty reply did not derive the same nonces or holds a different key.
    pub async fn establish(
        mut transport: Transport<S>,
        key: &SharedKey,
        options: SessionOptions,
    ) -> ConsoleResult<Self> {
        let nonces = match NonceExchange::new().run(&mut transport).await {
            Ok(nonces) => nonces,
            Err(e) => {
                let _ = transport.shutdown().await;
                return Err(e);
            }
        };

        let mut session = Self {
            transport: Some(transport),
            channel: SecureChannel::new(key, nonces),
            state: SessionState::Unestablished,
            options,
            in_flight: false,
            misaligned: false,
        };

        match session.confirm_handshake().await {
            Ok(()) => {
                session.state = session.state.transition(SessionState::Ready)?;
                info!("Console session established");
                Ok(session)
            }
            Err(e) => {
                warn!("Console handshake failed: {}", e);
                let _ = session.close().await;
                Err(e)
            }
        }
    }

    async fn confirm_handshake(&mut self) -> ConsoleResult<()> {
        let response = self.exchange(b"").await?;
        if !response.is_empty() {
            return Err(ConsoleError::Handshake(format!(
                "console answered the empty command with {} bytes",
                response.len()
            )));
        }
        Ok(())
    }

    /// Run one console command and return its output as text
    ///
    /// Console-side failures (a Lua error, say) come back as ordinary output.
    pub async fn command(&mut self, cmd: &str) -> ConsoleResult<String> {
        let response = self.command_bytes(cmd.as_bytes()).await?;
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// Run one console command with raw bytes in both directions
    pub async fn command_bytes(&mut self, cmd: &[u8]) -> ConsoleResult<Vec<u8>> {
        self.ensure_ready().await?;
        self.exchange(cmd).await
    }

    async fn ensure_ready(&mut self) -> ConsoleResult<()> {
        if self.in_flight {
            warn!("Previous command was interrupted; closing console session");
            let _ = self.close().await;
            return Err(ConsoleError::State {
                state: self.state,
                reason: "previous command was interrupted",
            });
        }

        if self.misaligned {
            warn!("Previous command left the stream misaligned; closing console session");
            let _ = self.close().await;
            return Err(ConsoleError::State {
                state: self.state,
                reason: "previous command left unread frame bytes",
            });
        }

        match self.state {
            SessionState::Ready => Ok(()),
            state => Err(ConsoleError::State {
                state,
                reason: "commands need an established session",
            }),
        }
    }

    async fn exchange(&mut self, cmd: &[u8]) -> ConsoleResult<Vec<u8>> {
        self.in_flight = true;

        let result = match self.options.command_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.round_trip(cmd)).await {
                Ok(result) => result,
                // abandoned midway, in_flight stays set
                Err(_) => return Err(ConsoleError::Transport(TransportError::Timeout)),
            },
            None => self.round_trip(cmd).await,
        };

        self.in_flight = false;
        result
    }

    /// seal -> frame -> write -> read frame -> open
    ///
    /// Both nonces advance exactly once per call, whatever fails.
    async fn round_trip(&mut self, cmd: &[u8]) -> ConsoleResult<Vec<u8>> {
        let sealed = match self.channel.seal_outgoing(cmd) {
            Ok(sealed) => sealed,
            Err(e) => {
                self.channel.skip_incoming();
                return Err(e.into());
            }
        };

        let reply = match self.send_and_receive(&sealed).await {
            Ok(reply) => reply,
            Err(e) => {
                self.channel.skip_incoming();
                self.misaligned = true;
                return Err(e);
            }
        };

        let plaintext = self.channel.open_incoming(&reply)?;
        debug!(
            sent = cmd.len(),
            received = plaintext.len(),
            "Console command complete"
        );
        Ok(plaintext)
    }

    async fn send_and_receive(&mut self, sealed: &[u8]) -> ConsoleResult<Bytes> {
        let max_frame_len = self.options.max_frame_len;
        let transport = self.transport.as_mut().ok_or(ConsoleError::State {
            state: SessionState::Closed,
            reason: "transport already released",
        })?;

        transport.write_frame(sealed).await?;
        Ok(transport.read_frame(max_frame_len).await?)
    }

    /// Shut down and release the transport
    ///
    /// Later commands fail with [`ConsoleError::State`]. Closing twice is a no-op.
    pub async fn close(&mut self) -> ConsoleResult<()> {
        if self.state.is_closed() {
            return Ok(());
        }

        self.state = self.state.transition(SessionState::Closed)?;
        self.in_flight = false;
        self.misaligned = false;

        if let Some(mut transport) = self.transport.take() {
            info!(
                commands = self.channel.sent_count(),
                "Console session closed"
            );
            transport.shutdown().await?;
        }

        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Messages sealed so far, including the handshake confirmation
    pub fn sent_count(&self) -> u64 {
        self.channel.sent_count()
    }

    /// Replies attempted so far, including the handshake confirmation
    pub fn received_count(&self) -> u64 {
        self.channel.received_count()
    }

    pub fn stats(&self) -> Option<ConnectionStats> {
        self.transport.as_ref().map(|t| t.stats().clone())
    }

    pub fn remote_address(&self) -> Option<SocketAddr> {
        self.transport.as_ref().and_then(|t| t.remote_address())
    }

    /// Wrap for use from several tasks
    pub fn into_shared(self) -> SharedSession<S> {
        Arc::new(Mutex::new(self))
    }
}
