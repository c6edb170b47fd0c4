//! Stream transport implementation

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use console_protocol::{FramedMessage, LENGTH_PREFIX_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::{TransportError, TransportResult};

/// Blocking-style exact reads and whole writes over one byte stream
///
/// The transport owns its stream exclusively. Nothing here imposes a
/// timeout on reads or writes; wrap calls in `tokio::time::timeout` if needed.
pub struct Transport<S = TcpStream> {
    stream: S,
    peer: Option<SocketAddr>,
    stats: ConnectionStats,
}

impl Transport<TcpStream> {
    /// Connect to a `host:port` target over TCP
    pub async fn connect(target: &str) -> TransportResult<Self> {
        let (host, port) = parse_target(target)?;

        info!("Connecting to {}", target);

        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", target, e)))?;
        stream.set_nodelay(true)?;

        let peer = stream.peer_addr().ok();
        info!("Connected to {}", peer.map_or_else(|| target.to_string(), |p| p.to_string()));

        let mut transport = Self::new(stream);
        transport.peer = peer;
        Ok(transport)
    }

    /// Connect, giving up after `timeout` if one is set
    pub async fn connect_timeout(target: &str, timeout: Option<Duration>) -> TransportResult<Self> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, Self::connect(target))
                .await
                .map_err(|_| TransportError::Timeout)?,
            None => Self::connect(target).await,
        }
    }
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-connected stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            peer: None,
            stats: ConnectionStats::default(),
        }
    }

    /// Write every byte, then flush
    pub async fn write_all(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_sent += bytes.len() as u64;
        Ok(())
    }

    /// Read exactly `len` bytes; the stream ending first is an error
    pub async fn read_exact(&mut self, len: usize) -> TransportResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| read_error(e, len))?;
        self.stats.bytes_received += len as u64;
        Ok(buf)
    }

    /// Send one length-prefixed frame
    pub async fn write_frame(&mut self, payload: &[u8]) -> TransportResult<()> {
        let frame = FramedMessage::encode(payload)?;
        self.write_all(&frame).await?;
        self.stats.frames_sent += 1;

        debug!(len = payload.len(), "Sent frame");
        Ok(())
    }

    /// Receive one length-prefixed frame of at most `max_len` payload bytes
    ///
    /// An oversized length prefix is rejected before any payload is read.
    pub async fn read_frame(&mut self, max_len: usize) -> TransportResult<Bytes> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.stream
            .read_exact(&mut prefix)
            .await
            .map_err(|e| read_error(e, LENGTH_PREFIX_SIZE))?;
        self.stats.bytes_received += LENGTH_PREFIX_SIZE as u64;

        let len = FramedMessage::parse_length(prefix, max_len)?;
        let payload = self.read_exact(len).await?;
        self.stats.frames_received += 1;

        debug!(len, "Received frame");
        Ok(Bytes::from(payload))
    }

    /// Shut down the write half of the stream
    pub async fn shutdown(&mut self) -> TransportResult<()> {
        self.stream.shutdown().await?;
        debug!("Transport shut down");
        Ok(())
    }

    /// Get remote address (TCP transports only)
    pub fn remote_address(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Get transfer stats
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}

/// Connection statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub frames_sent: u64,
    pub frames_received: u64,
}

/// Split `host:port`, accepting bracketed IPv6 hosts
pub fn parse_target(target: &str) -> TransportResult<(&str, u16)> {
    let (host, port) = target
        .rsplit_once(':')
        .ok_or_else(|| TransportError::AddressParse(format!("missing port in {:?}", target)))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(TransportError::AddressParse(format!(
            "missing host in {:?}",
            target
        )));
    }

    let port = port
        .parse::<u16>()
        .map_err(|e| TransportError::AddressParse(format!("bad port in {:?}: {}", target, e)))?;

    Ok((host, port))
}

fn read_error(err: io::Error, expected: usize) -> TransportError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TransportError::ConnectionClosed(format!(
            "stream ended before {} bytes arrived",
            expected
        ))
    } else {
        TransportError::Io(err)
    }
}
