//! Length-prefixed framing for sealed console messages

use bytes::{BufMut, Bytes, BytesMut};

use crate::{LENGTH_PREFIX_SIZE, ProtocolError, ProtocolResult};

/// A single console message on the wire
///
/// Layout: `[4-byte big-endian payload length][payload]`. The payload is the
/// sealed ciphertext; this layer never looks inside it. Receiving reads the
/// prefix, checks it with [`FramedMessage::parse_length`], then reads exactly
/// that many bytes.
pub struct FramedMessage;

impl FramedMessage {
    /// Prefix `payload` with its big-endian length
    pub fn encode(payload: &[u8]) -> ProtocolResult<Bytes> {
        let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::FrameTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        })?;

        let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
        buf.put_u32(len);
        buf.put_slice(payload);
        Ok(buf.freeze())
    }

    /// Interpret a received length prefix, rejecting anything above `max_len`
    pub fn parse_length(prefix: [u8; LENGTH_PREFIX_SIZE], max_len: usize) -> ProtocolResult<usize> {
        let len = u32::from_be_bytes(prefix) as usize;
        if len > max_len {
            return Err(ProtocolError::FrameTooLarge {
                size: len,
                max: max_len,
            });
        }
        Ok(len)
    }
}
