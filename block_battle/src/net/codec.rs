//! Length-prefix framing and payload serialization.
//!
//! Every frame is a 4-byte big-endian payload length followed by exactly
//! that many payload bytes. The codec never inspects message semantics;
//! it only moves serialized bytes across the length-prefix boundary.

use serde::{Serialize, de::DeserializeOwned};
use std::io::{self, Read, Write};

use super::errors::NetError;

/// Maximum allowed payload size (1 MiB). A larger length header means
/// the stream is desynced or the peer is hostile.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Upper bound on bytes pulled per read while accumulating a payload.
const READ_CHUNK: usize = 4096;

/// The payload serialization revision. Both revisions share the framing;
/// peers must agree on the format out of band.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WireFormat {
    /// Compact binary encoding.
    #[default]
    Bincode,
    /// Human-readable JSON with the same length-prefix framing.
    Json,
}

impl WireFormat {
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, NetError> {
        match self {
            Self::Bincode => {
                bincode::serialize(value).map_err(|e| NetError::MalformedPayload(e.to_string()))
            }
            Self::Json => {
                serde_json::to_vec(value).map_err(|e| NetError::MalformedPayload(e.to_string()))
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, NetError> {
        match self {
            Self::Bincode => {
                bincode::deserialize(bytes).map_err(|e| NetError::MalformedPayload(e.to_string()))
            }
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| NetError::MalformedPayload(e.to_string())),
        }
    }
}

/// Serialize `value` and return header||payload as one buffer, sized so
/// a single `write_all` emits the whole frame. Writing the frame in one
/// chunk prevents read-side EOF races between header and payload.
pub fn encode_frame<T: Serialize>(format: WireFormat, value: &T) -> Result<Vec<u8>, NetError> {
    let payload = format.encode(value)?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(NetError::FrameTooLarge {
            actual: payload.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Write one frame. Write errors map to [`NetError::SendFailure`].
pub fn write_frame<T: Serialize, W: Write>(
    writer: &mut W,
    format: WireFormat,
    value: &T,
) -> Result<(), NetError> {
    let buf = encode_frame(format, value)?;
    writer.write_all(&buf).map_err(NetError::SendFailure)
}

/// Read exactly one frame and decode its payload.
///
/// Header and payload bytes are accumulated across however many partial
/// reads the stream delivers; short reads are expected, not errors. A
/// clean close before a full frame maps to [`NetError::ConnectionClosed`];
/// a read timeout (only configured during the handshake) maps to
/// [`NetError::HandshakeTimeout`]. A zero-length frame is legal and
/// decodes the empty payload.
pub fn read_frame<T: DeserializeOwned, R: Read>(
    reader: &mut R,
    format: WireFormat,
) -> Result<T, NetError> {
    let header = read_accumulated(reader, 4)?;
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(NetError::FrameTooLarge {
            actual: len,
            max: MAX_FRAME_SIZE,
        });
    }
    let payload = read_accumulated(reader, len)?;
    format.decode(&payload)
}

/// Accumulate exactly `len` bytes, pulling at most [`READ_CHUNK`] bytes
/// per read.
fn read_accumulated<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, NetError> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let end = len.min(filled + READ_CHUNK);
        match reader.read(&mut buf[filled..end]) {
            Ok(0) => return Err(NetError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                return Err(NetError::HandshakeTimeout);
            }
            Err(_) => return Err(NetError::ConnectionClosed),
        }
    }
    Ok(buf)
}
