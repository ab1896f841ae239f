//! Error types for profwire.

use thiserror::Error;

/// Main error type for all wire-protocol operations.
///
/// Framing errors ([`WireError::BadFrameKind`], the unknown-type variants and
/// [`WireError::Integrity`]) are fatal to the connection: once the stream is
/// desynchronized there is no way to find the next frame boundary, so callers
/// must tear the connection down rather than retry.
#[derive(Debug, Error)]
pub enum WireError {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame-kind byte outside the defined set `{1, 2, 3, 4}`.
    #[error("bad frame kind byte: {0}")]
    BadFrameKind(u8),

    /// Well-formed complex-command frame with a type code the registry does
    /// not know. Distinguished from a garbled frame so that protocol-version
    /// mismatches are diagnosable from the numeric code.
    #[error("unknown command type: {0}")]
    UnknownCommandType(u8),

    /// Well-formed complex-response frame with an unknown type code.
    #[error("unknown response type: {0}")]
    UnknownResponseType(u8),

    /// Payload data that cannot be interpreted: inflate failure, a
    /// decompressed-size mismatch, a negative count, malformed UTF-8, or
    /// parallel fields whose lengths disagree at encode time.
    #[error("protocol integrity fault: {0}")]
    Integrity(String),

    /// Encode-side limit: a string field longer than the 2-byte length
    /// prefix can express.
    #[error("string field too long for wire format: {0} bytes")]
    StringTooLong(usize),

    /// Peer closed the stream at a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using [`WireError`].
pub type Result<T> = std::result::Result<T, WireError>;
