//! The one-byte frame-kind marker that opens every wire transmission.

use crate::error::{Result, WireError};

/// Frame kind marker. Exactly four values are defined; any other byte on the
/// wire means the stream is desynchronized, which is unrecoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    /// A command fully described by its type code.
    SimpleCommand = 1,
    /// A command with a subtype-specific payload after the type code.
    ComplexCommand = 2,
    /// A response carrying only the common `{ok, error}` header.
    SimpleResponse = 3,
    /// A response with a subtype-specific payload after the common header.
    ComplexResponse = 4,
}

impl FrameKind {
    /// Wire value of this frame kind.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a frame-kind byte. Anything outside `{1, 2, 3, 4}` is a fatal
    /// [`WireError::BadFrameKind`].
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FrameKind::SimpleCommand),
            2 => Ok(FrameKind::ComplexCommand),
            3 => Ok(FrameKind::SimpleResponse),
            4 => Ok(FrameKind::ComplexResponse),
            other => Err(WireError::BadFrameKind(other)),
        }
    }
}
