//! Decode-time errors. None of these ever propagate into the simulation
//! core: a malformed message is logged and dropped at the network boundary,
//! never thrown into the tick loop.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProtocolError {
    /// The frame was shorter than the fixed layout for its message type requires.
    Truncated,
    /// The first byte did not match any known message type.
    UnknownType(u8),
    /// A JOIN name-length byte claims more bytes than the frame actually contains.
    NameLengthExceedsPayload,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated => write!(f, "message truncated"),
            ProtocolError::UnknownType(t) => write!(f, "unknown message type {t}"),
            ProtocolError::NameLengthExceedsPayload => write!(f, "name length exceeds payload"),
        }
    }
}

impl std::error::Error for ProtocolError {}
