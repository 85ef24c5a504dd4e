//! Error types for the packet codec.
//!
//! We distinguish signals that a caller loop is expected to recover from
//! (`EndOfStream`) from failures that end the connection (`Truncated`,
//! `NegativeLength`). `std::io::Error` is wrapped rather than reused so that
//! callers can match on protocol-level causes without inspecting an `io`
//! error kind.

use thiserror::Error;

/// Errors produced while decoding or encoding a [`crate::Packet`].
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The peer closed the stream cleanly at a frame boundary.
    ///
    /// This is a signal, not a fault: a caller reading packets in a loop
    /// should treat it as ordinary completion.
    #[error("end of stream")]
    EndOfStream,

    /// The stream ended in the middle of a frame.
    #[error("truncated frame: expected {expected} more bytes, got {actual}")]
    Truncated {
        /// Bytes still needed to complete the frame.
        expected: usize,
        /// Bytes actually available before the stream ended.
        actual: usize,
    },

    /// The frame's length field was negative.
    #[error("invalid body length: {0}")]
    NegativeLength(i32),

    /// No byte of a frame arrived within the configured polling window.
    ///
    /// A selector treats this the same as a benign rotation signal; it is
    /// not propagated as connection failure.
    #[error("poll timeout")]
    PollTimeout,

    /// An I/O error unrelated to framing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns true if this error is a benign signal a selector loop should
    /// simply rotate past, rather than a connection-ending fault.
    #[must_use]
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::EndOfStream | Self::PollTimeout)
    }
}
