//! Error types for the multiplexed portal and its selector.

use thiserror::Error;
use ttp_core::ChannelError;
use ttp_proto::ProtocolError;

/// Errors surfaced by [`crate::Portal`] operations.
#[derive(Error, Debug)]
pub enum PortalError {
    /// A channel-level error (out-of-range index, closed portal).
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Errors that terminate the selector worker.
///
/// These are the two failures classified as fatal in the connection's
/// failure taxonomy: anything else (end-of-stream, poll timeout, a
/// truncated frame, a write failure) is recovered from in place and never
/// reaches this type.
#[derive(Error, Debug)]
pub enum SelectorError {
    /// A routing frame named a channel id outside the portal's range, or
    /// its body could not be parsed as a nonnegative integer.
    #[error("invalid routing: {0}")]
    InvalidRouting(String),

    /// A lower-level protocol error that is not one of the benign signals
    /// the selector otherwise recovers from.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
