//! Error types for channel and portal operations.

use thiserror::Error;

/// Errors raised by operations on a [`crate::Channel`] or its owning portal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The operation was attempted after the owning portal closed.
    #[error("operation attempted on a closed portal")]
    ClosedPortal,

    /// A channel id outside `0..count` was requested.
    #[error("channel index {index} out of range for portal with {count} channels")]
    OutOfRangeChannel {
        /// The requested index.
        index: usize,
        /// The number of channels the portal was constructed with.
        count: usize,
    },
}
