//! The channel abstraction shared between a multiplexed portal and the
//! application code that uses it.
//!
//! A [`Channel`] is intentionally I/O-free: it owns two queues and the
//! notification primitives that let application tasks wait on them. All
//! stream I/O is centralized in a selector, implemented in `ttp-mux`.

mod channel;
mod error;

pub use channel::Channel;
pub use error::ChannelError;
