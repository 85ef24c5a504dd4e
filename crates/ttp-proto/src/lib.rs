//! Wire format for the tagged transfer protocol: the header catalog, the
//! [`Packet`] value type, and the codec that moves packets to and from a
//! byte stream.
//!
//! This crate has no notion of channels or multiplexing; see `ttp-core` and
//! `ttp-mux` for those layers.

mod codec;
mod error;
pub mod header;
mod packet;

pub use codec::{decode_packet, decode_packet_blocking, encode_packet};
pub use error::ProtocolError;
pub use packet::Packet;

/// The standard TCP port advisory for a TTP listener.
///
/// Advisory only: the codec and the multiplexer never bind a socket
/// themselves.
pub const STANDARD_PORT: u16 = 4020;

/// Default polling window for [`decode_packet`] when a caller has no
/// stronger preference.
pub const DEFAULT_POLL_WINDOW: std::time::Duration = std::time::Duration::from_millis(1);
