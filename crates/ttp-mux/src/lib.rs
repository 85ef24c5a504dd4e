//! The multiplexer: a [`Portal`] owning a shared byte stream and a fixed
//! set of channels, driven by a background [`Selector`].
//!
//! This is where the protocol's routing-frame discipline and graceful
//! shutdown draining live; `ttp-proto` knows nothing about channels, and
//! `ttp-core`'s [`ttp_core::Channel`] knows nothing about the stream.

mod error;
mod portal;
mod selector;

pub use error::{PortalError, SelectorError};
pub use portal::Portal;
pub use selector::{Selector, SelectorState};
