//! The multiplexed portal: owns a byte stream, a fixed set of channels, and
//! the selector that drives I/O between them.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;
use ttp_core::{Channel, ChannelError};
use ttp_proto::DEFAULT_POLL_WINDOW;

use crate::{selector::Selector, PortalError};

/// A portal multiplexing a fixed number of channels over one shared stream.
///
/// Channels are created eagerly at construction with ids `0..channel_count`.
/// Once [`Portal::open`] returns, a [`Selector`] is already running in the
/// background; applications never touch the underlying stream directly.
pub struct Portal {
    name: String,
    channels: Arc<Vec<Arc<Channel>>>,
    selector: Selector,
    closed: Arc<AtomicBool>,
}

impl Portal {
    /// Opens a portal over `stream` with `channel_count` channels, and
    /// starts its selector immediately using the default polling window.
    pub fn open<S>(stream: S, name: impl Into<String>, channel_count: usize) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        Self::open_with_poll_window(stream, name, channel_count, DEFAULT_POLL_WINDOW)
    }

    /// Like [`Portal::open`], but with an explicit polling window for the
    /// selector's reads.
    pub fn open_with_poll_window<S>(
        stream: S,
        name: impl Into<String>,
        channel_count: usize,
        poll_window: Duration,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let channels: Vec<Arc<Channel>> =
            (0..channel_count).map(|id| Arc::new(Channel::new(id))).collect();
        let channels = Arc::new(channels);
        let name = name.into();

        info!(%name, channel_count, "portal opening");

        let selector = Selector::new();
        selector.start(stream, Arc::clone(&channels), poll_window);

        Self { name, channels, selector, closed: Arc::new(AtomicBool::new(false)) }
    }

    /// This portal's name, used only for observability.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of channels this portal was opened with.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether [`Portal::close`] has completed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Read-only access to the selector driving this portal, for
    /// diagnostics (cycle count, lifecycle state).
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Returns channel `index`, or an error if it is out of range.
    pub fn channel(&self, index: usize) -> Result<&Arc<Channel>, PortalError> {
        self.channels
            .get(index)
            .ok_or(ChannelError::OutOfRangeChannel { index, count: self.channels.len() })
            .map_err(PortalError::from)
    }

    /// Idempotent. Stops the selector, waiting for it to drain every
    /// channel's outbound queue before returning.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(name = %self.name, "portal closing");
        self.selector.stop().await;
        for channel in self.channels.iter() {
            channel.mark_closed();
        }
        info!(name = %self.name, "portal closed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ttp_proto::Packet;

    use super::*;

    #[tokio::test]
    async fn single_packet_single_channel_round_trips() {
        let (client_stream, server_stream) = tokio::io::duplex(4096);
        let client = Portal::open(client_stream, "client", 1);
        let server = Portal::open(server_stream, "server", 1);

        client.channel(0).unwrap().send(Packet::of_string("hello")).unwrap();
        client.channel(0).unwrap().await_output().await;

        let received = tokio::time::timeout(Duration::from_millis(500), async {
            loop {
                if let Some(p) = server.channel(0).unwrap().receive().unwrap() {
                    return p;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(received, Packet::of_string("hello"));

        client.close().await;
        server.close().await;
    }

    #[tokio::test]
    async fn interleaved_channels_preserve_destination() {
        let (client_stream, server_stream) = tokio::io::duplex(4096);
        let client = Portal::open(client_stream, "client", 2);
        let server = Portal::open(server_stream, "server", 2);

        client.channel(0).unwrap().send(Packet::of_int(7)).unwrap();
        client.channel(1).unwrap().send(Packet::of_bool(true)).unwrap();
        client.channel(0).unwrap().await_output().await;
        client.channel(1).unwrap().await_output().await;

        server.channel(0).unwrap().await_input().await;
        server.channel(1).unwrap().await_input().await;

        assert_eq!(server.channel(0).unwrap().receive().unwrap(), Some(Packet::of_int(7)));
        assert_eq!(server.channel(1).unwrap().receive().unwrap(), Some(Packet::of_bool(true)));

        client.close().await;
        server.close().await;
    }

    #[tokio::test]
    async fn close_drains_outstanding_sends_before_stopping() {
        let (client_stream, server_stream) = tokio::io::duplex(4096);
        let client = Portal::open(client_stream, "client", 1);
        let server = Portal::open(server_stream, "server", 1);

        let ch = client.channel(0).unwrap();
        ch.send(Packet::of_int(1)).unwrap();
        ch.send(Packet::of_int(2)).unwrap();
        ch.send(Packet::of_int(3)).unwrap();
        client.close().await;

        let mut received = Vec::new();
        tokio::time::timeout(Duration::from_millis(500), async {
            while received.len() < 3 {
                if let Some(p) = server.channel(0).unwrap().receive().unwrap() {
                    received.push(p);
                } else {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(received, vec![Packet::of_int(1), Packet::of_int(2), Packet::of_int(3)]);
        server.close().await;
    }

    #[tokio::test]
    async fn out_of_range_channel_is_an_error() {
        let (stream, _server) = tokio::io::duplex(64);
        let portal = Portal::open(stream, "solo", 1);
        assert!(portal.channel(1).is_err());
        portal.close().await;
    }
}
