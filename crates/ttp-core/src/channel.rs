//! A single multiplexed channel's outbound and inbound queues.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::Notify;
use tracing::trace;
use ttp_proto::Packet;

use crate::error::ChannelError;

/// One logical conversation sharing a portal's underlying stream.
///
/// A channel has two independent FIFO queues: `outbound`, filled by
/// application code and drained by the selector, and `inbound`, filled by
/// the selector and drained by application code. Both queues are unbounded;
/// the only back-pressure available is [`Channel::await_output`].
pub struct Channel {
    id: usize,
    outbound: Mutex<VecDeque<Packet>>,
    inbound: Mutex<VecDeque<Packet>>,
    output_drained: Notify,
    input_arrived: Notify,
    closed: AtomicBool,
}

impl Channel {
    /// Creates a new, empty channel with the given id.
    ///
    /// Ordinarily called only by a portal at construction time; channel ids
    /// must be unique within whatever portal owns them.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            outbound: Mutex::new(VecDeque::new()),
            inbound: Mutex::new(VecDeque::new()),
            output_drained: Notify::new(),
            input_arrived: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// This channel's id, unique within its portal.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the owning portal has marked this channel closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Marks this channel closed and releases any waiters blocked in
    /// [`Channel::await_output`] or [`Channel::await_input`].
    ///
    /// Called by the owning portal on `close()`; not intended for
    /// application code, but Rust has no package-private visibility across
    /// crate boundaries to enforce that.
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.output_drained.notify_waiters();
        self.input_arrived.notify_waiters();
    }

    /// Enqueues `packet` for the selector to send. Never blocks.
    pub fn send(&self, packet: Packet) -> Result<(), ChannelError> {
        if self.is_closed() {
            trace!(channel = self.id, "send rejected, portal closed");
            return Err(ChannelError::ClosedPortal);
        }
        let mut outbound = self.outbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        outbound.push_back(packet);
        Ok(())
    }

    /// Dequeues and returns the oldest packet the selector has deposited,
    /// or `None` if there is none yet. Never blocks.
    pub fn receive(&self) -> Result<Option<Packet>, ChannelError> {
        if self.is_closed() {
            trace!(channel = self.id, "receive rejected, portal closed");
            return Err(ChannelError::ClosedPortal);
        }
        let mut inbound = self.inbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(inbound.pop_front())
    }

    /// Returns a clone of the oldest inbound packet without removing it.
    pub fn peek(&self) -> Result<Option<Packet>, ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::ClosedPortal);
        }
        let inbound = self.inbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(inbound.front().cloned())
    }

    /// Number of packets waiting to be sent. May be stale the instant it
    /// returns.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.outbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Number of packets waiting to be received. May be stale the instant
    /// it returns.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.inbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Suspends the caller until `outbound` is empty, i.e. the selector has
    /// caught up with every packet sent so far, or until the channel is
    /// closed. Callers should re-check [`Channel::is_closed`] afterward.
    pub async fn await_output(&self) {
        loop {
            let drained = self.output_drained.notified();
            if self.output_size() == 0 || self.is_closed() {
                return;
            }
            drained.await;
        }
    }

    /// Suspends the caller until `inbound` has at least one packet, or
    /// until the channel is closed. Callers should re-check
    /// [`Channel::is_closed`] afterward.
    pub async fn await_input(&self) {
        loop {
            let arrived = self.input_arrived.notified();
            if self.input_size() > 0 || self.is_closed() {
                return;
            }
            arrived.await;
        }
    }

    /// Selector-facing: dequeues the next outbound packet, if any, and
    /// wakes [`Channel::await_output`] waiters once the queue empties.
    ///
    /// Not intended for application code; a selector is the only caller in
    /// the ordinary lifecycle of a channel, but Rust has no package-private
    /// visibility across crate boundaries to enforce that.
    pub fn take_outbound(&self) -> Option<Packet> {
        let mut outbound = self.outbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let packet = outbound.pop_front();
        if packet.is_some() && outbound.is_empty() {
            self.output_drained.notify_waiters();
        }
        drop(outbound);
        packet
    }

    /// Selector-facing: deposits `packet` into inbound and wakes
    /// [`Channel::await_input`] waiters.
    ///
    /// Not intended for application code; see [`Channel::take_outbound`].
    pub fn deposit_inbound(&self, packet: Packet) {
        let mut inbound = self.inbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inbound.push_back(packet);
        self.input_arrived.notify_waiters();
    }
}
