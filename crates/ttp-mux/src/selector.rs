//! The selector: a background worker that owns stream I/O on behalf of a
//! portal's channels.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU8, AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::Notify,
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};
use ttp_proto::{decode_packet, decode_packet_blocking, encode_packet, header, Packet};

use ttp_core::Channel;

use crate::error::SelectorError;

const NEW: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;
const STOPPED: u8 = 3;

/// Lifecycle state of a [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Constructed but not yet started.
    New,
    /// Actively cycling.
    Running,
    /// `stop()` has been called; draining outbound packets before exit.
    Stopping,
    /// The worker has exited; no further I/O will occur.
    Stopped,
}

fn state_from_u8(raw: u8) -> SelectorState {
    match raw {
        NEW => SelectorState::New,
        RUNNING => SelectorState::Running,
        STOPPING => SelectorState::Stopping,
        _ => SelectorState::Stopped,
    }
}

/// Drives packets between a shared byte stream and a fixed set of channels.
///
/// One cycle visits every channel in ascending id order, flushing at most
/// one outbound packet per channel (preceded by its routing frame), then
/// performs one opportunistic read. The worker keeps cycling past a
/// `stop()` request until every channel's outbound queue is empty.
pub struct Selector {
    state: Arc<AtomicU8>,
    cycles: Arc<AtomicU64>,
    stopped_signal: Arc<Notify>,
    handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Selector {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(NEW)),
            cycles: Arc::new(AtomicU64::new(0)),
            stopped_signal: Arc::new(Notify::new()),
            handle: std::sync::Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SelectorState {
        state_from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of cycles the worker has completed so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    pub(crate) fn start<S>(&self, stream: S, channels: Arc<Vec<Arc<Channel>>>, poll_window: Duration)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        self.state.store(RUNNING, Ordering::SeqCst);
        info!(channels = channels.len(), "selector starting");

        let state = Arc::clone(&self.state);
        let cycles = Arc::clone(&self.cycles);
        let stopped_signal = Arc::clone(&self.stopped_signal);

        let handle =
            tokio::spawn(run(stream, channels, poll_window, state, cycles, stopped_signal));
        *self.handle.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(handle);
    }

    /// Requests that the worker drain and stop, then waits for it to reach
    /// [`SelectorState::Stopped`]. Idempotent: calling `stop()` more than
    /// once, or from multiple tasks, is safe.
    pub async fn stop(&self) {
        let _ = self.state.compare_exchange(
            RUNNING,
            STOPPING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        loop {
            let notified = self.stopped_signal.notified();
            if self.state.load(Ordering::SeqCst) == STOPPED {
                return;
            }
            notified.await;
        }
    }
}

async fn run<S>(
    mut stream: S,
    channels: Arc<Vec<Arc<Channel>>>,
    poll_window: Duration,
    state: Arc<AtomicU8>,
    cycles: Arc<AtomicU64>,
    stopped_signal: Arc<Notify>,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut reads_disabled = false;

    let outcome = 'cycles: loop {
        let running = state.load(Ordering::SeqCst) == RUNNING;
        let draining = channels.iter().any(|c| c.output_size() > 0);
        if !draining && (reads_disabled || !running) {
            break 'cycles Ok(());
        }

        for channel in channels.iter() {
            if let Err(err) = output(&mut stream, channel).await {
                warn!(channel = channel.id(), error = %err, "failed to write packet");
            }
        }

        if !reads_disabled {
            match input(&mut stream, &channels, poll_window).await {
                Ok(()) => {},
                Err(InputOutcome::Benign) => {},
                Err(InputOutcome::Recoverable(err)) => {
                    warn!(error = %err, "disabling further reads after recoverable failure");
                    reads_disabled = true;
                },
                Err(InputOutcome::Fatal(err)) => {
                    error!(error = %err, "fatal protocol violation, stopping selector");
                    break 'cycles Err(err);
                },
            }
        }

        cycles.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    };

    if let Err(err) = outcome {
        debug!(error = %err, "selector exited due to a fatal error");
    }

    state.store(STOPPED, Ordering::SeqCst);
    stopped_signal.notify_waiters();
    info!("selector stopped");
}

async fn output<S>(stream: &mut S, channel: &Channel) -> Result<(), SelectorError>
where
    S: AsyncWrite + Unpin,
{
    let Some(packet) = channel.take_outbound() else {
        return Ok(());
    };

    let routing = Packet::of(header::INTEGER, &channel.id().to_string(), 0);
    encode_packet(stream, &routing).await?;
    encode_packet(stream, &packet).await?;
    debug!(channel = channel.id(), packet = %packet, "wrote packet");
    Ok(())
}

enum InputOutcome {
    Benign,
    Recoverable(SelectorError),
    Fatal(SelectorError),
}

async fn input<S>(
    stream: &mut S,
    channels: &[Arc<Channel>],
    poll_window: Duration,
) -> Result<(), InputOutcome>
where
    S: AsyncRead + Unpin,
{
    let routing = match decode_packet(stream, poll_window).await {
        Ok(packet) => packet,
        Err(err) if err.is_benign() => return Err(InputOutcome::Benign),
        Err(err) => return Err(InputOutcome::Recoverable(SelectorError::Protocol(err))),
    };

    let id: usize = routing
        .format()
        .parse()
        .map_err(|_| InputOutcome::Fatal(SelectorError::InvalidRouting(routing.format().into_owned())))?;

    if id >= channels.len() {
        return Err(InputOutcome::Fatal(SelectorError::InvalidRouting(format!(
            "channel {id} out of range for {} channels",
            channels.len()
        ))));
    }

    let payload = decode_packet_blocking(stream)
        .await
        .map_err(|err| InputOutcome::Recoverable(SelectorError::Protocol(err)))?;

    debug!(channel = id, packet = %payload, "read packet");
    channels[id].deposit_inbound(payload);
    Ok(())
}
