//! Per-connection task bridging a TCP stream and the chat core.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tracing::{debug, warn};

use super::input::LineBuffer;
use crate::chat::{ChatEvent, Connection, SessionId};

/// Directive queued for a connection's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Text to write to the client.
    Text(String),
    /// Flush and close.
    Close,
}

/// Maximum number of messages queued for one client.
///
/// A client that stops reading loses messages past this point instead of
/// growing the queue.
pub const OUTBOUND_CAPACITY: usize = 256;

/// State shared by a connection handle and its queue.
#[derive(Debug, Default)]
struct QueueState {
    close_requested: Notify,
    dropped: AtomicU64,
}

/// [`Connection`] backed by a bounded channel to the connection task.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    tx: mpsc::Sender<Outbound>,
    state: Arc<QueueState>,
}

impl ChannelConnection {
    /// Create a connection with the default queue capacity.
    pub fn new() -> (Self, OutboundQueue) {
        Self::with_capacity(OUTBOUND_CAPACITY)
    }

    /// Create a connection and the queue its task drains.
    pub fn with_capacity(capacity: usize) -> (Self, OutboundQueue) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = Arc::new(QueueState::default());
        (
            Self {
                tx,
                state: Arc::clone(&state),
            },
            OutboundQueue { rx, state },
        )
    }
}

impl Connection for ChannelConnection {
    fn send(&self, text: &str) {
        match self.tx.try_send(Outbound::Text(text.to_string())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.state.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // The task is gone; the close event will follow.
            Err(TrySendError::Closed(_)) => {}
        }
    }

    fn close(&self) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(Outbound::Close) {
            self.state.close_requested.notify_one();
        }
    }
}

/// Receiving side of a [`ChannelConnection`].
#[derive(Debug)]
pub struct OutboundQueue {
    rx: mpsc::Receiver<Outbound>,
    state: Arc<QueueState>,
}

impl OutboundQueue {
    /// Next directive. Queued text comes first; a close requested while the
    /// queue was full is reported once the queue drains or immediately if
    /// nothing is queued.
    pub async fn recv(&mut self) -> Option<Outbound> {
        tokio::select! {
            biased;
            directive = self.rx.recv() => directive,
            _ = self.state.close_requested.notified() => Some(Outbound::Close),
        }
    }

    /// Number of messages dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.state.dropped.load(Ordering::Relaxed)
    }
}

/// Frame a message for the wire.
pub fn frame(text: &str) -> String {
    format!("\n{text}\n")
}

/// Serve one client until it disconnects or is told to close.
///
/// Raises `Opened` first and `Closed` last, with one `Message` per inbound
/// line in between. Read and write failures raise `Error` before `Closed`.
pub async fn serve_connection<S>(
    stream: S,
    peer_addr: SocketAddr,
    id: SessionId,
    events: mpsc::UnboundedSender<ChatEvent>,
    max_line_length: usize,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let (connection, mut outbound) = ChannelConnection::new();
    let mut lines = LineBuffer::new(max_line_length);
    let mut buf = [0u8; 1024];

    debug!("Session {} connected from {}", id, peer_addr);
    if events
        .send(ChatEvent::Opened {
            id,
            connection: Arc::new(connection),
        })
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            directive = outbound.recv() => match directive {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = writer.write_all(frame(&text).as_bytes()).await {
                        let _ = events.send(ChatEvent::Error { id, error: e.to_string() });
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    debug!("Session {} closing on request", id);
                    break;
                }
            },
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    if let Some(line) = lines.flush() {
                        let _ = events.send(ChatEvent::Message { id, text: line });
                    }
                    debug!("Session {} reached EOF", id);
                    break;
                }
                Ok(n) => {
                    for line in lines.feed(&buf[..n]) {
                        let _ = events.send(ChatEvent::Message { id, text: line });
                    }
                }
                Err(e) => {
                    let _ = events.send(ChatEvent::Error { id, error: e.to_string() });
                    break;
                }
            },
        }
    }

    if outbound.dropped() > 0 {
        warn!(
            "Session {} dropped {} messages for a slow client",
            id,
            outbound.dropped()
        );
    }

    let _ = writer.flush().await;
    let _ = writer.shutdown().await;
    let _ = events.send(ChatEvent::Closed { id });
}
