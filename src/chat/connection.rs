//! Send capability handed to the chat core by the transport.

use std::sync::Mutex;

/// Outbound side of one client connection.
///
/// Both methods are fire-and-forget: they must not block, and delivery
/// failures are not reported back to the caller.
pub trait Connection: Send + Sync {
    /// Queue a text message for the client.
    fn send(&self, text: &str);

    /// Ask the transport to close the connection once queued text is flushed.
    fn close(&self);
}

/// In-memory connection that records everything sent to it.
///
/// Useful for driving the chat core without a socket.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    sent: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl MemoryConnection {
    /// Create an empty connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Remove and return all messages sent so far.
    pub fn take(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default()
    }

    /// Whether `close` was called.
    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(false)
    }
}

impl Connection for MemoryConnection {
    fn send(&self, text: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
    }

    fn close(&self) {
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
    }
}
