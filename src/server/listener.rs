//! TCP listener for the chat server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

use super::connection::serve_connection;
use crate::chat::{ChatEvent, SessionId};
use crate::config::ServerConfig;
use crate::{ChatError, Result};

/// Chat server listener that accepts TCP connections.
pub struct ChatListener {
    listener: TcpListener,
    semaphore: Arc<Semaphore>,
    max_connections: usize,
    max_line_length: usize,
    next_id: u64,
}

impl ChatListener {
    /// Create a listener bound to the configured address.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        info!("Chat server listening on {}", local_addr);

        Ok(Self {
            listener,
            semaphore: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
            max_line_length: config.max_line_length,
            next_id: 1,
        })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Get the maximum number of connections allowed.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Get the number of available connection slots.
    pub fn available_connections(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Get the number of active connections.
    pub fn active_connections(&self) -> usize {
        self.max_connections - self.semaphore.available_permits()
    }

    /// Accept a new connection.
    ///
    /// Waits for a free connection slot first, then for the next client.
    /// Each accepted client gets the next session id.
    pub async fn accept(&mut self) -> Result<(TcpStream, SocketAddr, SessionId, ConnectionPermit)> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ChatError::Io(std::io::Error::other("semaphore closed")))?;

        let (stream, addr) = self.listener.accept().await?;
        let id = SessionId(self.next_id);
        self.next_id += 1;
        debug!("Accepted connection {} from {}", id, addr);

        Ok((stream, addr, id, ConnectionPermit { _permit: permit }))
    }

    /// Accept connections forever, serving each on its own task and
    /// forwarding their events to the chat core.
    pub async fn run(mut self, events: mpsc::UnboundedSender<ChatEvent>) -> Result<()> {
        loop {
            match self.accept().await {
                Ok((stream, addr, id, permit)) => {
                    let events = events.clone();
                    let max_line_length = self.max_line_length;
                    tokio::spawn(async move {
                        serve_connection(stream, addr, id, events, max_line_length).await;
                        // Releases the connection slot.
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// A permit that represents an active connection slot.
///
/// When this permit is dropped, the connection slot is released.
pub struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
