//! Test helpers for E2E tests.
//!
//! Provides TestClient, TestServer, and helper functions for E2E testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use clubchat::config::ServerConfig;
use clubchat::{ChatListener, ChatServer};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Test client for connecting to the chat server.
pub struct TestClient {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl TestClient {
    /// Connect to the server at the given address.
    pub async fn connect(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            buffer: Vec::with_capacity(4096),
        })
    }

    /// Connect and consume the welcome banner.
    pub async fn connect_ready(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let mut client = Self::connect(addr).await?;
        client.recv_until("Quit chat club").await?;
        Ok(client)
    }

    /// Send a line (with LF) to the server.
    pub async fn send_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await
    }

    /// Receive data until a pattern is found.
    pub async fn recv_until(&mut self, pattern: &str) -> Result<String, std::io::Error> {
        self.recv_until_timeout(pattern, DEFAULT_TIMEOUT).await
    }

    /// Receive data until a pattern is found with custom timeout.
    ///
    /// Data after the pattern stays buffered for the next call.
    pub async fn recv_until_timeout(
        &mut self,
        pattern: &str,
        duration: Duration,
    ) -> Result<String, std::io::Error> {
        let mut buf = [0u8; 1024];

        let result = timeout(duration, async {
            loop {
                if let Some(text) = self.take_through(pattern) {
                    return Ok(text);
                }
                match self.stream.read(&mut buf).await {
                    Ok(0) => {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            format!("connection closed before {pattern:?}"),
                        ))
                    }
                    Ok(n) => self.buffer.extend_from_slice(&buf[..n]),
                    Err(e) => return Err(e),
                }
            }
        })
        .await;

        match result {
            Ok(r) => r,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!(
                    "timed out waiting for {pattern:?}, got {:?}",
                    String::from_utf8_lossy(&self.buffer)
                ),
            )),
        }
    }

    /// Assert nothing but whitespace arrives within `duration`.
    pub async fn expect_silence(&mut self, duration: Duration) -> Result<(), String> {
        let mut buf = [0u8; 256];
        let deadline = tokio::time::Instant::now() + duration;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, self.stream.read(&mut buf)).await {
                Err(_) => break,
                Ok(Ok(0)) => return Err("connection closed".to_string()),
                Ok(Ok(n)) => self.buffer.extend_from_slice(&buf[..n]),
                Ok(Err(e)) => return Err(e.to_string()),
            }
        }

        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        if text.trim().is_empty() {
            Ok(())
        } else {
            Err(format!("unexpected data: {text:?}"))
        }
    }

    /// Wait for the server to close the connection, returning what was left.
    pub async fn recv_to_eof(&mut self) -> Result<String, std::io::Error> {
        let mut rest = Vec::new();
        timeout(DEFAULT_TIMEOUT, self.stream.read_to_end(&mut rest))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "no EOF"))??;
        self.buffer.extend_from_slice(&rest);
        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Ok(text)
    }

    /// Consume the buffer through the end of the line containing `pattern`.
    ///
    /// Every server message ends with a newline, so waiting for it never
    /// stalls.
    fn take_through(&mut self, pattern: &str) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        let after = text.find(pattern)? + pattern.len();
        let end = after + text[after..].find('\n')? + 1;
        self.buffer.drain(..end);
        Some(text[..end].to_string())
    }
}

/// A chat server running on an ephemeral local port.
pub struct TestServer {
    addr: SocketAddr,
    listener_task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default limits.
    pub async fn start() -> Self {
        Self::start_with(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ServerConfig::default()
        })
        .await
    }

    /// Start a server with the given configuration (port should be 0).
    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = ChatListener::bind(&config)
            .await
            .expect("failed to bind test server");
        let addr = listener.local_addr().expect("no local address");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tokio::spawn(ChatServer::new().run(events_rx));
        let listener_task = tokio::spawn(async move {
            let _ = listener.run(events_tx).await;
        });

        Self {
            addr,
            listener_task,
        }
    }

    /// Address clients should connect to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Connect a client and read past the welcome banner.
    pub async fn client(&self) -> TestClient {
        TestClient::connect_ready(self.addr)
            .await
            .expect("failed to connect test client")
    }

    /// Connect a client and register `nickname`.
    pub async fn named_client(&self, nickname: &str) -> TestClient {
        let mut client = self.client().await;
        client
            .send_line(&format!("/nick {nickname}"))
            .await
            .expect("send failed");
        client
            .recv_until(&format!("changed to {nickname}."))
            .await
            .expect("nick not acknowledged");
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}
