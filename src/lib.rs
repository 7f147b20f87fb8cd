//! clubchat - a minimal multi-user line chat server.
//!
//! Clients connect over TCP, pick a nickname with `/nick`, and talk with
//! `/msg` (everyone) or `/pm` (one user).

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use chat::{ChatEvent, ChatServer, Command, CommandError, Connection, SessionId};
pub use config::Config;
pub use error::{ChatError, Result};
pub use server::{ChatListener, LineBuffer};

use tokio::sync::mpsc;

/// Bind the listener and run it together with the chat core.
///
/// Returns only if binding fails or the listener stops.
pub async fn serve(config: &Config) -> Result<()> {
    let listener = ChatListener::bind(&config.server).await?;
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(ChatServer::new().run(events_rx));
    listener.run(events_tx).await
}
