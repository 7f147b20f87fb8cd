//! Chat core: connection lifecycle and command handling.
//!
//! [`ChatServer`] owns the session registry. The transport feeds it
//! [`ChatEvent`]s one at a time, either through the `on_*` methods directly
//! or through [`ChatServer::run`], which drains an event channel on a single
//! task so no locking is needed around the registry.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::command::{format_help, parse_command, Command};
use super::connection::Connection;
use super::reply::{self, CommandError};
use super::router;
use super::session::{Session, SessionId, SessionRegistry};

/// Event raised by the transport.
pub enum ChatEvent {
    /// A client connected.
    Opened {
        /// Transport-assigned id.
        id: SessionId,
        /// Send capability for the new client.
        connection: Arc<dyn Connection>,
    },
    /// A client sent one line of text.
    Message {
        /// Originating session.
        id: SessionId,
        /// The line, without terminator.
        text: String,
    },
    /// A client disconnected.
    Closed {
        /// Session that went away.
        id: SessionId,
    },
    /// The transport hit an error on a connection.
    Error {
        /// Affected session.
        id: SessionId,
        /// Error description.
        error: String,
    },
}

impl std::fmt::Debug for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatEvent::Opened { id, .. } => f.debug_struct("Opened").field("id", id).finish(),
            ChatEvent::Message { id, text } => f
                .debug_struct("Message")
                .field("id", id)
                .field("text", text)
                .finish(),
            ChatEvent::Closed { id } => f.debug_struct("Closed").field("id", id).finish(),
            ChatEvent::Error { id, error } => f
                .debug_struct("Error")
                .field("id", id)
                .field("error", error)
                .finish(),
        }
    }
}

type HandlerResult = Result<(), CommandError>;

/// The chat core.
#[derive(Debug, Default)]
pub struct ChatServer {
    registry: SessionRegistry,
}

impl ChatServer {
    /// Create a server with no sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Process events until every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<ChatEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("Event channel closed, chat server stopping");
    }

    /// Dispatch a single transport event.
    pub fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Opened { id, connection } => self.on_open(id, connection),
            ChatEvent::Message { id, text } => self.on_message(id, &text),
            ChatEvent::Closed { id } => self.on_close(id),
            ChatEvent::Error { id, error } => self.on_error(id, &error),
        }
    }

    /// A client connected: track it and greet it.
    pub fn on_open(&mut self, id: SessionId, connection: Arc<dyn Connection>) {
        let session = Session::new(id, connection);
        if !self.registry.add(session) {
            debug!("Ignoring duplicate open for session {}", id);
            return;
        }

        info!("New connection -> {}", id);
        router::send_to(&self.registry, id, &reply::welcome());
    }

    /// A client sent a line.
    pub fn on_message(&mut self, id: SessionId, text: &str) {
        let command = parse_command(text);
        if command == Command::NoOp {
            return;
        }
        if self.registry.get(id).is_none() {
            debug!("Dropping message from unknown session {}", id);
            return;
        }

        debug!(
            "Client id -> {} sent a {} command -> {}",
            id,
            command.name(),
            escape_newlines(text)
        );

        if let Err(e) = self.dispatch(id, command) {
            router::send_to(&self.registry, id, &e.to_string());
        }
    }

    /// A client disconnected: announce it if it had a name, then forget it.
    pub fn on_close(&mut self, id: SessionId) {
        let Some(session) = self.registry.remove(id) else {
            return;
        };

        if session.is_registered() {
            router::broadcast_except(&self.registry, id, &reply::user_quit(session.nickname()));
        }

        let duration = chrono::Utc::now() - session.connected_at();
        info!(
            "Connection closed -> {} ({}s)",
            id,
            duration.num_seconds()
        );
    }

    /// Transport errors are not surfaced to any session.
    pub fn on_error(&mut self, id: SessionId, error: &str) {
        debug!("Transport error on session {}: {}", id, error);
    }

    fn dispatch(&mut self, id: SessionId, command: Command) -> HandlerResult {
        match command {
            Command::NoOp => Ok(()),
            Command::Quit => self.handle_quit(id),
            Command::Help => self.handle_help(id),
            Command::SetNickname(name) => self.handle_nick(id, name),
            Command::InvalidNickname => Err(CommandError::NicknameHasSpace),
            Command::Broadcast(text) => self.handle_msg(id, &text),
            Command::PrivateMessage { target, text } => self.handle_pm(id, &target, &text),
            Command::InvalidPrivateMessage => {
                self.require_registered(id)?;
                Err(CommandError::CouldNotSendPm)
            }
            Command::ListUsers => self.handle_users(id),
            Command::Unrecognized => Err(CommandError::UnknownCommand),
        }
    }

    fn handle_quit(&mut self, id: SessionId) -> HandlerResult {
        if let Some(session) = self.registry.get(id) {
            session.close();
        }
        Ok(())
    }

    fn handle_help(&mut self, id: SessionId) -> HandlerResult {
        router::send_to(&self.registry, id, &format_help());
        Ok(())
    }

    fn handle_nick(&mut self, id: SessionId, name: String) -> HandlerResult {
        if self
            .registry
            .find_by_nickname(&name)
            .is_some_and(|holder| holder.id() != id)
        {
            return Err(CommandError::NicknameTaken);
        }

        router::send_to(&self.registry, id, &reply::nickname_changed(&name));
        if let Some(session) = self.registry.get_mut(id) {
            session.register(name.as_str());
        }
        info!("Session {} registered as {}", id, name);

        router::broadcast_except(&self.registry, id, &reply::user_joined(&name));
        Ok(())
    }

    fn handle_msg(&mut self, id: SessionId, text: &str) -> HandlerResult {
        let nickname = self.require_registered(id)?;
        if text.is_empty() {
            return Err(CommandError::MessageRequired);
        }

        router::broadcast(&self.registry, &reply::chat_line(&nickname, text));
        Ok(())
    }

    fn handle_pm(&mut self, id: SessionId, target: &str, text: &str) -> HandlerResult {
        let sender = self.require_registered(id)?;
        if target == sender {
            return Err(CommandError::CannotPmSelf);
        }

        let recipient = self
            .registry
            .find_by_nickname(target)
            .ok_or_else(|| CommandError::NicknameNotFound(target.to_string()))?;
        recipient.send(&reply::private_message(&sender, text));
        Ok(())
    }

    fn handle_users(&mut self, id: SessionId) -> HandlerResult {
        let nicknames = self.registry.registered_nicknames();
        let report = reply::users_report(&nicknames, self.registry.count());
        router::send_to(&self.registry, id, &report);
        Ok(())
    }

    /// Nickname of `id`, or `MustRegisterFirst` if it has none.
    fn require_registered(&self, id: SessionId) -> Result<String, CommandError> {
        match self.registry.get(id) {
            Some(session) if session.is_registered() => Ok(session.nickname().to_string()),
            _ => Err(CommandError::MustRegisterFirst),
        }
    }
}

fn escape_newlines(text: &str) -> String {
    text.replace("\r\n", "\\n").replace('\n', "\\n")
}
