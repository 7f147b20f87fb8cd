//! Chat core for clubchat.
//!
//! This module provides the transport-independent part of the server:
//! - Command parsing (/nick, /msg, /pm, /users, /help, /quit)
//! - Session registry with unique nicknames
//! - Broadcast and private message routing
//! - The [`ChatServer`] event handler that ties them together

mod command;
mod connection;
mod handler;
mod reply;
mod router;
mod session;

pub use command::{format_help, is_valid_nickname, parse_command, Command, CommandInfo, COMMANDS};
pub use connection::{Connection, MemoryConnection};
pub use handler::{ChatEvent, ChatServer};
pub use reply::{
    chat_line, nickname_changed, private_message, user_joined, user_quit, users_report, welcome,
    CommandError,
};
pub use router::{broadcast, broadcast_except, deliver, send_to, Recipients, BROADCAST_PREFIX};
pub use session::{Session, SessionId, SessionRegistry};
