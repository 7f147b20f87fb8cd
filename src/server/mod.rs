//! TCP transport for the chat server.
//!
//! This module provides the listener, the per-connection task and the line
//! framing that turn socket traffic into [`crate::chat::ChatEvent`]s.

mod connection;
pub mod input;
mod listener;

pub use connection::{
    frame, serve_connection, ChannelConnection, Outbound, OutboundQueue, OUTBOUND_CAPACITY,
};
pub use input::LineBuffer;
pub use listener::{ChatListener, ConnectionPermit};
