//! Chat sessions and the registry that tracks them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::connection::Connection;

/// Transport-assigned identifier of a connection.
///
/// Ids are handed out in accept order, so registry order (ascending id) is
/// also connection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side state for one connected client.
pub struct Session {
    id: SessionId,
    nickname: String,
    registered: bool,
    connection: Arc<dyn Connection>,
    connected_at: DateTime<Utc>,
}

impl Session {
    /// Create an anonymous session with the default nickname `user_<id>`.
    pub fn new(id: SessionId, connection: Arc<dyn Connection>) -> Self {
        Self {
            id,
            nickname: format!("user_{id}"),
            registered: false,
            connection,
            connected_at: Utc::now(),
        }
    }

    /// Get the session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current nickname (the default one until registration).
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Whether the session has claimed a nickname.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// When the connection was opened.
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Claim `nickname`. Uniqueness is the caller's job.
    pub fn register(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
        self.registered = true;
    }

    /// Queue text for this session's client.
    pub fn send(&self, text: &str) {
        self.connection.send(text);
    }

    /// Ask the transport to close this session's connection.
    pub fn close(&self) {
        self.connection.close();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("nickname", &self.nickname)
            .field("registered", &self.registered)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// All open sessions, keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, Session>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session.
    ///
    /// Returns false and leaves the registry untouched if the id is already
    /// present.
    pub fn add(&mut self, session: Session) -> bool {
        if self.sessions.contains_key(&session.id) {
            return false;
        }
        self.sessions.insert(session.id, session);
        true
    }

    /// Remove a session, returning it if it was present.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Look up a session by id.
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Look up a session by id for mutation.
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Find the registered session holding `nickname` (exact, case-sensitive).
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&Session> {
        self.sessions
            .values()
            .find(|s| s.registered && s.nickname == nickname)
    }

    /// Iterate over all sessions in registry order.
    pub fn all(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Number of open sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of registered sessions.
    pub fn count_registered(&self) -> usize {
        self.sessions.values().filter(|s| s.registered).count()
    }

    /// Nicknames of registered sessions in registry order.
    pub fn registered_nicknames(&self) -> Vec<&str> {
        self.sessions
            .values()
            .filter(|s| s.registered)
            .map(|s| s.nickname.as_str())
            .collect()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
