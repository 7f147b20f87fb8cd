//! Message delivery over the session registry.

use super::session::{SessionId, SessionRegistry};

/// Prefix marking text that was broadcast rather than sent privately.
pub const BROADCAST_PREFIX: &str = ">> ";

/// Who a message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    /// Every open session.
    All,
    /// Every open session except one.
    AllExcept(SessionId),
    /// A single session.
    Only(SessionId),
}

impl Recipients {
    fn includes(&self, id: SessionId) -> bool {
        match *self {
            Recipients::All => true,
            Recipients::AllExcept(excluded) => id != excluded,
            Recipients::Only(target) => id == target,
        }
    }
}

/// Deliver `text` verbatim to `recipients`.
///
/// Returns the number of sessions the text was handed to.
pub fn deliver(registry: &SessionRegistry, recipients: Recipients, text: &str) -> usize {
    if let Recipients::Only(id) = recipients {
        return match registry.get(id) {
            Some(session) => {
                session.send(text);
                1
            }
            None => 0,
        };
    }

    let mut delivered = 0;
    for session in registry.all().filter(|s| recipients.includes(s.id())) {
        session.send(text);
        delivered += 1;
    }
    delivered
}

/// Broadcast `message` to every session, sender included.
pub fn broadcast(registry: &SessionRegistry, message: &str) -> usize {
    deliver(
        registry,
        Recipients::All,
        &format!("{BROADCAST_PREFIX}{message}"),
    )
}

/// Broadcast `message` to every session except `sender`.
pub fn broadcast_except(registry: &SessionRegistry, sender: SessionId, message: &str) -> usize {
    deliver(
        registry,
        Recipients::AllExcept(sender),
        &format!("{BROADCAST_PREFIX}{message}"),
    )
}

/// Send `text` to a single session. Returns false if it is not open.
pub fn send_to(registry: &SessionRegistry, id: SessionId, text: &str) -> bool {
    deliver(registry, Recipients::Only(id), text) == 1
}
