use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use chatrelay_core::protocol::UserEntry;
use chatrelay_core::{ConnectionId, ANONYMOUS};

use crate::realtime::types::PreparedMsg;

/// One connection's outbound queue sender.
#[derive(Debug, Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Fire-and-forget delivery. A closed or full queue drops the frame and
    /// returns `false`; the caller never treats that as an error.
    pub fn deliver(&self, msg: &PreparedMsg) -> bool {
        match self.tx.try_send(msg.to_ws_message()) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "delivery dropped");
                false
            }
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    name: String,
    conn: Connection,
    created_seq: u64,
}

/// Session registry: `connection id -> (display name, outbound queue)`.
///
/// Owned by the hub task; never shared, so no interior locking.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, SessionEntry>,
    seq: u64,
}

/// Trim a requested name; blank names become `Anonymous`.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.to_string()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh entry named `Anonymous`. An existing entry with the same
    /// id is overwritten; the transport guarantees ids are unique.
    pub fn register(&mut self, id: ConnectionId, conn: Connection) -> String {
        self.seq += 1;
        let entry = SessionEntry {
            name: ANONYMOUS.to_string(),
            conn,
            created_seq: self.seq,
        };
        self.sessions.insert(id, entry);
        ANONYMOUS.to_string()
    }

    /// Last write wins. Unknown ids are left untouched but still get the
    /// normalized name back.
    pub fn set_name(&mut self, id: &ConnectionId, raw: &str) -> String {
        let name = normalize_name(raw);
        if let Some(entry) = self.sessions.get_mut(id) {
            entry.name = name.clone();
        }
        name
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<String> {
        self.sessions.remove(id).map(|entry| entry.name)
    }

    /// Current users in registration order.
    pub fn snapshot(&self) -> Vec<UserEntry> {
        let mut rows: Vec<(&ConnectionId, &SessionEntry)> = self.sessions.iter().collect();
        rows.sort_by_key(|(_, e)| e.created_seq);
        rows.into_iter()
            .map(|(id, e)| UserEntry {
                id: id.clone(),
                name: e.name.clone(),
            })
            .collect()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn display_name(&self, id: &ConnectionId) -> Option<&str> {
        self.sessions.get(id).map(|e| e.name.as_str())
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.sessions.get(id).map(|e| &e.conn)
    }

    pub fn connections(&self) -> impl Iterator<Item = (&ConnectionId, &Connection)> {
        self.sessions.iter().map(|(id, e)| (id, &e.conn))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
