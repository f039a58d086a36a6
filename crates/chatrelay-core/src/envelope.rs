//! Connection identifiers and the normalized chat message envelope.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Display name used until a connection registers one (and for blank names).
pub const ANONYMOUS: &str = "Anonymous";

/// Opaque per-connection address assigned by the transport layer.
///
/// Doubles as the registry key and the routing target for private delivery.
/// Serialized as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Client-supplied ids arrive as optional strings; blank means absent.
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Milliseconds since the Unix epoch (0 if the clock is before the epoch).
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Normalized chat message as delivered to clients.
///
/// Built once per inbound message (live channel or upload) and never mutated;
/// the timestamp is captured at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    username: String,
    message: String,
    #[serde(rename = "type")]
    msg_type: String,
    sender_id: Option<ConnectionId>,
    recipient_id: Option<ConnectionId>,
    timestamp: u64,
}

impl MessageEnvelope {
    pub fn new(
        username: impl Into<String>,
        message: impl Into<String>,
        msg_type: impl Into<String>,
        sender_id: Option<ConnectionId>,
        recipient_id: Option<ConnectionId>,
    ) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            msg_type: msg_type.into(),
            sender_id,
            recipient_id,
            timestamp: now_millis(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Literal text, or the URL path of a stored attachment.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Descriptive tag (`text`, `file`, `voice`, ...). Not validated.
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    pub fn sender_id(&self) -> Option<&ConnectionId> {
        self.sender_id.as_ref()
    }

    pub fn recipient_id(&self) -> Option<&ConnectionId> {
        self.recipient_id.as_ref()
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
