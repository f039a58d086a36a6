//! Server -> client frames.

use serde::{Deserialize, Serialize};

use crate::envelope::{ConnectionId, MessageEnvelope};
use crate::error::{RelayError, Result};

/// One row of the `user list` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: ConnectionId,
    pub name: String,
}

/// Body of an `error` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub code: String,
    pub message: String,
}

/// Outbound event frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// The receiving connection's own identifier, sent once on connect.
    #[serde(rename = "your id")]
    YourId(ConnectionId),
    /// Full registry snapshot.
    #[serde(rename = "user list")]
    UserList(Vec<UserEntry>),
    /// Free-text presence notice.
    #[serde(rename = "user notification")]
    UserNotification(String),
    #[serde(rename = "chat message")]
    ChatMessage(MessageEnvelope),
    #[serde(rename = "error")]
    Error(ErrorData),
}

impl ServerEvent {
    pub fn joined(name: &str) -> Self {
        ServerEvent::UserNotification(format!("{name} joined the chat"))
    }

    pub fn left(name: &str) -> Self {
        ServerEvent::UserNotification(format!("{name} left the chat"))
    }

    pub fn error(err: &RelayError) -> Self {
        ServerEvent::Error(ErrorData {
            code: err.client_code().as_str().to_string(),
            message: err.to_string(),
        })
    }

    /// Serialize to the JSON text frame.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
    }
}
