//! Client -> server frames.
//!
//! The chat payload is loosely typed on the wire (string or object); it is
//! decided here, at the transport boundary, as a tagged variant.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::envelope::ConnectionId;
use crate::error::{RelayError, Result};

/// Message type used for plain-text and untyped structured messages.
pub const TEXT_TYPE: &str = "text";

/// Inbound event frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Raw display name; normalized by the registry.
    #[serde(rename = "set username")]
    SetUsername(String),
    #[serde(rename = "chat message")]
    ChatMessage(ChatPayload),
}

/// `chat message` payload: a bare string or `{message, recipientId?, type?}`.
///
/// Object fields are taken as-is: a non-string `message` is carried as its
/// JSON text (`null` as `""`), and a non-string `recipientId` or `type` counts
/// as absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChatPayload {
    PlainText(String),
    Structured(StructuredMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredMessage {
    #[serde(default, deserialize_with = "message_text")]
    pub message: String,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub recipient_id: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "string_or_absent")]
    pub msg_type: Option<String>,
}

fn message_text<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn string_or_absent<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl StructuredMessage {
    /// Target of a private message; blank ids count as broadcast.
    pub fn recipient(&self) -> Option<ConnectionId> {
        ConnectionId::from_optional(self.recipient_id.as_deref())
    }

    /// Caller-supplied type tag, `text` when missing or blank.
    pub fn msg_type(&self) -> &str {
        match self.msg_type.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => TEXT_TYPE,
        }
    }
}

/// Decode one text frame.
pub fn decode_client_event(frame: &str) -> Result<ClientEvent> {
    serde_json::from_str(frame)
        .map_err(|e| RelayError::BadRequest(format!("invalid client frame: {e}")))
}
