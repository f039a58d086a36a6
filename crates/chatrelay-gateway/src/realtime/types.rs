use axum::extract::ws::Message;

use chatrelay_core::error::Result;
use chatrelay_core::protocol::ServerEvent;

/// Server event serialized once for fan-out (serialize once, send N times).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMsg(String);

impl PreparedMsg {
    pub fn prepare(ev: &ServerEvent) -> Result<Self> {
        Ok(PreparedMsg(ev.to_json()?))
    }

    /// Convert to axum::ws::Message for transport.
    /// NOTE: axum's Text variant owns a String, so every target gets a clone.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.clone())
    }
}
