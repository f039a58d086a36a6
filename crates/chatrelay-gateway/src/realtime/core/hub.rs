//! Relay hub: the single task that owns the session registry.
//!
//! Every connect, name change, message, upload and disconnect is funnelled
//! through one `mpsc` queue and handled to completion (registry mutation plus
//! all resulting deliveries) before the next event is taken. Events from one
//! connection therefore keep their arrival order, and the registry needs no
//! locks.

use tokio::sync::mpsc;

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::protocol::{inbound::TEXT_TYPE, ChatPayload, ServerEvent};
use chatrelay_core::{ConnectionId, MessageEnvelope, ANONYMOUS};

use crate::realtime::core::message_router::{self, Echo};
use crate::realtime::core::{Connection, SessionRegistry};

/// A stored attachment ready to be announced as a chat message.
#[derive(Debug, Clone)]
pub struct AttachmentPost {
    pub sender_id: Option<ConnectionId>,
    pub recipient_id: Option<ConnectionId>,
    /// Explicit display name; wins over the sender's registry name.
    pub username: Option<String>,
    pub msg_type: String,
    pub file_url: String,
}

/// Inbound work for the hub.
#[derive(Debug)]
pub enum HubEvent {
    Connect { id: ConnectionId, conn: Connection },
    SetName { id: ConnectionId, name: String },
    Chat { id: ConnectionId, payload: ChatPayload },
    Attachment(AttachmentPost),
    Disconnect { id: ConnectionId },
}

/// Registry plus routing; the state the hub task owns.
#[derive(Debug, Default)]
pub struct Relay {
    registry: SessionRegistry,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Handle one event to completion. Failures are logged, never propagated:
    /// one bad event must not stop the loop.
    pub fn handle(&mut self, ev: HubEvent) {
        let res = match ev {
            HubEvent::Connect { id, conn } => self.on_connect(id, conn),
            HubEvent::SetName { id, name } => self.on_set_name(&id, &name),
            HubEvent::Chat { id, payload } => self.on_chat(id, payload),
            HubEvent::Attachment(post) => self.on_attachment(post),
            HubEvent::Disconnect { id } => self.on_disconnect(&id),
        };
        if let Err(e) = res {
            tracing::warn!(error = %e, "relay event failed");
        }
    }

    fn on_connect(&mut self, id: ConnectionId, conn: Connection) -> Result<()> {
        self.registry.register(id.clone(), conn);
        tracing::info!(conn_id = %id, users = self.registry.len(), "connection registered");
        message_router::send_to(&self.registry, &id, &ServerEvent::YourId(id.clone()))?;
        Ok(())
    }

    fn on_set_name(&mut self, id: &ConnectionId, raw: &str) -> Result<()> {
        let name = self.registry.set_name(id, raw);
        tracing::info!(conn_id = %id, name = %name, "display name set");

        message_router::broadcast(&self.registry, &ServerEvent::UserList(self.registry.snapshot()))?;
        message_router::broadcast_except(&self.registry, id, &ServerEvent::joined(&name))?;
        Ok(())
    }

    fn on_chat(&mut self, id: ConnectionId, payload: ChatPayload) -> Result<()> {
        let username = self.registry.display_name(&id).unwrap_or(ANONYMOUS).to_string();

        let delivered = match payload {
            // Bare strings never carry a recipient: straight to broadcast.
            ChatPayload::PlainText(text) => {
                let env = MessageEnvelope::new(username, text, TEXT_TYPE, Some(id.clone()), None);
                message_router::broadcast(&self.registry, &ServerEvent::ChatMessage(env))?
            }
            ChatPayload::Structured(msg) => {
                let env = MessageEnvelope::new(
                    username,
                    msg.message.clone(),
                    msg.msg_type(),
                    Some(id.clone()),
                    msg.recipient(),
                );
                message_router::route(&self.registry, env, Echo::Always)?
            }
        };
        tracing::debug!(conn_id = %id, delivered, "chat message routed");
        Ok(())
    }

    fn on_attachment(&mut self, post: AttachmentPost) -> Result<()> {
        let username = post
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| {
                post.sender_id
                    .as_ref()
                    .and_then(|s| self.registry.display_name(s))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let env = MessageEnvelope::new(
            username,
            post.file_url,
            post.msg_type,
            post.sender_id,
            post.recipient_id,
        );
        let delivered = message_router::route(&self.registry, env, Echo::UnlessRecipient)?;
        tracing::debug!(delivered, "attachment routed");
        Ok(())
    }

    fn on_disconnect(&mut self, id: &ConnectionId) -> Result<()> {
        let Some(name) = self.registry.remove(id) else {
            return Ok(());
        };
        tracing::info!(conn_id = %id, name = %name, users = self.registry.len(), "connection removed");

        message_router::broadcast(&self.registry, &ServerEvent::UserList(self.registry.snapshot()))?;
        message_router::broadcast(&self.registry, &ServerEvent::left(&name))?;
        Ok(())
    }
}

/// Cloneable sender side of the hub queue.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubEvent>,
}

impl HubHandle {
    /// Queue an event; fails only when the hub task is gone.
    pub async fn send(&self, ev: HubEvent) -> Result<()> {
        self.tx
            .send(ev)
            .await
            .map_err(|_| RelayError::Internal("relay hub closed".into()))
    }
}

/// Start the hub on the current tokio runtime.
pub fn spawn(capacity: usize) -> HubHandle {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(run(Relay::new(), rx));
    HubHandle { tx }
}

/// Event loop; ends once every `HubHandle` has been dropped.
async fn run(mut relay: Relay, mut rx: mpsc::Receiver<HubEvent>) {
    while let Some(ev) = rx.recv().await {
        relay.handle(ev);
    }
    tracing::info!("relay hub stopped");
}
