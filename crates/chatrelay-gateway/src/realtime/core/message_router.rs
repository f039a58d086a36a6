//! Message router: picks the delivery set for one envelope and fans it out.
//!
//! Routing rule:
//! - recipient present and currently connected -> private: recipient, then an
//!   echo back to the sender according to [`Echo`]
//! - otherwise -> broadcast to every connection, sender included
//!
//! Delivery is best effort. A target that disappears between the existence
//! check and the send is skipped silently (see [`Connection::deliver`]).
//!
//! [`Connection::deliver`]: super::Connection::deliver

use chatrelay_core::error::Result;
use chatrelay_core::protocol::ServerEvent;
use chatrelay_core::{ConnectionId, MessageEnvelope};

use crate::realtime::core::SessionRegistry;
use crate::realtime::types::PreparedMsg;

/// Sender echo rule for private delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Live channel: echo whenever a sender id is present, even when the
    /// sender addressed itself (it then sees the message twice).
    Always,
    /// Upload path: echo only when the sender differs from the recipient.
    UnlessRecipient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPlan {
    Private {
        recipient: ConnectionId,
        echo_to: Option<ConnectionId>,
    },
    Broadcast,
}

/// Decide how `env` is delivered against the current registry.
pub fn plan(registry: &SessionRegistry, env: &MessageEnvelope, echo: Echo) -> DeliveryPlan {
    let Some(recipient) = env.recipient_id().filter(|r| registry.contains(r)) else {
        return DeliveryPlan::Broadcast;
    };

    let echo_to = match (echo, env.sender_id()) {
        (_, None) => None,
        (Echo::Always, Some(sender)) => Some(sender.clone()),
        (Echo::UnlessRecipient, Some(sender)) if sender != recipient => Some(sender.clone()),
        (Echo::UnlessRecipient, Some(_)) => None,
    };

    DeliveryPlan::Private {
        recipient: recipient.clone(),
        echo_to,
    }
}

/// Route one chat envelope. Returns the number of queued deliveries.
pub fn route(registry: &SessionRegistry, env: MessageEnvelope, echo: Echo) -> Result<usize> {
    let plan = plan(registry, &env, echo);
    let prepared = PreparedMsg::prepare(&ServerEvent::ChatMessage(env))?;

    let delivered = match plan {
        DeliveryPlan::Private { recipient, echo_to } => {
            let mut n = usize::from(deliver_prepared(registry, &recipient, &prepared));
            if let Some(sender) = echo_to {
                n += usize::from(deliver_prepared(registry, &sender, &prepared));
            }
            n
        }
        DeliveryPlan::Broadcast => fan_out(registry, None, &prepared),
    };
    Ok(delivered)
}

/// Deliver `ev` to every connection.
pub fn broadcast(registry: &SessionRegistry, ev: &ServerEvent) -> Result<usize> {
    let prepared = PreparedMsg::prepare(ev)?;
    Ok(fan_out(registry, None, &prepared))
}

/// Deliver `ev` to every connection except `skip`.
pub fn broadcast_except(
    registry: &SessionRegistry,
    skip: &ConnectionId,
    ev: &ServerEvent,
) -> Result<usize> {
    let prepared = PreparedMsg::prepare(ev)?;
    Ok(fan_out(registry, Some(skip), &prepared))
}

/// Deliver `ev` to a single connection.
pub fn send_to(registry: &SessionRegistry, id: &ConnectionId, ev: &ServerEvent) -> Result<bool> {
    let prepared = PreparedMsg::prepare(ev)?;
    Ok(deliver_prepared(registry, id, &prepared))
}

fn deliver_prepared(registry: &SessionRegistry, id: &ConnectionId, msg: &PreparedMsg) -> bool {
    registry
        .connection(id)
        .map(|conn| conn.deliver(msg))
        .unwrap_or(false)
}

fn fan_out(registry: &SessionRegistry, skip: Option<&ConnectionId>, msg: &PreparedMsg) -> usize {
    registry
        .connections()
        .filter(|(id, _)| Some(*id) != skip)
        .filter(|(_, conn)| conn.deliver(msg))
        .count()
}
