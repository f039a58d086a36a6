//! Decode-once codec for the transport layer.
//!
//! - Text frames => `ClientEvent` (chat payload already split into plain/structured)
//! - Binary frames => rejected, the relay speaks JSON text only
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use chatrelay_core::{
    error::{RelayError, Result},
    protocol::{decode_client_event, ClientEvent},
};

#[derive(Debug)]
pub enum Inbound {
    Event(ClientEvent),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Event(decode_client_event(&s)?)),
        Message::Binary(_) => Err(RelayError::BadRequest(
            "binary frames are not supported".into(),
        )),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
