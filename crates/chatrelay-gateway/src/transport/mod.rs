//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the codec that turns each frame into a
//! typed client event before it reaches the relay hub.

pub mod codec;
pub mod ws;
