//! Realtime runtime for the chat relay.
//!
//! The hub task owns the session registry and runs the message router; the
//! transport and upload layers only talk to it through `HubHandle`.

pub mod core;
pub mod types;

pub use self::core::{AttachmentPost, Connection, Echo, HubEvent, HubHandle, Relay, SessionRegistry};
pub use types::PreparedMsg;
