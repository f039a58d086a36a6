//! Realtime core components.
//!
//! Session registry, message router, and the hub event loop that owns both.

mod hub;
pub mod message_router;
mod session_registry;

pub use hub::{spawn, AttachmentPost, HubEvent, HubHandle, Relay};
pub use message_router::Echo;
pub use session_registry::{Connection, SessionRegistry};
