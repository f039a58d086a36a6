//! JSON event frames exchanged over the persistent channel.
//!
//! Every frame is `{"event": <name>, "data": <payload>}`:
//! - inbound: `set username`, `chat message` (bare string or structured object)
//! - outbound: `your id`, `user list`, `user notification`, `chat message`, `error`
//!
//! Decoding never panics; malformed frames surface as `RelayError::BadRequest`.

pub mod inbound;
pub mod outbound;

pub use inbound::{decode_client_event, ChatPayload, ClientEvent, StructuredMessage};
pub use outbound::{ErrorData, ServerEvent, UserEntry};
