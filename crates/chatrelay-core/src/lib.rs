//! chatrelay core: transport-agnostic wire contracts and the shared error type.
//!
//! This crate defines the connection identifier, the message envelope, and the
//! JSON event frames exchanged between clients and the gateway. It carries no
//! transport or runtime dependencies so the same contracts can be used by the
//! server, by test harnesses, and by client tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed client
//! input surfaces as `RelayError` instead of bringing the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod envelope;
pub mod error;
pub mod protocol;

pub use envelope::{now_millis, ConnectionId, MessageEnvelope, ANONYMOUS};
/// Shared result type.
pub use error::{Result, RelayError};
