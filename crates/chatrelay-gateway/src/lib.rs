//! chatrelay gateway library entry.
//!
//! This crate wires the WebSocket transport, the upload endpoint, and the
//! relay hub (session registry + message router) into one axum service. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod server;
pub mod transport;
pub mod upload;

pub use server::serve;
