//! Shared application state for the chatrelay gateway.
//!
//! Holds the validated config, the relay hub handle, and the attachment
//! store. Construction spawns the hub, so it must run inside a tokio runtime.

use std::sync::Arc;

use chatrelay_core::error::Result;

use crate::config::GatewayConfig;
use crate::realtime::{self, HubHandle};
use crate::upload::AttachmentStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    hub: HubHandle,
    store: AttachmentStore,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let store = AttachmentStore::new(&cfg.uploads.dir);
        store.ensure_dir()?;

        let hub = realtime::core::spawn(cfg.server.hub_queue);

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, hub, store }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn hub(&self) -> &HubHandle {
        &self.inner.hub
    }

    pub fn store(&self) -> &AttachmentStore {
        &self.inner.store
    }
}
