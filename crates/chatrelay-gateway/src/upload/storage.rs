//! On-disk attachment store.
//!
//! Files land in a single directory as `<capture-ms>-<sanitized name>` and are
//! served read-only under [`UPLOAD_ROUTE`].

use std::path::{Path, PathBuf};

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::now_millis;

/// Public route prefix for stored files.
pub const UPLOAD_ROUTE: &str = "/uploads";

/// Replace every char outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn stored_name(captured_ms: u64, original: &str) -> String {
    format!("{captured_ms}-{}", sanitize_file_name(original))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    pub stored_name: String,
    /// Path under the public upload route, e.g. `/uploads/1700000000000-a.png`.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory at startup so the static route has something to serve.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| RelayError::Internal(format!("create upload dir failed: {e}")))
    }

    pub async fn store(&self, original_name: &str, data: &[u8]) -> Result<StoredAttachment> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RelayError::Internal(format!("create upload dir failed: {e}")))?;

        let stored_name = stored_name(now_millis(), original_name);
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| RelayError::Internal(format!("write {} failed: {e}", path.display())))?;

        tracing::info!(file = %stored_name, bytes = data.len(), "attachment stored");
        Ok(StoredAttachment {
            url: format!("{UPLOAD_ROUTE}/{stored_name}"),
            stored_name,
        })
    }
}
