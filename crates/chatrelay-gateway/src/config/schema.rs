use serde::Deserialize;
use chatrelay_core::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub uploads: UploadSection,

    /// Directory with the web client, served as the fallback route.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            uploads: UploadSection::default(),
            static_dir: None,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.uploads.validate()?;

        Ok(())
    }

    /// `host:port` string handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-connection outbound queue depth.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// Inbound event queue depth of the relay hub.
    #[serde(default = "default_hub_queue")]
    pub hub_queue: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
            hub_queue: default_hub_queue(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RelayError::BadRequest("server.host must not be empty".into()));
        }
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(RelayError::BadRequest(
                "server.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(RelayError::BadRequest(
                "server.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(RelayError::BadRequest(
                "server.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if self.outbound_queue == 0 || self.hub_queue == 0 {
            return Err(RelayError::BadRequest(
                "server.outbound_queue and server.hub_queue must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    1024
}
fn default_hub_queue() -> usize {
    4096
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadSection {
    #[serde(default = "default_upload_dir")]
    pub dir: String,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl UploadSection {
    pub fn validate(&self) -> Result<()> {
        if self.dir.trim().is_empty() {
            return Err(RelayError::BadRequest("uploads.dir must not be empty".into()));
        }
        if !(1..=MAX_FILE_BYTES_CEILING).contains(&self.max_file_bytes) {
            return Err(RelayError::BadRequest(
                "uploads.max_file_bytes must be between 1 and 1073741824".into(),
            ));
        }
        Ok(())
    }
}

const MAX_FILE_BYTES_CEILING: usize = 1024 * 1024 * 1024;

fn default_upload_dir() -> String {
    "uploads".into()
}
fn default_max_file_bytes() -> usize {
    20 * 1024 * 1024
}
