//! Gateway config loader (strict parsing).
//!
//! The YAML file is optional: a missing file yields defaults. The `PORT`
//! environment variable, when set, overrides `server.port`.

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use chatrelay_core::error::{RelayError, Result};

pub use schema::{GatewayConfig, ServerSection, UploadSection};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CHATRELAY_CONFIG";
/// Config file used when `CHATRELAY_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "chatrelay.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to validated defaults.
pub fn load_or_default(path: &str) -> Result<GatewayConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let cfg = GatewayConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) => Err(RelayError::Internal(format!("read config failed: {e}"))),
    }
}

/// Apply a `PORT` override (value of the env var, if any).
pub fn apply_port_override(cfg: &mut GatewayConfig, port: Option<&str>) -> Result<()> {
    let Some(raw) = port else { return Ok(()) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }
    cfg.server.port = raw
        .parse()
        .map_err(|e| RelayError::BadRequest(format!("PORT must be a valid port number: {e}")))?;
    Ok(())
}

/// Resolve config the way the binary does: file from `CHATRELAY_CONFIG`
/// (or `chatrelay.yaml`), then the `PORT` override.
pub fn load_from_env() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut cfg = load_or_default(&path)?;
    let port = std::env::var("PORT").ok();
    apply_port_override(&mut cfg, port.as_deref())?;
    Ok(cfg)
}
