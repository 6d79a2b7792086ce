//! Provisioning configuration.
//!
//! Built once at application start and handed to every component through the
//! runtime's context object. Resolution order: built-in defaults, then
//! environment variables, then explicit overrides applied by the caller
//! (CLI flags).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::paths::{PathError, data_root};

pub const NODE_BIN_ENV: &str = "STREAMHOST_NODE_BIN";
pub const SERVICE_DIR_ENV: &str = "STREAMHOST_SERVICE_DIR";
pub const INSTALL_TIMEOUT_ENV: &str = "STREAMHOST_INSTALL_TIMEOUT_SECS";

/// Errors raised while assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Everything the provisioning subsystem needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// User-data directory holding `streamingserver/`, the log and flag files.
    pub data_dir: PathBuf,
    /// JavaScript runtime used to run `server.js`.
    pub node_binary: String,
    /// Directory checked for a portable service executable before the system install.
    pub portable_service_dir: Option<PathBuf>,
    /// Where downloaded service installers are staged.
    pub temp_dir: PathBuf,
    pub install_timeout_secs: u64,
    pub install_poll_interval_secs: u64,
    pub server_js_url: String,
    pub service_release_api: String,
}

impl ProvisionConfig {
    /// Defaults rooted at an explicit data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            node_binary: "node".to_string(),
            portable_service_dir: None,
            temp_dir: env::temp_dir(),
            install_timeout_secs: constants::INSTALL_COMPLETION_TIMEOUT_SECS,
            install_poll_interval_secs: constants::SERVICE_CHECK_INTERVAL_SECS,
            server_js_url: constants::SERVER_JS_URL.to_string(),
            service_release_api: constants::SERVICE_RELEASES_API.to_string(),
        }
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::with_data_dir(data_root()?);

        if let Ok(node) = env::var(NODE_BIN_ENV)
            && !node.trim().is_empty()
        {
            config.node_binary = node.trim().to_string();
        }

        if let Ok(dir) = env::var(SERVICE_DIR_ENV)
            && !dir.trim().is_empty()
        {
            config.portable_service_dir = Some(PathBuf::from(dir.trim()));
        }

        if let Ok(raw) = env::var(INSTALL_TIMEOUT_ENV) {
            config.install_timeout_secs = parse_secs(INSTALL_TIMEOUT_ENV, &raw)?;
        }

        Ok(config)
    }

    pub const fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub const fn install_poll_interval(&self) -> Duration {
        Duration::from_secs(self.install_poll_interval_secs)
    }
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = ProvisionConfig::with_data_dir("/tmp/streamhost");
        assert_eq!(config.install_timeout(), Duration::from_secs(120));
        assert_eq!(config.install_poll_interval(), Duration::from_secs(5));
        assert_eq!(config.node_binary, "node");
        assert_eq!(config.server_js_url, constants::SERVER_JS_URL);
        assert!(config.portable_service_dir.is_none());
    }

    #[test]
    fn timeout_must_be_positive_integer() {
        assert_eq!(parse_secs(INSTALL_TIMEOUT_ENV, " 30 ").unwrap(), 30);
        assert!(matches!(
            parse_secs(INSTALL_TIMEOUT_ENV, "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(parse_secs(INSTALL_TIMEOUT_ENV, "soon").is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = ProvisionConfig::with_data_dir("/data");
        let json = serde_json::to_string(&config).unwrap();
        let back: ProvisionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
