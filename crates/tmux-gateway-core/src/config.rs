//! Configuration types for tmux-gateway.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Gateway configuration loaded from YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// RPC settings
    pub rpc: RpcSettings,
    /// Delegate resolution settings
    pub delegate: DelegateSettings,
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: GatewayConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        // Resolution issues at least one round trip of its own
        let resolve = self.delegate.resolve_timeout_ms;
        let request = self.rpc.request_timeout_ms;
        if resolve != 0 && request != 0 && resolve < request {
            return Err(crate::Error::Config(format!(
                "delegate.resolve_timeout_ms ({resolve}) must be 0 or >= rpc.request_timeout_ms ({request})"
            )));
        }

        Ok(())
    }
}

/// RPC settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    /// Deadline for a single round trip in milliseconds (0 = no deadline)
    pub request_timeout_ms: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
        }
    }
}

impl RpcSettings {
    /// Round-trip deadline, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

/// Delegate resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegateSettings {
    /// Deadline for the first delegate resolution in milliseconds (0 = no deadline)
    pub resolve_timeout_ms: u64,
}

impl DelegateSettings {
    /// Resolution deadline, if one is configured.
    pub fn resolve_timeout(&self) -> Option<Duration> {
        (self.resolve_timeout_ms > 0).then(|| Duration::from_millis(self.resolve_timeout_ms))
    }
}
