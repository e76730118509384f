// Configuration Types
// Settings consumed by the tool adapter and process runner

use std::collections::BTreeMap;
use std::time::Duration;

use codex_bridge_exec::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profile::ConfigProfile;

/// Executable used when nothing else is configured.
pub const DEFAULT_CODEX_PATH: &str = "codex";

/// Resolved bridge configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
  /// Path or name of the codex executable
  pub codex_path: String,
  /// Wall-clock limit per invocation
  pub timeout_ms: u64,
  /// Combined stdout + stderr cap per invocation
  pub max_output_bytes: u64,
  /// Selected entry of `profiles`
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile: Option<String>,
  /// Extra environment for the child process
  pub env: BTreeMap<String, String>,
  /// Named setting bundles
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub profiles: BTreeMap<String, ConfigProfile>,
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      codex_path: DEFAULT_CODEX_PATH.to_string(),
      timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
      max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES as u64,
      profile: None,
      env: BTreeMap::new(),
      profiles: BTreeMap::new(),
    }
  }
}

impl BridgeConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  pub fn max_output_bytes(&self) -> usize {
    usize::try_from(self.max_output_bytes).unwrap_or(usize::MAX)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.codex_path.trim().is_empty() {
      return Err(ConfigError::InvalidValue {
        key: "codex_path".to_string(),
        reason: "must not be empty".to_string(),
      });
    }
    if self.timeout_ms == 0 {
      return Err(ConfigError::InvalidValue {
        key: "timeout_ms".to_string(),
        reason: "must be greater than zero".to_string(),
      });
    }
    if self.max_output_bytes == 0 {
      return Err(ConfigError::InvalidValue {
        key: "max_output_bytes".to_string(),
        reason: "must be greater than zero".to_string(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn defaults_match_runner_limits() {
    let config = BridgeConfig::default();

    assert_eq!(config.codex_path, "codex");
    assert_eq!(config.timeout(), Duration::from_secs(15 * 60));
    assert_eq!(config.max_output_bytes(), 10 * 1024 * 1024);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn missing_keys_fall_back_to_defaults() {
    let config: BridgeConfig = toml::from_str("timeout_ms = 5000").unwrap();

    assert_eq!(config.timeout_ms, 5000);
    assert_eq!(config.codex_path, DEFAULT_CODEX_PATH);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let err = toml::from_str::<BridgeConfig>("codex = \"x\"").unwrap_err();

    assert!(err.to_string().contains("unknown field"));
  }

  #[test]
  fn zero_limits_fail_validation() {
    let config = BridgeConfig {
      timeout_ms: 0,
      ..Default::default()
    };

    assert!(matches!(
      config.validate(),
      Err(ConfigError::InvalidValue { key, .. }) if key == "timeout_ms"
    ));
  }
}
