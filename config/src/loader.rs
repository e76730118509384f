// Configuration Loader
// Layered configuration loading system

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::layered::{ConfigLayer, ConfigLayerSource, LayeredConfig};
use crate::types::BridgeConfig;

/// Overrides `codex_path`; an empty value is ignored.
pub const ENV_CODEX_PATH: &str = "CODEX_PATH";
/// Overrides `timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "CODEX_BRIDGE_TIMEOUT_MS";
/// Overrides `max_output_bytes`.
pub const ENV_MAX_OUTPUT_BYTES: &str = "CODEX_BRIDGE_MAX_OUTPUT_BYTES";

const CONFIG_DIR_NAME: &str = ".codex-bridge";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loader with layered support
pub struct ConfigLoader {
  /// Global config directory, `None` to skip the global layer
  global_dir: Option<PathBuf>,
  /// Explicit config file
  config_file: Option<PathBuf>,
  /// Snapshot of the environment variables this loader reads
  env_vars: HashMap<String, String>,
}

impl ConfigLoader {
  /// Create a loader reading `~/.codex-bridge/config.toml` and the process environment
  pub fn new() -> Self {
    let env_vars = [ENV_CODEX_PATH, ENV_TIMEOUT_MS, ENV_MAX_OUTPUT_BYTES]
      .into_iter()
      .filter_map(|var| std::env::var(var).ok().map(|value| (var.to_string(), value)))
      .collect();

    Self {
      global_dir: dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME)),
      config_file: None,
      env_vars,
    }
  }

  pub fn with_global_dir(mut self, dir: Option<PathBuf>) -> Self {
    self.global_dir = dir;
    self
  }

  pub fn with_config_file(mut self, path: PathBuf) -> Self {
    self.config_file = Some(path);
    self
  }

  /// Replace the environment snapshot
  pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    self.env_vars = vars
      .into_iter()
      .map(|(key, value)| (key.into(), value.into()))
      .collect();
    self
  }

  pub fn load(&self) -> Result<BridgeConfig, ConfigError> {
    self.load_with_cli_overrides(&[])
  }

  /// Load configuration with CLI overrides
  pub fn load_with_cli_overrides(
    &self,
    cli_overrides: &[(String, String)],
  ) -> Result<BridgeConfig, ConfigError> {
    // Layers in precedence order:
    // 1. Global config (~/.codex-bridge/config.toml)
    // 2. Explicit config file (--config)
    // 3. Selected profile
    // 4. Environment
    // 5. CLI overrides
    let mut layered = LayeredConfig::new();

    if let Some(global_dir) = &self.global_dir {
      let path = global_dir.join(CONFIG_FILE_NAME);
      if path.exists() {
        layered.add_layer(ConfigLayer::new(
          ConfigLayerSource::GlobalConfig,
          read_table(&path)?,
        ));
      }
    }

    if let Some(path) = &self.config_file {
      layered.add_layer(ConfigLayer::new(
        ConfigLayerSource::ConfigFile(path.clone()),
        read_table(path)?,
      ));
    }

    layered.add_layer(ConfigLayer::new(
      ConfigLayerSource::Environment,
      self.env_table()?,
    ));
    layered.add_layer(ConfigLayer::from_overrides(
      ConfigLayerSource::CliOverride,
      cli_overrides,
    )?);

    let mut merged = layered.merge();
    if let Some(name) = merged.get("profile").and_then(Value::as_str).map(str::to_string) {
      let profile = merged
        .get("profiles")
        .and_then(|profiles| profiles.get(&name))
        .and_then(Value::as_table)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?;
      layered.add_layer(ConfigLayer::new(ConfigLayerSource::Profile(name), profile));
      merged = layered.merge();
    }
    debug!("configuration layers: {:?}", layered.sources());

    let config: BridgeConfig = Value::Table(merged).try_into()?;
    config.validate()?;
    Ok(config)
  }

  fn env_table(&self) -> Result<Table, ConfigError> {
    let mut table = Table::new();

    if let Some(path) = self.env_vars.get(ENV_CODEX_PATH)
      && !path.is_empty()
    {
      table.insert("codex_path".to_string(), Value::String(path.clone()));
    }

    for (var, key) in [
      (ENV_TIMEOUT_MS, "timeout_ms"),
      (ENV_MAX_OUTPUT_BYTES, "max_output_bytes"),
    ] {
      if let Some(raw) = self.env_vars.get(var) {
        let value = raw
          .trim()
          .parse::<i64>()
          .ok()
          .filter(|value| *value > 0)
          .ok_or_else(|| ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw.clone(),
          })?;
        table.insert(key.to_string(), Value::Integer(value));
      }
    }

    Ok(table)
  }
}

impl Default for ConfigLoader {
  fn default() -> Self {
    Self::new()
  }
}

fn read_table(path: &Path) -> Result<Table, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  toml::from_str(&content).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}
