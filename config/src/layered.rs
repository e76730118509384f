// Layered Configuration
// Support for layered configuration with precedence

use std::path::PathBuf;

use toml::{Table, Value};

use crate::error::ConfigError;

/// Keys whose override values are kept verbatim as strings.
const STRING_KEYS: &[&str] = &["codex_path", "profile"];
/// Tables whose entries are child environment variables.
const STRING_TABLES: &[&str] = &["env"];

/// Configuration layer source, ordered from lowest to highest precedence
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigLayerSource {
  /// Global user config (~/.codex-bridge/config.toml)
  GlobalConfig,
  /// File passed explicitly on the command line
  ConfigFile(PathBuf),
  /// Selected `[profiles.<name>]` table
  Profile(String),
  /// Process environment
  Environment,
  /// CLI override
  CliOverride,
}

/// Configuration layer with source tracking
#[derive(Debug, Clone)]
pub struct ConfigLayer {
  /// Layer source
  pub source: ConfigLayerSource,
  /// Configuration values
  pub values: Table,
}

impl ConfigLayer {
  pub fn new(source: ConfigLayerSource, values: Table) -> Self {
    Self { source, values }
  }

  /// Builds a layer from `key=value` pairs. Dotted keys address nested tables.
  pub fn from_overrides(
    source: ConfigLayerSource,
    overrides: &[(String, String)],
  ) -> Result<Self, ConfigError> {
    let mut values = Table::new();
    for (key, raw) in overrides {
      let path: Vec<&str> = key.split('.').map(str::trim).collect();
      if path.iter().any(|segment| segment.is_empty()) {
        return Err(ConfigError::InvalidOverride(format!("{key}={raw}")));
      }
      if !insert_path(&mut values, &path, parse_scalar(&path, raw)) {
        return Err(ConfigError::InvalidOverride(format!("{key}={raw}")));
      }
    }
    Ok(Self { source, values })
  }
}

/// Layered configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
  /// Configuration layers, kept sorted by source precedence
  layers: Vec<ConfigLayer>,
}

impl LayeredConfig {
  /// Create a new layered configuration
  pub fn new() -> Self {
    Self { layers: Vec::new() }
  }

  /// Add a layer after every layer of equal or lower precedence
  pub fn add_layer(&mut self, layer: ConfigLayer) {
    let index = self
      .layers
      .partition_point(|existing| existing.source <= layer.source);
    self.layers.insert(index, layer);
  }

  pub fn sources(&self) -> Vec<&ConfigLayerSource> {
    self.layers.iter().map(|layer| &layer.source).collect()
  }

  /// Get merged configuration. Nested tables merge key by key; any other
  /// value from a higher layer replaces the lower one.
  pub fn merge(&self) -> Table {
    let mut merged = Table::new();
    for layer in &self.layers {
      merge_tables(&mut merged, &layer.values);
    }
    merged
  }
}

fn merge_tables(base: &mut Table, overlay: &Table) {
  for (key, value) in overlay {
    match (base.get_mut(key), value) {
      (Some(Value::Table(existing)), Value::Table(incoming)) => merge_tables(existing, incoming),
      _ => {
        base.insert(key.clone(), value.clone());
      }
    }
  }
}

/// Returns `false` when the path runs through a non-table value.
fn insert_path(table: &mut Table, path: &[&str], value: Value) -> bool {
  match path {
    [] => false,
    [last] => {
      table.insert((*last).to_string(), value);
      true
    }
    [head, rest @ ..] => {
      let entry = table
        .entry((*head).to_string())
        .or_insert(Value::Table(Table::new()));
      match entry {
        Value::Table(child) => insert_path(child, rest, value),
        _ => false,
      }
    }
  }
}

/// Types an override value by the key it targets. String-valued keys keep
/// the raw text so `env.DEBUG=1` stays `"1"`.
fn parse_scalar(path: &[&str], raw: &str) -> Value {
  let is_string_key = match path.split_last() {
    Some((last, parents)) => {
      STRING_KEYS.contains(last) || parents.iter().any(|parent| STRING_TABLES.contains(parent))
    }
    None => false,
  };
  if is_string_key {
    return Value::String(raw.to_string());
  }

  let trimmed = raw.trim();
  if let Ok(int) = trimmed.parse::<i64>() {
    return Value::Integer(int);
  }
  match trimmed {
    "true" => Value::Boolean(true),
    "false" => Value::Boolean(false),
    _ => Value::String(raw.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn table(src: &str) -> Table {
    toml::from_str(src).unwrap()
  }

  #[test]
  fn higher_precedence_wins_regardless_of_insertion_order() {
    let mut layered = LayeredConfig::new();
    layered.add_layer(ConfigLayer::new(
      ConfigLayerSource::CliOverride,
      table("timeout_ms = 3"),
    ));
    layered.add_layer(ConfigLayer::new(
      ConfigLayerSource::GlobalConfig,
      table("timeout_ms = 1\ncodex_path = \"/opt/codex\""),
    ));
    layered.add_layer(ConfigLayer::new(
      ConfigLayerSource::Environment,
      table("timeout_ms = 2"),
    ));

    let merged = layered.merge();

    assert_eq!(merged.get("timeout_ms"), Some(&Value::Integer(3)));
    assert_eq!(
      merged.get("codex_path"),
      Some(&Value::String("/opt/codex".to_string()))
    );
    assert_eq!(
      layered.sources(),
      vec![
        &ConfigLayerSource::GlobalConfig,
        &ConfigLayerSource::Environment,
        &ConfigLayerSource::CliOverride,
      ]
    );
  }

  #[test]
  fn nested_tables_merge_key_by_key() {
    let mut layered = LayeredConfig::new();
    layered.add_layer(ConfigLayer::new(
      ConfigLayerSource::GlobalConfig,
      table("[env]\nA = \"1\"\nB = \"1\""),
    ));
    layered.add_layer(ConfigLayer::new(
      ConfigLayerSource::CliOverride,
      table("[env]\nB = \"2\""),
    ));

    let merged = layered.merge();

    assert_eq!(merged, table("[env]\nA = \"1\"\nB = \"2\""));
  }

  #[test]
  fn overrides_parse_scalars_and_dotted_keys() {
    let overrides = vec![
      ("timeout_ms".to_string(), "1000".to_string()),
      ("env.RUST_LOG".to_string(), "debug".to_string()),
      ("flag".to_string(), "true".to_string()),
    ];

    let layer = ConfigLayer::from_overrides(ConfigLayerSource::CliOverride, &overrides).unwrap();

    assert_eq!(
      layer.values,
      table("timeout_ms = 1000\nflag = true\n[env]\nRUST_LOG = \"debug\"")
    );
  }

  #[test]
  fn string_keys_keep_numeric_and_boolean_text() {
    let overrides = vec![
      ("env.RETRIES".to_string(), "3".to_string()),
      ("env.DEBUG".to_string(), "true".to_string()),
      ("codex_path".to_string(), "1234".to_string()),
      ("profile".to_string(), "2024".to_string()),
      ("profiles.ci.env.SEED".to_string(), "42".to_string()),
      ("profiles.ci.timeout_ms".to_string(), "500".to_string()),
    ];

    let layer = ConfigLayer::from_overrides(ConfigLayerSource::CliOverride, &overrides).unwrap();

    assert_eq!(
      layer.values,
      table(
        r#"
codex_path = "1234"
profile = "2024"

[env]
RETRIES = "3"
DEBUG = "true"

[profiles.ci]
timeout_ms = 500

[profiles.ci.env]
SEED = "42"
"#
      )
    );
  }

  #[test]
  fn override_through_scalar_is_rejected() {
    let overrides = vec![
      ("codex_path".to_string(), "codex".to_string()),
      ("codex_path.inner".to_string(), "x".to_string()),
    ];

    let err = ConfigLayer::from_overrides(ConfigLayerSource::CliOverride, &overrides).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidOverride(_)));
  }

  #[test]
  fn empty_key_segment_is_rejected() {
    let overrides = vec![("env.".to_string(), "x".to_string())];

    assert!(ConfigLayer::from_overrides(ConfigLayerSource::CliOverride, &overrides).is_err());
  }
}
