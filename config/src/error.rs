//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  /// A config file exists but could not be read
  #[error("failed to read config file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A config file is not valid TOML
  #[error("failed to parse config file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  /// The merged layers do not describe a valid configuration
  #[error("invalid configuration: {0}")]
  Invalid(#[from] toml::de::Error),

  /// A setting has an unusable value
  #[error("invalid value for `{key}`: {reason}")]
  InvalidValue { key: String, reason: String },

  /// An environment variable could not be interpreted
  #[error("environment variable {var} must be a positive integer, got `{value}`")]
  InvalidEnv { var: String, value: String },

  /// A CLI override was malformed
  #[error("invalid override `{0}`: expected KEY=VALUE")]
  InvalidOverride(String),

  /// The selected profile is not defined
  #[error("profile `{0}` is not defined under [profiles]")]
  UnknownProfile(String),
}
