// Codex Bridge CLI - Command Line Interface Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codex_bridge_config::{BridgeConfig, ConfigError, ConfigLoader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Codex Bridge - MCP server that runs the codex CLI
#[derive(Parser, Debug)]
#[command(name = "codex-bridge")]
#[command(version, about, long_about = None)]
struct TopCli {
  #[clap(flatten)]
  config_overrides: CliConfigOverrides,

  #[clap(subcommand)]
  command: Option<Commands>,

  /// Configuration file layered over ~/.codex-bridge/config.toml
  #[arg(long = "config", value_name = "PATH")]
  config_file: Option<PathBuf>,

  /// Named profile from [profiles]
  #[arg(short = 'p', long = "profile")]
  profile: Option<String>,

  /// Path to the codex executable
  #[arg(long = "codex-path", value_name = "PATH")]
  codex_path: Option<String>,

  /// Per-invocation timeout in milliseconds
  #[arg(long = "timeout-ms", value_name = "MS")]
  timeout_ms: Option<u64>,

  /// Combined stdout + stderr cap in bytes
  #[arg(long = "max-output-bytes", value_name = "BYTES")]
  max_output_bytes: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, clap::Args)]
struct CliConfigOverrides {
  /// Configuration override in key=value format
  #[arg(short = 'c', long = "set", value_name = "KEY=VALUE")]
  overrides: Vec<String>,
}

impl CliConfigOverrides {
  fn parse_overrides(&self) -> Result<Vec<(String, String)>, ConfigError> {
    self
      .overrides
      .iter()
      .map(|raw| {
        raw
          .split_once('=')
          .filter(|(key, _)| !key.trim().is_empty())
          .map(|(key, value)| (key.trim().to_string(), value.to_string()))
          .ok_or_else(|| ConfigError::InvalidOverride(raw.clone()))
      })
      .collect()
  }
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
  /// Serve the MCP tools on stdin/stdout (default)
  Serve,

  /// Print the resolved configuration
  Config,
}

impl TopCli {
  /// `-c` overrides followed by the dedicated flags, which take precedence.
  fn overrides(&self) -> Result<Vec<(String, String)>, ConfigError> {
    let mut overrides = self.config_overrides.parse_overrides()?;
    if let Some(profile) = &self.profile {
      overrides.push(("profile".to_string(), profile.clone()));
    }
    if let Some(path) = &self.codex_path {
      overrides.push(("codex_path".to_string(), path.clone()));
    }
    if let Some(timeout_ms) = self.timeout_ms {
      overrides.push(("timeout_ms".to_string(), timeout_ms.to_string()));
    }
    if let Some(max_output_bytes) = self.max_output_bytes {
      overrides.push(("max_output_bytes".to_string(), max_output_bytes.to_string()));
    }
    Ok(overrides)
  }

  fn load_config(&self) -> Result<BridgeConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &self.config_file {
      loader = loader.with_config_file(path.clone());
    }
    let config = loader
      .load_with_cli_overrides(&self.overrides()?)
      .context("failed to load configuration")?;
    Ok(config)
  }
}

/// Renders the resolved configuration in the same TOML shape it is read from.
fn render_config(config: &BridgeConfig) -> Result<String> {
  toml::to_string_pretty(config).context("failed to render configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
  // stdout carries the protocol, so logs go to stderr
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .with_ansi(false)
    .init();

  let cli = TopCli::parse();
  let config = cli.load_config()?;

  match cli.command.unwrap_or(Commands::Serve) {
    Commands::Serve => {
      info!(
        "codex bridge starting (codex: {}, timeout: {}ms)",
        config.codex_path, config.timeout_ms
      );
      codex_bridge_mcp_server::serve_stdio(config).await?;
    }
    Commands::Config => {
      print!("{}", render_config(&config)?);
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use codex_bridge_config::ConfigProfile;
  use pretty_assertions::assert_eq;

  fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
      .iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect()
  }

  #[test]
  fn no_subcommand_means_serve() {
    let cli = TopCli::try_parse_from(["codex-bridge"]).unwrap();

    assert!(cli.command.is_none());
    assert_eq!(cli.overrides().unwrap(), Vec::new());
  }

  #[test]
  fn dedicated_flags_follow_generic_overrides() {
    let cli = TopCli::try_parse_from([
      "codex-bridge",
      "-c",
      "timeout_ms=5",
      "--set",
      "env.RUST_LOG=debug",
      "--timeout-ms",
      "60000",
      "--codex-path",
      "/opt/codex",
      "config",
    ])
    .unwrap();

    assert!(matches!(cli.command, Some(Commands::Config)));
    assert_eq!(
      cli.overrides().unwrap(),
      pairs(&[
        ("timeout_ms", "5"),
        ("env.RUST_LOG", "debug"),
        ("codex_path", "/opt/codex"),
        ("timeout_ms", "60000"),
      ])
    );
  }

  #[test]
  fn override_values_may_contain_equals() {
    let cli = TopCli::try_parse_from(["codex-bridge", "-c", "env.OPTS=a=b"]).unwrap();

    assert_eq!(cli.overrides().unwrap(), pairs(&[("env.OPTS", "a=b")]));
  }

  #[test]
  fn override_without_key_is_rejected() {
    let cli = TopCli::try_parse_from(["codex-bridge", "-c", "=value"]).unwrap();

    assert!(matches!(
      cli.overrides(),
      Err(ConfigError::InvalidOverride(raw)) if raw == "=value"
    ));
  }

  #[test]
  fn default_config_renders_without_profiles() {
    let rendered = render_config(&BridgeConfig::default()).unwrap();

    assert!(rendered.contains("codex_path = \"codex\""), "{rendered}");
    assert!(rendered.contains("timeout_ms = 900000"), "{rendered}");
    assert!(!rendered.contains("profile"), "{rendered}");
    assert_eq!(
      toml::from_str::<BridgeConfig>(&rendered).unwrap(),
      BridgeConfig::default()
    );
  }

  #[test]
  fn rendered_config_reads_back_unchanged() {
    let config = BridgeConfig {
      codex_path: "/opt/codex".to_string(),
      timeout_ms: 60_000,
      profile: Some("ci".to_string()),
      env: [("RUST_LOG".to_string(), "warn".to_string())].into(),
      profiles: [(
        "ci".to_string(),
        ConfigProfile {
          max_output_bytes: Some(4096),
          env: [("CI".to_string(), "1".to_string())].into(),
          ..Default::default()
        },
      )]
      .into(),
      ..Default::default()
    };

    let rendered = render_config(&config).unwrap();

    assert_eq!(toml::from_str::<BridgeConfig>(&rendered).unwrap(), config);
  }

  #[test]
  fn override_without_equals_is_rejected() {
    let cli = TopCli::try_parse_from(["codex-bridge", "-c", "timeout_ms"]).unwrap();

    assert!(cli.overrides().is_err());
  }
}
