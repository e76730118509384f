// Configuration Profile
// Named overrides selected with `profile = "<name>"`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings a profile may override; unset fields keep the layered value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigProfile {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub codex_path: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_output_bytes: Option<u64>,
  /// Merged key by key into the top-level `env` table
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,
}
