//! Loading `TreeConfig` (field names and root sentinel for JSON records) from TOML.
//!
//! Every field is optional; missing ones fall back to the `{id, pid, children}`
//! shape with `0` as the root sentinel:
//!
//! ```toml
//! id_field = "key"
//! parent_field = "parent"
//! children_field = "items"
//! root_id = -1
//! max_depth = 32
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::{Result, TreeError};

pub const CONFIG_PATH_ENV: &str = "TREE_CONFIG_PATH";
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
  pub id_field: String,
  pub parent_field: String,
  /// Field written on every output node; overwrites an input field of the same name.
  pub children_field: String,
  pub root_id: i64,
  /// Deepest JSON forest `ValueTreeBuilder` will produce, roots being level 1.
  pub max_depth: usize,
}

impl Default for TreeConfig {
  fn default() -> Self {
    Self {
      id_field: "id".into(),
      parent_field: "pid".into(),
      children_field: "children".into(),
      root_id: 0,
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }
}

impl TreeConfig {
  pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
      .map_err(|source| TreeError::ConfigRead { path: path.to_path_buf(), source })?;
    Self::from_toml_str(&s).map_err(|source| TreeError::ConfigParse { path: path.to_path_buf(), source })
  }
}

/// Attempt to load `TreeConfig` from TREE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tree_config_from_env() -> Option<TreeConfig> {
  let path = std::env::var(CONFIG_PATH_ENV).ok()?;
  match TreeConfig::load(&path) {
    Ok(cfg) => {
      info!(target: "hierarchy", %path, "Loaded tree config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "hierarchy", %path, error = %e, "Failed to load tree config");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::io::Write;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg = TreeConfig::from_toml_str("parent_field = \"parent\"\nroot_id = -1\n").unwrap();
    assert_eq!(cfg.id_field, "id");
    assert_eq!(cfg.parent_field, "parent");
    assert_eq!(cfg.children_field, "children");
    assert_eq!(cfg.root_id, -1);
    assert_eq!(cfg.max_depth, DEFAULT_MAX_DEPTH);

    let cfg = TreeConfig::from_toml_str("max_depth = 8").unwrap();
    assert_eq!(cfg.max_depth, 8);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(TreeConfig::from_toml_str("idfield = \"key\"").is_err());
  }

  #[test]
  fn load_reports_path_on_errors() {
    let err = TreeConfig::load("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, TreeError::ConfigRead { .. }));

    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "root_id = \"zero\"").unwrap();
    let err = TreeConfig::load(f.path()).unwrap_err();
    match err {
      TreeError::ConfigParse { path, .. } => assert_eq!(path, f.path()),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  #[serial]
  fn env_loader() {
    std::env::remove_var(CONFIG_PATH_ENV);
    assert_eq!(load_tree_config_from_env(), None);

    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "children_field = \"items\"").unwrap();
    std::env::set_var(CONFIG_PATH_ENV, f.path());
    let cfg = load_tree_config_from_env().unwrap();
    assert_eq!(cfg.children_field, "items");

    std::env::set_var(CONFIG_PATH_ENV, "/definitely/not/here.toml");
    assert_eq!(load_tree_config_from_env(), None);
    std::env::remove_var(CONFIG_PATH_ENV);
  }
}
