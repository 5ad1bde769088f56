//! Error type for the edges of the crate: dynamic record shape and config loading.
//!
//! Linkage anomalies (missing parents, duplicate ids, cycles) are not errors;
//! they degrade the shape of the forest instead.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TreeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TreeError {
  /// A dynamic record was not a JSON object.
  #[error("record #{index} is not a JSON object")]
  NotAnObject { index: usize },

  #[error("record #{index} has no '{field}' field")]
  MissingField { index: usize, field: String },

  /// Keys must be integers; `found` is the offending value rendered as JSON.
  #[error("record #{index} has a non-integer '{field}': {found}")]
  InvalidKey { index: usize, field: String, found: String },

  /// The JSON forest would be deeper than the configured `max_depth`.
  #[error("forest is deeper than the limit of {limit} levels")]
  TooDeep { limit: usize },

  #[error("invalid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("failed to read config {path}: {source}")]
  ConfigRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  ConfigParse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_record() {
    let e = TreeError::MissingField { index: 3, field: "pid".into() };
    assert_eq!(e.to_string(), "record #3 has no 'pid' field");

    let e = TreeError::InvalidKey { index: 0, field: "id".into(), found: "\"a\"".into() };
    assert_eq!(e.to_string(), "record #0 has a non-integer 'id': \"a\"");

    let e = TreeError::TooDeep { limit: 64 };
    assert_eq!(e.to_string(), "forest is deeper than the limit of 64 levels");
  }

  #[test]
  fn json_errors_convert() {
    let err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
    let e: TreeError = err.into();
    assert!(matches!(e, TreeError::Json(_)));
  }
}
