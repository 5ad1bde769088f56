//! Forest building over open-ended JSON records.
//!
//! Each record is a JSON object with integer id/parent fields and any number
//! of other fields. Output nodes are shallow copies of their records with a
//! children array inserted. Linking is shared with the typed builder, so
//! missing parents, duplicate ids and cycles behave exactly the same.
//!
//! `serde_json::Value` drops and serializes recursively, so the output is
//! bounded by `TreeConfig::max_depth` levels (64 by default); a deeper forest
//! is a `TreeError::TooDeep` instead of a stack overflow later on. Keys may be
//! integers or integer-valued floats (`1.0` is the key `1`).

use serde_json::{Map, Value};
use tracing::instrument;

use crate::builder::{log_summary, Links, TooDeep};
use crate::config::TreeConfig;
use crate::error::{Result, TreeError};

#[derive(Clone, Debug, Default)]
pub struct ValueTreeBuilder {
  config: TreeConfig,
}

impl ValueTreeBuilder {
  pub fn new(config: TreeConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &TreeConfig { &self.config }

  /// Build the forest for `records`. Fails when a record is not an object,
  /// lacks an integer id/parent field, or the forest is deeper than
  /// `max_depth`.
  #[instrument(level = "debug", skip_all, fields(records = records.len()))]
  pub fn build(&self, records: &[Value]) -> Result<Vec<Value>> {
    let mut objects = Vec::with_capacity(records.len());
    let mut keys = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
      let obj = record.as_object().ok_or(TreeError::NotAnObject { index })?;
      let id = key_field(obj, &self.config.id_field, index)?;
      let pid = key_field(obj, &self.config.parent_field, index)?;
      objects.push(obj);
      keys.push((id, pid));
    }

    let links = Links::link(&keys, &self.config.root_id);
    log_summary(&links, records.len());

    let children_field = &self.config.children_field;
    let max_depth = self.config.max_depth;
    links
      .materialize_within(max_depth, |pos, children| {
        let mut node = objects[pos].clone();
        node.insert(children_field.clone(), Value::Array(children));
        Value::Object(node)
      })
      .map_err(|TooDeep| TreeError::TooDeep { limit: max_depth })
  }

  /// Parse a JSON array of records, build, and serialize the forest.
  pub fn build_json(&self, input: &str) -> Result<String> {
    let records: Vec<Value> = serde_json::from_str(input)?;
    let forest = self.build(&records)?;
    Ok(serde_json::to_string(&forest)?)
  }
}

fn key_field(obj: &Map<String, Value>, field: &str, index: usize) -> Result<i64> {
  let value = obj
    .get(field)
    .ok_or_else(|| TreeError::MissingField { index, field: field.to_string() })?;
  value.as_i64().or_else(|| integral_f64(value)).ok_or_else(|| TreeError::InvalidKey {
    index,
    field: field.to_string(),
    found: value.to_string(),
  })
}

// 2^63 is exactly representable; anything at or above it does not fit.
fn integral_f64(value: &Value) -> Option<i64> {
  let f = value.as_f64()?;
  (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Build the forest of `{id, pid, ...}` records with the default config.
pub fn array_to_tree_value(records: &[Value]) -> Result<Vec<Value>> {
  ValueTreeBuilder::default().build(records)
}
