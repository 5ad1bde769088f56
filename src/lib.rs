//! Hierarchy builder · flat records to forest
//!
//! - Typed surface: any `Record` (id + parent id) into `Vec<Node<R>>`
//! - Dynamic surface: JSON objects into JSON objects with a `children` array
//! - Two linear passes over the input; O(1) parent lookup by id
//!
//! Records whose parent id is the root sentinel (`0` for integer keys) become
//! roots, in input order. Children keep their input order. A parent id that no
//! record carries is held by an internal placeholder that is never a root, so
//! that subtree is left out of the result. None of these are errors.
//!
//! Duplicate ids: the last record wins, and every record carrying that id
//! links the same node. Nodes are owned values, so a node linked in several
//! places is cloned into each; ids duplicated at every level of a chain
//! therefore double the output per level. A link back into an ancestor is
//! cut (see `Hierarchy::cyclic_link_count`).
//!
//! Typed forests may be arbitrarily deep; `Node` drops iteratively. JSON
//! forests are capped at `TreeConfig::max_depth` levels because
//! `serde_json::Value` drops and serializes recursively.
//!
//! ```
//! use hierarchy_builder::{array_to_tree, FlatRecord};
//!
//! let items = vec![
//!     FlatRecord::new(1, 0, "a"),
//!     FlatRecord::new(2, 1, "b"),
//!     FlatRecord::new(3, 1, "c"),
//! ];
//! let forest = array_to_tree(&items);
//! assert_eq!(forest.len(), 1);
//! assert_eq!(forest[0].children.len(), 2);
//! ```
//!
//! Important env variables:
//!   TREE_CONFIG_PATH : path to TOML `TreeConfig` for JSON records
//!   LOG_LEVEL        : tracing filter used by `telemetry::init_tracing`
//!   LOG_FORMAT       : "pretty" (default) or "json"

pub mod builder;
pub mod config;
pub mod domain;
pub mod error;
pub mod telemetry;
pub mod value;

pub use builder::{array_to_tree, Hierarchy, HierarchyBuilder};
pub use config::{load_tree_config_from_env, TreeConfig};
pub use domain::{forest_len, FlatRecord, Node, Record};
pub use error::{Result, TreeError};
pub use value::{array_to_tree_value, ValueTreeBuilder};
