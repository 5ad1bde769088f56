//! The two-pass hierarchy builder.
//!
//! Pass 1 indexes every record id into an arena slot. Pass 2 walks the
//! records again, in input order, and links each slot under its parent slot
//! (or onto the root list when the parent id is the root sentinel). A parent
//! id that no record carries gets a payload-less placeholder slot, so every
//! sibling of a missing parent lands in the same place; placeholders are
//! never roots, which leaves those subtrees unreachable.
//!
//! Nothing is materialized until `Hierarchy::into_forest` walks the arena
//! from the roots.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, instrument, warn};

use crate::domain::{Node, Record};

const TARGET: &str = "hierarchy";

/// Color states for the reachability walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
  /// Not visited yet.
  White,
  /// On the current path.
  Gray,
  /// Fully visited.
  Black,
}

/// Materialization stopped at the depth limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TooDeep;

/// One arena entry. `record` is the position of the last input record that
/// carried this id, or `None` for a placeholder.
#[derive(Debug)]
struct Slot<K> {
  key: K,
  record: Option<usize>,
  children: Vec<usize>,
}

/// Result of linking: arena slots, the key index, and root links.
#[derive(Debug)]
pub(crate) struct Links<K> {
  slots: Vec<Slot<K>>,
  by_key: HashMap<K, usize>,
  roots: Vec<usize>,
  placeholders: Vec<usize>,
  duplicates: usize,
}

impl<K: Eq + Hash + Clone> Links<K> {
  /// Run both passes over `keys`, a list of `(id, parent_id)` in input order.
  pub(crate) fn link(keys: &[(K, K)], root: &K) -> Self {
    let mut links = Links {
      slots: Vec::with_capacity(keys.len()),
      by_key: HashMap::with_capacity(keys.len()),
      roots: Vec::new(),
      placeholders: Vec::new(),
      duplicates: 0,
    };

    // Pass 1: index. Last write wins for duplicate ids.
    for (pos, (id, _)) in keys.iter().enumerate() {
      match links.by_key.get(id) {
        Some(&slot) => {
          links.slots[slot].record = Some(pos);
          links.duplicates += 1;
        }
        None => {
          let slot = links.slots.len();
          links.slots.push(Slot { key: id.clone(), record: Some(pos), children: Vec::new() });
          links.by_key.insert(id.clone(), slot);
        }
      }
    }

    // Pass 2: link, in input order.
    for (id, pid) in keys {
      let Some(&me) = links.by_key.get(id) else { continue };
      if pid == root {
        links.roots.push(me);
        continue;
      }
      let parent = match links.by_key.get(pid) {
        Some(&slot) => slot,
        None => {
          let slot = links.slots.len();
          links.slots.push(Slot { key: pid.clone(), record: None, children: Vec::new() });
          links.by_key.insert(pid.clone(), slot);
          links.placeholders.push(slot);
          slot
        }
      };
      links.slots[parent].children.push(me);
    }

    links
  }

  pub(crate) fn root_count(&self) -> usize { self.roots.len() }

  pub(crate) fn node_count(&self) -> usize { self.slots.len() - self.placeholders.len() }

  pub(crate) fn duplicate_count(&self) -> usize { self.duplicates }

  pub(crate) fn placeholder_keys(&self) -> Vec<&K> {
    self.placeholders.iter().map(|&s| &self.slots[s].key).collect()
  }

  /// Distinct record slots reachable from the roots.
  pub(crate) fn reachable_count(&self) -> usize {
    self.walk().0
  }

  /// Links from a reachable slot back to one of its ancestors. Each one is
  /// cut when the forest is materialized.
  pub(crate) fn cyclic_link_count(&self) -> usize {
    self.walk().1
  }

  /// Depth-first walk from the roots with white/gray/black coloring.
  /// Returns (reachable slots, back links).
  fn walk(&self) -> (usize, usize) {
    let mut colors = vec![Color::White; self.slots.len()];
    let mut reachable = 0;
    let mut back_links = 0;

    for &root in &self.roots {
      if colors[root] != Color::White {
        continue;
      }
      colors[root] = Color::Gray;
      reachable += 1;
      let mut stack = vec![(root, 0usize)];

      while let Some(top) = stack.last_mut() {
        let slot = top.0;
        let children = &self.slots[slot].children;
        if top.1 < children.len() {
          let child = children[top.1];
          top.1 += 1;
          match colors[child] {
            Color::Gray => back_links += 1,
            Color::White => {
              colors[child] = Color::Gray;
              reachable += 1;
              stack.push((child, 0));
            }
            Color::Black => {}
          }
        } else {
          colors[slot] = Color::Black;
          stack.pop();
        }
      }
    }

    (reachable, back_links)
  }

  /// Build owned nodes from the roots. `make` receives the input position of
  /// a record and its already-built children.
  ///
  /// A slot linked under several parents (duplicate ids) is built once per
  /// position, so ids duplicated level after level multiply the output. A
  /// slot already on the current path is skipped, which is what keeps
  /// self-references from duplicate ids finite.
  pub(crate) fn materialize<N>(&self, make: impl FnMut(usize, Vec<N>) -> N) -> Vec<N> {
    // No forest can hold usize::MAX levels.
    self.materialize_within(usize::MAX, make).unwrap_or_default()
  }

  /// Like `materialize`, but gives up with `TooDeep` as soon as a node would
  /// sit below `max_depth` levels (roots are level 1).
  pub(crate) fn materialize_within<N>(
    &self,
    max_depth: usize,
    mut make: impl FnMut(usize, Vec<N>) -> N,
  ) -> Result<Vec<N>, TooDeep> {
    struct Frame<N> {
      slot: usize,
      record: usize,
      next: usize,
      built: Vec<N>,
    }

    let mut on_path = vec![false; self.slots.len()];
    let mut forest = Vec::with_capacity(self.roots.len());

    for &root in &self.roots {
      let Some(record) = self.slots[root].record else { continue };
      if max_depth == 0 {
        return Err(TooDeep);
      }
      on_path[root] = true;
      let mut frames = vec![Frame { slot: root, record, next: 0, built: Vec::new() }];

      while let Some(frame) = frames.last_mut() {
        let children = &self.slots[frame.slot].children;
        if frame.next < children.len() {
          let child = children[frame.next];
          frame.next += 1;
          if on_path[child] {
            warn!(target: TARGET, slot = child, "Skipping node already on its own ancestor path (duplicate id)");
            continue;
          }
          let Some(record) = self.slots[child].record else { continue };
          if frames.len() >= max_depth {
            return Err(TooDeep);
          }
          on_path[child] = true;
          frames.push(Frame { slot: child, record, next: 0, built: Vec::new() });
          continue;
        }

        let Some(done) = frames.pop() else { break };
        on_path[done.slot] = false;
        let node = make(done.record, done.built);
        match frames.last_mut() {
          Some(parent) => parent.built.push(node),
          None => forest.push(node),
        }
      }
    }

    Ok(forest)
  }
}

/// Configures the root sentinel and builds hierarchies from records.
#[derive(Clone, Debug)]
pub struct HierarchyBuilder<K> {
  root: K,
}

impl<K: Default> Default for HierarchyBuilder<K> {
  fn default() -> Self {
    Self { root: K::default() }
  }
}

impl<K: Eq + Hash + Clone + std::fmt::Debug> HierarchyBuilder<K> {
  /// Builder whose root sentinel is `K::default()` (`0` for integers).
  pub fn new() -> Self
  where
    K: Default,
  {
    Self::default()
  }

  pub fn with_root(root: K) -> Self {
    Self { root }
  }

  pub fn root(&self) -> &K { &self.root }

  /// Index and link `items`. The input is only borrowed; records are cloned
  /// when the forest is materialized.
  #[instrument(level = "debug", skip_all, fields(records = items.len()))]
  pub fn build<'a, R>(&self, items: &'a [R]) -> Hierarchy<'a, R>
  where
    R: Record<Key = K>,
  {
    let keys: Vec<(K, K)> = items.iter().map(|r| (r.id(), r.parent_id())).collect();
    let links = Links::link(&keys, &self.root);
    log_summary(&links, items.len());
    Hierarchy { items, links }
  }
}

pub(crate) fn log_summary<K: Eq + Hash + Clone>(links: &Links<K>, records: usize) {
  if links.duplicate_count() > 0 {
    warn!(target: TARGET, duplicates = links.duplicate_count(), "Duplicate record ids; last record wins");
  }
  debug!(
    target: TARGET,
    records,
    nodes = links.node_count(),
    roots = links.root_count(),
    placeholders = links.placeholders.len(),
    "Hierarchy linked"
  );
}

/// Linked hierarchy, borrowed from its input records.
#[derive(Debug)]
pub struct Hierarchy<'a, R: Record> {
  items: &'a [R],
  links: Links<R::Key>,
}

impl<'a, R: Record> Hierarchy<'a, R> {
  pub fn root_count(&self) -> usize { self.links.root_count() }

  /// Distinct record ids that were indexed.
  pub fn node_count(&self) -> usize { self.links.node_count() }

  /// Parent ids that no record carries, in the order they were first met.
  pub fn placeholder_keys(&self) -> Vec<&R::Key> { self.links.placeholder_keys() }

  pub fn reachable_count(&self) -> usize { self.links.reachable_count() }

  /// Links that would close a loop through an ancestor (only possible with
  /// duplicate ids). The forest leaves them out.
  pub fn cyclic_link_count(&self) -> usize { self.links.cyclic_link_count() }

  /// True when every indexed record hangs off some root and no link is cut
  /// while building the forest.
  pub fn is_complete(&self) -> bool {
    let (reachable, back_links) = self.links.walk();
    self.links.placeholders.is_empty() && reachable == self.node_count() && back_links == 0
  }

  pub fn to_forest(&self) -> Vec<Node<R>>
  where
    R: Clone,
  {
    self.links.materialize(|pos, children| Node { record: self.items[pos].clone(), children })
  }

  pub fn into_forest(self) -> Vec<Node<R>>
  where
    R: Clone,
  {
    self.to_forest()
  }
}

/// Build the forest of `items` with the default root sentinel.
pub fn array_to_tree<R>(items: &[R]) -> Vec<Node<R>>
where
  R: Record + Clone,
  R::Key: Default,
{
  HierarchyBuilder::<R::Key>::new().build(items).into_forest()
}
