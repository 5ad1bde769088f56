//! Domain models: the `Record` trait, the ready-made `FlatRecord`, and `Node`.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Anything that can be placed into a forest: it names itself and its parent.
pub trait Record {
  type Key: Eq + Hash + Clone + Debug;

  fn id(&self) -> Self::Key;
  fn parent_id(&self) -> Self::Key;
}

/// The `{id, pid, ...payload}` record shape with integer keys.
/// `pid == 0` marks a root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord<P> {
  pub id: i64,
  pub pid: i64,
  #[serde(flatten)]
  pub payload: P,
}

impl<P> FlatRecord<P> {
  pub fn new(id: i64, pid: i64, payload: P) -> Self {
    Self { id, pid, payload }
  }
}

impl<P> Record for FlatRecord<P> {
  type Key = i64;

  fn id(&self) -> i64 { self.id }
  fn parent_id(&self) -> i64 { self.pid }
}

/// A record plus its ordered children. Serializes as the record's own
/// fields with a `children` array appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "R: Serialize", deserialize = "R: Deserialize<'de>"))]
pub struct Node<R> {
  #[serde(flatten)]
  pub record: R,
  #[serde(default)]
  pub children: Vec<Node<R>>,
}

impl<R> Node<R> {
  pub fn new(record: R) -> Self {
    Self { record, children: Vec::new() }
  }

  pub fn is_leaf(&self) -> bool { self.children.is_empty() }

  /// Number of nodes in this subtree, this node included.
  pub fn subtree_len(&self) -> usize {
    self.iter().count()
  }

  /// Height of the subtree: 1 for a leaf.
  pub fn depth(&self) -> usize {
    let mut max = 0;
    let mut stack = vec![(self, 1usize)];
    while let Some((node, level)) = stack.pop() {
      max = max.max(level);
      stack.extend(node.children.iter().map(|c| (c, level + 1)));
    }
    max
  }

  /// Pre-order traversal, children visited in their stored order.
  pub fn iter(&self) -> Iter<'_, R> {
    Iter { stack: vec![self] }
  }
}

// Drains descendants onto a local stack so deep chains do not recurse.
impl<R> Drop for Node<R> {
  fn drop(&mut self) {
    let mut stack = std::mem::take(&mut self.children);
    while let Some(mut node) = stack.pop() {
      stack.append(&mut node.children);
    }
  }
}

/// Pre-order iterator over a subtree.
pub struct Iter<'a, R> {
  stack: Vec<&'a Node<R>>,
}

impl<'a, R> Iterator for Iter<'a, R> {
  type Item = &'a Node<R>;

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.stack.pop()?;
    self.stack.extend(node.children.iter().rev());
    Some(node)
  }
}

/// Total number of nodes reachable from the given roots.
pub fn forest_len<R>(forest: &[Node<R>]) -> usize {
  forest.iter().map(Node::subtree_len).sum()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn leaf(id: i64, pid: i64) -> Node<FlatRecord<()>> {
    Node::new(FlatRecord::new(id, pid, ()))
  }

  #[test]
  fn iter_is_preorder() {
    let mut a = leaf(1, 0);
    let mut b = leaf(2, 1);
    b.children.push(leaf(4, 2));
    a.children.push(b);
    a.children.push(leaf(3, 1));

    let ids: Vec<i64> = a.iter().map(|n| n.record.id).collect();
    assert_eq!(ids, vec![1, 2, 4, 3]);
    assert_eq!(a.subtree_len(), 4);
    assert_eq!(a.depth(), 3);
    assert!(!a.is_leaf());
    assert_eq!(forest_len(&[a, leaf(9, 0)]), 5);
  }

  #[test]
  fn deep_chain_drops_without_recursing() {
    let mut node = leaf(100_000, 99_999);
    for id in (1..100_000).rev() {
      let mut parent = leaf(id, id - 1);
      parent.children.push(node);
      node = parent;
    }
    assert_eq!(node.depth(), 100_000);
    drop(node);
  }

  #[test]
  fn node_serializes_flat_with_children() {
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Payload { name: String }

    let mut root = Node::new(FlatRecord::new(1, 0, Payload { name: "a".into() }));
    root.children.push(Node::new(FlatRecord::new(2, 1, Payload { name: "b".into() })));

    let v = serde_json::to_value(&root).unwrap();
    assert_eq!(
      v,
      json!({"id": 1, "pid": 0, "name": "a", "children": [
        {"id": 2, "pid": 1, "name": "b", "children": []}
      ]})
    );

    let back: Node<FlatRecord<Payload>> = serde_json::from_value(v).unwrap();
    assert_eq!(back, root);
  }

  #[test]
  fn missing_children_field_deserializes_as_leaf() {
    let n: Node<FlatRecord<serde_json::Map<String, serde_json::Value>>> =
      serde_json::from_value(json!({"id": 5, "pid": 0, "tag": "x"})).unwrap();
    assert!(n.is_leaf());
    assert_eq!(n.record.id(), 5);
    assert_eq!(n.record.payload["tag"], json!("x"));
  }
}
