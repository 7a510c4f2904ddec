//! Canonicalizing binary-tree store.
//!
//! Every piece of data in this crate — terms, types, contexts, bitstreams —
//! is a node in one shared arena of immutable (left, right) pairs. The arena
//! interns nodes, so for any pair of children at most one node exists and
//! structural equality collapses to handle equality.

use std::fmt;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

// ============================================================================
// Tree handles
// ============================================================================

/// A handle into the [`TreeStore`] arena, or the distinguished empty tree.
///
/// Handles are plain copyable values; `==` on handles is structural equality
/// for trees interned in the same store.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct Tree(u32);

impl Tree {
  /// The empty tree: zero, the empty context, and the empty bitstream.
  pub const EMPTY: Tree = Tree(0);

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }
}

// ============================================================================
// Errors
// ============================================================================

/// Child accessor invoked on the empty tree. A precondition violation,
/// fatal to the caller.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidAccess;

impl fmt::Display for InvalidAccess {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "child access on the empty tree")
  }
}

impl std::error::Error for InvalidAccess {}

// ============================================================================
// TreeStore
// ============================================================================

/// The arena owning all nodes. Nodes are never mutated or freed; the store
/// only grows for the life of the process. A concurrent caller must serialize
/// insertions (everything else is a pure function over canonical handles).
#[derive(Debug, Default)]
pub struct TreeStore {
  nodes: IndexSet<(Tree, Tree), FxBuildHasher>,
}

impl TreeStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Intern the node with children `(l, r)` and return its canonical handle.
  /// Repeated calls with equal children return the identical handle.
  pub fn pair(&mut self, l: Tree, r: Tree) -> Tree {
    let (idx, _) = self.nodes.insert_full((l, r));
    Tree(idx as u32 + 1)
  }

  /// Children of `t`, or `None` for the empty tree. The total accessor the
  /// rest of the crate recurses through.
  #[inline]
  pub fn children(&self, t: Tree) -> Option<(Tree, Tree)> {
    if t.is_empty() {
      None
    } else {
      self.nodes.get_index(t.0 as usize - 1).copied()
    }
  }

  /// Left child. Boundary accessor; fails on the empty tree.
  pub fn left(&self, t: Tree) -> Result<Tree, InvalidAccess> {
    self.children(t).map(|(l, _)| l).ok_or(InvalidAccess)
  }

  /// Right child. Boundary accessor; fails on the empty tree.
  pub fn right(&self, t: Tree) -> Result<Tree, InvalidAccess> {
    self.children(t).map(|(_, r)| r).ok_or(InvalidAccess)
  }

  /// Number of interned nodes.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}

/// Height of a tree, counting right-child edges one deeper than left ones —
/// the measure the bootstrap tower tool reports.
pub fn height(store: &TreeStore, t: Tree) -> u64 {
  match store.children(t) {
    None => 0,
    Some((l, r)) => {
      let left = height(store, l);
      let right = height(store, r) + 1;
      left.max(right)
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pair_is_canonical() {
    let store = &mut TreeStore::new();
    let a = store.pair(Tree::EMPTY, Tree::EMPTY);
    let b = store.pair(Tree::EMPTY, Tree::EMPTY);
    assert_eq!(a, b);
    let c = store.pair(a, Tree::EMPTY);
    let d = store.pair(b, Tree::EMPTY);
    assert_eq!(c, d);
    assert_ne!(a, c);
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn children_round_trip() {
    let store = &mut TreeStore::new();
    let one = store.pair(Tree::EMPTY, Tree::EMPTY);
    let t = store.pair(one, Tree::EMPTY);
    assert_eq!(store.children(t), Some((one, Tree::EMPTY)));
    assert_eq!(store.left(t), Ok(one));
    assert_eq!(store.right(t), Ok(Tree::EMPTY));
  }

  #[test]
  fn empty_tree_accessors_fail() {
    let store = TreeStore::new();
    assert_eq!(store.children(Tree::EMPTY), None);
    assert_eq!(store.left(Tree::EMPTY), Err(InvalidAccess));
    assert_eq!(store.right(Tree::EMPTY), Err(InvalidAccess));
  }

  #[test]
  fn height_counts_right_edges() {
    let store = &mut TreeStore::new();
    assert_eq!(height(store, Tree::EMPTY), 0);
    let one = store.pair(Tree::EMPTY, Tree::EMPTY);
    assert_eq!(height(store, one), 1);
    let two = store.pair(Tree::EMPTY, one);
    assert_eq!(height(store, two), 2);
    let deep_left = store.pair(two, Tree::EMPTY);
    assert_eq!(height(store, deep_left), 2);
  }
}
