//! The term view of trees.
//!
//! The same trees that serve as numbers double as terms of the calculus,
//! keyed by the left child (the opcode):
//!
//! ```text
//! PI(A,B)     = Pair(0, Pair(A,B))
//! LAMBDA(A,B) = Pair(1, Pair(A,B))
//! APPLY(A,B)  = Pair(2, Pair(A,B))
//! STAR        = Pair(3, 0) = 7
//! BOX         = Pair(3, 1) = 14
//! VAR(k)      = Pair(4+2k, 0) = 9 + 4k      [k >= 0, a de Bruijn index]
//! ```
//!
//! A context is a tree too: the empty context is the empty tree, and a
//! context extended with `A` is `Pair(A, rest)`.

use crate::nat::{from_u64, to_u64};
use crate::reduce::norm_eq;
use crate::tree::{Tree, TreeStore};

pub const OP_PI: u64 = 0;
pub const OP_LAMBDA: u64 = 1;
pub const OP_APPLY: u64 = 2;
pub const OP_SORT: u64 = 3;
pub const OP_VAR: u64 = 4;

// ============================================================================
// Deconstruction
// ============================================================================

/// One level of a term, decoded from the opcode. `view` is the only place
/// the opcode convention is interpreted; everything downstream matches on
/// this.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TermView {
  /// Dependent function type: domain, codomain.
  Pi(Tree, Tree),
  /// Abstraction: domain, body.
  Lam(Tree, Tree),
  /// Application: function, argument.
  App(Tree, Tree),
  /// The universe of types.
  Star,
  /// The sort of STAR.
  Box,
  /// A de Bruijn variable.
  Var(u64),
}

/// Decode the head of `t`, or `None` if `t` is not a well-formed term.
pub fn view(store: &TreeStore, t: Tree) -> Option<TermView> {
  let (op, body) = store.children(t)?;
  match to_u64(store, op)? {
    OP_PI => store.children(body).map(|(a, b)| TermView::Pi(a, b)),
    OP_LAMBDA => store.children(body).map(|(a, b)| TermView::Lam(a, b)),
    OP_APPLY => store.children(body).map(|(a, b)| TermView::App(a, b)),
    OP_SORT => match store.children(body) {
      None => Some(TermView::Star),
      Some((l, r)) if l.is_empty() && r.is_empty() => Some(TermView::Box),
      Some(_) => None,
    },
    op if op >= OP_VAR && op % 2 == 0 && body.is_empty() => {
      Some(TermView::Var((op - OP_VAR) / 2))
    },
    _ => None,
  }
}

/// STAR and BOX are the only terms that classify context entries.
pub fn is_sort(store: &TreeStore, t: Tree) -> bool {
  matches!(view(store, t), Some(TermView::Star | TermView::Box))
}

// ============================================================================
// Constructors
// ============================================================================

fn node(store: &mut TreeStore, op: u64, a: Tree, b: Tree) -> Tree {
  let op = from_u64(store, op);
  let body = store.pair(a, b);
  store.pair(op, body)
}

pub fn pi(store: &mut TreeStore, domain: Tree, codomain: Tree) -> Tree {
  node(store, OP_PI, domain, codomain)
}

pub fn lam(store: &mut TreeStore, domain: Tree, body: Tree) -> Tree {
  node(store, OP_LAMBDA, domain, body)
}

pub fn app(store: &mut TreeStore, fun: Tree, arg: Tree) -> Tree {
  node(store, OP_APPLY, fun, arg)
}

pub fn star(store: &mut TreeStore) -> Tree {
  let op = from_u64(store, OP_SORT);
  store.pair(op, Tree::EMPTY)
}

pub fn box_(store: &mut TreeStore) -> Tree {
  let op = from_u64(store, OP_SORT);
  let one = from_u64(store, 1);
  store.pair(op, one)
}

pub fn var(store: &mut TreeStore, k: u64) -> Tree {
  let op = from_u64(store, OP_VAR + 2 * k);
  store.pair(op, Tree::EMPTY)
}

// ============================================================================
// Contexts
// ============================================================================

/// Extend a context with a new innermost entry.
pub fn ctx_push(store: &mut TreeStore, entry: Tree, ctx: Tree) -> Tree {
  store.pair(entry, ctx)
}

/// Innermost entry and remainder, or `None` for the empty context.
pub fn ctx_pop(store: &TreeStore, ctx: Tree) -> Option<(Tree, Tree)> {
  store.children(ctx)
}

/// Context tree to a Vec with the oldest entry first (so `last()` is the
/// innermost entry, de Bruijn index 0).
pub fn ctx_to_vec(store: &TreeStore, mut ctx: Tree) -> Vec<Tree> {
  let mut out = Vec::new();
  while let Some((head, tail)) = store.children(ctx) {
    out.push(head);
    ctx = tail;
  }
  out.reverse();
  out
}

/// Vec (oldest first) back to a context tree.
pub fn ctx_from_slice(store: &mut TreeStore, entries: &[Tree]) -> Tree {
  let mut ctx = Tree::EMPTY;
  for &entry in entries {
    ctx = ctx_push(store, entry, ctx);
  }
  ctx
}

/// Entry-wise normalized equality of two context trees.
pub fn ctx_norm_eq(store: &mut TreeStore, mut a: Tree, mut b: Tree) -> bool {
  loop {
    if a == b {
      return true;
    }
    match (store.children(a), store.children(b)) {
      (Some((ha, ta)), Some((hb, tb))) => {
        if !norm_eq(store, ha, hb) {
          return false;
        }
        a = ta;
        b = tb;
      },
      _ => return false,
    }
  }
}

/// Entry-wise normalized equality of two context slices (oldest first).
pub fn ctx_slices_norm_eq(store: &mut TreeStore, a: &[Tree], b: &[Tree]) -> bool {
  a.len() == b.len()
    && a.iter().zip(b.iter()).all(|(&x, &y)| norm_eq(store, x, y))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::nat::to_u64;

  #[test]
  fn sorts_match_the_numeric_encoding() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let b = box_(store);
    assert_eq!(to_u64(store, s), Some(7));
    assert_eq!(to_u64(store, b), Some(14));
    assert_eq!(view(store, s), Some(TermView::Star));
    assert_eq!(view(store, b), Some(TermView::Box));
    assert!(is_sort(store, s) && is_sort(store, b));
  }

  #[test]
  fn vars_match_the_numeric_encoding() {
    let store = &mut TreeStore::new();
    for k in 0..10 {
      let v = var(store, k);
      assert_eq!(to_u64(store, v), Some(9 + 4 * k));
      assert_eq!(view(store, v), Some(TermView::Var(k)));
      assert!(!is_sort(store, v));
    }
  }

  #[test]
  fn binders_deconstruct() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let v = var(store, 0);
    let t = pi(store, s, v);
    assert_eq!(view(store, t), Some(TermView::Pi(s, v)));
    let l = lam(store, s, v);
    assert_eq!(view(store, l), Some(TermView::Lam(s, v)));
    let a = app(store, l, s);
    assert_eq!(view(store, a), Some(TermView::App(l, s)));
  }

  #[test]
  fn non_terms_have_no_view() {
    let store = &mut TreeStore::new();
    assert_eq!(view(store, Tree::EMPTY), None);
    // 1 = Pair(0, 0): a PI opcode with no body.
    let one = store.pair(Tree::EMPTY, Tree::EMPTY);
    assert_eq!(view(store, one), None);
    // Odd opcodes above 3 name nothing.
    let five = crate::nat::from_u64(store, 5);
    let t = store.pair(five, Tree::EMPTY);
    assert_eq!(view(store, t), None);
  }

  #[test]
  fn context_round_trip() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let v = var(store, 0);
    let ctx = ctx_from_slice(store, &[s, v]);
    assert_eq!(ctx_to_vec(store, ctx), vec![s, v]);
    let (head, tail) = ctx_pop(store, ctx).unwrap();
    assert_eq!(head, v);
    assert_eq!(ctx_to_vec(store, tail), vec![s]);
  }
}
