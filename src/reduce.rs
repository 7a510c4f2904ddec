//! Substitution, lifting, and normalization for the calculus.
//!
//! Plain structural recursion over the term view. Weak-head and full
//! normalization are not guarded against divergence: callers only hand them
//! terms originating from typed derivations, where normalization terminates.

use crate::term::{TermView, app, lam, pi, var, view};
use crate::tree::{Tree, TreeStore};

/// Substitute `repl` for variable `v` in `term`, shifting the variables
/// above `v` down by one. Entering a binder bumps the target variable and
/// lifts the replacement. Trees with no term view pass through unchanged.
pub fn subst(store: &mut TreeStore, term: Tree, v: u64, repl: Tree) -> Tree {
  match view(store, term) {
    Some(TermView::Pi(a, b)) => {
      let a = subst(store, a, v, repl);
      let repl = lift(store, repl, 0);
      let b = subst(store, b, v + 1, repl);
      pi(store, a, b)
    },
    Some(TermView::Lam(a, b)) => {
      let a = subst(store, a, v, repl);
      let repl = lift(store, repl, 0);
      let b = subst(store, b, v + 1, repl);
      lam(store, a, b)
    },
    Some(TermView::App(f, x)) => {
      let f = subst(store, f, v, repl);
      let x = subst(store, x, v, repl);
      app(store, f, x)
    },
    Some(TermView::Var(k)) if k == v => repl,
    Some(TermView::Var(k)) if k > v => var(store, k - 1),
    _ => term,
  }
}

/// Increment every free variable `>= v` in `term` by one; used whenever a
/// new binding is inserted below the current scope.
pub fn lift(store: &mut TreeStore, term: Tree, v: u64) -> Tree {
  match view(store, term) {
    Some(TermView::Pi(a, b)) => {
      let a = lift(store, a, v);
      let b = lift(store, b, v + 1);
      pi(store, a, b)
    },
    Some(TermView::Lam(a, b)) => {
      let a = lift(store, a, v);
      let b = lift(store, b, v + 1);
      lam(store, a, b)
    },
    Some(TermView::App(f, x)) => {
      let f = lift(store, f, v);
      let x = lift(store, x, v);
      app(store, f, x)
    },
    Some(TermView::Var(k)) if k >= v => var(store, k + 1),
    _ => term,
  }
}

/// Reduce until the head is no longer a redex. The function position is
/// itself weak-head-normalized to expose a LAMBDA.
pub fn whnf(store: &mut TreeStore, mut t: Tree) -> Tree {
  loop {
    match view(store, t) {
      Some(TermView::App(f, x)) => {
        let f = whnf(store, f);
        match view(store, f) {
          Some(TermView::Lam(_, body)) => {
            t = subst(store, body, 0, x);
          },
          _ => return app(store, f, x),
        }
      },
      _ => return t,
    }
  }
}

/// Fully normalize: reduce outer redexes, then recurse into binder bodies
/// and both operands of stuck applications.
pub fn normalize(store: &mut TreeStore, mut t: Tree) -> Tree {
  loop {
    match view(store, t) {
      Some(TermView::App(f, x)) => {
        let f = normalize(store, f);
        match view(store, f) {
          Some(TermView::Lam(_, body)) => {
            let x = normalize(store, x);
            t = subst(store, body, 0, x);
          },
          _ => break,
        }
      },
      _ => break,
    }
  }
  match view(store, t) {
    Some(TermView::Pi(a, b)) => {
      let a = normalize(store, a);
      let b = normalize(store, b);
      pi(store, a, b)
    },
    Some(TermView::Lam(a, b)) => {
      let a = normalize(store, a);
      let b = normalize(store, b);
      lam(store, a, b)
    },
    Some(TermView::App(f, x)) => {
      let f = normalize(store, f);
      let x = normalize(store, x);
      app(store, f, x)
    },
    _ => t,
  }
}

/// Equality up to normalization. Identity is the fast path; otherwise both
/// sides are weak-head-normalized and compared head-by-head. VAR, STAR and
/// BOX heads are inert, so their comparison is direct.
pub fn norm_eq(store: &mut TreeStore, a: Tree, b: Tree) -> bool {
  if a == b {
    return true;
  }
  let a = whnf(store, a);
  let b = whnf(store, b);
  if a == b {
    return true;
  }
  match (view(store, a), view(store, b)) {
    (Some(TermView::Pi(a1, a2)), Some(TermView::Pi(b1, b2)))
    | (Some(TermView::Lam(a1, a2)), Some(TermView::Lam(b1, b2)))
    | (Some(TermView::App(a1, a2)), Some(TermView::App(b1, b2))) => {
      norm_eq(store, a1, b1) && norm_eq(store, a2, b2)
    },
    (Some(TermView::Star), Some(TermView::Star)) => true,
    (Some(TermView::Box), Some(TermView::Box)) => true,
    (Some(TermView::Var(i)), Some(TermView::Var(j))) => i == j,
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::derive::derive;
  use crate::nat::from_u64;
  use crate::term::{box_, star};

  // [x:*]x
  fn id_star(store: &mut TreeStore) -> Tree {
    let s = star(store);
    let v = var(store, 0);
    lam(store, s, v)
  }

  #[test]
  fn subst_hits_the_target_variable() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let v0 = var(store, 0);
    assert_eq!(subst(store, v0, 0, s), s);
    // Variables above the target shift down.
    let v1 = var(store, 1);
    assert_eq!(subst(store, v1, 0, s), v0);
    // Variables below the target are untouched.
    assert_eq!(subst(store, v0, 1, s), v0);
  }

  #[test]
  fn subst_enters_binders_lifted() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let v0 = var(store, 0);
    let v1 = var(store, 1);
    // [y:*]x with x = VAR(1) free; substituting VAR(0) for it must produce
    // [y:*]VAR(1), not capture y.
    let body = lam(store, s, v1);
    let got = subst(store, body, 0, v0);
    assert_eq!(got, lam(store, s, v1));
  }

  #[test]
  fn lift_bumps_free_variables_only() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let v0 = var(store, 0);
    let v1 = var(store, 1);
    assert_eq!(lift(store, v0, 0), v1);
    assert_eq!(lift(store, v0, 1), v0);
    // Under a binder the bound variable stays put.
    let l = lam(store, s, v0);
    assert_eq!(lift(store, l, 0), l);
    let l1 = lam(store, s, v1);
    let l2 = var(store, 2);
    let l2 = lam(store, s, l2);
    assert_eq!(lift(store, l1, 0), l2);
  }

  #[test]
  fn subst_inverts_lift() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let b = box_(store);
    let v0 = var(store, 0);
    let id = id_star(store);
    let applied = app(store, id, s);
    for t in [s, b, v0, id, applied] {
      let lifted = lift(store, t, 0);
      let back = subst(store, lifted, 0, id);
      assert_eq!(back, t);
    }
  }

  #[test]
  fn whnf_fires_the_outer_redex() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let id = id_star(store);
    let t = app(store, id, s);
    assert_eq!(whnf(store, t), s);
    // ([x:*]x) (([x:*]x) *) reduces in two steps.
    let inner = app(store, id, s);
    let t = app(store, id, inner);
    assert_eq!(whnf(store, t), s);
  }

  #[test]
  fn whnf_stops_at_stuck_heads() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let v0 = var(store, 0);
    let stuck = app(store, v0, s);
    assert_eq!(whnf(store, stuck), stuck);
  }

  #[test]
  fn normalize_recurses_under_binders() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let id = id_star(store);
    let redex = app(store, id, s);
    // [y:([x:*]x) *] y normalizes to [y:*] y.
    let v0 = var(store, 0);
    let t = lam(store, redex, v0);
    let want = lam(store, s, v0);
    assert_eq!(normalize(store, t), want);
  }

  #[test]
  fn normalize_is_idempotent() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let id = id_star(store);
    let redex = app(store, id, s);
    let v0 = var(store, 0);
    let under = lam(store, redex, v0);
    let stuck = app(store, v0, redex);
    for t in [s, redex, under, stuck] {
      let n1 = normalize(store, t);
      let n2 = normalize(store, n1);
      assert_eq!(n1, n2);
    }
  }

  #[test]
  fn normalize_is_idempotent_on_decoded_judgments() {
    let store = &mut TreeStore::new();
    for n in 0..4096u64 {
      let bits = from_u64(store, n);
      let j = derive(store, bits);
      for t in [j.term, j.ty] {
        let n1 = normalize(store, t);
        let n2 = normalize(store, n1);
        assert_eq!(n1, n2, "stream {n}");
      }
    }
  }

  #[test]
  fn subst_inverts_lift_on_decoded_judgments() {
    let store = &mut TreeStore::new();
    let s = star(store);
    for n in 0..4096u64 {
      let bits = from_u64(store, n);
      let j = derive(store, bits);
      for t in [j.term, j.ty] {
        let lifted = lift(store, t, 0);
        // The replacement is irrelevant: the lifted term has no VAR(0).
        assert_eq!(subst(store, lifted, 0, s), t, "stream {n}");
        assert_eq!(subst(store, lifted, 0, j.ty), t, "stream {n}");
      }
    }
  }

  #[test]
  fn norm_eq_reflexive_symmetric() {
    let store = &mut TreeStore::new();
    let s = star(store);
    let b = box_(store);
    let id = id_star(store);
    let redex = app(store, id, s);
    for t in [s, b, id, redex] {
      assert!(norm_eq(store, t, t));
    }
    assert!(norm_eq(store, redex, s));
    assert!(norm_eq(store, s, redex));
    assert!(!norm_eq(store, s, b));
    // Agreement with full normalization.
    assert_eq!(normalize(store, redex), normalize(store, s));
  }
}
