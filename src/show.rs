//! Diagnostic printers.
//!
//! Trees do not know which store they live in, so these are adapter types
//! borrowing the store, built with the `show_*` helpers and rendered through
//! `fmt::Display`.

use std::fmt;

use crate::derive::Judgment;
use crate::nat::to_u64;
use crate::term::{TermView, view};
use crate::tree::{Tree, TreeStore};

/// Term renderer: `PI(a,b)`, `LAMBDA(a,b)`, `APPLY(a,b)`, `STAR`, `BOX`,
/// `VAR k`, with `Pair(l,r)` as the fallback for trees that are not terms.
pub struct ShowTerm<'a> {
  store: &'a TreeStore,
  tree: Tree,
}

pub fn show_term(store: &TreeStore, tree: Tree) -> ShowTerm<'_> {
  ShowTerm { store, tree }
}

impl fmt::Display for ShowTerm<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sub = |tree| ShowTerm { store: self.store, tree };
    match view(self.store, self.tree) {
      Some(TermView::Pi(a, b)) => write!(f, "PI({},{})", sub(a), sub(b)),
      Some(TermView::Lam(a, b)) => write!(f, "LAMBDA({},{})", sub(a), sub(b)),
      Some(TermView::App(a, b)) => write!(f, "APPLY({},{})", sub(a), sub(b)),
      Some(TermView::Star) => write!(f, "STAR"),
      Some(TermView::Box) => write!(f, "BOX"),
      Some(TermView::Var(k)) => write!(f, "VAR {}", k),
      None => match self.store.children(self.tree) {
        None => write!(f, "0"),
        Some((l, r)) => write!(f, "Pair({},{})", sub(l), sub(r)),
      },
    }
  }
}

/// Context renderer, oldest entry first: `<>,A,B`.
pub struct ShowContext<'a> {
  store: &'a TreeStore,
  context: Tree,
}

pub fn show_context(store: &TreeStore, context: Tree) -> ShowContext<'_> {
  ShowContext { store, context }
}

impl fmt::Display for ShowContext<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.store.children(self.context) {
      None => write!(f, "<>"),
      Some((head, tail)) => {
        let rest = ShowContext { store: self.store, context: tail };
        write!(f, "{},{}", rest, show_term(self.store, head))
      },
    }
  }
}

/// Bitstream renderer, most significant bit first.
pub struct ShowBits<'a> {
  store: &'a TreeStore,
  bits: Tree,
}

pub fn show_bits(store: &TreeStore, bits: Tree) -> ShowBits<'_> {
  ShowBits { store, bits }
}

impl fmt::Display for ShowBits<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.store.children(self.bits) {
      None => write!(f, "0"),
      Some((l, r)) => {
        if !l.is_empty() {
          write!(f, "{}", ShowBits { store: self.store, bits: l })?;
        }
        write!(f, "1")?;
        match to_u64(self.store, r) {
          Some(run) => {
            for _ in 0..run {
              write!(f, "0")?;
            }
            Ok(())
          },
          // A trailing-zero run too long to spell out.
          None => write!(f, "0*"),
        }
      },
    }
  }
}

/// Judgment renderer: `term : type [ context ] bits`.
pub struct ShowJudgment<'a> {
  store: &'a TreeStore,
  judgment: &'a Judgment,
}

pub fn show_judgment<'a>(
  store: &'a TreeStore,
  judgment: &'a Judgment,
) -> ShowJudgment<'a> {
  ShowJudgment { store, judgment }
}

impl fmt::Display for ShowJudgment<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} : {} [ {} ] {}",
      show_term(self.store, self.judgment.term),
      show_term(self.store, self.judgment.ty),
      show_context(self.store, self.judgment.context),
      show_bits(self.store, self.judgment.rest)
    )
  }
}
