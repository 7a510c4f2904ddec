//! The derivation decoder: bitstream in, well-typed judgment out.
//!
//! Decoding starts from the axiom `⊢ STAR : BOX` and repeatedly runs a round
//! of four stages — application, weakening, abstraction, variable
//! introduction — consuming control bits low-bit-first. Every stage degrades
//! to a no-op when its precondition fails or its control bit is 0, so the
//! decoder is total: every natural number decodes to some judgment, and the
//! all-zero stream decodes to the axiom itself.

use crate::nat::{decrement, take_bit};
use crate::reduce::{lift, norm_eq, subst, whnf};
use crate::term::{
  TermView, app, box_, ctx_norm_eq, ctx_pop, ctx_push, is_sort, lam, pi, star,
  var, view,
};
use crate::tree::{Tree, TreeStore};

/// A typing fact `context ⊢ term : type`, together with the bits left over
/// from decoding it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Judgment {
  pub term: Tree,
  pub ty: Tree,
  pub rest: Tree,
  pub context: Tree,
}

/// Decode a bitstream into a judgment. Total: there is no error path.
pub fn derive(store: &mut TreeStore, bits: Tree) -> Judgment {
  derive_with(store, bits, None)
}

/// Exhaustive/diagnostic mode: before each round on stream `x`, also derive
/// every stream below `x`, and append every computed judgment (auxiliary
/// sub-derivations included) to `trace` in completion order.
pub fn derive_exhaustive(
  store: &mut TreeStore,
  bits: Tree,
  trace: &mut Vec<Judgment>,
) -> Judgment {
  derive_with(store, bits, Some(trace))
}

fn derive_with(
  store: &mut TreeStore,
  bits: Tree,
  mut trace: Option<&mut Vec<Judgment>>,
) -> Judgment {
  let mut xx = bits;
  let mut context = Tree::EMPTY;
  let mut term = star(store);
  let mut ty = box_(store);

  loop {
    if trace.is_some() && !xx.is_empty() {
      let below = decrement(store, xx);
      derive_with(store, below, trace.as_deref_mut());
    }
    if !take_bit(store, &mut xx) {
      break;
    }

    // Decode the auxiliary sub-derivation from the current stream; its
    // leftover bits continue this round.
    let aux = derive_with(store, xx, trace.as_deref_mut());
    xx = aux.rest;

    // The two-antecedent stages require the auxiliary to have been derived
    // in the same context.
    if ctx_norm_eq(store, context, aux.context) {
      // Application: only a matching PI type puts the control bit on the
      // wire at all.
      let wh = whnf(store, ty);
      if let Some(TermView::Pi(dom, cod)) = view(store, wh) {
        if norm_eq(store, dom, aux.ty) && take_bit(store, &mut xx) {
          term = app(store, term, aux.term);
          ty = subst(store, cod, 0, aux.term);
        }
      }

      // Weakening: push the auxiliary as a context entry if it is a type.
      let bit = take_bit(store, &mut xx);
      if bit && is_sort(store, aux.ty) {
        context = ctx_push(store, aux.term, context);
        term = lift(store, term, 0);
        ty = lift(store, ty, 0);
      }
    }

    // Abstraction: pop the innermost context entry into a binder. A sort
    // type allows PI formation; everything else forces LAMBDA introduction
    // (a conservative extension of CoC).
    if let Some((head, tail)) = ctx_pop(store, context) {
      if take_bit(store, &mut xx) {
        let lambda = take_bit(store, &mut xx);
        if is_sort(store, ty) && !lambda {
          term = pi(store, head, term);
        } else {
          ty = pi(store, head, ty);
          term = lam(store, head, term);
        }
        context = tail;
      }
    }

    // Variable introduction: the current term becomes the innermost context
    // entry and the first de Bruijn variable now inhabits it.
    let bit = take_bit(store, &mut xx);
    if bit && is_sort(store, ty) {
      context = ctx_push(store, term, context);
      ty = lift(store, term, 0);
      term = var(store, 0);
    }
  }

  let judgment = Judgment { term, ty, rest: xx, context };
  if let Some(tr) = trace.as_deref_mut() {
    tr.push(judgment);
  }
  judgment
}

/// The tree encoding of a judgment:
/// `Pair(term, Pair(type, Pair(rest, context)))`.
pub fn pack(store: &mut TreeStore, j: &Judgment) -> Tree {
  let tail = store.pair(j.rest, j.context);
  let tail = store.pair(j.ty, tail);
  store.pair(j.term, tail)
}

/// Fold a trace into the accumulate tree, most recent judgment at the head.
pub fn accumulate(store: &mut TreeStore, trace: &[Judgment]) -> Tree {
  let mut acc = Tree::EMPTY;
  for j in trace {
    let packed = pack(store, j);
    acc = store.pair(packed, acc);
  }
  acc
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::nat::from_u64;
  use crate::term::ctx_to_vec;

  #[test]
  fn zero_decodes_to_the_axiom() {
    let store = &mut TreeStore::new();
    let j = derive(store, Tree::EMPTY);
    assert_eq!(j.term, star(store));
    assert_eq!(j.ty, box_(store));
    assert!(j.rest.is_empty());
    assert!(j.context.is_empty());
  }

  #[test]
  fn every_stream_decodes() {
    let store = &mut TreeStore::new();
    for n in 0..2048u64 {
      let bits = from_u64(store, n);
      let j = derive(store, bits);
      // Whatever came out is a term the printer and reducer understand.
      assert!(view(store, j.term).is_some());
      assert!(view(store, j.ty).is_some());
    }
  }

  #[test]
  fn stream_217_decodes_to_the_identity() {
    let store = &mut TreeStore::new();
    let bits = from_u64(store, 217);
    let j = derive(store, bits);
    let s = star(store);
    let v0 = var(store, 0);
    assert_eq!(j.term, lam(store, s, v0));
    assert_eq!(j.ty, pi(store, s, s));
    assert!(j.rest.is_empty());
    assert!(j.context.is_empty());
  }

  #[test]
  fn intro_round_builds_a_variable() {
    let store = &mut TreeStore::new();
    // Bits low-first: 1 (loop), 0 (trivial aux), 0 (no weaken),
    // 1 (intro) = 0b1001 = 9.
    let bits = from_u64(store, 9);
    let j = derive(store, bits);
    let s = star(store);
    assert_eq!(j.term, var(store, 0));
    assert_eq!(j.ty, s);
    assert_eq!(ctx_to_vec(store, j.context), vec![s]);
    assert!(j.rest.is_empty());
  }

  #[test]
  fn residual_bits_are_returned() {
    let store = &mut TreeStore::new();
    // An even stream stops immediately; the rest is the halved stream.
    let bits = from_u64(store, 6);
    let j = derive(store, bits);
    assert_eq!(j.rest, from_u64(store, 3));
  }

  #[test]
  fn exhaustive_trace_is_monotone() {
    let store = &mut TreeStore::new();
    let mut shorter = Vec::new();
    let five = from_u64(store, 5);
    derive_exhaustive(store, five, &mut shorter);
    let mut longer = Vec::new();
    let six = from_u64(store, 6);
    derive_exhaustive(store, six, &mut longer);
    assert!(longer.len() > shorter.len());
    // The final judgment of the run is the last trace entry.
    let j = derive(store, six);
    assert_eq!(longer.last(), Some(&j));
  }

  #[test]
  fn accumulate_chains_judgments() {
    let store = &mut TreeStore::new();
    let mut trace = Vec::new();
    let three = from_u64(store, 3);
    derive_exhaustive(store, three, &mut trace);
    let acc = accumulate(store, &trace);
    // Peel the chain back off: most recent first.
    let mut at = acc;
    for j in trace.iter().rev() {
      let (head, tail) = store.children(at).unwrap();
      assert_eq!(head, pack(store, j));
      at = tail;
    }
    assert!(at.is_empty());
  }
}
