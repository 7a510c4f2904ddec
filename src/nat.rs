//! The natural-number view of trees.
//!
//! Every tree denotes exactly one natural: the empty tree is 0, and a node
//! `(l, r)` denotes `(2·l + 1) << r`. The right child is the run of trailing
//! zero bits, so a tree run-length-encodes the bit alternations of its
//! number — towers of exponentials stay shallow. The arithmetic here works
//! by structural recursion on that encoding and never materializes a bit
//! array.

use std::fmt;

use num_bigint::BigUint;

use crate::tree::{Tree, TreeStore};

// ============================================================================
// Nat
// ============================================================================

/// Arbitrary-precision natural number, wrapping `BigUint`.
#[derive(Hash, PartialEq, Eq, Debug, Clone, PartialOrd, Ord)]
pub struct Nat(pub BigUint);

impl fmt::Display for Nat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<u64> for Nat {
  fn from(x: u64) -> Self {
    Nat(BigUint::from(x))
  }
}

impl Nat {
  pub const ZERO: Self = Self(BigUint::ZERO);

  #[inline]
  pub fn is_zero(&self) -> bool {
    self.0 == BigUint::ZERO
  }

  /// Try to convert to u64, returning None if the value is too large.
  #[inline]
  pub fn to_u64(&self) -> Option<u64> {
    u64::try_from(&self.0).ok()
  }
}

// ============================================================================
// Bijection
// ============================================================================

/// The tree denoting `n`.
pub fn from_nat(store: &mut TreeStore, n: &Nat) -> Tree {
  if n.is_zero() {
    return Tree::EMPTY;
  }
  // Nonzero, so the trailing-zero count exists.
  let r = n.0.trailing_zeros().unwrap_or(0);
  let l = Nat(&n.0 >> (r + 1));
  let lt = from_nat(store, &l);
  let rt = from_nat(store, &Nat::from(r));
  store.pair(lt, rt)
}

/// Convenience wrapper for small naturals.
pub fn from_u64(store: &mut TreeStore, n: u64) -> Tree {
  from_nat(store, &Nat::from(n))
}

/// The natural denoted by `t`. `None` when some run length overflows `u64`,
/// i.e. the number would not fit in memory written out in binary.
pub fn to_nat(store: &TreeStore, t: Tree) -> Option<Nat> {
  match store.children(t) {
    None => Some(Nat::ZERO),
    Some((l, r)) => {
      let l = to_nat(store, l)?;
      let r = to_nat(store, r)?.to_u64()?;
      Some(Nat(((l.0 << 1u8) + 1u8) << r))
    },
  }
}

/// `to_nat` squeezed into a `u64`, for small trees (opcodes, indices).
pub fn to_u64(store: &TreeStore, t: Tree) -> Option<u64> {
  to_nat(store, t)?.to_u64()
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `t + 1`. Mutually recursive with `double` and `decrement`.
pub fn increment(store: &mut TreeStore, t: Tree) -> Tree {
  match store.children(t) {
    // 0 + 1 = 1.
    None => store.pair(Tree::EMPTY, Tree::EMPTY),
    Some((l, r)) if !r.is_empty() => {
      // Even: the successor is odd, with half `(l, r - 1)`.
      let r1 = decrement(store, r);
      let half = store.pair(l, r1);
      store.pair(half, Tree::EMPTY)
    },
    // Odd `2l + 1`: the successor is `2(l + 1)`.
    Some((l, _)) => {
      let l1 = increment(store, l);
      double(store, l1)
    },
  }
}

/// `2t`.
pub fn double(store: &mut TreeStore, t: Tree) -> Tree {
  match store.children(t) {
    None => Tree::EMPTY,
    Some((l, r)) => {
      let r1 = increment(store, r);
      store.pair(l, r1)
    },
  }
}

/// `t - 1`. Decrementing zero yields zero.
pub fn decrement(store: &mut TreeStore, t: Tree) -> Tree {
  match store.children(t) {
    None => Tree::EMPTY,
    // Odd `2l + 1`: the predecessor is `2l`.
    Some((l, r)) if r.is_empty() => double(store, l),
    // Even: the predecessor is `2(t/2 - 1) + 1`.
    Some(_) => {
      let h = halve(store, t);
      let d = decrement(store, h);
      store.pair(d, Tree::EMPTY)
    },
  }
}

/// `t / 2`, rounding down.
pub fn halve(store: &mut TreeStore, t: Tree) -> Tree {
  match store.children(t) {
    None => Tree::EMPTY,
    Some((l, r)) if r.is_empty() => l,
    Some((l, r)) => {
      let r1 = decrement(store, r);
      store.pair(l, r1)
    },
  }
}

/// Is the lowest bit set? Cheap: tests whether the trailing-zero run is zero.
#[inline]
pub fn is_odd(store: &TreeStore, t: Tree) -> bool {
  matches!(store.children(t), Some((_, r)) if r.is_empty())
}

/// Consume one bit from a bitstream: parity first, then halve. The empty
/// stream yields an endless supply of zero bits.
pub fn take_bit(store: &mut TreeStore, t: &mut Tree) -> bool {
  let bit = is_odd(store, *t);
  *t = halve(store, *t);
  bit
}
