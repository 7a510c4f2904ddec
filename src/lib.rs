//! A minimal implementation of the Calculus of Constructions built on a
//! canonicalizing store of binary trees.
//!
//! Terms, types, contexts and whole typing judgments are all nodes in one
//! hash-consed [`tree::TreeStore`], and every tree is also a natural number
//! through the bijection in [`nat`]. On top of that sit the reduction
//! machinery ([`reduce`]), a total decoder mapping any bitstream to a valid
//! judgment ([`derive`]), and its inverse, which recovers the unique minimal
//! bitstream for a derivable judgment ([`generate`]). The [`parse`] and
//! [`show`] modules give the trees a concrete syntax.

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
#[cfg(test)]
extern crate rand;

pub mod derive;
pub mod generate;
pub mod nat;
pub mod parse;
pub mod reduce;
pub mod show;
pub mod term;
pub mod tree;
