//! The derivation encoder: judgment in, bitstream out.
//!
//! A finite-state machine simulates the decoder's control flow in reverse.
//! Walking the target term structurally, it emits exactly the control bits
//! the decoder would consume to rebuild that term in that context, splicing
//! in recursively generated sub-bitstreams wherever the decoder would have
//! recursively decoded an auxiliary. A target the decoder cannot reach
//! surfaces as [`InconsistentJudgment`].

use std::fmt;

use crate::nat::{double, increment};
use crate::reduce::{lift, norm_eq, subst, whnf};
use crate::term::{
  TermView, app, box_, ctx_slices_norm_eq, is_sort, lam, pi, star, var, view,
};
use crate::tree::{Tree, TreeStore};

// ============================================================================
// Errors
// ============================================================================

/// The target (context, term) is not reachable by any derivation. A contract
/// violation on the caller's side, not a recoverable condition.
#[derive(Debug, PartialEq, Eq)]
pub enum InconsistentJudgment {
  /// An application's function position has a non-PI type.
  FunctionExpected { ty: Tree },
  /// An application's argument type does not match the PI domain.
  DomainMismatch { expected: Tree, found: Tree },
  /// PI formation, weakening, or variable introduction over a non-sort.
  SortExpected { found: Tree },
  /// Abstraction with nothing in the context to abstract.
  EmptyContext,
  /// A de Bruijn index pointing past the end of the context.
  UnboundVariable { index: u64, depth: usize },
  /// BOX inhabits no type and cannot be the subject of a judgment.
  UntypableBox,
  /// The target tree is not a term at all.
  NotATerm { tree: Tree },
}

impl fmt::Display for InconsistentJudgment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InconsistentJudgment::FunctionExpected { .. } => {
        write!(f, "inconsistent judgment: function expected")
      },
      InconsistentJudgment::DomainMismatch { .. } => {
        write!(f, "inconsistent judgment: argument type mismatch")
      },
      InconsistentJudgment::SortExpected { .. } => {
        write!(f, "inconsistent judgment: sort expected")
      },
      InconsistentJudgment::EmptyContext => {
        write!(f, "inconsistent judgment: abstraction over an empty context")
      },
      InconsistentJudgment::UnboundVariable { index, depth } => {
        write!(
          f,
          "inconsistent judgment: variable {} unbound at context depth {}",
          index, depth
        )
      },
      InconsistentJudgment::UntypableBox => {
        write!(f, "inconsistent judgment: BOX has no type")
      },
      InconsistentJudgment::NotATerm { .. } => {
        write!(f, "inconsistent judgment: not a term")
      },
    }
  }
}

impl std::error::Error for InconsistentJudgment {}

// ============================================================================
// The machine
// ============================================================================

/// Where in the decoder's round the simulation currently stands.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Code {
  /// Loop entry: the next bit decides whether a round runs at all.
  While,
  /// An auxiliary sub-derivation is about to be decoded.
  Auxiliary,
  /// The auxiliary is in hand; the two-antecedent guard branches next.
  Binary,
  /// The application stage.
  Apply,
  /// The weakening stage.
  Weak,
  /// The abstraction stage.
  Context,
  /// The variable-introduction stage.
  Intro,
}

struct State<'a> {
  store: &'a mut TreeStore,
  bits: &'a mut Vec<bool>,
  code: Code,
  term: Tree,
  ty: Tree,
  context: Vec<Tree>,
  aux_term: Tree,
  aux_ty: Tree,
  aux_context: Vec<Tree>,
}

/// Encode `term` under `context` (oldest entry first). Returns the bitstream
/// tree and the recomputed type: decoding the bitstream reproduces `term`
/// identically, the type up to normalized equality, with no residual bits
/// and exactly `context` as the final context.
pub fn generate(
  store: &mut TreeStore,
  context: &[Tree],
  term: Tree,
) -> Result<(Tree, Tree), InconsistentJudgment> {
  let mut bits = Vec::new();
  let ty = generate_bits(store, &mut bits, context, term)?;
  // Bits were pushed in consumption order; fold most-recent-first so the
  // first consumed bit lands in the lowest position.
  let mut acc = Tree::EMPTY;
  for &bit in bits.iter().rev() {
    acc = double(store, acc);
    if bit {
      acc = increment(store, acc);
    }
  }
  Ok((acc, ty))
}

/// Run one simulated derivation, appending its bits (stop bit included) to
/// `bits`. Also the recursion target for auxiliary sub-bitstreams.
fn generate_bits(
  store: &mut TreeStore,
  bits: &mut Vec<bool>,
  context: &[Tree],
  term: Tree,
) -> Result<Tree, InconsistentJudgment> {
  let term_star = star(store);
  let term_box = box_(store);
  let mut state = State {
    store,
    bits,
    code: Code::While,
    term: term_star,
    ty: term_box,
    context: Vec::new(),
    aux_term: Tree::EMPTY,
    aux_ty: Tree::EMPTY,
    aux_context: Vec::new(),
  };
  state.generate(context, term)?;
  state.advance_to(Code::While);
  state.bits.push(false);
  Ok(state.ty)
}

impl State<'_> {
  /// Drive the machine until `self.term` is `target` under context `c`,
  /// by structural recursion on the target.
  fn generate(
    &mut self,
    c: &[Tree],
    target: Tree,
  ) -> Result<(), InconsistentJudgment> {
    match view(self.store, target) {
      Some(TermView::Pi(a, b)) => {
        let mut inner = c.to_vec();
        inner.push(a);
        self.generate(&inner, b)?;
        self.do_pi()
      },
      Some(TermView::Lam(a, b)) => {
        let mut inner = c.to_vec();
        inner.push(a);
        self.generate(&inner, b)?;
        self.do_lambda()
      },
      Some(TermView::App(f, x)) => {
        self.generate(c, f)?;
        self.do_apply(x)
      },
      Some(TermView::Star) => match c.split_last() {
        // The axiom state already is STAR in the empty context.
        None => Ok(()),
        Some((&entry, rest)) => {
          self.generate(rest, target)?;
          self.do_weak(entry)
        },
      },
      Some(TermView::Box) => Err(InconsistentJudgment::UntypableBox),
      Some(TermView::Var(v)) => match c.split_last() {
        None => {
          Err(InconsistentJudgment::UnboundVariable { index: v, depth: 0 })
        },
        Some((&entry, rest)) => {
          if v as usize >= c.len() {
            return Err(InconsistentJudgment::UnboundVariable {
              index: v,
              depth: c.len(),
            });
          }
          if v == 0 {
            self.generate(rest, entry)?;
            self.do_intro()
          } else {
            let shallower = var(self.store, v - 1);
            self.generate(rest, shallower)?;
            self.do_weak(entry)
          }
        },
      },
      None => Err(InconsistentJudgment::NotATerm { tree: target }),
    }
  }

  /// Advance one step while doing nothing: emit whatever skip bit the
  /// decoder would consume for this stage and move on.
  fn advance(&mut self) {
    match self.code {
      Code::While => {
        self.bits.push(true);
        self.code = Code::Auxiliary;
      },
      Code::Auxiliary => {
        // The trivial auxiliary: a single 0 bit decodes to the axiom.
        self.bits.push(false);
        self.aux_term = star(self.store);
        self.aux_ty = box_(self.store);
        self.aux_context.clear();
        self.code = Code::Binary;
      },
      Code::Binary => {
        let same = ctx_slices_norm_eq(
          &mut *self.store,
          &self.context,
          &self.aux_context,
        );
        self.code = if same { Code::Apply } else { Code::Context };
      },
      Code::Apply => {
        // The decoder only consumes an application bit when its type is a
        // PI matching the auxiliary type.
        let wh = whnf(&mut *self.store, self.ty);
        if let Some(TermView::Pi(dom, _)) = view(self.store, wh) {
          if norm_eq(&mut *self.store, dom, self.aux_ty) {
            self.bits.push(false);
          }
        }
        self.code = Code::Weak;
      },
      Code::Weak => {
        self.bits.push(false);
        self.code = Code::Context;
      },
      Code::Context => {
        if !self.context.is_empty() {
          self.bits.push(false);
        }
        self.code = Code::Intro;
      },
      Code::Intro => {
        self.bits.push(false);
        self.code = Code::While;
      },
    }
  }

  fn advance_to(&mut self, target: Code) {
    while self.code != target {
      self.advance();
    }
  }

  /// Advance until the machine sits at `target` with `aux` as the auxiliary
  /// derived under the current context, generating the auxiliary's
  /// sub-bitstream in place of the trivial one.
  fn advance_to_aux(
    &mut self,
    target: Code,
    aux: Tree,
  ) -> Result<(), InconsistentJudgment> {
    while self.code != target
      || self.context != self.aux_context
      || self.aux_term != aux
    {
      if self.code == Code::Auxiliary {
        let ctx = self.context.clone();
        let aux_ty =
          generate_bits(&mut *self.store, &mut *self.bits, &ctx, aux)?;
        self.aux_ty = aux_ty;
        self.aux_context = ctx;
        self.aux_term = aux;
        self.code = Code::Binary;
      } else {
        self.advance();
      }
    }
    Ok(())
  }

  fn do_apply(&mut self, arg: Tree) -> Result<(), InconsistentJudgment> {
    self.advance_to_aux(Code::Binary, arg)?;
    let wh = whnf(&mut *self.store, self.ty);
    match view(self.store, wh) {
      Some(TermView::Pi(dom, cod)) => {
        if !norm_eq(&mut *self.store, dom, self.aux_ty) {
          return Err(InconsistentJudgment::DomainMismatch {
            expected: dom,
            found: self.aux_ty,
          });
        }
        self.bits.push(true);
        self.term = app(self.store, self.term, arg);
        self.ty = subst(self.store, cod, 0, arg);
        self.code = Code::Weak;
        Ok(())
      },
      _ => Err(InconsistentJudgment::FunctionExpected { ty: wh }),
    }
  }

  fn do_weak(&mut self, entry: Tree) -> Result<(), InconsistentJudgment> {
    self.advance_to_aux(Code::Weak, entry)?;
    if !is_sort(self.store, self.aux_ty) {
      return Err(InconsistentJudgment::SortExpected { found: self.aux_ty });
    }
    self.bits.push(true);
    self.context.push(self.aux_term);
    self.term = lift(self.store, self.term, 0);
    self.ty = lift(self.store, self.ty, 0);
    self.code = Code::Context;
    Ok(())
  }

  fn do_lambda(&mut self) -> Result<(), InconsistentJudgment> {
    self.advance_to(Code::Context);
    let entry =
      *self.context.last().ok_or(InconsistentJudgment::EmptyContext)?;
    self.bits.push(true);
    self.bits.push(true);
    self.term = lam(self.store, entry, self.term);
    self.ty = pi(self.store, entry, self.ty);
    self.context.pop();
    self.code = Code::Intro;
    Ok(())
  }

  fn do_pi(&mut self) -> Result<(), InconsistentJudgment> {
    self.advance_to(Code::Context);
    let entry =
      *self.context.last().ok_or(InconsistentJudgment::EmptyContext)?;
    if !is_sort(self.store, self.ty) {
      return Err(InconsistentJudgment::SortExpected { found: self.ty });
    }
    self.bits.push(true);
    self.bits.push(false);
    self.term = pi(self.store, entry, self.term);
    self.context.pop();
    self.code = Code::Intro;
    Ok(())
  }

  fn do_intro(&mut self) -> Result<(), InconsistentJudgment> {
    self.advance_to(Code::Intro);
    if !is_sort(self.store, self.ty) {
      return Err(InconsistentJudgment::SortExpected { found: self.ty });
    }
    self.bits.push(true);
    self.context.push(self.term);
    self.ty = lift(self.store, self.term, 0);
    self.term = var(self.store, 0);
    self.code = Code::While;
    Ok(())
  }
}
