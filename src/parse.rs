//! Recursive descent parser for the concrete term syntax.
//!
//! Grammar:
//!
//! ```text
//! term := var | { var : term } term | [ var : term ] term
//!       | term term | term > term | * | # | ( term )
//! ```
//!
//! Variables are alphanumeric. `{x:A}B` is a PI type, `[x:A]B` a lambda,
//! `A>B` is `{x:A}B` for `x` not free in `B`, `*` is STAR and `#` is BOX.
//! Scoping rules are LEGO-like: `[x:A]y` and `{x:A}y` bind tightly to the
//! right, `x>y` is right associative, application is left associative:
//!
//! ```text
//! a b c        =  (a b) c
//! a {x:b} c d  =  a ({x:b} (c d))
//! a b>c d      =  a (b>(c d))
//! ```

use std::fmt;

use crate::reduce::lift;
use crate::term::{app, box_, lam, pi, star, var};
use crate::tree::{Tree, TreeStore};

/// End-of-input sentinel; doubles as "expected end" in [`SyntaxError`].
const END: u8 = 0;

/// Malformed concrete syntax: the character the parser wanted and the byte
/// position where it looked.
#[derive(Debug, PartialEq, Eq)]
pub struct SyntaxError {
  pub expected: char,
  pub position: usize,
}

impl fmt::Display for SyntaxError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.expected == END as char {
      write!(f, "unexpected text after the term at position {}", self.position)
    } else {
      write!(f, "expected '{}' at position {}", self.expected, self.position)
    }
  }
}

impl std::error::Error for SyntaxError {}

/// Parse a complete term. Free variables are accepted with a warning and
/// take the next de Bruijn index past the enclosing binders.
pub fn parse_term(
  store: &mut TreeStore,
  input: &str,
) -> Result<Tree, SyntaxError> {
  let mut parser = Parser { store, input: input.as_bytes(), pos: 0 };
  let mut vars = Vec::new();
  let term = parser.term(&mut vars)?;
  parser.skip_white();
  if parser.pos != parser.input.len() {
    return Err(SyntaxError { expected: END as char, position: parser.pos });
  }
  Ok(term)
}

struct Parser<'a, 's> {
  store: &'a mut TreeStore,
  input: &'s [u8],
  pos: usize,
}

impl Parser<'_, '_> {
  /// Current byte, or the NUL sentinel at end of input.
  fn peek(&self) -> u8 {
    self.input.get(self.pos).copied().unwrap_or(END)
  }

  fn skip_white(&mut self) {
    while self.peek().is_ascii_whitespace() {
      self.pos += 1;
    }
  }

  fn check_char(&mut self, c: u8) -> Result<(), SyntaxError> {
    self.skip_white();
    if self.peek() != c {
      return Err(SyntaxError { expected: c as char, position: self.pos });
    }
    self.pos += 1;
    self.skip_white();
    Ok(())
  }

  fn term(&mut self, vars: &mut Vec<String>) -> Result<Tree, SyntaxError> {
    let first = self.non_arrow_term(vars)?;
    if self.peek() != b'>' {
      return Ok(first);
    }
    self.pos += 1;
    let second = self.term(vars)?;
    // A>B is {x:A}B with x unused, so B moves under one extra binder.
    let second = lift(self.store, second, 0);
    Ok(pi(self.store, first, second))
  }

  fn non_arrow_term(
    &mut self,
    vars: &mut Vec<String>,
  ) -> Result<Tree, SyntaxError> {
    self.skip_white();
    let mut term = self.unapplied_term(vars)?;
    loop {
      self.skip_white();
      match self.peek() {
        END | b']' | b')' | b'}' | b'>' => return Ok(term),
        _ => {
          let arg = self.unapplied_term(vars)?;
          term = app(self.store, term, arg);
        },
      }
    }
  }

  fn unapplied_term(
    &mut self,
    vars: &mut Vec<String>,
  ) -> Result<Tree, SyntaxError> {
    match self.peek() {
      b'(' => {
        self.pos += 1;
        let term = self.term(vars)?;
        self.check_char(b')')?;
        Ok(term)
      },
      open @ (b'[' | b'{') => {
        let is_lambda = open == b'[';
        self.pos += 1;
        self.skip_white();
        let name = self.variable()?;
        self.check_char(b':')?;
        let domain = self.term(vars)?;
        self.check_char(if is_lambda { b']' } else { b'}' })?;
        vars.push(name);
        let body = self.term(vars)?;
        vars.pop();
        if is_lambda {
          Ok(lam(self.store, domain, body))
        } else {
          Ok(pi(self.store, domain, body))
        }
      },
      b'*' => {
        self.pos += 1;
        self.skip_white();
        Ok(star(self.store))
      },
      b'#' => {
        self.pos += 1;
        self.skip_white();
        Ok(box_(self.store))
      },
      _ => {
        let name = self.variable()?;
        match vars.iter().rev().position(|v| *v == name) {
          Some(k) => Ok(var(self.store, k as u64)),
          None => {
            eprintln!("warning: free variable \"{}\"", name);
            Ok(var(self.store, vars.len() as u64))
          },
        }
      },
    }
  }

  fn variable(&mut self) -> Result<String, SyntaxError> {
    if !self.peek().is_ascii_alphanumeric() {
      return Err(SyntaxError { expected: 'a', position: self.pos });
    }
    let start = self.pos;
    while self.peek().is_ascii_alphanumeric() {
      self.pos += 1;
    }
    Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
  }
}
