use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigUint;

use coc::derive::{accumulate, derive, derive_exhaustive};
use coc::generate::generate;
use coc::nat::{from_nat, Nat};
use coc::parse::parse_term;
use coc::reduce::norm_eq;
use coc::show::{show_bits, show_judgment, show_term};
use coc::tree::{height, TreeStore};

#[derive(Parser)]
#[command(
  name = "coc",
  version,
  about = "Calculus of Constructions over canonical binary trees"
)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Type-check a term, encode it and decode it back
  Check {
    /// The term, e.g. "[a:*][x:a]x"
    term: String,
  },
  /// Decode a natural number into the judgment it derives
  Derive {
    /// The bitstream, given as a natural number
    number: String,
    /// Derive every prefix and print the whole tower of judgments
    #[arg(long)]
    exhaustive: bool,
  },
  /// Print the height of the judgment tower a number decodes to
  Tower {
    /// The bitstream, given as a natural number
    number: String,
  },
}

fn parse_number(src: &str) -> Result<Nat> {
  let n = src
    .parse::<BigUint>()
    .with_context(|| format!("not a natural number: {src:?}"))?;
  Ok(Nat(n))
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  let store = &mut TreeStore::new();
  match cli.command {
    Command::Check { term } => {
      let term = parse_term(store, &term)?;
      println!("term: {}", show_term(store, term));
      let (bits, ty) = generate(store, &[], term)?;
      println!("type: {}", show_term(store, ty));
      println!("bits: {}", show_bits(store, bits));
      let j = derive(store, bits);
      println!("derived: {}", show_judgment(store, &j));
      if j.term != term {
        bail!("decoded term differs from the input");
      }
      if !norm_eq(store, j.ty, ty) {
        bail!("decoded type differs from the checked type");
      }
      if !j.rest.is_empty() || !j.context.is_empty() {
        bail!("decoding left residual bits or context entries");
      }
      Ok(())
    },
    Command::Derive { number, exhaustive } => {
      let bits = parse_number(&number)?;
      let bits = from_nat(store, &bits);
      if exhaustive {
        let mut trace = Vec::new();
        derive_exhaustive(store, bits, &mut trace);
        for j in &trace {
          println!("{}", show_judgment(store, j));
        }
      } else {
        let j = derive(store, bits);
        println!("{}", show_judgment(store, &j));
      }
      Ok(())
    },
    Command::Tower { number } => {
      let bits = parse_number(&number)?;
      let bits = from_nat(store, &bits);
      let mut trace = Vec::new();
      derive_exhaustive(store, bits, &mut trace);
      let tower = accumulate(store, &trace);
      println!("{}", height(store, tower).saturating_sub(1));
      Ok(())
    },
  }
}
