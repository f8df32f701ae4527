//! Cellular Automata Verification Environment.
//!
//! Reads a formula (from `--formula` or stdin), compiles it against the
//! configured ECA rule and boundary conditions, and prints the verdict.
//! Exits with status 1 when the formula is valid, 0 when it is not, and a
//! negative (wrapping) status on parse or compilation errors.

use std::io::{BufRead, Write};
use std::process::exit;

use clap::Parser;

use buchi_rs::compile::decide;
use buchi_rs::logic::{Boundary, Formula};

#[derive(Debug, Parser)]
#[command(author, version, about = "Cellular Automata Verification Environment")]
struct Cli {
    /// Default ECA rule for literals written with '->'.
    #[arg(short, long, value_name = "INT", default_value = "0")]
    eca: u8,

    /// Parse this formula instead of reading from stdin.
    #[arg(short, long, value_name = "FORMULA")]
    formula: Option<String>,

    /// Work with bi-infinite cellular automata (EXPERIMENTAL).
    #[arg(short = 'Z', long)]
    zeta: bool,

    /// Verbose mode.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Warn
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let input = match args.formula {
        Some(formula) => formula,
        None => {
            print!(">> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    let formula = match Formula::parse(input.trim(), args.eca) {
        Ok(formula) => formula,
        Err(e) => {
            eprintln!("Error parsing formula: {}", e);
            exit(-1);
        }
    };
    println!("{}", formula);

    let boundary = if args.zeta { Boundary::Zeta } else { Boundary::Omega };
    let valid = match decide(&formula, boundary) {
        Ok(valid) => valid,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(-1);
        }
    };

    println!("{}", if valid { "true" } else { "false" });
    exit(i32::from(valid));
}
