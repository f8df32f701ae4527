//! Determinizes a serialized Büchi automaton into a Rabin automaton file.

use clap::Parser;
use color_eyre::eyre::eyre;

use buchi_rs::determinize::Safra;
use buchi_rs::nbw::Nbw;

#[derive(Debug, Parser)]
#[command(author, version, about = "Safra determinization of a serialized NBW")]
struct Cli {
    /// Input automaton (BUECHI/BUCHI or GASt format).
    #[arg(value_name = "INPUT")]
    input: std::path::PathBuf,

    /// Output file for the RABIN automaton.
    #[arg(value_name = "OUTPUT")]
    output: std::path::PathBuf,

    /// Also write a Graphviz rendering of the result here.
    #[arg(long, value_name = "FILE")]
    dot: Option<std::path::PathBuf>,

    /// Abort once the construction exceeds this many Rabin states.
    #[arg(long, value_name = "INT")]
    max_states: Option<usize>,

    /// Print the Safra tree behind each Rabin state.
    #[arg(long)]
    trees: bool,

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
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let nbw = Nbw::load(&args.input).map_err(|e| eyre!("{}", e))?;
    println!("Buchi states: {}", nbw.size());

    let time = std::time::Instant::now();
    let mut safra = Safra::new(&nbw);
    if let Some(limit) = args.max_states {
        safra = safra.state_limit(limit);
    }
    let drw = safra.run().map_err(|e| eyre!("{}", e))?;
    println!("Rabin states: {} ({:?})", drw.size(), time.elapsed());

    drw.save(&args.output).map_err(|e| eyre!("{}", e))?;

    if args.trees {
        match drw.tree_dump() {
            Some(dump) => print!("{}", dump),
            None => println!("(tree data not retained)"),
        }
    }

    if let Some(path) = args.dot {
        std::fs::write(path, drw.to_dot()?)?;
    }

    Ok(())
}
