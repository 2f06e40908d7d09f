//! Enumerate all extreme Nash equilibria of a two-player game.
//!
//! Usage:
//!   enummixed [OPTIONS] [FILE]
//!
//! Options:
//!   -d <DECIMALS>          Use floating point, printing DECIMALS digits
//!   -D                     Don't eliminate dominated strategies first
//!   -L                     Use lrs for vertex enumeration
//!   --lrs-program <PATH>   The lrs executable (default: lrs on PATH)
//!   -c                     Output connected components of equilibria
//!   -q                     Quiet mode (no banner)
//!   -v, --version          Print version information
//!   --config <FILE>        Solver settings in JSON; flags override them
//!
//! The game is read as JSON from FILE, or from standard input when FILE is
//! omitted. Each equilibrium is printed as `NE,p1,p2,...`; with `-c`, the
//! members of each connected component follow as `convex-k,...`.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use log::info;

use nash_enum::nash::{solve, CsvRenderer, Game, SolveError, SolveReport, SolverConfig};

#[derive(Parser, Debug)]
#[command(
    name = "enummixed",
    version,
    disable_version_flag = true,
    about = "Compute Nash equilibria by enumerating extreme points"
)]
struct Args {
    /// Print version information
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: (),

    /// Game file in JSON format (standard input when omitted)
    file: Option<PathBuf>,

    /// Compute using floating-point arithmetic; display results with DECIMALS digits
    #[arg(short = 'd', value_name = "DECIMALS")]
    decimals: Option<usize>,

    /// Don't eliminate strictly dominated strategies first
    #[arg(short = 'D')]
    no_elimination: bool,

    /// Use lrs for vertex enumeration
    #[arg(short = 'L')]
    lrs: bool,

    /// Path to the lrs executable
    #[arg(long, value_name = "PATH")]
    lrs_program: Option<PathBuf>,

    /// Output connected components of equilibria
    #[arg(short = 'c')]
    cliques: bool,

    /// Quiet mode (suppresses banner)
    #[arg(short = 'q')]
    quiet: bool,

    /// Solver settings in JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.quiet {
        eprintln!("Compute Nash equilibria by enumerating extreme points");
        eprintln!("nash-enum version {}", env!("CARGO_PKG_VERSION"));
        eprintln!();
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SolveError> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(decimals) = args.decimals {
        config = config.with_exact_arithmetic(false).with_decimals(decimals);
    }
    if args.no_elimination {
        config = config.with_elimination(false);
    }
    if args.lrs {
        config.use_delegated_enumerator = true;
    }
    if let Some(program) = &args.lrs_program {
        config = config.with_lrs_program(program);
    }
    if args.cliques {
        config = config.with_cliques(true);
    }
    config.approximate = false;

    let game = read_game(args.file.as_deref())?;
    let mut renderer = CsvRenderer::new(io::stdout().lock(), config.num_decimals);
    if let SolveReport::Enumeration { equilibria, cliques } = solve(&game, &config, &mut renderer)? {
        match cliques {
            Some(cliques) => info!("{} extreme equilibria in {} cliques", equilibria, cliques),
            None => info!("{} extreme equilibria", equilibria),
        }
    }
    Ok(())
}

fn read_game(path: Option<&Path>) -> Result<Game, SolveError> {
    match path {
        Some(path) => Ok(Game::from_json_file(path)?),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| SolveError::InvalidGame(format!("cannot read standard input: {}", e)))?;
            Ok(Game::from_json_str(&text)?)
        }
    }
}
