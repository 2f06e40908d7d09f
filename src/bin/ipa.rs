//! Approximate a Nash equilibrium by iterated polymatrix approximation.
//!
//! Usage:
//!   ipa [OPTIONS] [FILE]
//!
//! Options:
//!   -d <DECIMALS>        Digits to print (default: 6)
//!   -V, --verbose        Verbose: print every iterate as `iterate-k,...`
//!   -v, --version        Print version information
//!   -q                   Quiet mode (no banner, no spinner)
//!   --iterations <N>     Iteration cap (default: 1000)
//!   --tolerance <TOL>    Convergence threshold on the step size (default: 1e-6)
//!   --seed <N>           Start from a random profile with this seed
//!   --config <FILE>      Solver settings in JSON; flags override them
//!
//! The result is printed as `NE,p1,p2,...`, or `unconverged,...` when the
//! iteration cap is reached first.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use nash_enum::nash::{
    solve, CsvRenderer, Game, MixedProfile, ProfileRenderer, Scalar, SolveError, SolveReport,
    SolverConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "ipa",
    version,
    about = "Compute Nash equilibria using iterated polymatrix approximation",
    disable_version_flag = true
)]
struct Args {
    /// Print version information
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: (),

    /// Game file in JSON format (standard input when omitted)
    file: Option<PathBuf>,

    /// Show equilibrium probabilities with DECIMALS digits
    #[arg(short = 'd', value_name = "DECIMALS")]
    decimals: Option<usize>,

    /// Verbose mode (shows intermediate output)
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Quiet mode (suppresses banner and progress)
    #[arg(short = 'q')]
    quiet: bool,

    /// Maximum number of iterations
    #[arg(long, value_name = "N")]
    iterations: Option<usize>,

    /// Step size below which the iteration has converged
    #[arg(long, value_name = "TOL")]
    tolerance: Option<f64>,

    /// Seed for a random starting profile
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Solver settings in JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Prints profiles as CSV while a spinner tracks the iterations on stderr.
struct SpinnerRenderer<W: Write> {
    inner: CsvRenderer<W>,
    bar: Option<ProgressBar>,
}

impl<W: Write> ProfileRenderer for SpinnerRenderer<W> {
    fn render<T: Scalar>(&mut self, profile: &MixedProfile<T>, label: &str) -> io::Result<()> {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.inner.render(profile, label)),
            None => self.inner.render(profile, label),
        }
    }

    fn progress(&mut self, iteration: usize) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("iteration {}", iteration));
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.quiet {
        eprintln!("Compute Nash equilibria using iterated polymatrix approximation");
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
        None => SolverConfig::approximation(),
    };
    config.approximate = true;
    config.use_delegated_enumerator = false;
    if let Some(decimals) = args.decimals {
        config = config.with_decimals(decimals);
    }
    if args.verbose {
        config = config.with_verbose(true);
    }
    if let Some(cap) = args.iterations {
        config = config.with_iteration_cap(cap);
    }
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let game = read_game(args.file.as_deref())?;

    let bar = if args.quiet {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    };
    let mut renderer = SpinnerRenderer {
        inner: CsvRenderer::new(io::stdout().lock(), config.num_decimals),
        bar,
    };

    let report = solve(&game, &config, &mut renderer);
    if let Some(bar) = &renderer.bar {
        bar.finish_and_clear();
    }

    if let SolveReport::Approximation(result) = report? {
        if !args.quiet {
            eprintln!(
                "{:?} after {} iterations (step {:.3e}, regret {:.3e})",
                result.status, result.iterations, result.step, result.regret
            );
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
