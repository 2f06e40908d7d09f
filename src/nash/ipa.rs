//! Iterated Polymatrix Approximation (IPA).
//!
//! Finds one approximate equilibrium of a game with any number of players:
//!
//! ```text
//!   σ ──► linearize at σ ──► polymatrix game ──► Lemke LCP ──► z
//!   ▲                                                          │
//!   └──────────── σ ← α·σ + (1 − α)·z   (until ‖z − σ‖∞ < tol) ┘
//! ```
//!
//! The linearization replaces each player's payoff by a sum of pairwise
//! terms that agree with the true payoffs at σ:
//!
//! ```text
//!   M_pq[a][b] = u_p(a, b, σ₋pq) − (N − 2)/(N − 1) · u_p(a, σ₋p)
//! ```
//!
//! Everything runs in `f64`.

use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::nash::config::IpaConfig;
use crate::nash::error::SolveError;
use crate::nash::game::{Game, Payoffs};
use crate::nash::lemke::Lcp;
use crate::nash::number::Scalar;
use crate::nash::profile::MixedProfile;

/// How the approximation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// The last step was below the tolerance.
    Converged,
    /// The iteration cap was reached first.
    IterationLimit,
}

/// Result of an approximation run.
#[derive(Debug, Clone)]
pub struct ApproximateEquilibrium {
    /// The returned profile. On `IterationLimit`, the lowest-regret profile
    /// seen during the run.
    pub profile: MixedProfile<f64>,
    /// Why the run stopped.
    pub status: Convergence,
    /// Iterations performed.
    pub iterations: usize,
    /// Size of the last step, `‖z − σ‖∞`.
    pub step: f64,
    /// Largest gain from a unilateral pure deviation at `profile`.
    pub regret: f64,
}

impl ApproximateEquilibrium {
    /// Whether the run met its tolerance.
    pub fn is_converged(&self) -> bool {
        self.status == Convergence::Converged
    }
}

/// The IPA solver.
///
/// # Example
/// ```
/// use nash_enum::games;
/// use nash_enum::nash::{IpaConfig, IpaSolver};
///
/// let result = IpaSolver::new(IpaConfig::default())
///     .solve(&games::prisoners_dilemma())
///     .unwrap();
/// assert!(result.is_converged());
/// ```
#[derive(Debug, Clone)]
pub struct IpaSolver {
    config: IpaConfig,
}

impl IpaSolver {
    /// Create a solver with the given settings.
    pub fn new(config: IpaConfig) -> Self {
        Self { config }
    }

    /// The solver settings.
    pub fn config(&self) -> &IpaConfig {
        &self.config
    }

    /// The profile iteration starts from.
    ///
    /// Uniform unless a seed is configured, in which case every strategy gets
    /// a random positive weight before normalization.
    pub fn starting_profile(&self, game: &Game) -> MixedProfile<f64> {
        let counts = game.strategy_counts();
        match self.config.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                let weights = counts
                    .iter()
                    .map(|&n| (0..n).map(|_| rng.gen_range(0.05..1.0)).collect())
                    .collect();
                MixedProfile::from_weights(weights)
            }
            None => MixedProfile::uniform(&counts),
        }
    }

    /// Approximate an equilibrium of `game`.
    pub fn solve(&self, game: &Game) -> Result<ApproximateEquilibrium, SolveError> {
        self.solve_with(game, |_, _| Ok(()))
    }

    /// Approximate an equilibrium, calling `on_iterate` with each iterate.
    pub fn solve_with<F>(&self, game: &Game, on_iterate: F) -> Result<ApproximateEquilibrium, SolveError>
    where
        F: FnMut(usize, &MixedProfile<f64>) -> Result<(), SolveError>,
    {
        let start = self.starting_profile(game);
        self.solve_from(game, start, on_iterate)
    }

    /// Approximate an equilibrium starting from `start`.
    ///
    /// # Arguments
    /// * `game` - The game to solve
    /// * `start` - Initial profile; must match the game's strategy counts
    /// * `on_iterate` - Called with the iteration number and the new profile
    pub fn solve_from<F>(
        &self,
        game: &Game,
        start: MixedProfile<f64>,
        mut on_iterate: F,
    ) -> Result<ApproximateEquilibrium, SolveError>
    where
        F: FnMut(usize, &MixedProfile<f64>) -> Result<(), SolveError>,
    {
        self.config.validate()?;
        game.validate()?;
        let counts = game.strategy_counts();
        if start.probs().iter().map(Vec::len).ne(counts.iter().copied()) {
            return Err(SolveError::InvalidGame(
                "starting profile does not match the game".to_string(),
            ));
        }

        let payoffs = Payoffs::<f64>::from_game(game);
        if payoffs_overflow(game) {
            return Err(SolveError::Arithmetic(
                "payoffs do not fit in floating point".to_string(),
            ));
        }

        let timer = Instant::now();
        let alpha = self.config.damping;
        let mut sigma = start;
        let mut best = (payoffs.regret(&sigma), sigma.clone());
        let mut step = f64::INFINITY;

        for iteration in 1..=self.config.iteration_cap {
            let z = linearized_response(&payoffs, &sigma);
            step = z.max_distance(&sigma);
            sigma = blend(&sigma, &z, alpha);

            let regret = payoffs.regret(&sigma);
            debug!("iteration {}: step {:.3e}, regret {:.3e}", iteration, step, regret);
            on_iterate(iteration, &sigma)?;
            if regret < best.0 {
                best = (regret, sigma.clone());
            }

            if step < self.config.tolerance {
                info!(
                    "converged after {} iterations in {:.3}s (regret {:.3e})",
                    iteration,
                    timer.elapsed().as_secs_f64(),
                    regret
                );
                return Ok(ApproximateEquilibrium {
                    profile: sigma,
                    status: Convergence::Converged,
                    iterations: iteration,
                    step,
                    regret,
                });
            }
        }

        warn!(
            "no convergence within {} iterations (last step {:.3e}); returning lowest-regret profile",
            self.config.iteration_cap, step
        );
        let (regret, profile) = best;
        Ok(ApproximateEquilibrium {
            profile,
            status: Convergence::IterationLimit,
            iterations: self.config.iteration_cap,
            step,
            regret,
        })
    }
}

fn payoffs_overflow(game: &Game) -> bool {
    (0..game.num_profiles())
        .flat_map(|index| (0..game.num_players()).map(move |player| (index, player)))
        .any(|(index, player)| !game.payoff_at(index, player).as_f64().is_finite())
}

/// `α·σ + (1 − α)·z`, player by player.
fn blend(sigma: &MixedProfile<f64>, z: &MixedProfile<f64>, alpha: f64) -> MixedProfile<f64> {
    MixedProfile::new(
        sigma
            .probs()
            .iter()
            .zip(z.probs())
            .map(|(s, t)| s.iter().zip(t).map(|(a, b)| alpha * a + (1.0 - alpha) * b).collect())
            .collect(),
    )
}

/// Equilibrium of the polymatrix game linearized at `sigma`.
///
/// Falls back to pure best responses when Lemke's algorithm fails.
fn linearized_response(payoffs: &Payoffs<f64>, sigma: &MixedProfile<f64>) -> MixedProfile<f64> {
    if payoffs.num_players() < 2 {
        return best_response(payoffs, sigma);
    }
    let lcp = polymatrix_lcp(payoffs, sigma);
    match lcp.solve() {
        Ok(z) => {
            let mut weights = Vec::with_capacity(payoffs.num_players());
            let mut offset = 0;
            for &n in payoffs.counts() {
                weights.push(z[offset..offset + n].to_vec());
                offset += n;
            }
            MixedProfile::from_weights(weights)
        }
        Err(e) => {
            debug!("{}; using pure best responses", e);
            best_response(payoffs, sigma)
        }
    }
}

/// The LCP `w = q + M z` of the polymatrix game at `sigma`.
///
/// Variables are every player's strategy weights followed by one payoff
/// level per player:
///
/// ```text
///   M = [ C   −Eᵀ ]    q = [  0 ]
///       [ E    0  ]        [ −1 ]
/// ```
///
/// `C` holds costs `K − M_pq` (zero on the diagonal blocks) with `K` above
/// every linearized payoff, and `E` sums each player's weights.
fn polymatrix_lcp(payoffs: &Payoffs<f64>, sigma: &MixedProfile<f64>) -> Lcp {
    let counts = payoffs.counts();
    let players = counts.len();
    let scale = (players - 2) as f64 / (players - 1) as f64;
    let offsets: Vec<usize> = counts
        .iter()
        .scan(0, |acc, &n| {
            let start = *acc;
            *acc += n;
            Some(start)
        })
        .collect();
    let strategies: usize = counts.iter().sum();

    let mut blocks = Vec::with_capacity(players * (players - 1));
    let mut max = f64::NEG_INFINITY;
    for p in 0..players {
        let own = payoffs.strategy_values(sigma, p);
        for q in (0..players).filter(|&q| q != p) {
            let mut block = payoffs.pair_values(sigma, p, q);
            for (row, value) in block.iter_mut().zip(&own) {
                for entry in row.iter_mut() {
                    *entry -= scale * value;
                    max = max.max(*entry);
                }
            }
            blocks.push((p, q, block));
        }
    }
    let ceiling = max + 1.0;

    let size = strategies + players;
    let mut m = vec![vec![0.0; size]; size];
    for (p, q, block) in blocks {
        for (a, row) in block.iter().enumerate() {
            for (b, value) in row.iter().enumerate() {
                m[offsets[p] + a][offsets[q] + b] = ceiling - value;
            }
        }
    }
    for p in 0..players {
        for a in 0..counts[p] {
            m[offsets[p] + a][strategies + p] = -1.0;
            m[strategies + p][offsets[p] + a] = 1.0;
        }
    }

    let mut q = vec![0.0; strategies];
    q.extend(std::iter::repeat(-1.0).take(players));
    Lcp::new(m, q)
}

/// Each player's first pure best response to `sigma`.
fn best_response(payoffs: &Payoffs<f64>, sigma: &MixedProfile<f64>) -> MixedProfile<f64> {
    let probs = (0..payoffs.num_players())
        .map(|player| {
            let values = payoffs.strategy_values(sigma, player);
            let mut best = 0;
            for (s, v) in values.iter().enumerate() {
                if *v > values[best] {
                    best = s;
                }
            }
            (0..values.len()).map(|s| if s == best { 1.0 } else { 0.0 }).collect()
        })
        .collect();
    MixedProfile::new(probs)
}
