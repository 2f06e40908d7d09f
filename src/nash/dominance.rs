//! Iterated elimination of strictly dominated strategies.
//!
//! A pure strategy is removed when another pure strategy of the same player
//! does strictly better against every pure profile of the others. Rounds
//! repeat until nothing changes. Comparisons are exact, on the game's
//! rational payoffs, so the result does not depend on the solve domain.

use log::{debug, info};

use crate::nash::error::SolveError;
use crate::nash::game::{advance, Game};
use crate::nash::number::Scalar;
use crate::nash::profile::MixedProfile;

/// A game with dominated strategies removed, and the map back to the original.
#[derive(Debug, Clone)]
pub struct Reduction {
    game: Game,
    kept: Vec<Vec<usize>>,
    original_counts: Vec<usize>,
}

impl Reduction {
    /// The reduction that removes nothing.
    pub fn identity(game: &Game) -> Self {
        let counts = game.strategy_counts();
        Self {
            game: game.clone(),
            kept: counts.iter().map(|&n| (0..n).collect()).collect(),
            original_counts: counts,
        }
    }

    /// The reduced game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Original indices of the surviving strategies, per player.
    pub fn kept(&self) -> &[Vec<usize>] {
        &self.kept
    }

    /// Whether no strategy was removed.
    pub fn is_trivial(&self) -> bool {
        self.kept
            .iter()
            .zip(&self.original_counts)
            .all(|(kept, &n)| kept.len() == n)
    }

    /// Number of strategies removed across all players.
    pub fn removed(&self) -> usize {
        let total: usize = self.original_counts.iter().sum();
        total - self.kept.iter().map(Vec::len).sum::<usize>()
    }

    /// Map a profile of the reduced game back to the original game, giving
    /// eliminated strategies probability zero.
    pub fn expand<T: Scalar>(&self, profile: &MixedProfile<T>) -> MixedProfile<T> {
        let probs = self
            .kept
            .iter()
            .zip(&self.original_counts)
            .enumerate()
            .map(|(player, (kept, &n))| {
                let mut full = vec![T::zero(); n];
                for (local, &original) in kept.iter().enumerate() {
                    full[original] = profile.get(player, local).clone();
                }
                full
            })
            .collect();
        MixedProfile::new(probs)
    }
}

/// Remove strictly dominated strategies until none is left.
pub fn eliminate_dominated(game: &Game) -> Result<Reduction, SolveError> {
    game.validate()?;
    let mut reduction = Reduction::identity(game);

    loop {
        let mut changed = false;
        for player in 0..reduction.game.num_players() {
            let survivors = undominated(&reduction.game, player);
            if survivors.len() == reduction.game.num_strategies(player) {
                continue;
            }
            debug!(
                "player {}: keeping strategies {:?} of {}",
                player + 1,
                survivors,
                reduction.game.num_strategies(player)
            );

            let local: Vec<Vec<usize>> = (0..reduction.game.num_players())
                .map(|q| {
                    if q == player {
                        survivors.clone()
                    } else {
                        (0..reduction.game.num_strategies(q)).collect()
                    }
                })
                .collect();
            reduction.kept[player] = survivors.iter().map(|&s| reduction.kept[player][s]).collect();
            reduction.game = reduction.game.restrict(&local);
            changed = true;
        }
        if !changed {
            break;
        }
    }

    if !reduction.is_trivial() {
        info!(
            "eliminated {} dominated strategies, {:?} remain",
            reduction.removed(),
            reduction.game.strategy_counts()
        );
    }
    Ok(reduction)
}

/// Strategies of `player` not strictly dominated by another pure strategy.
fn undominated(game: &Game, player: usize) -> Vec<usize> {
    let n = game.num_strategies(player);
    (0..n)
        .filter(|&s| !(0..n).any(|t| t != s && dominates(game, player, t, s)))
        .collect()
}

/// Whether `better` strictly dominates `worse` for `player`.
fn dominates(game: &Game, player: usize, better: usize, worse: usize) -> bool {
    let mut radix = game.strategy_counts();
    radix[player] = 1;
    let opponents: usize = radix.iter().product();

    let mut strategies = vec![0usize; radix.len()];
    for _ in 0..opponents {
        strategies[player] = better;
        let high = game.payoff(player, &strategies);
        strategies[player] = worse;
        let low = game.payoff(player, &strategies);
        if high <= low {
            return false;
        }
        strategies[player] = 0;
        advance(&mut strategies, &radix);
    }
    true
}
