//! Mixed strategy profiles.

use std::fmt;

use crate::nash::game::{Game, Payoffs};
use crate::nash::number::{rational, sum, Scalar};

/// A probability distribution over each player's pure strategies.
///
/// All players' probabilities are in the same numeric domain `T`, chosen for
/// the whole solve.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedProfile<T> {
    probs: Vec<Vec<T>>,
}

impl<T: Scalar> MixedProfile<T> {
    /// Wrap per-player probability vectors as given.
    pub fn new(probs: Vec<Vec<T>>) -> Self {
        Self { probs }
    }

    /// Scale each player's non-negative weights to sum to one.
    ///
    /// A player whose weights are all zero gets the uniform distribution.
    pub fn from_weights(weights: Vec<Vec<T>>) -> Self {
        let probs = weights
            .into_iter()
            .map(|w| {
                let total = sum(&w);
                if total.is_negligible() {
                    let n = T::from_rational(&rational(w.len() as i64));
                    w.iter().map(|_| T::one() / n.clone()).collect()
                } else {
                    w.into_iter().map(|x| x / total.clone()).collect()
                }
            })
            .collect();
        Self { probs }
    }

    /// The uniform profile for the given strategy counts.
    pub fn uniform(counts: &[usize]) -> Self {
        Self::from_weights(counts.iter().map(|&n| vec![T::zero(); n]).collect())
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.probs.len()
    }

    /// Probabilities of `player`.
    pub fn player(&self, player: usize) -> &[T] {
        &self.probs[player]
    }

    /// Probability that `player` plays `strategy`.
    pub fn get(&self, player: usize, strategy: usize) -> &T {
        &self.probs[player][strategy]
    }

    /// All probabilities, player by player.
    pub fn probs(&self) -> &[Vec<T>] {
        &self.probs
    }

    /// Probabilities of all players concatenated.
    pub fn flatten(&self) -> Vec<T> {
        self.probs.iter().flatten().cloned().collect()
    }

    /// Strategies `player` uses with positive probability.
    pub fn support(&self, player: usize) -> Vec<usize> {
        self.probs[player]
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_strictly_positive())
            .map(|(s, _)| s)
            .collect()
    }

    /// Whether each player's probabilities are non-negative and sum to one.
    pub fn is_normalized(&self) -> bool {
        self.probs.iter().all(|p| {
            p.iter().all(|x| !x.is_strictly_negative()) && sum(p).approx_eq(&T::one())
        })
    }

    /// Largest distance between matching probabilities of two profiles.
    pub fn max_distance(&self, other: &Self) -> T {
        self.probs
            .iter()
            .flatten()
            .zip(other.probs.iter().flatten())
            .map(|(a, b)| (a.clone() - b.clone()).abs())
            .fold(T::zero(), |acc, d| if d > acc { d } else { acc })
    }

    /// Whether this profile is a Nash equilibrium of `game`.
    pub fn is_nash(&self, game: &Game) -> bool {
        Payoffs::from_game(game).is_nash(self)
    }

    /// Largest gain from a unilateral pure deviation in `game`.
    pub fn regret(&self, game: &Game) -> T {
        Payoffs::from_game(game).regret(self)
    }

    /// Approximate this profile in floating point.
    pub fn to_f64(&self) -> MixedProfile<f64> {
        MixedProfile {
            probs: self
                .probs
                .iter()
                .map(|p| p.iter().map(Scalar::as_f64).collect())
                .collect(),
        }
    }

    /// Render probabilities for output, player by player.
    pub fn render(&self, decimals: usize) -> Vec<String> {
        self.probs.iter().flatten().map(|p| p.render(decimals)).collect()
    }
}

impl<T: Scalar> fmt::Display for MixedProfile<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let players: Vec<String> = self
            .probs
            .iter()
            .map(|p| {
                let entries: Vec<String> = p.iter().map(ToString::to_string).collect();
                format!("({})", entries.join(", "))
            })
            .collect();
        write!(f, "{}", players.join(" "))
    }
}
