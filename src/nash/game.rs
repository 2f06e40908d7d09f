//! Finite strategic-form games.
//!
//! A [`Game`] is immutable once built. Payoffs are stored exactly and are
//! converted into the solve domain through [`Payoffs`], which also carries the
//! expected-payoff computations every solver needs.

use std::fs;
use std::path::Path;

use num_rational::BigRational;
use serde::{Deserialize, Serialize};

use crate::nash::config::ConfigError;
use crate::nash::error::SolveError;
use crate::nash::number::{parse_rational, Scalar};
use crate::nash::profile::MixedProfile;

/// A player and the labels of their pure strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Strategy labels, one per pure strategy.
    pub strategies: Vec<String>,
}

impl Player {
    /// Create a player with strategies labelled `1`, `2`, ...
    pub fn numbered(name: impl Into<String>, num_strategies: usize) -> Self {
        Self {
            name: name.into(),
            strategies: (1..=num_strategies).map(|s| s.to_string()).collect(),
        }
    }
}

/// A finite game in strategic form.
///
/// Pure profiles are indexed in mixed radix with the first player's strategy
/// varying fastest; `payoffs[index][player]` is that player's payoff.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    title: String,
    players: Vec<Player>,
    payoffs: Vec<Vec<BigRational>>,
    strides: Vec<usize>,
}

impl Game {
    /// Build a game, checking that the payoff table matches the players.
    ///
    /// Empty strategy sets are accepted here and rejected by [`Game::validate`],
    /// which every solver calls before doing any work.
    pub fn new(
        title: impl Into<String>,
        players: Vec<Player>,
        payoffs: Vec<Vec<BigRational>>,
    ) -> Result<Self, SolveError> {
        let mut strides = Vec::with_capacity(players.len());
        let mut stride = 1usize;
        for player in &players {
            strides.push(stride);
            stride *= player.strategies.len();
        }

        if payoffs.len() != stride {
            return Err(SolveError::InvalidGame(format!(
                "expected {} payoff rows, found {}",
                stride,
                payoffs.len()
            )));
        }
        if let Some(row) = payoffs.iter().find(|row| row.len() != players.len()) {
            return Err(SolveError::InvalidGame(format!(
                "payoff row has {} entries for {} players",
                row.len(),
                players.len()
            )));
        }

        Ok(Self {
            title: title.into(),
            players,
            payoffs,
            strides,
        })
    }

    /// Build a two-player game from the row player's matrix `a` and the
    /// column player's matrix `b`, both indexed `[row][column]`.
    pub fn bimatrix(
        title: impl Into<String>,
        a: Vec<Vec<BigRational>>,
        b: Vec<Vec<BigRational>>,
    ) -> Result<Self, SolveError> {
        let rows = a.len();
        let cols = a.first().map_or(0, Vec::len);
        if b.len() != rows || a.iter().chain(b.iter()).any(|row| row.len() != cols) {
            return Err(SolveError::InvalidGame(
                "payoff matrices must have identical rectangular shapes".to_string(),
            ));
        }

        let mut payoffs = Vec::with_capacity(rows * cols);
        for col in 0..cols {
            for row in 0..rows {
                payoffs.push(vec![a[row][col].clone(), b[row][col].clone()]);
            }
        }

        let players = vec![Player::numbered("Player 1", rows), Player::numbered("Player 2", cols)];
        Self::new(title, players, payoffs)
    }

    /// Check the structural requirements every solver relies on.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.players.is_empty() {
            return Err(SolveError::InvalidGame("game has no players".to_string()));
        }
        if let Some(player) = self.players.iter().find(|p| p.strategies.is_empty()) {
            return Err(SolveError::InvalidGame(format!(
                "player '{}' has no strategies",
                player.name
            )));
        }
        Ok(())
    }

    /// Game title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Players in order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Number of pure strategies of `player`.
    pub fn num_strategies(&self, player: usize) -> usize {
        self.players[player].strategies.len()
    }

    /// Strategy counts for all players.
    pub fn strategy_counts(&self) -> Vec<usize> {
        self.players.iter().map(|p| p.strategies.len()).collect()
    }

    /// Number of pure strategy profiles.
    pub fn num_profiles(&self) -> usize {
        self.payoffs.len()
    }

    /// Flat index of a pure profile.
    pub fn profile_index(&self, strategies: &[usize]) -> usize {
        strategies
            .iter()
            .zip(self.strides.iter())
            .map(|(&s, &stride)| s * stride)
            .sum()
    }

    /// Pure profile at a flat index.
    pub fn decode(&self, mut index: usize) -> Vec<usize> {
        self.players
            .iter()
            .map(|p| {
                let n = p.strategies.len();
                let s = index % n;
                index /= n;
                s
            })
            .collect()
    }

    /// Payoff to `player` at a pure profile.
    pub fn payoff(&self, player: usize, strategies: &[usize]) -> &BigRational {
        &self.payoffs[self.profile_index(strategies)][player]
    }

    /// Payoff to `player` at a flat profile index.
    pub fn payoff_at(&self, index: usize, player: usize) -> &BigRational {
        &self.payoffs[index][player]
    }

    /// The payoff matrix of `player` in a two-player game, `[row][column]`.
    pub fn matrix(&self, player: usize) -> Vec<Vec<BigRational>> {
        let (rows, cols) = (self.num_strategies(0), self.num_strategies(1));
        (0..rows)
            .map(|r| (0..cols).map(|c| self.payoff(player, &[r, c]).clone()).collect())
            .collect()
    }

    /// The subgame keeping only `kept[p]` strategies of each player, in order.
    pub fn restrict(&self, kept: &[Vec<usize>]) -> Game {
        let players: Vec<Player> = self
            .players
            .iter()
            .zip(kept)
            .map(|(player, keep)| Player {
                name: player.name.clone(),
                strategies: keep.iter().map(|&s| player.strategies[s].clone()).collect(),
            })
            .collect();

        let counts: Vec<usize> = kept.iter().map(Vec::len).collect();
        let total: usize = counts.iter().product();
        let mut payoffs = Vec::with_capacity(total);
        let mut local = vec![0usize; counts.len()];
        for _ in 0..total {
            let original: Vec<usize> = local.iter().zip(kept).map(|(&s, keep)| keep[s]).collect();
            payoffs.push(self.payoffs[self.profile_index(&original)].clone());
            advance(&mut local, &counts);
        }

        let mut strides = Vec::with_capacity(counts.len());
        let mut stride = 1;
        for &n in &counts {
            strides.push(stride);
            stride *= n;
        }

        Game {
            title: self.title.clone(),
            players,
            payoffs,
            strides,
        }
    }

    /// Load a game from a JSON document on disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse a game from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let doc: GameDocument =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        doc.into_game()
    }

    /// Serialize this game as a JSON document with exact payoffs.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let doc = GameDocument {
            title: self.title.clone(),
            players: self.players.clone(),
            payoffs: self
                .payoffs
                .iter()
                .map(|row| row.iter().map(|v| PayoffValue::Text(v.to_string())).collect())
                .collect(),
        };
        serde_json::to_string_pretty(&doc)
    }
}

/// Step a mixed-radix counter, first digit fastest. Wraps to all zeros.
pub(crate) fn advance(digits: &mut [usize], radix: &[usize]) {
    for (d, &n) in digits.iter_mut().zip(radix) {
        *d += 1;
        if *d < n {
            return;
        }
        *d = 0;
    }
}

/// On-disk game format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GameDocument {
    #[serde(default)]
    title: String,
    players: Vec<Player>,
    payoffs: Vec<Vec<PayoffValue>>,
}

/// A payoff written either as a JSON number or as text such as `"2/3"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PayoffValue {
    Number(serde_json::Number),
    Text(String),
}

impl PayoffValue {
    fn to_rational(&self) -> Option<BigRational> {
        match self {
            PayoffValue::Number(n) => parse_rational(&n.to_string()),
            PayoffValue::Text(s) => parse_rational(s),
        }
    }
}

impl GameDocument {
    fn into_game(self) -> Result<Game, ConfigError> {
        let mut payoffs = Vec::with_capacity(self.payoffs.len());
        for (index, row) in self.payoffs.iter().enumerate() {
            let parsed: Option<Vec<BigRational>> = row.iter().map(PayoffValue::to_rational).collect();
            match parsed {
                Some(values) => payoffs.push(values),
                None => {
                    return Err(ConfigError::InvalidValue {
                        field: "payoffs".to_string(),
                        message: format!("row {} contains a value that is not a number", index),
                    })
                }
            }
        }

        Game::new(self.title, self.players, payoffs).map_err(|e| ConfigError::InvalidValue {
            field: "payoffs".to_string(),
            message: e.to_string(),
        })
    }
}

/// A game's payoffs converted into a solve domain.
///
/// Expected payoffs against mixed profiles are computed by a single pass over
/// all pure profiles, skipping those the profile never reaches.
#[derive(Debug, Clone)]
pub struct Payoffs<T> {
    counts: Vec<usize>,
    table: Vec<Vec<T>>,
}

impl<T: Scalar> Payoffs<T> {
    /// Convert a game's payoff table.
    pub fn from_game(game: &Game) -> Self {
        Self {
            counts: game.strategy_counts(),
            table: game
                .payoffs
                .iter()
                .map(|row| row.iter().map(T::from_rational).collect())
                .collect(),
        }
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.counts.len()
    }

    /// Strategy counts per player.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Expected payoff to `player` of each of their pure strategies, with the
    /// other players following `profile`.
    pub fn strategy_values(&self, profile: &MixedProfile<T>, player: usize) -> Vec<T> {
        let mut values = vec![T::zero(); self.counts[player]];
        let mut strategies = vec![0usize; self.counts.len()];
        for row in &self.table {
            let weight = self.weight(profile, &strategies, &[player]);
            if !weight.is_zero() {
                values[strategies[player]] =
                    values[strategies[player]].clone() + weight * row[player].clone();
            }
            advance(&mut strategies, &self.counts);
        }
        values
    }

    /// Expected payoff to `player` for each pair of their own strategy `a` and
    /// `other`'s strategy `b`, with everyone else following `profile`.
    pub fn pair_values(&self, profile: &MixedProfile<T>, player: usize, other: usize) -> Vec<Vec<T>> {
        let mut values = vec![vec![T::zero(); self.counts[other]]; self.counts[player]];
        let mut strategies = vec![0usize; self.counts.len()];
        for row in &self.table {
            let weight = self.weight(profile, &strategies, &[player, other]);
            if !weight.is_zero() {
                let cell = &mut values[strategies[player]][strategies[other]];
                *cell = cell.clone() + weight * row[player].clone();
            }
            advance(&mut strategies, &self.counts);
        }
        values
    }

    /// Expected payoff to `player` under `profile`.
    pub fn expected_payoff(&self, profile: &MixedProfile<T>, player: usize) -> T {
        self.strategy_values(profile, player)
            .into_iter()
            .zip(profile.player(player))
            .fold(T::zero(), |acc, (v, p)| acc + v * p.clone())
    }

    /// Largest gain any player could get by deviating to a pure strategy.
    pub fn regret(&self, profile: &MixedProfile<T>) -> T {
        let mut worst = T::zero();
        for player in 0..self.num_players() {
            let values = self.strategy_values(profile, player);
            let current = values
                .iter()
                .zip(profile.player(player))
                .fold(T::zero(), |acc, (v, p)| acc + v.clone() * p.clone());
            for value in values {
                let gain = value - current.clone();
                if gain > worst {
                    worst = gain;
                }
            }
        }
        worst
    }

    /// Whether every strategy played with positive probability is a best
    /// response to the others.
    pub fn is_nash(&self, profile: &MixedProfile<T>) -> bool {
        (0..self.num_players()).all(|player| {
            let values = self.strategy_values(profile, player);
            let best = values
                .iter()
                .skip(1)
                .fold(values[0].clone(), |acc, v| if *v > acc { v.clone() } else { acc });
            profile
                .player(player)
                .iter()
                .zip(&values)
                .all(|(p, v)| !p.is_strictly_positive() || v.approx_eq(&best))
        })
    }

    fn weight(&self, profile: &MixedProfile<T>, strategies: &[usize], skip: &[usize]) -> T {
        let mut weight = T::one();
        for (q, &s) in strategies.iter().enumerate() {
            if !skip.contains(&q) {
                weight = weight * profile.get(q, s).clone();
            }
        }
        weight
    }
}
