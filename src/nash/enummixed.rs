//! Extreme equilibrium enumeration for two-player games.
//!
//! The solver enumerates the vertices of both best-response polytopes and
//! pairs every two non-origin vertices whose labels are complementary. Each
//! such pair, normalized, is an extreme equilibrium; together they span the
//! whole equilibrium set.

use std::marker::PhantomData;
use std::time::Instant;

use log::{debug, info};
use serde::Serialize;

use crate::nash::cliques::{CliqueBuilder, NashSubset};
use crate::nash::config::EnumStats;
use crate::nash::error::SolveError;
use crate::nash::game::Game;
use crate::nash::number::Scalar;
use crate::nash::polytope::{BestResponsePolytope, PivotingEnumerator, PolytopeVertex, VertexEnumerator};
use crate::nash::profile::MixedProfile;

/// An extreme equilibrium and the polytope vertices it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeEquilibrium<T> {
    /// The normalized strategy profile.
    pub profile: MixedProfile<T>,
    /// Index of the vertex on each player's polytope.
    pub vertices: (usize, usize),
}

/// Enumerates extreme equilibria with a pluggable vertex enumerator.
///
/// # Type Parameters
/// - `T`: numeric domain (`BigRational` for exact results, `f64` for speed)
/// - `V`: vertex enumerator back-end
///
/// # Example
/// ```
/// use nash_enum::games;
/// use nash_enum::nash::EnumMixedSolver;
/// use num_rational::BigRational;
///
/// let solver = EnumMixedSolver::<BigRational, _>::new();
/// let equilibria = solver.solve(&games::coordination()).unwrap();
/// assert_eq!(equilibria.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct EnumMixedSolver<T, V = PivotingEnumerator> {
    enumerator: V,
    _phantom: PhantomData<T>,
}

impl<T: Scalar> EnumMixedSolver<T, PivotingEnumerator> {
    /// Solver using native pivoting enumeration.
    pub fn new() -> Self {
        Self::with_enumerator(PivotingEnumerator)
    }
}

impl<T: Scalar> Default for EnumMixedSolver<T, PivotingEnumerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, V: VertexEnumerator<T>> EnumMixedSolver<T, V> {
    /// Solver using the given vertex enumerator.
    pub fn with_enumerator(enumerator: V) -> Self {
        Self {
            enumerator,
            _phantom: PhantomData,
        }
    }

    /// The vertex enumerator in use.
    pub fn enumerator(&self) -> &V {
        &self.enumerator
    }

    /// All extreme equilibria of `game`.
    pub fn solve(&self, game: &Game) -> Result<Vec<MixedProfile<T>>, SolveError> {
        Ok(self.solve_detailed(game)?.profiles())
    }

    /// All extreme equilibria together with the vertex index they came from.
    pub fn solve_detailed(&self, game: &Game) -> Result<EnumMixedSolution<T>, SolveError> {
        self.solve_with(game, |_| Ok(()))
    }

    /// Enumerate, calling `on_equilibrium` for each extreme equilibrium as
    /// soon as it is found.
    ///
    /// An error from the callback stops the enumeration and is returned.
    pub fn solve_with<F>(&self, game: &Game, mut on_equilibrium: F) -> Result<EnumMixedSolution<T>, SolveError>
    where
        F: FnMut(&ExtremeEquilibrium<T>) -> Result<(), SolveError>,
    {
        game.validate()?;
        let start = Instant::now();
        let polytopes = BestResponsePolytope::<T>::pair(game)?;
        let num_labels = polytopes[0].num_labels();

        let mut stats = EnumStats::new();
        let mut vertices: [Vec<PolytopeVertex<T>>; 2] = [Vec::new(), Vec::new()];
        for (player, polytope) in polytopes.iter().enumerate() {
            let found = self.enumerator.vertices(polytope)?;
            stats.vertices[player] = found.points.len();
            stats.bases_visited += found.bases_visited;
            vertices[player] = found.points.into_iter().map(|p| polytope.vertex(p)).collect();
            debug!(
                "{}: {} vertices for player {}",
                self.enumerator.name(),
                vertices[player].len(),
                player + 1
            );
        }

        let mut equilibria = Vec::new();
        for (i, x) in vertices[0].iter().enumerate() {
            if x.is_origin() {
                continue;
            }
            for (j, y) in vertices[1].iter().enumerate() {
                if y.is_origin() || !x.is_complementary(y, num_labels) {
                    continue;
                }
                let equilibrium = ExtremeEquilibrium {
                    profile: MixedProfile::from_weights(vec![x.point.clone(), y.point.clone()]),
                    vertices: (i, j),
                };
                debug!("equilibrium {} from vertices ({}, {})", equilibrium.profile, i, j);
                on_equilibrium(&equilibrium)?;
                equilibria.push(equilibrium);
            }
        }

        stats.equilibria = equilibria.len();
        stats.elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            "{} extreme equilibria from {} x {} vertices in {:.3}s",
            stats.equilibria, stats.vertices[0], stats.vertices[1], stats.elapsed_seconds
        );

        Ok(EnumMixedSolution {
            vertices,
            equilibria,
            stats,
        })
    }
}

/// Everything an enumeration produced.
///
/// The vertex pair of each equilibrium is kept so connected components can be
/// built from it without redoing any geometry.
#[derive(Debug, Clone)]
pub struct EnumMixedSolution<T> {
    vertices: [Vec<PolytopeVertex<T>>; 2],
    equilibria: Vec<ExtremeEquilibrium<T>>,
    stats: EnumStats,
}

impl<T: Scalar> EnumMixedSolution<T> {
    /// Extreme equilibria in discovery order.
    pub fn equilibria(&self) -> &[ExtremeEquilibrium<T>] {
        &self.equilibria
    }

    /// Copies of the equilibrium profiles in discovery order.
    pub fn profiles(&self) -> Vec<MixedProfile<T>> {
        self.equilibria.iter().map(|e| e.profile.clone()).collect()
    }

    /// Number of extreme equilibria.
    pub fn len(&self) -> usize {
        self.equilibria.len()
    }

    /// Whether the game has no equilibrium found (only possible for invalid
    /// input, since every finite game has one).
    pub fn is_empty(&self) -> bool {
        self.equilibria.is_empty()
    }

    /// Vertices of `player`'s polytope, with labels.
    pub fn vertices(&self, player: usize) -> &[PolytopeVertex<T>] {
        &self.vertices[player]
    }

    /// Vertex index pair of every equilibrium, in discovery order.
    pub fn vertex_pairs(&self) -> Vec<(usize, usize)> {
        self.equilibria.iter().map(|e| e.vertices).collect()
    }

    /// Enumeration statistics.
    pub fn stats(&self) -> &EnumStats {
        &self.stats
    }

    /// Connected components of the equilibrium set, as equilibrium indices.
    pub fn cliques(&self) -> Vec<Vec<usize>> {
        CliqueBuilder::new(self).build()
    }

    /// Profiles grouped by connected component.
    pub fn clique_profiles(&self) -> Vec<Vec<&MixedProfile<T>>> {
        self.cliques()
            .into_iter()
            .map(|clique| clique.into_iter().map(|i| &self.equilibria[i].profile).collect())
            .collect()
    }

    /// Maximal sets of extreme equilibria whose convex hull is all equilibria.
    pub fn maximal_nash_subsets(&self) -> Vec<NashSubset> {
        CliqueBuilder::new(self).maximal_nash_subsets()
    }

    /// Export the solution as JSON with profiles rendered by `decimals`.
    pub fn to_json(&self, decimals: usize) -> serde_json::Result<String> {
        let export = SolutionExport {
            equilibria: self.equilibria.iter().map(|e| e.profile.render(decimals)).collect(),
            cliques: self.cliques(),
            stats: self.stats.clone(),
        };
        serde_json::to_string_pretty(&export)
    }
}

/// Serializable export format for a solution.
#[derive(Debug, Clone, Serialize)]
struct SolutionExport {
    equilibria: Vec<Vec<String>>,
    cliques: Vec<Vec<usize>>,
    stats: EnumStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games;
    use crate::nash::number::{ratio, rational};
    use num_rational::BigRational;

    fn assert_all_nash<T: Scalar>(game: &Game, profiles: &[MixedProfile<T>]) {
        for profile in profiles {
            assert!(profile.is_normalized(), "{} is not normalized", profile);
            assert!(profile.is_nash(game), "{} is not an equilibrium", profile);
        }
    }

    #[test]
    fn test_coordination_three_equilibria() {
        let game = games::coordination();
        let solution = EnumMixedSolver::<BigRational, _>::new().solve_detailed(&game).unwrap();
        let profiles = solution.profiles();
        assert_eq!(profiles.len(), 3);
        assert_all_nash(&game, &profiles);

        let half = ratio(1, 2);
        let (one, zero) = (rational(1), rational(0));
        let expected = [
            MixedProfile::new(vec![vec![one.clone(), zero.clone()], vec![one.clone(), zero.clone()]]),
            MixedProfile::new(vec![vec![zero.clone(), one.clone()], vec![zero, one]]),
            MixedProfile::new(vec![vec![half.clone(), half.clone()], vec![half.clone(), half]]),
        ];
        for e in &expected {
            assert!(profiles.contains(e), "missing {}", e);
        }

        let cliques = solution.cliques();
        assert_eq!(cliques.len(), 3);
        assert!(cliques.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_degenerate_game_single_clique() {
        let game = games::indifferent_column();
        let solution = EnumMixedSolver::<BigRational, _>::new().solve_detailed(&game).unwrap();
        assert_eq!(solution.len(), 2);
        assert_all_nash(&game, &solution.profiles());
        assert_eq!(solution.cliques(), vec![vec![0, 1]]);
    }

    #[test]
    fn test_rock_paper_scissors_unique() {
        let game = games::rock_paper_scissors();
        let profiles = EnumMixedSolver::<BigRational, _>::new().solve(&game).unwrap();
        let third = ratio(1, 3);
        assert_eq!(
            profiles,
            vec![MixedProfile::new(vec![vec![third.clone(); 3], vec![third; 3]])]
        );
    }

    #[test]
    fn test_float_agrees_with_exact() {
        for game in [games::battle_of_sexes(), games::rock_paper_scissors(), games::shapley()] {
            let exact = EnumMixedSolver::<BigRational, _>::new().solve(&game).unwrap();
            let float = EnumMixedSolver::<f64, _>::new().solve(&game).unwrap();
            assert_eq!(exact.len(), float.len(), "{}", game.title());
            assert_all_nash(&game, &float);
            for e in &exact {
                assert!(float.iter().any(|f| f.max_distance(&e.to_f64()) < 1e-9));
            }
        }
    }

    #[test]
    fn test_random_degenerate_games() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        // Payoffs in [-2, 2] make ties, and so degenerate polytopes, common.
        let mut rng = StdRng::seed_from_u64(2024);
        for round in 0..60 {
            let rows = rng.gen_range(1..=4);
            let cols = rng.gen_range(1..=4);
            let mut matrix = || -> Vec<Vec<BigRational>> {
                (0..rows)
                    .map(|_| (0..cols).map(|_| rational(rng.gen_range(-2..=2))).collect())
                    .collect()
            };
            let (a, b) = (matrix(), matrix());
            let game = Game::bimatrix(format!("random {}", round), a, b).unwrap();

            let exact = EnumMixedSolver::<BigRational>::new().solve_detailed(&game).unwrap();
            assert!(!exact.is_empty(), "{}: no equilibrium found", game.title());
            assert_all_nash(&game, &exact.profiles());

            let mut members: Vec<usize> = exact.cliques().into_iter().flatten().collect();
            members.sort_unstable();
            assert_eq!(members, (0..exact.len()).collect::<Vec<_>>(), "{}", game.title());

            let float = EnumMixedSolver::<f64>::new().solve(&game).unwrap();
            assert_eq!(float.len(), exact.len(), "{}", game.title());
            assert_all_nash(&game, &float);
        }
    }

    #[test]
    fn test_single_strategy_player() {
        let game = games::single_row();
        let profiles = EnumMixedSolver::<BigRational, _>::new().solve(&game).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].player(1), &[rational(0), rational(1), rational(0)]);
        assert_all_nash(&game, &profiles);
    }

    #[test]
    fn test_invalid_games_rejected() {
        let empty = Game::new(
            "empty",
            vec![
                crate::nash::Player::numbered("A", 0),
                crate::nash::Player::numbered("B", 2),
            ],
            vec![],
        )
        .unwrap();
        let solver = EnumMixedSolver::<BigRational, _>::new();
        assert!(matches!(solver.solve(&empty), Err(SolveError::InvalidGame(_))));
        assert!(matches!(
            solver.solve(&games::three_player_matching()),
            Err(SolveError::InvalidGame(_))
        ));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let game = games::degenerate_three_by_two();
        let solver = EnumMixedSolver::<BigRational, _>::new();
        let first = solver.solve_detailed(&game).unwrap();
        let second = solver.solve_detailed(&game).unwrap();
        assert_eq!(first.profiles(), second.profiles());
        assert_eq!(first.cliques(), second.cliques());
        assert_all_nash(&game, &first.profiles());

        // Row 1 meets both columns, so the last two equilibria share a vertex.
        assert_eq!(first.len(), 3);
        assert_eq!(first.cliques(), vec![vec![0], vec![1, 2]]);
        let subsets = first.maximal_nash_subsets();
        assert_eq!(subsets.len(), 2);
        assert!(subsets.iter().any(|s| s.equilibria == vec![1, 2]));
    }

    #[test]
    fn test_streaming_callback_sees_every_equilibrium() {
        let game = games::battle_of_sexes();
        let mut seen = Vec::new();
        let solution = EnumMixedSolver::<BigRational, _>::new()
            .solve_with(&game, |e| {
                seen.push(e.vertices);
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, solution.vertex_pairs());
        assert_eq!(solution.stats().equilibria, 3);

        let stopped = EnumMixedSolver::<BigRational, _>::new()
            .solve_with(&game, |_| Err(SolveError::Render("closed".to_string())));
        assert!(matches!(stopped, Err(SolveError::Render(_))));
    }

    #[test]
    fn test_json_export() {
        let solution = EnumMixedSolver::<f64, _>::new()
            .solve_detailed(&games::coordination())
            .unwrap();
        let json = solution.to_json(3).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["equilibria"].as_array().unwrap().len(), 3);
        assert_eq!(value["stats"]["equilibria"], 3);
    }
}
