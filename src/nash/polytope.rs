//! Best-response polytopes and their vertex enumeration.
//!
//! For a bimatrix game (A, B) with every payoff at least 1, player 1's
//! polytope is `P = { x ≥ 0 : Bᵀx ≤ 1 }` and player 2's is
//! `Q = { y ≥ 0 : Ay ≤ 1 }`. Labels are shared between the two: strategy `i`
//! of player 1 is label `i`, strategy `j` of player 2 is label `m + j`.
//!
//! Vertex enumeration sits behind [`VertexEnumerator`] so the native pivoting
//! search and the external `lrs` program are interchangeable.

use log::debug;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::FxHashSet;

use crate::nash::error::SolveError;
use crate::nash::game::Game;
use crate::nash::number::{all_negligible, Scalar};

/// One player's best-response polytope.
#[derive(Debug, Clone)]
pub struct BestResponsePolytope<T> {
    player: usize,
    own_offset: usize,
    opponent_offset: usize,
    num_labels: usize,
    /// `constraints[j][i]`: coefficient of own strategy `i` in the
    /// inequality of opponent strategy `j`.
    constraints: Vec<Vec<T>>,
}

impl<T: Scalar> BestResponsePolytope<T> {
    /// Build both players' polytopes for a two-player game.
    ///
    /// Each player's payoffs are shifted so their minimum is 1; this leaves
    /// the equilibria unchanged and makes both polytopes bounded.
    pub fn pair(game: &Game) -> Result<[Self; 2], SolveError> {
        if game.num_players() != 2 {
            return Err(SolveError::InvalidGame(format!(
                "enumeration needs exactly two players, game has {}",
                game.num_players()
            )));
        }
        let (m, n) = (game.num_strategies(0), game.num_strategies(1));
        let a: Vec<Vec<T>> = shifted(game.matrix(0));
        let b: Vec<Vec<T>> = shifted(game.matrix(1));

        let first = Self {
            player: 0,
            own_offset: 0,
            opponent_offset: m,
            num_labels: m + n,
            constraints: (0..n).map(|j| (0..m).map(|i| b[i][j].clone()).collect()).collect(),
        };
        let second = Self {
            player: 1,
            own_offset: m,
            opponent_offset: 0,
            num_labels: m + n,
            constraints: a,
        };

        for polytope in [&first, &second] {
            if polytope.constraints.iter().flatten().any(|v| !v.is_finite_value()) {
                return Err(SolveError::Arithmetic(format!(
                    "payoffs of player {} overflow the numeric domain",
                    polytope.player + 1
                )));
            }
        }
        Ok([first, second])
    }

    /// The player whose mixed strategy this polytope describes.
    pub fn player(&self) -> usize {
        self.player
    }

    /// Number of own strategies (the space dimension).
    pub fn dimension(&self) -> usize {
        self.constraints.first().map_or(0, Vec::len)
    }

    /// Number of opponent strategies (inequalities besides non-negativity).
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Inequality coefficients, one row per opponent strategy.
    pub fn constraints(&self) -> &[Vec<T>] {
        &self.constraints
    }

    /// Total number of labels in the game.
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Labels of a point: unused own strategies and tight opponent rows.
    pub fn labels(&self, point: &[T]) -> Vec<usize> {
        let mut labels: Vec<usize> = point
            .iter()
            .enumerate()
            .filter(|(_, x)| x.is_negligible())
            .map(|(i, _)| self.own_offset + i)
            .collect();

        for (j, row) in self.constraints.iter().enumerate() {
            let slack = row
                .iter()
                .zip(point)
                .fold(T::one(), |acc, (c, x)| acc - c.clone() * x.clone());
            if slack.is_negligible() {
                labels.push(self.opponent_offset + j);
            }
        }

        labels.sort_unstable();
        labels
    }

    /// Attach labels to a point.
    pub fn vertex(&self, point: Vec<T>) -> PolytopeVertex<T> {
        PolytopeVertex {
            labels: self.labels(&point),
            point,
        }
    }
}

/// Shift a payoff matrix so its smallest entry is 1.
fn shifted<T: Scalar>(matrix: Vec<Vec<BigRational>>) -> Vec<Vec<T>> {
    let min = matrix
        .iter()
        .flatten()
        .fold(None::<BigRational>, |acc, v| match acc {
            Some(m) if m <= *v => Some(m),
            _ => Some(v.clone()),
        })
        .unwrap_or_else(BigRational::zero);
    let shift = BigRational::one() - min;
    matrix
        .into_iter()
        .map(|row| row.into_iter().map(|v| T::from_rational(&(v + shift.clone()))).collect())
        .collect()
}

/// A vertex of a best-response polytope with its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PolytopeVertex<T> {
    /// Unnormalized coordinates.
    pub point: Vec<T>,
    /// Sorted labels.
    pub labels: Vec<usize>,
}

impl<T: Scalar> PolytopeVertex<T> {
    /// Whether this is the origin, which takes part in no equilibrium.
    pub fn is_origin(&self) -> bool {
        all_negligible(&self.point)
    }

    /// Whether this vertex and `other` together carry all `num_labels` labels.
    pub fn is_complementary(&self, other: &Self, num_labels: usize) -> bool {
        let mut covered = vec![false; num_labels];
        for &label in self.labels.iter().chain(&other.labels) {
            covered[label] = true;
        }
        covered.into_iter().all(|c| c)
    }
}

/// Vertices found on one polytope.
#[derive(Debug, Clone)]
pub struct VertexSet<T> {
    /// Distinct vertices in discovery order.
    pub points: Vec<Vec<T>>,
    /// Feasible bases visited to find them (0 when not known).
    pub bases_visited: usize,
}

/// Anything that can list the vertices of a best-response polytope.
pub trait VertexEnumerator<T: Scalar> {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// All vertices of `polytope`, including the origin, without duplicates
    /// and in a deterministic order.
    fn vertices(&self, polytope: &BestResponsePolytope<T>) -> Result<VertexSet<T>, SolveError>;
}

/// Native vertex enumeration by pivoting through every feasible basis.
///
/// Starting from the origin (all slacks basic) the search follows every pivot
/// the ratio test allows, including all ties, so every basis of a degenerate
/// vertex is reached and the feasible-basis graph is covered.
#[derive(Debug, Clone, Copy, Default)]
pub struct PivotingEnumerator;

impl<T: Scalar> VertexEnumerator<T> for PivotingEnumerator {
    fn name(&self) -> &'static str {
        "pivoting"
    }

    fn vertices(&self, polytope: &BestResponsePolytope<T>) -> Result<VertexSet<T>, SolveError> {
        let dim = polytope.dimension();
        let width = dim + polytope.num_constraints();
        let start = Tableau::origin(polytope);

        let mut visited = FxHashSet::default();
        visited.insert(start.key());
        let mut stack = vec![start];
        let mut points: Vec<Vec<T>> = Vec::new();

        while let Some(tableau) = stack.pop() {
            let point = tableau.point(dim);
            if !points.iter().any(|p| same_point(p, &point)) {
                debug!("player {} vertex {:?}", polytope.player() + 1, point);
                points.push(point);
            }

            for col in 0..width {
                if tableau.basis.contains(&col) {
                    continue;
                }
                for row in tableau.leaving_rows(col) {
                    let mut next = tableau.clone();
                    next.pivot(row, col)?;
                    if visited.insert(next.key()) {
                        stack.push(next);
                    }
                }
            }
        }

        Ok(VertexSet {
            points,
            bases_visited: visited.len(),
        })
    }
}

fn same_point<T: Scalar>(a: &[T], b: &[T]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.approx_eq(y))
}

/// Simplex tableau for `Cx + s = 1`, columns `x` then `s`.
#[derive(Debug, Clone)]
struct Tableau<T> {
    rows: Vec<Vec<T>>,
    rhs: Vec<T>,
    basis: Vec<usize>,
}

impl<T: Scalar> Tableau<T> {
    fn origin(polytope: &BestResponsePolytope<T>) -> Self {
        let dim = polytope.dimension();
        let k = polytope.num_constraints();
        let rows = polytope
            .constraints()
            .iter()
            .enumerate()
            .map(|(r, coeffs)| {
                let mut row = coeffs.clone();
                row.extend((0..k).map(|c| if c == r { T::one() } else { T::zero() }));
                row
            })
            .collect();
        Self {
            rows,
            rhs: vec![T::one(); k],
            basis: (dim..dim + k).collect(),
        }
    }

    fn key(&self) -> Vec<usize> {
        let mut key = self.basis.clone();
        key.sort_unstable();
        key
    }

    fn point(&self, dim: usize) -> Vec<T> {
        let mut point = vec![T::zero(); dim];
        for (row, &var) in self.basis.iter().enumerate() {
            if var < dim {
                point[var] = self.rhs[row].clone();
            }
        }
        point
    }

    /// Rows attaining the minimum ratio for entering column `col`.
    fn leaving_rows(&self, col: usize) -> Vec<usize> {
        let mut best: Option<T> = None;
        let mut rows = Vec::new();
        for (r, row) in self.rows.iter().enumerate() {
            let coeff = &row[col];
            if !coeff.is_strictly_positive() {
                continue;
            }
            let ratio = self.rhs[r].clone() / coeff.clone();
            match &best {
                Some(b) if ratio.approx_eq(b) => rows.push(r),
                Some(b) if ratio > *b => {}
                _ => {
                    best = Some(ratio);
                    rows = vec![r];
                }
            }
        }
        rows
    }

    fn pivot(&mut self, row: usize, col: usize) -> Result<(), SolveError> {
        let pivot = self.rows[row][col].clone();
        for entry in self.rows[row].iter_mut() {
            *entry = entry.clone() / pivot.clone();
        }
        self.rhs[row] = self.rhs[row].clone() / pivot;

        let pivot_row = self.rows[row].clone();
        let pivot_rhs = self.rhs[row].clone();
        for r in 0..self.rows.len() {
            if r == row {
                continue;
            }
            let factor = self.rows[r][col].clone();
            if factor.is_zero() {
                continue;
            }
            for (entry, p) in self.rows[r].iter_mut().zip(&pivot_row) {
                *entry = entry.clone() - factor.clone() * p.clone();
            }
            self.rhs[r] = self.rhs[r].clone() - factor * pivot_rhs.clone();
        }
        self.basis[row] = col;

        if self.rhs.iter().chain(self.rows.iter().flatten()).any(|v| !v.is_finite_value()) {
            return Err(SolveError::Arithmetic(format!(
                "pivot on row {} column {} left non-finite entries",
                row, col
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games;
    use crate::nash::number::ratio;

    fn sorted_points(set: VertexSet<BigRational>) -> Vec<Vec<BigRational>> {
        let mut points = set.points;
        points.sort();
        points
    }

    #[test]
    fn test_coordination_vertices_and_labels() {
        let game = games::coordination();
        let [p, q] = BestResponsePolytope::<BigRational>::pair(&game).unwrap();
        assert_eq!(p.dimension(), 2);
        assert_eq!(p.num_labels(), 4);

        let vertices = sorted_points(PivotingEnumerator.vertices(&p).unwrap());
        let zero = ratio(0, 1);
        assert_eq!(
            vertices,
            vec![
                vec![zero.clone(), zero.clone()],
                vec![zero.clone(), ratio(1, 2)],
                vec![ratio(1, 3), ratio(1, 3)],
                vec![ratio(1, 2), zero.clone()],
            ]
        );

        assert_eq!(p.labels(&[ratio(1, 2), zero.clone()]), vec![1, 2]);
        assert_eq!(p.labels(&[ratio(1, 3), ratio(1, 3)]), vec![2, 3]);
        assert_eq!(q.labels(&[ratio(1, 2), zero.clone()]), vec![0, 3]);
        assert_eq!(q.labels(&[zero.clone(), zero]), vec![2, 3]);
    }

    #[test]
    fn test_degenerate_vertices_deduplicated() {
        let game = games::indifferent_column();
        let [p, _] = BestResponsePolytope::<BigRational>::pair(&game).unwrap();
        let set = PivotingEnumerator.vertices(&p).unwrap();
        assert_eq!(set.points.len(), 3);
        assert!(set.bases_visited > set.points.len());
    }

    #[test]
    fn test_float_matches_exact_vertex_count() {
        let game = games::rock_paper_scissors();
        for (exact, float) in BestResponsePolytope::<BigRational>::pair(&game)
            .unwrap()
            .iter()
            .zip(BestResponsePolytope::<f64>::pair(&game).unwrap().iter())
        {
            let exact = PivotingEnumerator.vertices(exact).unwrap();
            let float = PivotingEnumerator.vertices(float).unwrap();
            assert_eq!(exact.points.len(), float.points.len());
        }
    }

    #[test]
    fn test_complementarity() {
        let game = games::coordination();
        let [p, q] = BestResponsePolytope::<BigRational>::pair(&game).unwrap();
        let zero = ratio(0, 1);
        let x = p.vertex(vec![ratio(1, 2), zero.clone()]);
        let y = q.vertex(vec![ratio(1, 2), zero.clone()]);
        let y_other = q.vertex(vec![zero, ratio(1, 2)]);
        assert!(x.is_complementary(&y, 4));
        assert!(!x.is_complementary(&y_other, 4));
        assert!(!x.is_origin());
    }

    #[test]
    fn test_requires_two_players() {
        let game = games::three_player_matching();
        assert!(matches!(
            BestResponsePolytope::<f64>::pair(&game),
            Err(SolveError::InvalidGame(_))
        ));
    }

    #[test]
    fn test_overflowing_payoffs_are_reported() {
        let huge = BigRational::from_float(1e308).unwrap();
        let game = Game::bimatrix(
            "overflow",
            vec![vec![huge.clone(), -huge.clone()]],
            vec![vec![huge.clone(), -huge]],
        )
        .unwrap();
        assert!(matches!(
            BestResponsePolytope::<f64>::pair(&game),
            Err(SolveError::Arithmetic(_))
        ));
    }
}
