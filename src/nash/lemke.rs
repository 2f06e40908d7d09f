//! Lemke's algorithm for linear complementarity problems.
//!
//! Given `M` and `q`, find `z` with
//!
//! ```text
//!   w = q + M z ≥ 0,   z ≥ 0,   wᵀz = 0
//! ```
//!
//! An artificial variable `z0` with covering vector `d = 1` makes the origin
//! feasible; complementary pivoting then drives `z0` out of the basis. Ties in
//! the ratio test are broken lexicographically so degenerate problems do not
//! cycle. Arithmetic is `f64`; the approximation solver only needs it there.

use log::trace;

/// Entries smaller than this are treated as zero when choosing pivots.
const PIVOT_EPSILON: f64 = 1e-12;

/// Default bound on complementary pivots before giving up.
pub const DEFAULT_PIVOT_LIMIT: usize = 100_000;

/// Why Lemke's algorithm stopped without a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcpError {
    /// The entering column had no positive entry.
    RayTermination,
    /// The pivot limit was reached.
    PivotLimit,
}

impl std::fmt::Display for LcpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LcpError::RayTermination => write!(f, "Lemke's algorithm ended on a ray"),
            LcpError::PivotLimit => write!(f, "Lemke's algorithm exceeded its pivot limit"),
        }
    }
}

impl std::error::Error for LcpError {}

/// A linear complementarity problem `(M, q)`.
#[derive(Debug, Clone)]
pub struct Lcp {
    m: Vec<Vec<f64>>,
    q: Vec<f64>,
    pivot_limit: usize,
}

impl Lcp {
    /// Problem with square matrix `m` and vector `q` of the same size.
    ///
    /// # Panics
    /// If `m` is not `q.len()` by `q.len()`.
    pub fn new(m: Vec<Vec<f64>>, q: Vec<f64>) -> Self {
        assert!(
            m.len() == q.len() && m.iter().all(|row| row.len() == q.len()),
            "LCP matrix must be {0}x{0}",
            q.len()
        );
        Self {
            m,
            q,
            pivot_limit: DEFAULT_PIVOT_LIMIT,
        }
    }

    /// Builder method: set the pivot limit.
    pub fn with_pivot_limit(mut self, limit: usize) -> Self {
        self.pivot_limit = limit;
        self
    }

    /// Problem size.
    pub fn size(&self) -> usize {
        self.q.len()
    }

    /// `w = q + M z`.
    pub fn slack(&self, z: &[f64]) -> Vec<f64> {
        self.m
            .iter()
            .zip(&self.q)
            .map(|(row, q)| q + row.iter().zip(z).map(|(a, b)| a * b).sum::<f64>())
            .collect()
    }

    /// Solve by complementary pivoting.
    pub fn solve(&self) -> Result<Vec<f64>, LcpError> {
        let n = self.size();
        if self.q.iter().all(|&q| q >= 0.0) {
            return Ok(vec![0.0; n]);
        }

        let mut tableau = LemkeTableau::new(&self.m, &self.q);
        let artificial = 2 * n;

        // z0 enters at the row with the most negative q, the last one on ties.
        let mut row = 0;
        for r in 1..n {
            if self.q[r] <= self.q[row] {
                row = r;
            }
        }
        let mut leaving = tableau.basis[row];
        tableau.pivot(row, artificial);

        let mut pivots = 0;
        loop {
            if pivots >= self.pivot_limit {
                return Err(LcpError::PivotLimit);
            }
            let entering = complement(leaving, n);
            let row = tableau.ratio_test(entering).ok_or(LcpError::RayTermination)?;
            leaving = tableau.basis[row];
            tableau.pivot(row, entering);
            trace!("pivot {}: column {} enters, {} leaves", pivots, entering, leaving);
            if leaving == artificial {
                return Ok(tableau.solution());
            }
            pivots += 1;
        }
    }
}

/// `w_i` is column `i`, `z_i` is column `n + i`.
fn complement(var: usize, n: usize) -> usize {
    if var < n {
        var + n
    } else {
        var - n
    }
}

/// Dense tableau over columns `[w | z | z0]`, rows kept in `B⁻¹` form.
struct LemkeTableau {
    n: usize,
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    basis: Vec<usize>,
}

impl LemkeTableau {
    /// `w - M z - d z0 = q` with `w` basic.
    fn new(m: &[Vec<f64>], q: &[f64]) -> Self {
        let n = q.len();
        let rows = (0..n)
            .map(|r| {
                let mut row = vec![0.0; 2 * n + 1];
                row[r] = 1.0;
                for (c, v) in m[r].iter().enumerate() {
                    row[n + c] = -v;
                }
                row[2 * n] = -1.0;
                row
            })
            .collect();
        Self {
            n,
            rows,
            rhs: q.to_vec(),
            basis: (0..n).collect(),
        }
    }

    /// Leaving row for `col` by the lexicographic minimum ratio rule.
    ///
    /// Ratios are compared on `(rhs, B⁻¹ row) / coefficient`; `B⁻¹` sits in
    /// the `w` columns since they started as the identity.
    fn ratio_test(&self, col: usize) -> Option<usize> {
        let mut best: Option<usize> = None;
        for r in 0..self.rows.len() {
            if self.rows[r][col] <= PIVOT_EPSILON {
                continue;
            }
            best = match best {
                Some(b) if !self.lex_less(r, b, col) => Some(b),
                _ => Some(r),
            };
        }
        best
    }

    fn lex_less(&self, a: usize, b: usize, col: usize) -> bool {
        let (pa, pb) = (self.rows[a][col], self.rows[b][col]);
        let key = |r: usize, p: f64, k: usize| {
            if k == 0 {
                self.rhs[r] / p
            } else {
                self.rows[r][k - 1] / p
            }
        };
        for k in 0..=self.n {
            let (x, y) = (key(a, pa, k), key(b, pb, k));
            if (x - y).abs() > PIVOT_EPSILON {
                return x < y;
            }
        }
        false
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.rows[row][col];
        for entry in self.rows[row].iter_mut() {
            *entry /= pivot;
        }
        self.rhs[row] /= pivot;

        let pivot_row = self.rows[row].clone();
        let pivot_rhs = self.rhs[row];
        for r in 0..self.rows.len() {
            if r == row {
                continue;
            }
            let factor = self.rows[r][col];
            if factor == 0.0 {
                continue;
            }
            for (entry, p) in self.rows[r].iter_mut().zip(&pivot_row) {
                *entry -= factor * p;
            }
            self.rhs[r] -= factor * pivot_rhs;
        }
        self.basis[row] = col;
    }

    fn solution(&self) -> Vec<f64> {
        let mut z = vec![0.0; self.n];
        for (row, &var) in self.basis.iter().enumerate() {
            if (self.n..2 * self.n).contains(&var) {
                z[var - self.n] = self.rhs[row].max(0.0);
            }
        }
        z
    }
}
