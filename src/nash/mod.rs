//! Nash equilibrium computation for strategic-form games.
//!
//! This module provides two independent solvers over a shared game model:
//!
//! 1. **Extreme equilibrium enumeration** for two-player games. Every Nash
//!    equilibrium of a bimatrix game is a convex combination of extreme
//!    equilibria, and those are exactly the complementary vertex pairs of the
//!    two best-response polytopes.
//! 2. **Iterated polymatrix approximation** (IPA) for games with any number of
//!    players, which linearizes the game around the current profile, solves the
//!    linearized game exactly and moves part of the way towards its solution.
//!
//! # Numeric Domains
//!
//! The enumerator is generic over [`Scalar`], implemented for `f64` and
//! `BigRational`. Degenerate games have equilibria lying exactly on polytope
//! faces, so exact arithmetic is the default; floating point is faster and is
//! fine for games in general position.
//!
//! # Usage
//!
//! ```ignore
//! use nash_enum::nash::{EnumMixedSolver, Game, IpaConfig, IpaSolver};
//! use num_rational::BigRational;
//!
//! let game = Game::from_json_file("game.json")?;
//!
//! // Exact enumeration
//! let solver = EnumMixedSolver::<BigRational, _>::new();
//! for profile in solver.solve(&game)? {
//!     println!("{}", profile);
//! }
//!
//! // Approximation
//! let result = IpaSolver::new(IpaConfig::default()).solve(&game)?;
//! println!("{:?} after {} iterations", result.status, result.iterations);
//! ```
//!
//! # Theory
//!
//! For a bimatrix game (A, B) with all payoffs positive, the best-response
//! polytopes are
//!
//! ```text
//! P = { x ≥ 0 : Bᵀx ≤ 1 }        Q = { y ≥ 0 : Ay ≤ 1 }
//! ```
//!
//! A point of P is labelled with the player-1 strategies it does not use and
//! the player-2 strategies that are best responses to it (and Q symmetrically).
//! A pair (x, y) ≠ (0, 0) is an equilibrium, after normalization, exactly when
//! every strategy appears as a label of x or of y.
//!
//! # References
//!
//! - Mangasarian, O. L. "Equilibrium Points of Bimatrix Games" (1964)
//! - Avis, D., Rosenberg, G., Savani, R., von Stengel, B. "Enumeration of Nash
//!   equilibria for two-player games" (2010)
//! - Govindan, S., Wilson, R. "Computing Nash equilibria by iterated polymatrix
//!   approximation" (2004)

pub mod cliques;
pub mod config;
pub mod dispatch;
pub mod dominance;
pub mod enummixed;
pub mod error;
pub mod game;
pub mod ipa;
pub mod lemke;
pub mod lrs;
pub mod number;
pub mod polytope;
pub mod profile;
pub mod render;

// Re-export main types for convenient access
pub use cliques::{CliqueBuilder, NashSubset};
pub use config::{ConfigError, EnumStats, IpaConfig, SolverConfig};
pub use dispatch::{solve, Method, SolveReport};
pub use dominance::{eliminate_dominated, Reduction};
pub use enummixed::{EnumMixedSolution, EnumMixedSolver, ExtremeEquilibrium};
pub use error::SolveError;
pub use game::{Game, Payoffs, Player};
pub use ipa::{ApproximateEquilibrium, Convergence, IpaSolver};
pub use lemke::{Lcp, LcpError};
pub use lrs::LrsEnumerator;
pub use number::{parse_rational, Scalar};
pub use polytope::{BestResponsePolytope, PivotingEnumerator, PolytopeVertex, VertexEnumerator};
pub use profile::MixedProfile;
pub use render::{CsvRenderer, MemoryRenderer, ProfileRenderer};
