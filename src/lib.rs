//! # Nash Enum
//!
//! Computes Nash equilibria of finite strategic-form games.
//!
//! ## Features
//!
//! - **Extreme Equilibrium Enumeration**: All extreme equilibria of a
//!   two-player game, over exact rationals or floating point
//! - **Interchangeable Vertex Enumerators**: Native exact pivoting, or the
//!   external `lrs` reverse-search program
//! - **Connected Components**: Groups extreme equilibria into cliques of the
//!   equilibrium set
//! - **Iterated Polymatrix Approximation**: A damped fixed-point solver for
//!   games with any number of players
//! - **Dominance Elimination**: Iterated removal of strictly dominated strategies
//!
//! ## Quick Start
//!
//! ```ignore
//! use nash_enum::nash::{EnumMixedSolver, Game};
//! use num_rational::BigRational;
//!
//! let game = Game::from_json_file("coordination.json")?;
//! let solver = EnumMixedSolver::<BigRational, _>::new();
//! let solution = solver.solve_detailed(&game)?;
//!
//! for (k, clique) in solution.cliques().iter().enumerate() {
//!     println!("convex-{}: {:?}", k + 1, clique);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`nash`]: Game model, solvers, clique construction and dispatch
//! - [`games`]: Reference games with known equilibria
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     dispatch::solve (config)                   │
//! │        dominance elimination  ·  renderer  ·  labels           │
//! └────────────────────────────────────────────────────────────────┘
//!                 │                                  │
//!                 ▼                                  ▼
//!      ┌─────────────────────┐            ┌─────────────────────┐
//!      │   EnumMixedSolver   │            │      IpaSolver      │
//!      │  (two players, T)   │            │  (N players, f64)   │
//!      └─────────────────────┘            └─────────────────────┘
//!           │           │                            │
//!           ▼           ▼                            ▼
//!   ┌────────────┐ ┌────────────┐             ┌────────────┐
//!   │  Pivoting  │ │    lrs     │             │   Lemke    │
//!   │ enumerator │ │ (external) │             │ LCP solver │
//!   └────────────┘ └────────────┘             └────────────┘
//!           │
//!           ▼
//!    CliqueBuilder
//! ```

#![warn(missing_docs)]

/// Equilibrium computation module.
///
/// This is the core module containing the game model and all solvers.
pub mod nash;

/// Reference games module.
///
/// Contains small games with known equilibria for testing and benchmarks.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use nash::{
    solve, ApproximateEquilibrium, EnumMixedSolution, EnumMixedSolver, Game, IpaSolver,
    MixedProfile, Scalar, SolveError, SolverConfig,
};
