//! Errors reported by the solvers.

use std::fmt;

use crate::nash::config::ConfigError;

/// Reasons a solve could not produce a result.
///
/// "No equilibria exist" is never an error: it is an empty result. Every
/// variant here means the solver could not determine the equilibria.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The game is structurally unusable (empty strategy set, wrong number of
    /// players for the chosen solver, malformed payoff table).
    InvalidGame(String),
    /// Floating-point pivoting produced a non-finite value.
    Arithmetic(String),
    /// The external vertex enumerator failed or its output could not be read.
    DelegateFailure(String),
    /// The solver configuration was rejected.
    Config(ConfigError),
    /// The renderer could not write a profile.
    Render(String),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidGame(msg) => write!(f, "invalid game: {}", msg),
            SolveError::Arithmetic(msg) => write!(f, "numeric failure: {}", msg),
            SolveError::DelegateFailure(msg) => write!(f, "vertex enumerator failed: {}", msg),
            SolveError::Config(err) => write!(f, "invalid configuration: {}", err),
            SolveError::Render(msg) => write!(f, "could not write profile: {}", msg),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<ConfigError> for SolveError {
    fn from(err: ConfigError) -> Self {
        SolveError::Config(err)
    }
}

impl From<std::io::Error> for SolveError {
    fn from(err: std::io::Error) -> Self {
        SolveError::Render(err.to_string())
    }
}
