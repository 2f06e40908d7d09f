//! Configuration options for the solvers.
//!
//! This module provides configuration structs that select which solver runs
//! and control its arithmetic, preprocessing and output.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a solve.
///
/// Exactly one solver runs per solve:
/// - `approximate` selects iterated polymatrix approximation
/// - otherwise `use_delegated_enumerator` selects the external `lrs` program
/// - otherwise `exact_arithmetic` picks rational or floating-point enumeration
///
/// # Example
/// ```
/// use nash_enum::nash::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert!(config.exact_arithmetic); // exact rationals by default
/// assert!(config.eliminate_dominated);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Enumerate over exact rationals instead of `f64`.
    pub exact_arithmetic: bool,

    /// Digits after the decimal point when printing floating-point profiles.
    pub num_decimals: usize,

    /// Remove strictly dominated strategies before solving.
    pub eliminate_dominated: bool,

    /// Enumerate polytope vertices with the external `lrs` program.
    pub use_delegated_enumerator: bool,

    /// Group extreme equilibria into connected components and report them.
    pub report_cliques: bool,

    /// Report every intermediate profile of the approximate solver.
    pub verbose: bool,

    /// Maximum number of approximation iterations.
    pub iteration_cap: usize,

    /// Run the approximate solver instead of enumerating.
    pub approximate: bool,

    /// Step size below which the approximate solver has converged.
    pub tolerance: f64,

    /// Weight kept on the previous profile at each approximation step.
    ///
    /// Must be in `[0, 1)`; 0 jumps straight to each linearized solution.
    pub damping: f64,

    /// Seed for a random starting profile. `None` starts from the centroid.
    pub seed: Option<u64>,

    /// Path or name of the `lrs` executable.
    pub lrs_program: PathBuf,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            exact_arithmetic: true,
            num_decimals: 6,
            eliminate_dominated: true,
            use_delegated_enumerator: false,
            report_cliques: false,
            verbose: false,
            iteration_cap: 1000,
            approximate: false,
            tolerance: 1e-6,
            damping: 0.2,
            seed: None,
            lrs_program: PathBuf::from("lrs"),
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Floating-point enumeration, printing `decimals` digits.
    pub fn floating(decimals: usize) -> Self {
        Self {
            exact_arithmetic: false,
            num_decimals: decimals,
            ..Default::default()
        }
    }

    /// Enumeration delegated to `lrs`.
    pub fn delegated() -> Self {
        Self {
            use_delegated_enumerator: true,
            ..Default::default()
        }
    }

    /// Iterated polymatrix approximation.
    ///
    /// Dominance elimination is off, as in the standalone approximation tool.
    pub fn approximation() -> Self {
        Self {
            approximate: true,
            exact_arithmetic: false,
            eliminate_dominated: false,
            ..Default::default()
        }
    }

    /// Builder method: set whether to use exact arithmetic.
    pub fn with_exact_arithmetic(mut self, enable: bool) -> Self {
        self.exact_arithmetic = enable;
        self
    }

    /// Builder method: set the number of printed decimals.
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.num_decimals = decimals;
        self
    }

    /// Builder method: set whether to eliminate dominated strategies.
    pub fn with_elimination(mut self, enable: bool) -> Self {
        self.eliminate_dominated = enable;
        self
    }

    /// Builder method: set whether to report cliques.
    pub fn with_cliques(mut self, enable: bool) -> Self {
        self.report_cliques = enable;
        self
    }

    /// Builder method: set verbose approximation output.
    pub fn with_verbose(mut self, enable: bool) -> Self {
        self.verbose = enable;
        self
    }

    /// Builder method: set the approximation iteration cap.
    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = cap;
        self
    }

    /// Builder method: set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the `lrs` executable.
    pub fn with_lrs_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.lrs_program = program.into();
        self
    }

    /// Settings for the approximate solver.
    pub fn ipa(&self) -> IpaConfig {
        IpaConfig {
            iteration_cap: self.iteration_cap,
            tolerance: self.tolerance,
            damping: self.damping,
            seed: self.seed,
        }
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_decimals > 17 {
            return Err(ConfigError::InvalidValue {
                field: "num_decimals".to_string(),
                message: format!("{} digits exceeds f64 precision", self.num_decimals),
            });
        }
        if self.approximate && self.use_delegated_enumerator {
            return Err(ConfigError::InvalidValue {
                field: "approximate".to_string(),
                message: "cannot approximate and delegate enumeration at once".to_string(),
            });
        }
        self.ipa().validate()
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Settings for iterated polymatrix approximation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpaConfig {
    /// Maximum number of iterations before giving up.
    pub iteration_cap: usize,
    /// Converged once a step moves no probability by more than this.
    pub tolerance: f64,
    /// Weight kept on the previous profile, in `[0, 1)`.
    pub damping: f64,
    /// Seed for a random starting profile.
    pub seed: Option<u64>,
}

impl Default for IpaConfig {
    fn default() -> Self {
        SolverConfig::default().ipa()
    }
}

impl IpaConfig {
    /// Builder method: set the iteration cap.
    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = cap;
        self
    }

    /// Builder method: set the damping weight.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "iteration_cap".to_string(),
                message: "must allow at least one iteration".to_string(),
            });
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "tolerance".to_string(),
                message: format!("{} is not a positive number", self.tolerance),
            });
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(ConfigError::InvalidValue {
                field: "damping".to_string(),
                message: format!("{} is out of range [0, 1)", self.damping),
            });
        }
        Ok(())
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field holds an unusable value.
    InvalidValue {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
    /// The file could not be read.
    IoError(String),
    /// The document is not valid JSON for this type.
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid value for {}: {}", field, message)
            }
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics gathered during enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumStats {
    /// Vertices found on each player's best-response polytope.
    pub vertices: [usize; 2],

    /// Feasible bases visited by the pivoting enumerator (0 for `lrs`).
    pub bases_visited: usize,

    /// Extreme equilibria found.
    pub equilibria: usize,

    /// Total time spent enumerating (in seconds).
    pub elapsed_seconds: f64,
}

impl EnumStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SolverConfig::default().validate().is_ok());
        assert!(SolverConfig::approximation().validate().is_ok());
        assert!(SolverConfig::floating(4).validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = SolverConfig::default().with_iteration_cap(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "iteration_cap"
        ));

        let mut config = SolverConfig::approximation();
        config.damping = 1.0;
        assert!(config.validate().is_err());

        let config = SolverConfig::delegated();
        let mut both = config.clone();
        both.approximate = true;
        assert!(both.validate().is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_partial_document() {
        let config = SolverConfig::from_json_str(r#"{"exact_arithmetic": false, "num_decimals": 3}"#)
            .unwrap();
        assert!(!config.exact_arithmetic);
        assert_eq!(config.num_decimals, 3);
        assert_eq!(config.iteration_cap, 1000);

        assert!(matches!(
            SolverConfig::from_json_str("{not json"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            SolverConfig::from_json_str(r#"{"tolerance": -1.0}"#),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_ipa_settings_follow_solver_config() {
        let ipa = SolverConfig::approximation().with_seed(7).with_tolerance(1e-8).ipa();
        assert_eq!(ipa.seed, Some(7));
        assert_eq!(ipa.tolerance, 1e-8);
        assert_eq!(IpaConfig::default().iteration_cap, 1000);
    }
}
