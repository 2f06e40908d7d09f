//! Solver selection.
//!
//! [`solve`] picks one algorithm from the configuration, runs dominance
//! elimination once beforehand when enabled, and hands every profile to a
//! [`ProfileRenderer`] as soon as it is available. Profiles are always mapped
//! back to the full game before rendering.

use log::{info, warn};
use num_rational::BigRational;

use crate::nash::config::SolverConfig;
use crate::nash::dominance::{eliminate_dominated, Reduction};
use crate::nash::enummixed::EnumMixedSolver;
use crate::nash::error::SolveError;
use crate::nash::game::Game;
use crate::nash::ipa::{ApproximateEquilibrium, IpaSolver};
use crate::nash::lrs::LrsEnumerator;
use crate::nash::number::Scalar;
use crate::nash::polytope::VertexEnumerator;
use crate::nash::render::ProfileRenderer;

/// The algorithm a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Native enumeration over exact rationals.
    EnumExact,
    /// Native enumeration over `f64`.
    EnumFloat,
    /// Enumeration with vertices from `lrs`, exact.
    EnumLrs,
    /// Iterated polymatrix approximation.
    Ipa,
}

impl Method {
    /// Pick the method for `config`.
    pub fn from_config(config: &SolverConfig) -> Self {
        if config.approximate {
            Method::Ipa
        } else if config.use_delegated_enumerator {
            Method::EnumLrs
        } else if config.exact_arithmetic {
            Method::EnumExact
        } else {
            Method::EnumFloat
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Method::EnumExact => "enumeration (rational)",
            Method::EnumFloat => "enumeration (floating point)",
            Method::EnumLrs => "enumeration (lrs)",
            Method::Ipa => "polymatrix approximation",
        }
    }
}

/// What a solve produced besides the rendered profiles.
#[derive(Debug, Clone)]
pub enum SolveReport {
    /// Enumeration finished.
    Enumeration {
        /// Extreme equilibria rendered.
        equilibria: usize,
        /// Number of cliques, when clique reporting was on.
        cliques: Option<usize>,
    },
    /// Approximation finished; the profile is in full-game coordinates.
    Approximation(ApproximateEquilibrium),
}

/// Solve `game` as `config` says, streaming profiles to `renderer`.
///
/// Enumeration renders each extreme equilibrium with an empty label, which
/// renderers print as `NE`. With clique reporting on, each clique's members
/// follow labelled `convex-1`, `convex-2`, ... Approximation renders
/// intermediate profiles as `iterate-k` when verbose, then the result
/// unlabelled, or as `unconverged` when the iteration cap was hit.
pub fn solve<R: ProfileRenderer>(
    game: &Game,
    config: &SolverConfig,
    renderer: &mut R,
) -> Result<SolveReport, SolveError> {
    config.validate()?;
    game.validate()?;

    let reduction = if config.eliminate_dominated {
        eliminate_dominated(game)?
    } else {
        Reduction::identity(game)
    };

    let method = Method::from_config(config);
    info!("solving '{}' by {}", game.title(), method.name());
    match method {
        Method::EnumExact => enumerate(
            EnumMixedSolver::<BigRational, _>::new(),
            &reduction,
            config,
            renderer,
        ),
        Method::EnumFloat => enumerate(EnumMixedSolver::<f64, _>::new(), &reduction, config, renderer),
        Method::EnumLrs => enumerate(
            EnumMixedSolver::<BigRational, _>::with_enumerator(LrsEnumerator::new(&config.lrs_program)),
            &reduction,
            config,
            renderer,
        ),
        Method::Ipa => approximate(&reduction, config, renderer),
    }
}

fn enumerate<T, V, R>(
    solver: EnumMixedSolver<T, V>,
    reduction: &Reduction,
    config: &SolverConfig,
    renderer: &mut R,
) -> Result<SolveReport, SolveError>
where
    T: Scalar,
    V: VertexEnumerator<T>,
    R: ProfileRenderer,
{
    let solution = solver.solve_with(reduction.game(), |equilibrium| {
        renderer.render(&reduction.expand(&equilibrium.profile), "")?;
        Ok(())
    })?;

    let cliques = if config.report_cliques {
        let cliques = solution.cliques();
        for (k, clique) in cliques.iter().enumerate() {
            let label = format!("convex-{}", k + 1);
            for &index in clique {
                renderer.render(&reduction.expand(&solution.equilibria()[index].profile), &label)?;
            }
        }
        Some(cliques.len())
    } else {
        None
    };

    Ok(SolveReport::Enumeration {
        equilibria: solution.len(),
        cliques,
    })
}

fn approximate<R: ProfileRenderer>(
    reduction: &Reduction,
    config: &SolverConfig,
    renderer: &mut R,
) -> Result<SolveReport, SolveError> {
    let solver = IpaSolver::new(config.ipa());
    let mut result = solver.solve_with(reduction.game(), |iteration, profile| {
        renderer.progress(iteration);
        if config.verbose {
            renderer.render(&reduction.expand(profile), &format!("iterate-{}", iteration))?;
        }
        Ok(())
    })?;

    result.profile = reduction.expand(&result.profile);
    let label = if result.is_converged() {
        ""
    } else {
        warn!(
            "reporting unconverged profile after {} iterations (regret {:.3e})",
            result.iterations, result.regret
        );
        "unconverged"
    };
    renderer.render(&result.profile, label)?;
    Ok(SolveReport::Approximation(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games;
    use crate::nash::config::ConfigError;
    use crate::nash::ipa::Convergence;
    use crate::nash::render::MemoryRenderer;

    #[test]
    fn test_method_selection() {
        assert_eq!(Method::from_config(&SolverConfig::default()), Method::EnumExact);
        assert_eq!(Method::from_config(&SolverConfig::floating(4)), Method::EnumFloat);
        assert_eq!(Method::from_config(&SolverConfig::delegated()), Method::EnumLrs);
        assert_eq!(Method::from_config(&SolverConfig::approximation()), Method::Ipa);
    }

    #[test]
    fn test_enumeration_with_cliques() {
        let mut renderer = MemoryRenderer::new(6);
        let config = SolverConfig::default().with_cliques(true);
        let report = solve(&games::coordination(), &config, &mut renderer).unwrap();
        assert!(matches!(
            report,
            SolveReport::Enumeration {
                equilibria: 3,
                cliques: Some(3)
            }
        ));
        assert_eq!(
            renderer.labels(),
            vec!["NE", "NE", "NE", "convex-1", "convex-2", "convex-3"]
        );
        assert_eq!(renderer.rows()[1].1, vec!["1/2", "1/2", "1/2", "1/2"]);
    }

    #[test]
    fn test_degenerate_clique_labels() {
        let mut renderer = MemoryRenderer::new(6);
        let config = SolverConfig::default().with_cliques(true).with_elimination(false);
        solve(&games::indifferent_column(), &config, &mut renderer).unwrap();
        assert_eq!(renderer.labels(), vec!["NE", "NE", "convex-1", "convex-1"]);
        assert_eq!(renderer.rows()[2].1.len(), 4);
    }

    #[test]
    fn test_elimination_expands_profiles() {
        let mut renderer = MemoryRenderer::new(6);
        let report = solve(&games::prisoners_dilemma(), &SolverConfig::default(), &mut renderer).unwrap();
        assert!(matches!(report, SolveReport::Enumeration { equilibria: 1, cliques: None }));
        assert_eq!(renderer.labels(), vec!["NE"]);
        assert_eq!(renderer.rows()[0].1, vec!["0", "1", "0", "1"]);

        let mut unreduced = MemoryRenderer::new(6);
        let config = SolverConfig::default().with_elimination(false);
        solve(&games::prisoners_dilemma(), &config, &mut unreduced).unwrap();
        assert_eq!(unreduced.rows(), renderer.rows());
    }

    #[test]
    fn test_floating_point_rendering() {
        let mut renderer = MemoryRenderer::new(4);
        solve(&games::matching_pennies(), &SolverConfig::floating(4), &mut renderer).unwrap();
        assert_eq!(renderer.rows().len(), 1);
        assert_eq!(renderer.rows()[0].1, vec!["0.5000"; 4]);
    }

    #[test]
    fn test_approximation_labels() {
        let mut renderer = MemoryRenderer::new(3);
        let config = SolverConfig::approximation().with_verbose(true);
        let report = solve(&games::prisoners_dilemma(), &config, &mut renderer).unwrap();
        let result = match report {
            SolveReport::Approximation(result) => result,
            other => panic!("unexpected report {:?}", other),
        };
        assert!(result.is_converged());
        let labels = renderer.labels();
        assert_eq!(labels.len(), result.iterations + 1);
        assert_eq!(labels[0], "iterate-1");
        assert_eq!(labels.last(), Some(&"NE"));
        assert_eq!(renderer.rows().last().unwrap().1, vec!["0.000", "1.000", "0.000", "1.000"]);
    }

    #[test]
    fn test_unconverged_label() {
        let mut renderer = MemoryRenderer::new(3);
        let config = SolverConfig::approximation().with_iteration_cap(2);
        solve(&games::prisoners_dilemma(), &config, &mut renderer).unwrap();
        assert_eq!(renderer.labels(), vec!["unconverged"]);
    }

    #[test]
    fn test_cycling_game_is_reported_unconverged() {
        let mut renderer = MemoryRenderer::new(3);
        let config = SolverConfig::approximation().with_elimination(false);
        let report = solve(&games::three_player_cycle(), &config, &mut renderer).unwrap();
        match report {
            SolveReport::Approximation(result) => {
                assert_eq!(result.status, Convergence::IterationLimit);
                assert_eq!(result.iterations, config.iteration_cap);
                assert!(result.regret.is_finite());
            }
            other => panic!("unexpected report {:?}", other),
        }
        assert_eq!(renderer.labels(), vec!["unconverged"]);
    }

    #[test]
    fn test_approximation_after_elimination() {
        let mut renderer = MemoryRenderer::new(3);
        let config = SolverConfig::approximation().with_elimination(true);
        let report = solve(&games::iterated_dominance(), &config, &mut renderer).unwrap();
        match report {
            SolveReport::Approximation(result) => {
                assert_eq!(result.profile.probs(), &[vec![1.0, 0.0], vec![0.0, 1.0, 0.0]]);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        let mut renderer = MemoryRenderer::new(6);
        let config = SolverConfig::default();
        assert!(matches!(
            solve(&games::three_player_matching(), &config, &mut renderer),
            Err(SolveError::InvalidGame(_))
        ));

        let config = SolverConfig::delegated().with_lrs_program("/nonexistent/lrs-binary");
        assert!(matches!(
            solve(&games::coordination(), &config, &mut renderer),
            Err(SolveError::DelegateFailure(_))
        ));

        let config = SolverConfig::default().with_decimals(40);
        assert!(matches!(
            solve(&games::coordination(), &config, &mut renderer),
            Err(SolveError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(renderer.rows().is_empty());
    }
}
