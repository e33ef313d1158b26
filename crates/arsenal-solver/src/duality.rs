use tracing::warn;

use crate::config::SolverConfig;
use crate::data::ProblemData;
use crate::error::SolveError;
use crate::solution::{DualSolution, Solution, SolutionStatus};
use crate::{dual, primal};

/// Primal and dual solutions of the same problem, checked against each other
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PrimalDualPair {
    primal: Solution,
    dual: DualSolution,
}

impl PrimalDualPair {
    pub fn primal(&self) -> &Solution {
        &self.primal
    }

    pub fn dual(&self) -> &DualSolution {
        &self.dual
    }

    /// Primal cost minus dual revenue, when both are optimal
    pub fn duality_gap(&self) -> Option<f64> {
        Some(self.primal.objective_value()? - self.dual.objective_value()?)
    }
}

/// Solve both problems and cross-validate them
pub fn solve_pair(data: &ProblemData, config: &SolverConfig) -> Result<PrimalDualPair, SolveError> {
    let primal = primal::solve(data, config)?;
    let dual = dual::solve(data, config)?;
    verify(&primal, &dual, config)?;
    Ok(PrimalDualPair { primal, dual })
}

/// Check that two solutions of the same problem are consistent.
///
/// Both optimal: objectives must agree within `config.tolerance`, an
/// absolute bound. An infeasible primal must come with an unbounded or
/// infeasible dual. So may an optimal primal that misses a requirement by no
/// more than the tolerance, since the exact problem has no feasible plan.
/// Anything else signals a modeling or numerical bug.
pub fn verify(primal: &Solution, dual: &DualSolution, config: &SolverConfig) -> Result<(), SolveError> {
    match (primal.status(), dual.status()) {
        (SolutionStatus::Optimal, SolutionStatus::Optimal) => {
            let (Some(p), Some(d)) = (primal.objective_value(), dual.objective_value()) else {
                return Err(SolveError::StatusMismatch {
                    primal: primal.status().label(),
                    dual: dual.status().label(),
                });
            };
            let tolerance = config.tolerance;
            if (p - d).abs() > tolerance {
                warn!(primal = p, dual = d, tolerance, "strong duality violated");
                return Err(SolveError::DualityMismatch {
                    primal: p,
                    dual: d,
                    tolerance,
                });
            }
            Ok(())
        }
        (SolutionStatus::Infeasible, SolutionStatus::Unbounded | SolutionStatus::Infeasible) => Ok(()),
        (SolutionStatus::Optimal, SolutionStatus::Unbounded) if met_within_tolerance_only(primal) => Ok(()),
        (p, d) => Err(SolveError::StatusMismatch {
            primal: p.label(),
            dual: d.label(),
        }),
    }
}

/// Some requirement is short of its minimum, by no more than the tolerance
fn met_within_tolerance_only(primal: &Solution) -> bool {
    primal
        .diagnostics()
        .is_some_and(|d| d.requirements.iter().any(|r| r.surplus < 0.0))
}
