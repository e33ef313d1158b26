//! Seller's problem: revenue-maximizing prices per category.
//!
//! ```text
//! max  sum_i b_i y_i - sum_j u_j w_j
//! s.t. sum_i a_ij y_i - w_j <= c_j   for every lot j
//!      y_i >= 0, w_j >= 0
//! ```
//!
//! `w_j` exists only for lots with a capacity. Without capacities this is
//! the textbook dual of the buyer's problem: no lot may be priced above its
//! unit cost.

use tracing::debug;

use crate::config::SolverConfig;
use crate::data::ProblemData;
use crate::error::SolveError;
use crate::lp::{ConstraintOp, LpOutcome, LpProblem, Solver};
use crate::solution::{CapacityPrice, DualSolution, ShadowPrice, SolutionStatus};

/// Solve the dual problem.
///
/// An unbounded dual is the mirror image of an infeasible primal and is
/// reported through the status, like infeasibility.
pub fn solve(data: &ProblemData, config: &SolverConfig) -> Result<DualSolution, SolveError> {
    config.validate()?;

    let capped: Vec<usize> = data
        .lots()
        .iter()
        .enumerate()
        .filter(|(_, lot)| lot.capacity.is_some())
        .map(|(j, _)| j)
        .collect();

    let problem = build_problem(data, &capped);
    let outcome = Solver::new(config).solve(&problem)?;
    debug!(status = outcome.label(), "dual solved");

    let lp = match outcome {
        LpOutcome::Optimal(lp) => lp,
        LpOutcome::Infeasible => return Ok(DualSolution::without_optimum(SolutionStatus::Infeasible)),
        LpOutcome::Unbounded => return Ok(DualSolution::without_optimum(SolutionStatus::Unbounded)),
    };

    let n_req = data.num_requirements();
    let shadow_prices = data
        .requirements()
        .iter()
        .zip(&lp.values[..n_req])
        .map(|(req, &value)| ShadowPrice {
            category: req.category.clone(),
            value,
        })
        .collect();
    let capacity_prices = capped
        .iter()
        .zip(&lp.values[n_req..])
        .map(|(&j, &value)| CapacityPrice {
            lot: data.lots()[j].id.clone(),
            value,
        })
        .collect();

    Ok(DualSolution::optimal(lp.objective_value, shadow_prices, capacity_prices))
}

fn build_problem(data: &ProblemData, capped: &[usize]) -> LpProblem {
    let n_req = data.num_requirements();
    let lots = data.lots();

    let mut variables: Vec<String> = data
        .requirements()
        .iter()
        .map(|req| format!("price:{}", req.category))
        .collect();
    variables.extend(capped.iter().map(|&j| format!("capacity:{}", lots[j].id)));

    let mut objective: Vec<f64> = data.requirements().iter().map(|req| req.minimum_quantity).collect();
    objective.extend(capped.iter().filter_map(|&j| lots[j].capacity).map(|cap| -cap));

    let n_vars = variables.len();
    let mut problem = LpProblem::maximize(variables, objective);

    for (j, lot) in lots.iter().enumerate() {
        let mut coefficients = vec![0.0; n_vars];
        for (i, coef) in coefficients.iter_mut().enumerate().take(n_req) {
            *coef = data.coverage_row(i)[j];
        }
        if let Some(k) = capped.iter().position(|&c| c == j) {
            coefficients[n_req + k] = -1.0;
        }
        problem.add_row(lot.id.clone(), coefficients, ConstraintOp::Le, lot.unit_cost);
    }

    problem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Lot, Requirement};

    #[test]
    fn test_single_lot_dual() {
        let data = ProblemData::from_structured_input(
            vec![Lot::new("L1", 10.0, Some(5.0))],
            vec![Requirement::new("C1", 3.0, [("L1", 1.0)])],
        )
        .unwrap();
        let dual = solve(&data, &SolverConfig::default()).unwrap();

        assert_eq!(dual.status(), SolutionStatus::Optimal);
        assert!((dual.objective_value().unwrap() - 30.0).abs() < 1e-6);
        assert!((dual.shadow_price("C1").unwrap() - 10.0).abs() < 1e-6);
        assert!(dual.capacity_prices()[0].value.abs() < 1e-6);
    }

    #[test]
    fn test_capacity_price_when_cap_binds() {
        // Buyer: 4 units of L1 at 2, then 2 units of L2 at 5 -> 18
        let data = ProblemData::from_structured_input(
            vec![Lot::new("L1", 2.0, Some(4.0)), Lot::new("L2", 5.0, Some(10.0))],
            vec![Requirement::new("C1", 6.0, [("L1", 1.0), ("L2", 1.0)])],
        )
        .unwrap();
        let dual = solve(&data, &SolverConfig::default()).unwrap();

        assert!((dual.objective_value().unwrap() - 18.0).abs() < 1e-6);
        assert!((dual.shadow_price("C1").unwrap() - 5.0).abs() < 1e-6);
        assert_eq!(dual.capacity_prices()[0].lot, "L1");
        assert!((dual.capacity_prices()[0].value - 3.0).abs() < 1e-6);
        assert!(dual.capacity_prices()[1].value.abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_primal_gives_unbounded_dual() {
        let data = ProblemData::from_structured_input(
            vec![Lot::new("L1", 10.0, Some(5.0))],
            vec![Requirement::new("C1", 10.0, [("L1", 1.0)])],
        )
        .unwrap();
        let dual = solve(&data, &SolverConfig::default()).unwrap();

        assert_eq!(dual.status(), SolutionStatus::Unbounded);
        assert!(dual.objective_value().is_none());
        assert!(dual.shadow_prices().is_empty());
    }

    #[test]
    fn test_uncapped_lots_add_no_capacity_prices() {
        let data = ProblemData::from_coverage_matrix(
            &[10.0, 12.0, 15.0],
            &[vec![100.0, 200.0, 150.0], vec![50.0, 60.0, 55.0], vec![20.0, 30.0, 25.0]],
            &[4000.0, 2500.0, 900.0],
            None,
        )
        .unwrap();
        let dual = solve(&data, &SolverConfig::default()).unwrap();

        assert!(dual.is_optimal());
        assert!(dual.capacity_prices().is_empty());
        assert_eq!(dual.shadow_prices().len(), 3);
        assert!(dual.shadow_prices().iter().all(|sp| sp.value >= -1e-9));
    }
}
