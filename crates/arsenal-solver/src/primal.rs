//! Buyer's problem: cheapest purchase plan meeting every requirement.
//!
//! ```text
//! min  sum_j c_j x_j
//! s.t. sum_j a_ij x_j >= b_i     for every requirement i
//!      0 <= x_j <= u_j           for every lot j with a capacity
//! ```

use tracing::debug;

use crate::config::SolverConfig;
use crate::data::ProblemData;
use crate::error::SolveError;
use crate::lp::{ConstraintOp, LpOutcome, LpProblem, LpSolution, Solver};
use crate::solution::{
    Allocation, LotActivity, LotState, PrimalDiagnostics, RequirementActivity, Shortfall, Solution,
};

/// Solve the primal problem.
///
/// Infeasibility is reported through the returned status. An unbounded
/// result cannot happen with non-negative costs and is surfaced as
/// [`SolveError::UnexpectedUnbounded`].
pub fn solve(data: &ProblemData, config: &SolverConfig) -> Result<Solution, SolveError> {
    config.validate()?;

    let problem = build_problem(data);
    let outcome = Solver::new(config).solve(&problem)?;
    debug!(
        status = outcome.label(),
        lots = data.num_lots(),
        requirements = data.num_requirements(),
        "primal solved"
    );

    match outcome {
        LpOutcome::Optimal(lp) => Ok(optimal_solution(data, &lp, config)),
        LpOutcome::Infeasible => Ok(Solution::infeasible(shortfalls(data, config))),
        LpOutcome::Unbounded => Err(SolveError::UnexpectedUnbounded { problem: "primal" }),
    }
}

/// One row per requirement, then one capacity row per capped lot
fn build_problem(data: &ProblemData) -> LpProblem {
    let lots = data.lots();
    let mut problem = LpProblem::minimize(lots.iter().map(|lot| lot.id.clone()).collect(), data.unit_costs());

    for (i, req) in data.requirements().iter().enumerate() {
        problem.add_row(
            req.category.clone(),
            data.coverage_row(i).to_vec(),
            ConstraintOp::Ge,
            req.minimum_quantity,
        );
    }

    for (j, lot) in lots.iter().enumerate() {
        if let Some(capacity) = lot.capacity {
            let mut coefficients = vec![0.0; lots.len()];
            coefficients[j] = 1.0;
            problem.add_row(format!("capacity:{}", lot.id), coefficients, ConstraintOp::Le, capacity);
        }
    }

    problem
}

fn optimal_solution(data: &ProblemData, lp: &LpSolution, config: &SolverConfig) -> Solution {
    let requirement_duals = &lp.duals[..data.num_requirements()];

    let requirements = data
        .requirements()
        .iter()
        .enumerate()
        .map(|(i, req)| {
            let achieved: f64 = data.coverage_row(i).iter().zip(&lp.values).map(|(a, x)| a * x).sum();
            let surplus = achieved - req.minimum_quantity;
            RequirementActivity {
                category: req.category.clone(),
                minimum_quantity: req.minimum_quantity,
                achieved,
                surplus,
                binding: surplus.abs() <= config.tolerance_for(req.minimum_quantity),
            }
        })
        .collect();

    let lots = data
        .lots()
        .iter()
        .enumerate()
        .map(|(j, lot)| {
            let quantity = lp.values[j];
            let coverage_value: f64 = requirement_duals
                .iter()
                .enumerate()
                .map(|(i, y)| y * data.coverage_row(i)[j])
                .sum();
            let scale = lot.capacity.unwrap_or(quantity);
            LotActivity {
                lot: lot.id.clone(),
                quantity,
                state: LotState::classify(quantity, lot.capacity, config.tolerance_for(scale)),
                reduced_cost: lot.unit_cost - coverage_value,
            }
        })
        .collect();

    let allocation = Allocation::new(data.lots().iter().map(|lot| lot.id.clone()).collect(), lp.values.clone());
    let diagnostics = PrimalDiagnostics {
        requirements,
        lots,
        iterations: lp.iterations,
    };

    Solution::optimal(lp.objective_value, allocation, diagnostics)
}

fn shortfalls(data: &ProblemData, config: &SolverConfig) -> Vec<Shortfall> {
    data.requirements()
        .iter()
        .enumerate()
        .filter_map(|(i, req)| {
            let max_achievable = data.max_achievable(i)?;
            (req.minimum_quantity > max_achievable + config.tolerance_for(req.minimum_quantity)).then(|| Shortfall {
                category: req.category.clone(),
                minimum_quantity: req.minimum_quantity,
                max_achievable,
            })
        })
        .collect()
}
