//! Parametric re-solving over one lot's unit price.
//!
//! Every swept price is an independent solve of a derived [`ProblemData`].
//! Breakpoints are derived from the trace on demand by comparing the active
//! set (idle / partial / saturated lots) of consecutive points.

use tracing::debug_span;

use crate::config::SolverConfig;
use crate::data::ProblemData;
use crate::duality;
use crate::error::SolveError;
use crate::primal;
use crate::solution::{ActiveSet, DualSolution, Solution};

/// Upper bound on the number of prices a stepped range may expand to
pub const MAX_SWEEP_POINTS: usize = 1_000_000;

/// Prices to sweep
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriceRange {
    /// Explicit prices, in any order
    Values(Vec<f64>),
    /// `start, start + step, ...` up to and including `end`
    Stepped { start: f64, end: f64, step: f64 },
}

impl PriceRange {
    pub fn values(values: impl Into<Vec<f64>>) -> Self {
        PriceRange::Values(values.into())
    }

    pub fn stepped(start: f64, end: f64, step: f64) -> Self {
        PriceRange::Stepped { start, end, step }
    }

    /// Expand into ascending, deduplicated prices
    pub fn prices(&self, tolerance: f64) -> Result<Vec<f64>, SolveError> {
        let mut prices = match self {
            PriceRange::Values(values) => values.clone(),
            &PriceRange::Stepped { start, end, step } => {
                if !step.is_finite() || step <= 0.0 {
                    return Err(SolveError::InvalidPriceRange(format!("step must be positive, got {}", step)));
                }
                if !start.is_finite() || !end.is_finite() {
                    return Err(SolveError::InvalidPriceRange(format!("bounds must be finite, got {}..{}", start, end)));
                }
                if start > end {
                    return Err(SolveError::InvalidPriceRange(format!("start {} is above end {}", start, end)));
                }
                let steps = ((end - start) / step + tolerance).floor();
                if !steps.is_finite() || steps >= MAX_SWEEP_POINTS as f64 {
                    return Err(SolveError::InvalidPriceRange(format!(
                        "{}..{} by {} gives more than {} prices",
                        start, end, step, MAX_SWEEP_POINTS
                    )));
                }
                (0..=steps as usize).map(|k| start + k as f64 * step).collect()
            }
        };

        if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(SolveError::InvalidPriceRange(format!(
                "prices must be finite and non-negative, got {}",
                bad
            )));
        }
        prices.sort_by(f64::total_cmp);
        prices.dedup();
        Ok(prices)
    }
}

/// One swept price and the solutions obtained with it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SweepPoint {
    pub price: f64,
    pub solution: Solution,
    /// Present only for sweeps that also solve the dual
    pub dual: Option<DualSolution>,
}

/// Price change across which the optimal basis changes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Breakpoint {
    /// Last swept price with the old basis
    pub lower_price: f64,
    /// First swept price with the new basis
    pub upper_price: f64,
    /// `None` when the problem is infeasible on that side
    pub before: Option<ActiveSet>,
    pub after: Option<ActiveSet>,
}

/// Solutions ordered by ascending price of the target lot
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SensitivityTrace {
    lot: String,
    points: Vec<SweepPoint>,
}

impl SensitivityTrace {
    /// Lot whose price was swept
    pub fn lot(&self) -> &str {
        &self.lot
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Optimal cost per price, `None` where infeasible
    pub fn objective_values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.solution.objective_value()).collect()
    }

    /// Consecutive points whose active sets differ
    pub fn breakpoints(&self) -> Vec<Breakpoint> {
        self.points
            .windows(2)
            .filter_map(|pair| {
                let before = pair[0].solution.active_set();
                let after = pair[1].solution.active_set();
                (before != after).then(|| Breakpoint {
                    lower_price: pair[0].price,
                    upper_price: pair[1].price,
                    before,
                    after,
                })
            })
            .collect()
    }
}

/// Re-solve the primal problem with `lot` priced at each value of `range`
pub fn sweep(
    data: &ProblemData,
    lot: &str,
    range: &PriceRange,
    config: &SolverConfig,
) -> Result<SensitivityTrace, SolveError> {
    run_sweep(data, lot, range, config, |derived| {
        Ok((primal::solve(derived, config)?, None))
    })
}

/// Like [`sweep`], also solving the dual at every price and checking strong
/// duality point by point
pub fn sweep_with_duals(
    data: &ProblemData,
    lot: &str,
    range: &PriceRange,
    config: &SolverConfig,
) -> Result<SensitivityTrace, SolveError> {
    run_sweep(data, lot, range, config, |derived| {
        let pair = duality::solve_pair(derived, config)?;
        Ok((pair.primal().clone(), Some(pair.dual().clone())))
    })
}

type PointResult = Result<(Solution, Option<DualSolution>), SolveError>;

fn run_sweep<F>(data: &ProblemData, lot: &str, range: &PriceRange, config: &SolverConfig, solve: F) -> Result<SensitivityTrace, SolveError>
where
    F: Fn(&ProblemData) -> PointResult + Sync,
{
    config.validate()?;
    if data.lot(lot).is_none() {
        return Err(SolveError::UnknownLot(lot.to_string()));
    }
    let prices = range.prices(config.tolerance)?;
    let _span = debug_span!("sweep", lot, points = prices.len()).entered();

    let solve_at = |price: f64| -> Result<SweepPoint, SolveError> {
        let derived = data.with_unit_cost(lot, price)?;
        let (solution, dual) = solve(&derived)?;
        Ok(SweepPoint { price, solution, dual })
    };

    #[cfg(feature = "parallel")]
    let points = {
        use rayon::prelude::*;
        prices.into_par_iter().map(solve_at).collect::<Result<Vec<_>, _>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let points = prices.into_iter().map(solve_at).collect::<Result<Vec<_>, _>>()?;

    Ok(SensitivityTrace {
        lot: lot.to_string(),
        points,
    })
}
