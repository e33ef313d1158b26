//! Procurement linear programs: a buyer minimizing the cost of meeting
//! minimum requirements, the seller's dual pricing problem, and price
//! sensitivity sweeps over both.

mod config;
mod data;
mod error;
mod lp;
mod solution;

pub mod dual;
pub mod duality;
pub mod primal;
pub mod sensitivity;

pub use config::{SolverBackend, SolverConfig};
pub use data::{Lot, ProblemData, Requirement};
pub use duality::{solve_pair, PrimalDualPair};
pub use error::{MalformedInputError, SolveError};
pub use lp::{ConstraintOp, LpOutcome, LpProblem, LpSolution, Row, Sense, Solver};
pub use sensitivity::{
    sweep, sweep_with_duals, Breakpoint, PriceRange, SensitivityTrace, SweepPoint, MAX_SWEEP_POINTS,
};
pub use solution::{
    ActiveSet, Allocation, CapacityPrice, DualSolution, LotActivity, LotState, PrimalDiagnostics,
    RequirementActivity, ShadowPrice, Shortfall, Solution, SolutionStatus,
};
