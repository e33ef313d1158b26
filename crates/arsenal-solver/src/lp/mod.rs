//! Dense LP engine shared by the primal and dual formulations.

mod problem;
mod simplex;

pub use problem::{ConstraintOp, LpProblem, Row, Sense};
pub use simplex::{LpOutcome, LpSolution, Solver};
