use tracing::{debug, trace, warn};

use super::problem::{ConstraintOp, LpProblem};
use crate::config::{SolverBackend, SolverConfig};
use crate::error::SolveError;

/// Degenerate pivots tolerated under Dantzig's rule before switching to Bland's rule
const DEGENERATE_STREAK_LIMIT: usize = 50;

/// Outcome of a single LP solve
#[derive(Debug, Clone)]
pub enum LpOutcome {
    Optimal(LpSolution),
    Infeasible,
    Unbounded,
}

impl LpOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            LpOutcome::Optimal(_) => "optimal",
            LpOutcome::Infeasible => "infeasible",
            LpOutcome::Unbounded => "unbounded",
        }
    }
}

/// Optimal vertex found by the simplex method
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Value of each variable
    pub values: Vec<f64>,
    /// Objective value at `values`
    pub objective_value: f64,
    /// Change of the optimal objective per unit increase of each constraint's rhs
    pub duals: Vec<f64>,
    /// Pivots performed over both phases
    pub iterations: usize,
}

/// Dense two-phase simplex solver
pub struct Solver {
    /// Maximum iterations per phase before giving up
    max_iterations: usize,
    /// Tolerance for pivoting decisions
    tolerance: f64,
    /// Largest artificial value, relative to its row's rhs, still counted as feasible
    feasibility_tolerance: f64,
    backend: SolverBackend,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

impl Solver {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.pivot_tolerance(),
            feasibility_tolerance: config.tolerance,
            backend: config.backend,
        }
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, SolveError> {
        let mut tableau = Tableau::build(problem);
        let mut iterations = 0;

        // Phase 1: drive the artificial variables to zero
        if tableau.n_artificial > 0 {
            let phase1_objective = tableau.phase1_objective();
            tableau.install_objective(&phase1_objective);
            match self.optimize(&mut tableau, &mut iterations)? {
                PhaseResult::Optimal => {}
                // The phase 1 objective is bounded by zero
                PhaseResult::Unbounded => return Ok(LpOutcome::Infeasible),
            }

            // A row missed by no more than the feasibility tolerance still counts as met
            if let Some(residual) = tableau.artificial_violation(self.feasibility_tolerance) {
                debug!(residual, iterations, "phase 1 left artificial variables positive");
                return Ok(LpOutcome::Infeasible);
            }
            // Artificials still basic at (near) zero level must leave before phase 2
            self.drive_out_artificials(&mut tableau);
        }

        // Phase 2: optimize the real objective
        let objective = tableau.phase2_objective(problem);
        tableau.install_objective(&objective);
        match self.optimize(&mut tableau, &mut iterations)? {
            PhaseResult::Optimal => {}
            PhaseResult::Unbounded => return Ok(LpOutcome::Unbounded),
        }

        Ok(LpOutcome::Optimal(tableau.extract(problem, iterations)))
    }

    fn optimize(&self, tableau: &mut Tableau, iterations: &mut usize) -> Result<PhaseResult, SolveError> {
        let mut rule = self.backend;
        let mut degenerate_streak = 0;

        for _ in 0..self.max_iterations {
            // No improving column left: current basis is optimal
            let Some(pivot_col) = self.find_pivot_column(tableau, rule) else {
                return Ok(PhaseResult::Optimal);
            };
            // No row limits the entering column: the objective grows without bound
            let Some((pivot_row, ratio)) = self.find_pivot_row(tableau, pivot_col) else {
                return Ok(PhaseResult::Unbounded);
            };

            // A zero step leaves the vertex unchanged
            if ratio <= self.tolerance {
                degenerate_streak += 1;
                if rule == SolverBackend::Dantzig && degenerate_streak > DEGENERATE_STREAK_LIMIT {
                    warn!(degenerate_streak, "degenerate cycling suspected, switching to Bland's rule");
                    rule = SolverBackend::Bland;
                }
            } else {
                degenerate_streak = 0;
            }

            trace!(row = pivot_row, col = pivot_col, ratio, "pivot");
            tableau.pivot(pivot_row, pivot_col);
            *iterations += 1;
        }

        Err(SolveError::IterationLimit(self.max_iterations))
    }

    /// Entering column among the non-artificial columns, or `None` at optimality
    fn find_pivot_column(&self, tableau: &Tableau, rule: SolverBackend) -> Option<usize> {
        let obj = tableau.objective_row();
        let mut candidates = (0..tableau.artificial_start()).filter(|&j| obj[j] > self.tolerance);

        match rule {
            SolverBackend::Bland => candidates.next(),
            SolverBackend::Dantzig => {
                let mut best: Option<usize> = None;
                for j in candidates {
                    if best.is_none_or(|b| obj[j] > obj[b]) {
                        best = Some(j);
                    }
                }
                best
            }
        }
    }

    /// Minimum ratio test. Ties go to the lowest basic variable index.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<(usize, f64)> {
        let rhs_col = tableau.rhs_col();
        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.n_rows() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            best = match best {
                None => Some((i, ratio)),
                Some((row, min_ratio)) => {
                    if ratio < min_ratio - self.tolerance
                        || (ratio <= min_ratio + self.tolerance && tableau.basic_vars[i] < tableau.basic_vars[row])
                    {
                        Some((i, ratio))
                    } else {
                        Some((row, min_ratio))
                    }
                }
            };
        }

        best
    }

    /// Pivot zero-level artificial variables out of the basis. Rows where no
    /// real column can replace them are redundant and stay as they are.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.artificial_start();
        let rhs_col = tableau.rhs_col();
        for i in 0..tableau.n_rows() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let replacement = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance);
            match replacement {
                Some(col) => {
                    tableau.data[i][rhs_col] = 0.0;
                    tableau.pivot(i, col);
                }
                None => trace!(row = i, "redundant constraint row"),
            }
        }
    }
}

enum PhaseResult {
    Optimal,
    Unbounded,
}

struct RowInfo {
    /// Slack or surplus column with its coefficient
    slack: Option<(usize, f64)>,
    artificial: Option<usize>,
    /// Row was negated to make its rhs non-negative
    flipped: bool,
    /// Normalized (non-negative) right-hand side
    rhs: f64,
}

struct Tableau {
    /// Constraint rows followed by the objective row; the last column is the rhs
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
    rows: Vec<RowInfo>,
}

impl Tableau {
    fn build(problem: &LpProblem) -> Self {
        let n_vars = problem.num_columns();
        let n_constraints = problem.num_rows();

        // Negate rows with a negative rhs so every artificial starts non-negative
        let normalized: Vec<(ConstraintOp, bool)> = problem
            .rows()
            .iter()
            .map(|c| if c.rhs < 0.0 { (c.op.flipped(), true) } else { (c.op, false) })
            .collect();

        // Le and Ge rows get a slack/surplus column, Ge and Eq rows an artificial one
        let n_slack = normalized.iter().filter(|(op, _)| *op != ConstraintOp::Eq).count();
        let n_artificial = normalized.iter().filter(|(op, _)| *op != ConstraintOp::Le).count();
        let total_cols = n_vars + n_slack + n_artificial + 1;

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_constraints + 1],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
            rows: Vec::with_capacity(n_constraints),
        };

        // Column layout: structural | slack | artificial | rhs
        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, (c, &(op, flipped))) in problem.rows().iter().zip(&normalized).enumerate() {
            let sign = if flipped { -1.0 } else { 1.0 };
            for (j, &coef) in c.coefficients.iter().enumerate().take(n_vars) {
                tableau.data[i][j] = sign * coef;
            }
            tableau.data[i][total_cols - 1] = sign * c.rhs;

            let mut info = RowInfo {
                slack: None,
                artificial: None,
                flipped,
                rhs: sign * c.rhs,
            };
            match op {
                // Slack starts basic at the rhs
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    info.slack = Some((slack_idx, 1.0));
                    slack_idx += 1;
                }
                // Surplus cannot start basic (it would be negative), so an artificial does
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0;
                    info.slack = Some((slack_idx, -1.0));
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    info.artificial = Some(artificial_idx);
                    artificial_idx += 1;
                }
                // Artificial only
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    info.artificial = Some(artificial_idx);
                    artificial_idx += 1;
                }
            }
            tableau.rows.push(info);
        }

        tableau
    }

    fn n_rows(&self) -> usize {
        self.data.len() - 1
    }

    fn rhs_col(&self) -> usize {
        self.data[0].len() - 1
    }

    fn artificial_start(&self) -> usize {
        self.n_vars + self.n_slack
    }

    fn objective_row(&self) -> &[f64] {
        &self.data[self.n_rows()]
    }

    /// Maximize the negated sum of artificials
    fn phase1_objective(&self) -> Vec<f64> {
        let mut objective = vec![0.0; self.data[0].len()];
        let art_start = self.artificial_start();
        for value in &mut objective[art_start..art_start + self.n_artificial] {
            *value = -1.0;
        }
        objective
    }

    /// Internally the tableau always maximizes, so minimization negates the costs
    fn phase2_objective(&self, problem: &LpProblem) -> Vec<f64> {
        let mut objective = vec![0.0; self.data[0].len()];
        let sense = problem.sense().to_max();
        for (j, &coef) in problem.costs().iter().enumerate().take(self.n_vars) {
            objective[j] = sense * coef;
        }
        objective
    }

    /// Write `objective` as the reduced cost row of the current basis
    fn install_objective(&mut self, objective: &[f64]) {
        let obj_row = self.n_rows();
        self.data[obj_row] = objective.to_vec();
        for i in 0..obj_row {
            let basic = self.basic_vars[i];
            let ratio = self.data[obj_row][basic];
            if ratio != 0.0 {
                for j in 0..self.data[i].len() {
                    self.data[obj_row][j] -= ratio * self.data[i][j];
                }
            }
        }
    }

    /// Largest basic artificial value exceeding `tolerance * max(1, rhs)` of
    /// the row that owns it, or `None` when every row is met within tolerance
    fn artificial_violation(&self, tolerance: f64) -> Option<f64> {
        let art_start = self.artificial_start();
        let rhs_col = self.rhs_col();
        (0..self.n_rows())
            .filter(|&i| self.basic_vars[i] >= art_start)
            .filter_map(|i| {
                let col = self.basic_vars[i];
                let owner = self.rows.iter().find(|info| info.artificial == Some(col))?;
                let value = self.data[i][rhs_col];
                (value > tolerance * owner.rhs.max(1.0)).then_some(value)
            })
            .reduce(f64::max)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_cols = self.data[0].len();

        self.basic_vars[row] = col;

        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        let pivot_row = self.data[row].clone();
        for (i, current) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = current[col];
            if factor != 0.0 {
                for (value, &p) in current.iter_mut().zip(&pivot_row) {
                    *value -= factor * p;
                }
            }
        }
    }

    fn extract(&self, problem: &LpProblem, iterations: usize) -> LpSolution {
        let rhs_col = self.rhs_col();
        let obj = self.objective_row();
        let sense = problem.sense().to_max();

        let mut values = vec![0.0; self.n_vars];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < self.n_vars {
                values[basic] = self.data[i][rhs_col].max(0.0);
            }
        }

        let objective_value = problem.evaluate(&values);

        // Reduced cost of a slack column is -y * coefficient; an artificial column carries -y
        let duals = self
            .rows
            .iter()
            .map(|info| {
                let y = match (info.slack, info.artificial) {
                    (Some((col, coef)), _) => -obj[col] * coef,
                    (None, Some(col)) => -obj[col],
                    (None, None) => 0.0,
                };
                let flip = if info.flipped { -1.0 } else { 1.0 };
                sense * flip * y
            })
            .collect();

        LpSolution {
            values,
            objective_value,
            duals,
            iterations,
        }
    }
}
