/// Direction of the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    /// Factor that turns this objective into a maximization
    pub(crate) fn to_max(self) -> f64 {
        match self {
            Sense::Minimize => -1.0,
            Sense::Maximize => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// Operator obtained by multiplying both sides by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

/// One linear constraint `coefficients · x (op) rhs`
#[derive(Debug, Clone)]
pub struct Row {
    pub label: String,
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

/// A linear program over named, non-negative columns
#[derive(Debug, Clone)]
pub struct LpProblem {
    columns: Vec<String>,
    sense: Sense,
    costs: Vec<f64>,
    rows: Vec<Row>,
}

impl LpProblem {
    pub fn minimize(columns: Vec<String>, costs: Vec<f64>) -> Self {
        Self::with_sense(columns, costs, Sense::Minimize)
    }

    pub fn maximize(columns: Vec<String>, costs: Vec<f64>) -> Self {
        Self::with_sense(columns, costs, Sense::Maximize)
    }

    fn with_sense(columns: Vec<String>, mut costs: Vec<f64>, sense: Sense) -> Self {
        costs.resize(columns.len(), 0.0);
        Self {
            columns,
            sense,
            costs,
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing coefficients are zero
    pub fn add_row(&mut self, label: impl Into<String>, mut coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        coefficients.resize(self.columns.len(), 0.0);
        self.rows.push(Row {
            label: label.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Objective value at `values`
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.costs.iter().zip(values).map(|(c, x)| c * x).sum()
    }
}
