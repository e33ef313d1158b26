/// Outcome of a primal or dual solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// No solution satisfies all constraints
    Infeasible,
    /// The objective has no finite optimum
    Unbounded,
}

impl SolutionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
        }
    }
}

/// Where a lot's purchased quantity sits relative to its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LotState {
    /// Nothing purchased
    Idle,
    /// Strictly between zero and capacity
    Partial,
    /// Purchased up to capacity
    Saturated,
}

impl LotState {
    pub fn classify(quantity: f64, capacity: Option<f64>, tolerance: f64) -> Self {
        if quantity <= tolerance {
            LotState::Idle
        } else if capacity.is_some_and(|cap| quantity >= cap - tolerance) {
            LotState::Saturated
        } else {
            LotState::Partial
        }
    }
}

/// Purchased quantity per lot, in lot order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Allocation {
    lots: Vec<String>,
    quantities: Vec<f64>,
}

impl Allocation {
    pub(crate) fn new(lots: Vec<String>, quantities: Vec<f64>) -> Self {
        Self { lots, quantities }
    }

    pub fn get(&self, lot: &str) -> Option<f64> {
        self.lots.iter().position(|id| id == lot).map(|j| self.quantities[j])
    }

    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.lots.iter().map(String::as_str).zip(self.quantities.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

/// State of every lot at an optimum. Two optima share a basis when their
/// active sets are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActiveSet {
    states: Vec<(String, LotState)>,
}

impl ActiveSet {
    pub(crate) fn new(states: Vec<(String, LotState)>) -> Self {
        Self { states }
    }

    pub fn state(&self, lot: &str) -> Option<LotState> {
        self.states.iter().find(|(id, _)| id == lot).map(|&(_, state)| state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LotState)> {
        self.states.iter().map(|(id, state)| (id.as_str(), *state))
    }

    /// Lots whose state differs between `self` and `other`
    pub fn changed_lots<'a>(&'a self, other: &ActiveSet) -> Vec<&'a str> {
        self.iter()
            .filter(|&(id, state)| other.state(id) != Some(state))
            .map(|(id, _)| id)
            .collect()
    }
}

/// How a requirement is met at the optimum
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RequirementActivity {
    pub category: String,
    pub minimum_quantity: f64,
    /// Total coverage delivered by the allocation
    pub achieved: f64,
    /// `achieved - minimum_quantity`
    pub surplus: f64,
    /// Met with equality
    pub binding: bool,
}

/// Per-lot view of the optimum
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LotActivity {
    pub lot: String,
    pub quantity: f64,
    pub state: LotState,
    /// Unit cost minus the value of the coverage it provides at the
    /// requirements' shadow prices. Positive for idle lots, negative for
    /// saturated lots, zero in between.
    pub reduced_cost: f64,
}

/// Binding-constraint diagnostics of an optimal primal solution
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PrimalDiagnostics {
    pub requirements: Vec<RequirementActivity>,
    pub lots: Vec<LotActivity>,
    /// Simplex pivots used
    pub iterations: usize,
}

impl PrimalDiagnostics {
    pub fn binding_requirements(&self) -> Vec<&str> {
        self.requirements
            .iter()
            .filter(|r| r.binding)
            .map(|r| r.category.as_str())
            .collect()
    }

    pub fn saturated_lots(&self) -> Vec<&str> {
        self.lots
            .iter()
            .filter(|l| l.state == LotState::Saturated)
            .map(|l| l.lot.as_str())
            .collect()
    }

    pub fn active_set(&self) -> ActiveSet {
        ActiveSet::new(self.lots.iter().map(|l| (l.lot.clone(), l.state)).collect())
    }
}

/// A requirement no combination of lots can reach, even at full capacity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Shortfall {
    pub category: String,
    pub minimum_quantity: f64,
    /// Coverage obtained by buying every covering lot up to capacity
    pub max_achievable: f64,
}

/// Result of a primal solve: the cheapest purchase plan, if one exists
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Solution {
    status: SolutionStatus,
    objective_value: Option<f64>,
    allocation: Option<Allocation>,
    diagnostics: Option<PrimalDiagnostics>,
    shortfalls: Vec<Shortfall>,
}

impl Solution {
    pub(crate) fn optimal(objective_value: f64, allocation: Allocation, diagnostics: PrimalDiagnostics) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(objective_value),
            allocation: Some(allocation),
            diagnostics: Some(diagnostics),
            shortfalls: Vec::new(),
        }
    }

    pub(crate) fn infeasible(shortfalls: Vec<Shortfall>) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            objective_value: None,
            allocation: None,
            diagnostics: None,
            shortfalls,
        }
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Minimal total cost, present iff optimal
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    /// Purchase plan, present iff optimal
    pub fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&PrimalDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Requirements that are out of reach even with every lot bought up to
    /// capacity. Only populated for infeasible solutions. Coverage is
    /// non-negative, so an infeasible problem always has at least one.
    pub fn shortfalls(&self) -> &[Shortfall] {
        &self.shortfalls
    }

    pub fn active_set(&self) -> Option<ActiveSet> {
        self.diagnostics.as_ref().map(PrimalDiagnostics::active_set)
    }
}

/// Marginal value of one requirement
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShadowPrice {
    pub category: String,
    pub value: f64,
}

/// Marginal value of one more unit of a capped lot's capacity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CapacityPrice {
    pub lot: String,
    pub value: f64,
}

/// Result of a dual solve: the seller's revenue-maximizing prices
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DualSolution {
    status: SolutionStatus,
    objective_value: Option<f64>,
    shadow_prices: Vec<ShadowPrice>,
    capacity_prices: Vec<CapacityPrice>,
}

impl DualSolution {
    pub(crate) fn optimal(objective_value: f64, shadow_prices: Vec<ShadowPrice>, capacity_prices: Vec<CapacityPrice>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(objective_value),
            shadow_prices,
            capacity_prices,
        }
    }

    pub(crate) fn without_optimum(status: SolutionStatus) -> Self {
        Self {
            status,
            objective_value: None,
            shadow_prices: Vec::new(),
            capacity_prices: Vec::new(),
        }
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Maximal revenue, present iff optimal
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    /// One price per requirement, in requirement order. Empty unless optimal.
    pub fn shadow_prices(&self) -> &[ShadowPrice] {
        &self.shadow_prices
    }

    pub fn shadow_price(&self, category: &str) -> Option<f64> {
        self.shadow_prices
            .iter()
            .find(|sp| sp.category == category)
            .map(|sp| sp.value)
    }

    /// One price per capped lot, in lot order. Empty unless optimal.
    pub fn capacity_prices(&self) -> &[CapacityPrice] {
        &self.capacity_prices
    }
}
