use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{MalformedInputError, SolveError};

/// A purchasable lot of supply
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lot {
    pub id: String,
    /// Price of one unit of the lot. Zero is allowed so that sweeps can
    /// start from a free lot.
    pub unit_cost: f64,
    /// Maximum purchasable quantity; `None` means unlimited supply
    #[cfg_attr(feature = "serde", serde(default))]
    pub capacity: Option<f64>,
}

/// A minimum quantity of one category that purchased lots must cover
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requirement {
    pub category: String,
    pub minimum_quantity: f64,
    /// Contribution of one unit of each lot towards this category
    pub coverage: BTreeMap<String, f64>,
}

impl Lot {
    pub fn new(id: impl Into<String>, unit_cost: f64, capacity: Option<f64>) -> Self {
        Self {
            id: id.into(),
            unit_cost,
            capacity,
        }
    }
}

impl Requirement {
    pub fn new<I, S>(category: impl Into<String>, minimum_quantity: f64, coverage: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            minimum_quantity,
            coverage: coverage.into_iter().map(|(lot, q)| (lot.into(), q)).collect(),
        }
    }
}

/// Validated, immutable description of a procurement problem.
///
/// Lots and requirements keep their input order. The coverage matrix is
/// stored densely, one row per requirement and one column per lot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemData {
    lots: Vec<Lot>,
    requirements: Vec<Requirement>,
    matrix: Vec<Vec<f64>>,
    lot_index: HashMap<String, usize>,
}

impl ProblemData {
    /// Validate lots and requirements and build the problem.
    ///
    /// Fails when a coverage entry names an unknown lot, when an id or
    /// category is repeated, or when any number is negative or non-finite.
    /// Feasibility is not checked here.
    pub fn from_structured_input(lots: Vec<Lot>, requirements: Vec<Requirement>) -> Result<Self, MalformedInputError> {
        let mut lot_index = HashMap::with_capacity(lots.len());
        for (j, lot) in lots.iter().enumerate() {
            check_number(|| format!("unit_cost of lot '{}'", lot.id), lot.unit_cost)?;
            if let Some(capacity) = lot.capacity {
                check_number(|| format!("capacity of lot '{}'", lot.id), capacity)?;
            }
            if lot_index.insert(lot.id.clone(), j).is_some() {
                return Err(MalformedInputError::DuplicateLot(lot.id.clone()));
            }
        }

        let mut categories = HashSet::with_capacity(requirements.len());
        let mut matrix = Vec::with_capacity(requirements.len());
        for req in &requirements {
            if !categories.insert(req.category.as_str()) {
                return Err(MalformedInputError::DuplicateCategory(req.category.clone()));
            }
            check_number(|| format!("minimum_quantity of '{}'", req.category), req.minimum_quantity)?;

            let mut row = vec![0.0; lots.len()];
            for (lot, &amount) in &req.coverage {
                let Some(&j) = lot_index.get(lot) else {
                    return Err(MalformedInputError::UnknownLot {
                        category: req.category.clone(),
                        lot: lot.clone(),
                    });
                };
                check_number(|| format!("coverage of lot '{}' in '{}'", lot, req.category), amount)?;
                row[j] = amount;
            }
            matrix.push(row);
        }

        Ok(Self {
            lots,
            requirements,
            matrix,
            lot_index,
        })
    }

    /// Build a problem from the column layout: one cost per lot, one matrix
    /// row and one minimum per category. Lots are named `Lot 1..n` and have
    /// unlimited capacity; categories default to `Category 1..m`.
    pub fn from_coverage_matrix(
        costs: &[f64],
        matrix: &[Vec<f64>],
        minimums: &[f64],
        categories: Option<&[String]>,
    ) -> Result<Self, MalformedInputError> {
        if matrix.len() != minimums.len() {
            return Err(MalformedInputError::DimensionMismatch(format!(
                "{} constraint rows but {} requirements",
                matrix.len(),
                minimums.len()
            )));
        }
        if let Some(names) = categories {
            if names.len() != minimums.len() {
                return Err(MalformedInputError::DimensionMismatch(format!(
                    "{} category names but {} requirements",
                    names.len(),
                    minimums.len()
                )));
            }
        }
        if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != costs.len()) {
            return Err(MalformedInputError::DimensionMismatch(format!(
                "row {} has {} entries but there are {} lots",
                i + 1,
                row.len(),
                costs.len()
            )));
        }

        let lot_ids: Vec<String> = (1..=costs.len()).map(|j| format!("Lot {}", j)).collect();
        let lots = lot_ids
            .iter()
            .zip(costs)
            .map(|(id, &cost)| Lot::new(id.clone(), cost, None))
            .collect();

        let requirements = matrix
            .iter()
            .zip(minimums)
            .enumerate()
            .map(|(i, (row, &minimum))| {
                let category = match categories {
                    Some(names) => names[i].trim().to_string(),
                    None => format!("Category {}", i + 1),
                };
                Requirement::new(category, minimum, lot_ids.iter().cloned().zip(row.iter().copied()))
            })
            .collect();

        Self::from_structured_input(lots, requirements)
    }

    /// Copy of this problem with one lot's unit cost replaced
    pub fn with_unit_cost(&self, lot: &str, unit_cost: f64) -> Result<Self, SolveError> {
        let j = self.lot_index(lot).ok_or_else(|| SolveError::UnknownLot(lot.to_string()))?;
        check_number(|| format!("unit_cost of lot '{}'", lot), unit_cost)?;

        let mut derived = self.clone();
        derived.lots[j].unit_cost = unit_cost;
        Ok(derived)
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn num_lots(&self) -> usize {
        self.lots.len()
    }

    pub fn num_requirements(&self) -> usize {
        self.requirements.len()
    }

    pub fn lot(&self, id: &str) -> Option<&Lot> {
        self.lot_index(id).map(|j| &self.lots[j])
    }

    pub fn lot_index(&self, id: &str) -> Option<usize> {
        self.lot_index.get(id).copied()
    }

    pub fn unit_costs(&self) -> Vec<f64> {
        self.lots.iter().map(|lot| lot.unit_cost).collect()
    }

    /// Coverage of requirement `i` per unit of each lot, in lot order
    pub fn coverage_row(&self, i: usize) -> &[f64] {
        &self.matrix[i]
    }

    /// Most that all covering lots together can supply towards requirement
    /// `i`. `None` when an uncapped lot covers it.
    pub fn max_achievable(&self, i: usize) -> Option<f64> {
        let mut total = 0.0;
        for (lot, &amount) in self.lots.iter().zip(&self.matrix[i]) {
            if amount == 0.0 {
                continue;
            }
            total += amount * lot.capacity?;
        }
        Some(total)
    }
}

fn check_number(field: impl FnOnce() -> String, value: f64) -> Result<(), MalformedInputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MalformedInputError::InvalidNumber { field: field(), value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProblemData {
        ProblemData::from_structured_input(
            vec![Lot::new("L1", 10.0, Some(5.0)), Lot::new("L2", 12.0, None)],
            vec![
                Requirement::new("rifles", 3.0, [("L1", 1.0), ("L2", 2.0)]),
                Requirement::new("tanks", 1.0, [("L2", 1.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_builds_dense_matrix() {
        let data = sample();
        assert_eq!(data.num_lots(), 2);
        assert_eq!(data.num_requirements(), 2);
        assert_eq!(data.coverage_row(0), &[1.0, 2.0]);
        assert_eq!(data.coverage_row(1), &[0.0, 1.0]);
        assert_eq!(data.lot_index("L2"), Some(1));
        assert!(data.lot("L3").is_none());
    }

    #[test]
    fn test_unknown_lot_in_coverage() {
        let err = ProblemData::from_structured_input(
            vec![Lot::new("L1", 10.0, Some(5.0))],
            vec![Requirement::new("rifles", 3.0, [("L9", 1.0)])],
        )
        .unwrap_err();

        assert_eq!(
            err,
            MalformedInputError::UnknownLot {
                category: "rifles".to_string(),
                lot: "L9".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_negative_and_non_finite_numbers() {
        let cases = [
            (Lot::new("L1", -1.0, None), 1.0, 1.0),
            (Lot::new("L1", f64::NAN, None), 1.0, 1.0),
            (Lot::new("L1", 1.0, Some(-2.0)), 1.0, 1.0),
            (Lot::new("L1", 1.0, Some(f64::INFINITY)), 1.0, 1.0),
            (Lot::new("L1", 1.0, None), -3.0, 1.0),
            (Lot::new("L1", 1.0, None), 3.0, -1.0),
        ];
        for (lot, minimum, coverage) in cases {
            let result = ProblemData::from_structured_input(
                vec![lot.clone()],
                vec![Requirement::new("c", minimum, [("L1", coverage)])],
            );
            assert!(
                matches!(result, Err(MalformedInputError::InvalidNumber { .. })),
                "{:?} / {} / {} should be rejected",
                lot,
                minimum,
                coverage
            );
        }
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_lot = ProblemData::from_structured_input(
            vec![Lot::new("L1", 1.0, None), Lot::new("L1", 2.0, None)],
            Vec::new(),
        );
        assert_eq!(dup_lot.unwrap_err(), MalformedInputError::DuplicateLot("L1".to_string()));

        let dup_category = ProblemData::from_structured_input(
            vec![Lot::new("L1", 1.0, None)],
            vec![
                Requirement::new("c", 1.0, [("L1", 1.0)]),
                Requirement::new("c", 2.0, [("L1", 1.0)]),
            ],
        );
        assert_eq!(dup_category.unwrap_err(), MalformedInputError::DuplicateCategory("c".to_string()));
    }

    #[test]
    fn test_from_coverage_matrix() {
        let names = vec!["fusils ".to_string(), "grenades".to_string()];
        let data = ProblemData::from_coverage_matrix(
            &[10.0, 12.0, 15.0],
            &[vec![500.0, 300.0, 800.0], vec![1000.0, 2000.0, 1500.0]],
            &[100000.0, 200000.0],
            Some(&names),
        )
        .unwrap();

        assert_eq!(data.lots()[2].id, "Lot 3");
        assert_eq!(data.requirements()[0].category, "fusils");
        assert_eq!(data.coverage_row(1), &[1000.0, 2000.0, 1500.0]);
        assert!(data.lots().iter().all(|lot| lot.capacity.is_none()));
    }

    #[test]
    fn test_from_coverage_matrix_dimension_mismatch() {
        let err = ProblemData::from_coverage_matrix(&[1.0, 2.0], &[vec![1.0]], &[1.0], None).unwrap_err();
        assert!(matches!(err, MalformedInputError::DimensionMismatch(_)));

        let err = ProblemData::from_coverage_matrix(&[1.0], &[vec![1.0]], &[1.0, 2.0], None).unwrap_err();
        assert!(matches!(err, MalformedInputError::DimensionMismatch(_)));
    }

    #[test]
    fn test_zero_unit_cost_is_allowed() {
        let data = ProblemData::from_structured_input(
            vec![Lot::new("L1", 0.0, Some(5.0))],
            vec![Requirement::new("C1", 3.0, [("L1", 1.0)])],
        )
        .unwrap();
        assert_eq!(data.unit_costs(), vec![0.0]);
        assert!(data.with_unit_cost("L1", 0.0).is_ok());
    }

    #[test]
    fn test_with_unit_cost() {
        let data = sample();
        let derived = data.with_unit_cost("L1", 20.0).unwrap();

        assert_eq!(derived.lot("L1").unwrap().unit_cost, 20.0);
        assert_eq!(data.lot("L1").unwrap().unit_cost, 10.0);
        assert_eq!(derived.lot("L2"), data.lot("L2"));

        assert_eq!(data.with_unit_cost("L7", 1.0).unwrap_err(), SolveError::UnknownLot("L7".to_string()));
        assert!(matches!(
            data.with_unit_cost("L1", -5.0),
            Err(SolveError::Malformed(MalformedInputError::InvalidNumber { .. }))
        ));
    }

    #[test]
    fn test_max_achievable() {
        let data = sample();
        // L2 is uncapped and covers both categories
        assert_eq!(data.max_achievable(0), None);

        let capped = ProblemData::from_structured_input(
            vec![Lot::new("L1", 1.0, Some(5.0)), Lot::new("L2", 1.0, Some(2.0)), Lot::new("L3", 1.0, None)],
            vec![Requirement::new("c", 20.0, [("L1", 1.0), ("L2", 3.0)])],
        )
        .unwrap();
        assert_eq!(capped.max_achievable(0), Some(11.0));
    }
}
