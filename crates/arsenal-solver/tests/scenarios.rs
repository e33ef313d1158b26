use approx::assert_abs_diff_eq;
use arsenal_solver::{
    dual, primal, solve_pair, sweep, sweep_with_duals, Lot, LotState, MalformedInputError, PriceRange, ProblemData,
    Requirement, SolutionStatus, SolverBackend, SolverConfig,
};

fn single_lot(minimum: f64) -> ProblemData {
    ProblemData::from_structured_input(
        vec![Lot::new("L1", 10.0, Some(5.0))],
        vec![Requirement::new("C1", minimum, [("L1", 1.0)])],
    )
    .unwrap()
}

/// Three lots, five weapon categories, no capacity limits
fn five_categories() -> ProblemData {
    let names: Vec<String> = ["fusils", "grenades", "chars", "mitrailleuses", "bazookas"]
        .into_iter()
        .map(String::from)
        .collect();
    ProblemData::from_coverage_matrix(
        &[10.0, 12.0, 15.0],
        &[
            vec![500.0, 300.0, 800.0],
            vec![1000.0, 2000.0, 1500.0],
            vec![10.0, 20.0, 15.0],
            vec![100.0, 80.0, 15.0],
            vec![80.0, 120.0, 200.0],
        ],
        &[100000.0, 200000.0, 100.0, 400.0, 400.0],
        Some(&names),
    )
    .unwrap()
}

#[test]
fn single_lot_meets_requirement() {
    let sol = primal::solve(&single_lot(3.0), &SolverConfig::default()).unwrap();

    assert_eq!(sol.status(), SolutionStatus::Optimal);
    assert_abs_diff_eq!(sol.objective_value().unwrap(), 30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(sol.allocation().unwrap().get("L1").unwrap(), 3.0, epsilon = 1e-6);
}

#[test]
fn single_lot_over_capacity_is_infeasible() {
    let sol = primal::solve(&single_lot(10.0), &SolverConfig::default()).unwrap();

    assert_eq!(sol.status(), SolutionStatus::Infeasible);
    assert!(sol.allocation().is_none());
    assert_eq!(sol.shortfalls().len(), 1);
}

#[test]
fn single_lot_sweep_scales_linearly() {
    let trace = sweep(&single_lot(3.0), "L1", &PriceRange::values([10.0, 20.0, 30.0]), &SolverConfig::default()).unwrap();

    assert_eq!(trace.lot(), "L1");
    let expected = [30.0, 60.0, 90.0];
    for (point, want) in trace.points().iter().zip(expected) {
        assert_abs_diff_eq!(point.solution.objective_value().unwrap(), want, epsilon = 1e-6);
        assert_abs_diff_eq!(point.solution.allocation().unwrap().get("L1").unwrap(), 3.0, epsilon = 1e-6);
    }
}

#[test]
fn five_categories_primal_optimum() {
    let sol = primal::solve(&five_categories(), &SolverConfig::default()).unwrap();
    let allocation = sol.allocation().unwrap();

    assert_abs_diff_eq!(sol.objective_value().unwrap(), 44400.0 / 23.0, epsilon = 1e-6);
    assert_abs_diff_eq!(allocation.get("Lot 1").unwrap(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(allocation.get("Lot 2").unwrap(), 200.0 / 23.0, epsilon = 1e-6);
    assert_abs_diff_eq!(allocation.get("Lot 3").unwrap(), 2800.0 / 23.0, epsilon = 1e-6);

    let diagnostics = sol.diagnostics().unwrap();
    assert_eq!(diagnostics.binding_requirements(), vec!["fusils", "grenades"]);
}

#[test]
fn five_categories_dual_prices() {
    let data = five_categories();
    let dual = dual::solve(&data, &SolverConfig::default()).unwrap();

    assert_abs_diff_eq!(dual.objective_value().unwrap(), 44400.0 / 23.0, epsilon = 1e-6);
    assert_abs_diff_eq!(dual.shadow_price("fusils").unwrap(), 0.24 / 23.0, epsilon = 1e-9);
    assert_abs_diff_eq!(dual.shadow_price("grenades").unwrap(), 0.102 / 23.0, epsilon = 1e-9);
    for category in ["chars", "mitrailleuses", "bazookas"] {
        assert_abs_diff_eq!(dual.shadow_price(category).unwrap(), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn five_categories_strong_duality() {
    let pair = solve_pair(&five_categories(), &SolverConfig::default()).unwrap();
    assert_abs_diff_eq!(pair.duality_gap().unwrap(), 0.0, epsilon = 1e-6);
}

#[test]
fn five_categories_lot_one_price_study() {
    let data = five_categories();
    let trace = sweep_with_duals(&data, "Lot 1", &PriceRange::stepped(1.0, 29.0, 1.0), &SolverConfig::default()).unwrap();
    assert_eq!(trace.len(), 29);

    let costs: Vec<f64> = trace.objective_values().into_iter().map(Option::unwrap).collect();
    // Lot 1 alone covers everything with 200 units while it is cheap
    assert_abs_diff_eq!(costs[0], 200.0, epsilon = 1e-6);
    // Priced out from 10 upwards
    for &cost in &costs[9..] {
        assert_abs_diff_eq!(cost, 44400.0 / 23.0, epsilon = 1e-6);
    }
    for pair in costs.windows(2) {
        assert!(pair[0] <= pair[1] + 1e-6, "costs = {:?}", costs);
    }

    let breakpoints = trace.breakpoints();
    assert!(!breakpoints.is_empty());
    let last = breakpoints.last().unwrap();
    assert_eq!(last.after.as_ref().unwrap().state("Lot 1"), Some(LotState::Idle));
    assert!(last.upper_price <= 10.0);
}

#[test]
fn backends_agree_on_five_categories() {
    let data = five_categories();
    let dantzig = primal::solve(&data, &SolverConfig::default()).unwrap();
    let bland = primal::solve(&data, &SolverConfig::new().with_backend(SolverBackend::Bland)).unwrap();

    assert_abs_diff_eq!(
        dantzig.objective_value().unwrap(),
        bland.objective_value().unwrap(),
        epsilon = 1e-6
    );
}

#[test]
fn empty_problem_is_trivially_optimal() {
    let data = ProblemData::from_structured_input(Vec::new(), Vec::new()).unwrap();
    let pair = solve_pair(&data, &SolverConfig::default()).unwrap();

    assert_eq!(pair.primal().objective_value(), Some(0.0));
    assert_eq!(pair.dual().objective_value(), Some(0.0));
    assert!(pair.primal().allocation().unwrap().is_empty());
}

#[test]
fn malformed_input_is_rejected_before_solving() {
    let err = ProblemData::from_structured_input(
        vec![Lot::new("L1", 10.0, Some(5.0))],
        vec![Requirement::new("C1", f64::INFINITY, [("L1", 1.0)])],
    )
    .unwrap_err();

    assert!(matches!(err, MalformedInputError::InvalidNumber { .. }));
}
