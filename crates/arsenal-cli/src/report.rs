use arsenal_solver::{
    DualSolution, LotState, PrimalDualPair, ProblemData, SensitivityTrace, Solution, SolutionStatus,
};

pub fn print_summary(data: &ProblemData) {
    println!("  {} lots", data.num_lots());
    println!("  {} requirements", data.num_requirements());
    println!();
    println!("{:20} {:>12} {:>12}", "Lot", "Unit cost", "Capacity");
    for lot in data.lots() {
        let capacity = lot.capacity.map_or("unlimited".to_string(), |c| format!("{:.2}", c));
        println!("{:20} {:>12.4} {:>12}", lot.id, lot.unit_cost, capacity);
    }
    println!();
    println!("{:20} {:>14}", "Requirement", "Minimum");
    for req in data.requirements() {
        println!("{:20} {:>14.2}", req.category, req.minimum_quantity);
    }
}

pub fn print_pair(data: &ProblemData, pair: &PrimalDualPair) {
    println!("Primal problem (buyer minimizes cost)");
    println!();
    print_primal(data, pair.primal());
    println!();
    println!("Dual problem (seller maximizes revenue)");
    println!();
    print_dual(pair.dual());

    if let Some(gap) = pair.duality_gap() {
        println!();
        println!("Strong duality holds: gap {:.3e}", gap);
    }
}

fn print_primal(data: &ProblemData, solution: &Solution) {
    match solution.status() {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            if let Some(cost) = solution.objective_value() {
                println!("Total cost: {:.4}", cost);
            }
            println!();
            if let Some(diagnostics) = solution.diagnostics() {
                println!("{:20} {:>12} {:>12} {:>14} {:>10}", "Lot", "Quantity", "Unit cost", "Total", "State");
                for (lot, activity) in data.lots().iter().zip(&diagnostics.lots) {
                    println!(
                        "{:20} {:>12.4} {:>12.4} {:>14.4} {:>10}",
                        lot.id,
                        activity.quantity,
                        lot.unit_cost,
                        activity.quantity * lot.unit_cost,
                        state_label(activity.state)
                    );
                }

                let binding = diagnostics.binding_requirements();
                if !binding.is_empty() {
                    println!();
                    println!("Binding requirements:");
                    for name in binding {
                        println!("  - {}", name);
                    }
                }
            }
        }
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No purchase plan satisfies every requirement.");
            for shortfall in solution.shortfalls() {
                println!(
                    "  {} needs {:.2} but at most {:.2} can be supplied",
                    shortfall.category, shortfall.minimum_quantity, shortfall.max_achievable
                );
            }
        }
        SolutionStatus::Unbounded => println!("Status: UNBOUNDED"),
    }
}

fn print_dual(dual: &DualSolution) {
    match dual.status() {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            if let Some(revenue) = dual.objective_value() {
                println!("Total revenue: {:.4}", revenue);
            }
            println!();
            println!("{:20} {:>14}", "Category", "Unit price");
            for sp in dual.shadow_prices() {
                println!("{:20} {:>14.6}", sp.category, sp.value);
            }
            let priced: Vec<_> = dual.capacity_prices().iter().filter(|cp| cp.value.abs() > 1e-9).collect();
            if !priced.is_empty() {
                println!();
                println!("Capacity premiums:");
                for cp in priced {
                    println!("  {:20} {:>12.6}", cp.lot, cp.value);
                }
            }
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("Revenue is unlimited: no purchase plan meets every requirement exactly.");
        }
        SolutionStatus::Infeasible => println!("Status: INFEASIBLE"),
    }
}

pub fn print_trace(trace: &SensitivityTrace) {
    println!("Price sensitivity of {}", trace.lot());
    println!();
    println!("{:>12} {:>16} {:>16}  {}", "Price", "Total cost", "Revenue", "Quantities");
    for point in trace.points() {
        let cost = point
            .solution
            .objective_value()
            .map_or("infeasible".to_string(), |c| format!("{:.4}", c));
        let revenue = point
            .dual
            .as_ref()
            .and_then(DualSolution::objective_value)
            .map_or("-".to_string(), |r| format!("{:.4}", r));
        let quantities = point.solution.allocation().map_or(String::new(), |allocation| {
            allocation
                .quantities()
                .iter()
                .map(|q| format!("{:.2}", q))
                .collect::<Vec<_>>()
                .join(", ")
        });
        println!("{:>12.4} {:>16} {:>16}  {}", point.price, cost, revenue, quantities);
    }

    let breakpoints = trace.breakpoints();
    println!();
    if breakpoints.is_empty() {
        println!("No breakpoints: the optimal basis is the same at every price.");
        return;
    }
    println!("Breakpoints:");
    for bp in breakpoints {
        let changed = match (&bp.before, &bp.after) {
            (Some(before), Some(after)) => before
                .changed_lots(after)
                .into_iter()
                .map(|lot| {
                    format!(
                        "{} {} -> {}",
                        lot,
                        before.state(lot).map_or("?", state_label),
                        after.state(lot).map_or("?", state_label)
                    )
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => "feasibility changes".to_string(),
        };
        println!("  between {:.4} and {:.4}: {}", bp.lower_price, bp.upper_price, changed);
    }
}

fn state_label(state: LotState) -> &'static str {
    match state {
        LotState::Idle => "idle",
        LotState::Partial => "partial",
        LotState::Saturated => "saturated",
    }
}
