//! Objective (C5).
//!
//! `maximize revenue - cost - soft penalties`, mirroring
//! `original_source/scheduler/solver.py::define_maximization_function`:
//! revenue from `served[t]`, fleet cost from active vehicles, and a rush-hour
//! penalty on shifts ending inside a rush window. The rush and minimum-shift
//! penalty terms are priced unconditionally, the same way
//! `auxiliary.py::define_min_shifts_to_vehicles_difference` is called
//! regardless of `enable_min_shift_constraint` — the corresponding hard
//! overlay constraints in `model::constraints` only layer extra constraints
//! on top when their flag is on, they never gate the pricing here.

use good_lp::Expression;

use super::variables::Variables;
use crate::validate::ValidatedInput;

/// The components of one objective evaluation, kept separate so the
/// observer (C6) can report them individually the way
/// `solver.py::compute_maximization_function_components` does.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectiveBreakdown {
    pub revenue: f64,
    pub vehicle_cost: f64,
    pub rush_penalty: f64,
    pub deficit_penalty: f64,
}

impl ObjectiveBreakdown {
    pub fn total(&self) -> f64 {
        self.revenue - self.vehicle_cost - self.rush_penalty - self.deficit_penalty
    }
}

/// Build the maximization objective as a single linear expression.
pub fn expression(input: &ValidatedInput, decisions: &Variables) -> Expression {
    let mut revenue = Expression::from(0.0);
    for &s in &decisions.served {
        revenue += input.revenue_passenger as f64 * s;
    }

    let mut vehicle_cost = Expression::from(0.0);
    for &s in &decisions.state {
        vehicle_cost += input.cost_vehicle_per_15min as f64 * s;
    }

    let mut rush_penalty = Expression::from(0.0);
    for (t_index, t) in decisions.slots.iter().enumerate() {
        if input.rush_hours.get(t).copied().unwrap_or(0) == 0 {
            continue;
        }
        for vehicle in 0..decisions.num_vehicles {
            rush_penalty += input.rush_hour_soft_constraint_cost as f64
                * decisions.end[decisions.idx(t_index, vehicle)];
        }
    }

    let mut deficit_penalty = Expression::from(0.0);
    for &d in &decisions.deficit {
        deficit_penalty += input.minimum_shifts_soft_constraint_cost as f64 * d;
    }

    revenue - vehicle_cost - rush_penalty - deficit_penalty
}

/// Re-derive the revenue/cost/penalty split from a solved model's raw
/// variable values, rather than trusting the scalar objective value alone —
/// the same recomputation `solver.py::compute_maximization_function_components`
/// performs before logging or persisting a solution.
pub fn breakdown(
    input: &ValidatedInput,
    decisions: &Variables,
    value_of: impl Fn(good_lp::Variable) -> f64,
) -> ObjectiveBreakdown {
    let revenue = decisions
        .served
        .iter()
        .map(|&s| value_of(s) * input.revenue_passenger as f64)
        .sum();

    let vehicle_cost = decisions
        .state
        .iter()
        .map(|&s| value_of(s) * input.cost_vehicle_per_15min as f64)
        .sum();

    let rush_penalty = decisions
        .slots
        .iter()
        .enumerate()
        .map(|(t_index, t)| {
            let is_rush = input.rush_hours.get(t).copied().unwrap_or(0) != 0;
            if !is_rush {
                return 0.0;
            }
            (0..decisions.num_vehicles)
                .map(|vehicle| value_of(decisions.end[decisions.idx(t_index, vehicle)]))
                .sum::<f64>()
                * input.rush_hour_soft_constraint_cost as f64
        })
        .sum();

    let deficit_penalty = decisions
        .deficit
        .iter()
        .map(|&d| value_of(d) * input.minimum_shifts_soft_constraint_cost as f64)
        .sum();

    ObjectiveBreakdown {
        revenue,
        vehicle_cost,
        rush_penalty,
        deficit_penalty,
    }
}
