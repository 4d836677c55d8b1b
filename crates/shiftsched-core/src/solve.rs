//! Search Driver & Observer (C6).
//!
//! `good_lp`/HiGHS has no solution-callback API the way CP-SAT's
//! `solver.Solve(model, callback)` does (see
//! `original_source/scheduler/solver.py::SolutionCollector`) — there is no
//! way to be notified mid-search each time the branch-and-bound tree proves
//! a better incumbent. This driver emulates the same strictly-improving-only
//! stream with a cutoff-resolve loop: solve to optimality, emit the result,
//! then re-solve with an added `objective > previous_best` constraint; each
//! resolve either finds a strictly better optimum (forcing CP-SAT-style
//! monotonic improvement) or proves none exists, at which point the
//! previous solution stands. Every model coefficient here is an integer, so
//! one unit is the smallest possible improvement and the cutoff only needs
//! a `+ 1.0` margin, not an epsilon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use good_lp::{constraint, Solution, SolverModel};

use crate::aggregate::{self, Schedule};
use crate::error::{ShiftSchedError, ShiftSchedResult};
use crate::model::{self, objective};
use crate::progress::ProgressEvent;
use crate::validate::ValidatedInput;

/// Cooperative cancellation handle and progress sink for one run.
#[derive(Clone)]
pub struct SolveConfig {
    pub cancel: Arc<AtomicBool>,
    pub progress: Option<Sender<ProgressEvent>>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }
}

impl SolveConfig {
    pub fn with_progress(progress: Sender<ProgressEvent>) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Run the cutoff-resolve loop to completion: solve, emit, tighten the
/// cutoff, repeat until the solver proves no further improvement exists or
/// the caller cancels. Returns the best schedule found so far on
/// cancellation, and only reports [`ShiftSchedError::Cancelled`] if nothing
/// was found before the cancellation arrived.
pub fn solve(input: &ValidatedInput, config: &SolveConfig) -> ShiftSchedResult<Schedule> {
    let mut best: Option<Schedule> = None;
    let mut solution_index: u32 = 0;
    let mut cutoff: Option<f64> = None;

    loop {
        if config.is_cancelled() {
            return best.ok_or(ShiftSchedError::Cancelled);
        }

        let built = model::build(input)?;
        let objective_expr = objective::expression(input, &built.decisions);

        let mut problem = built
            .vars
            .maximise(objective_expr.clone())
            .using(good_lp::solvers::highs::highs);
        for c in built.constraints {
            problem = problem.with(c);
        }
        if let Some(threshold) = cutoff {
            problem = problem.with(constraint!(objective_expr >= threshold + 1.0));
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(err) => {
                tracing::debug!(error = %err, "resolve found no further improvement");
                return best.ok_or(ShiftSchedError::Infeasible);
            }
        };

        let value_of = |v: good_lp::Variable| solution.value(v);
        let breakdown = objective::breakdown(input, &built.decisions, value_of);
        let total = breakdown.total();
        let schedule = aggregate::extract(input, &built.decisions, total, value_of);

        solution_index += 1;
        tracing::info!(
            run_id = %input.run_id,
            solution_index,
            objective_value = total,
            "found improving schedule"
        );
        if let Some(sender) = &config.progress {
            let event = ProgressEvent::new(&input.run_id, solution_index, breakdown, &schedule);
            if sender.send(event).is_err() {
                tracing::debug!("progress receiver dropped; continuing without reporting");
            }
        }

        best = Some(schedule);
        cutoff = Some(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DynamicInputs, InputPayload, RawTable, StaticConfig};
    use crate::time::{horizon_minutes, slots};
    use crate::validate::validate;

    fn demand_table(horizon: i64, demand: i64) -> RawTable {
        let mut data = Vec::new();
        for t in slots(horizon) {
            let (d, h, m) = crate::time::from_t(t);
            data.push(vec![d, h, m, demand]);
        }
        RawTable {
            columns: vec!["day".into(), "hour".into(), "minute".into(), "demand".into()],
            index: Vec::new(),
            data,
        }
    }

    fn tiny_payload() -> InputPayload {
        InputPayload {
            run_id: "test-run".into(),
            num_workers: 1,
            static_config: StaticConfig {
                num_hours: 4,
                num_vehicles: 2,
                min_duration_hours: 2,
                max_duration_hours: 4,
                cost_vehicle_per_15min: 1,
                revenue_passenger: 10,
                max_starts_per_slot: 2,
                max_ends_per_slot: 2,
                enable_rush_hour_constraint: false,
                enable_market_hour_constraint: false,
                enable_min_shift_constraint: false,
                rush_hour_soft_constraint_cost: 0,
                minimum_shifts_soft_constraint_cost: 0,
                min_time_between_shifts: 0,
            },
            dynamic: DynamicInputs {
                demand_forecast: demand_table(horizon_minutes(4), 2),
                minimum_shifts: None,
                rush_hours: None,
                market_hours: None,
                fixed_shifts: None,
            },
        }
    }

    #[test]
    fn trivial_case_finds_a_feasible_schedule() {
        let payload = tiny_payload();
        let validated = validate(&payload).expect("payload should validate");
        let schedule = solve(&validated, &SolveConfig::default()).expect("should find a schedule");
        assert!(schedule.objective_value > 0.0);
    }

    #[test]
    fn pre_cancelled_run_with_no_prior_solution_reports_cancelled() {
        let payload = tiny_payload();
        let validated = validate(&payload).expect("payload should validate");
        let cancel = Arc::new(AtomicBool::new(true));
        let config = SolveConfig {
            cancel,
            progress: None,
        };
        let result = solve(&validated, &config);
        assert!(matches!(result, Err(ShiftSchedError::Cancelled)));
    }
}
