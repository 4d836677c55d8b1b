//! Progress event wire type (§6).
//!
//! Emitted once per strictly-improving solution the search driver (C6)
//! finds, the same strictly-improving-only discipline
//! `original_source/scheduler/solver.py::SolutionCollector.on_solution_callback`
//! uses (`if current_score > self._best_solution`). Per the Observer
//! contract (§4.6 steps 2-3), each event carries not just the scalar scores
//! but the per-slot aggregates and the per-vehicle schedule for that
//! solution — the sink would otherwise only ever see them on the final
//! return value, not as the search improves.

use serde::{Deserialize, Serialize};

use crate::aggregate::{Schedule, SlotAggregate, VehicleShift};
use crate::model::objective::ObjectiveBreakdown;

/// One improving solution found during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub run_id: String,
    pub solution_index: u32,
    pub objective_value: f64,
    pub revenue: f64,
    pub vehicle_cost: f64,
    pub rush_penalty: f64,
    pub deficit_penalty: f64,
    pub shifts: Vec<VehicleShift>,
    pub slots: Vec<SlotAggregate>,
    pub found_at: chrono::DateTime<chrono::Utc>,
}

impl ProgressEvent {
    pub fn new(
        run_id: &str,
        solution_index: u32,
        breakdown: ObjectiveBreakdown,
        schedule: &Schedule,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            solution_index,
            objective_value: breakdown.total(),
            revenue: breakdown.revenue,
            vehicle_cost: breakdown.vehicle_cost,
            rush_penalty: breakdown.rush_penalty,
            deficit_penalty: breakdown.deficit_penalty,
            shifts: schedule.shifts.clone(),
            slots: schedule.slots.clone(),
            found_at: chrono::Utc::now(),
        }
    }
}
