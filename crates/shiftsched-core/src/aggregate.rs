//! Result extraction: per-vehicle shift lists and per-slot aggregates read
//! back off a solved model's variable values.

use serde::{Deserialize, Serialize};

use crate::model::variables::Variables;
use crate::time::from_t;
use crate::validate::ValidatedInput;

/// One vehicle's assigned shift, or none if it was never dispatched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleShift {
    pub vehicle: usize,
    pub start_t: i64,
    pub end_t: i64,
}

/// Demand, supply, and shortfall for a single slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotAggregate {
    pub t: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub demand: i64,
    pub served: i64,
    pub active_vehicles: i64,
}

/// A fully materialized schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub run_id: String,
    pub objective_value: f64,
    pub shifts: Vec<VehicleShift>,
    pub slots: Vec<SlotAggregate>,
}

/// Extract vehicle shifts and slot aggregates from solved variable values.
pub fn extract(
    input: &ValidatedInput,
    decisions: &Variables,
    objective_value: f64,
    value_of: impl Fn(good_lp::Variable) -> f64,
) -> Schedule {
    let mut shifts = Vec::new();
    for vehicle in 0..decisions.num_vehicles {
        let mut start_t = None;
        let mut end_t = None;
        for (t_index, t) in decisions.slots.iter().enumerate() {
            let i = decisions.idx(t_index, vehicle);
            if value_of(decisions.start[i]) > 0.5 {
                start_t = Some(*t);
            }
            if value_of(decisions.end[i]) > 0.5 {
                end_t = Some(*t);
            }
        }
        if let (Some(s), Some(e)) = (start_t, end_t) {
            shifts.push(VehicleShift {
                vehicle,
                start_t: s,
                end_t: e,
            });
        }
    }

    let slots = decisions
        .slots
        .iter()
        .enumerate()
        .map(|(t_index, &t)| {
            let (day, hour, minute) = from_t(t);
            let active_vehicles = (0..decisions.num_vehicles)
                .filter(|&vehicle| value_of(decisions.state[decisions.idx(t_index, vehicle)]) > 0.5)
                .count() as i64;
            SlotAggregate {
                t,
                day,
                hour,
                minute,
                demand: *input.demand.get(&t).unwrap_or(&0),
                served: value_of(decisions.served[t_index]).round() as i64,
                active_vehicles,
            }
        })
        .collect();

    Schedule {
        run_id: input.run_id.clone(),
        objective_value,
        shifts,
        slots,
    }
}
