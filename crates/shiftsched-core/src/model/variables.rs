//! Decision Variables (C3).
//!
//! Every per-(slot, vehicle) variable is stored densely, row-major by slot,
//! matching the indexing scheme used throughout this core: `idx(t_index, v)
//! = t_index * num_vehicles + v`. A `HashMap<(t, v), Variable>` was
//! considered and rejected — with a full day at the 15-minute step and a
//! fleet in the hundreds this is a few hundred thousand keys, and the dense
//! layout turns every lookup into one multiply-add instead of a hash.

use good_lp::{variable, ProblemVariables, Variable};

use crate::validate::ValidatedInput;

/// Row-major index of `(t_index, vehicle)` into any of this module's flat
/// variable vectors.
pub fn idx(t_index: usize, vehicle: usize, num_vehicles: usize) -> usize {
    t_index * num_vehicles + vehicle
}

/// All decision variables for one model build, plus the slot axis they're
/// indexed against.
pub struct Variables {
    pub slots: Vec<i64>,
    pub num_vehicles: usize,

    /// `state[t,v]`: 1 if vehicle `v` is on an active shift during slot `t`.
    pub state: Vec<Variable>,
    /// `start[t,v]`: 1 if vehicle `v` begins a shift at slot `t`.
    pub start: Vec<Variable>,
    /// `end[t,v]`: 1 if vehicle `v`'s shift ends at slot `t` (the end slot is
    /// the last active slot of the shift, inclusive).
    pub end: Vec<Variable>,
    /// `cum_start[t,v]`: running count of starts for `v` up to and including `t`.
    pub cum_start: Vec<Variable>,
    /// `cum_end[t,v]`: running count of ends for `v` up to and including `t`.
    pub cum_end: Vec<Variable>,
    /// `served[t]`: passengers served in slot `t`, bounded above by both
    /// demand and active-vehicle count (see `model::objective`).
    pub served: Vec<Variable>,
    /// `deficit[t]`: shortfall of active vehicles below `minimum_shifts[t]`,
    /// zero when the minimum is met or the constraint is disabled.
    pub deficit: Vec<Variable>,

    /// Fixed-shift variables already pinned to 1 via a hard constraint,
    /// rather than left for the solver to rediscover (see `model::constraints`).
    pub fixed_pins: Vec<(usize, usize)>,
}

impl Variables {
    /// Allocate every decision variable needed for `input`, returning the
    /// `good_lp` variable registry alongside the typed index into it. The
    /// registry is only needed again once, to start the objective/solve
    /// step (`model::objective::build`); keeping it out of `Variables`
    /// means the index can be read from freely afterward without holding a
    /// half-moved struct.
    pub fn build(input: &ValidatedInput) -> (ProblemVariables, Self) {
        let slots = crate::time::slots(input.horizon);
        let num_vehicles = input.num_vehicles as usize;
        let n = slots.len() * num_vehicles;
        let max_cum = slots.len() as f64;

        let mut model = good_lp::variables!();

        let state = (0..n).map(|_| model.add(variable().binary())).collect();
        let start = (0..n).map(|_| model.add(variable().binary())).collect();
        let end = (0..n).map(|_| model.add(variable().binary())).collect();
        let cum_start = (0..n)
            .map(|_| model.add(variable().integer().min(0.0).max(max_cum)))
            .collect();
        let cum_end = (0..n)
            .map(|_| model.add(variable().integer().min(0.0).max(max_cum)))
            .collect();
        let served = slots
            .iter()
            .map(|t| {
                let demand = *input.demand.get(t).unwrap_or(&0) as f64;
                model.add(variable().integer().min(0.0).max(demand))
            })
            .collect();
        let deficit = slots
            .iter()
            .map(|_| {
                model.add(
                    variable()
                        .integer()
                        .min(0.0)
                        .max(input.num_vehicles as f64),
                )
            })
            .collect();

        let index = Self {
            slots,
            num_vehicles,
            state,
            start,
            end,
            cum_start,
            cum_end,
            served,
            deficit,
            fixed_pins: Vec::new(),
        };
        (model, index)
    }

    pub fn idx(&self, t_index: usize, vehicle: usize) -> usize {
        idx(t_index, vehicle, self.num_vehicles)
    }
}
