//! Constraint Builder (C4).
//!
//! Translates CB1-CB7 from CP-SAT's reified `OnlyEnforceIf` form (see
//! `original_source/scheduler/constraints/shift_span.py`, the modern
//! cumulative-sum scheme the distillation kept; `shifts_contiguous.py`'s
//! negated-bounded-span approach is the legacy predecessor and is not used
//! here) into plain linear constraints a non-reified MIP solver accepts.
//!
//! The reductions lean on one fact that isn't obvious from the CP-SAT source:
//! because starts and ends are both 0/1 and every other constraint here
//! keeps their running counts in lockstep to within one, `cum_start[t,v] -
//! cum_end[t,v]` can only ever be 0 or 1. That means "is vehicle `v` inside a
//! shift at `t`" doesn't need a reified `OnlyEnforceIf` at all — it's just
//! `state[t,v] == cum_start[t,v] - cum_end[t,v]`, a direct equality.

use good_lp::{constraint, Constraint, Expression};

use super::variables::Variables;
use crate::validate::ValidatedInput;

/// Sum a run of variables into one linear expression, the same `+=`
/// accumulation the TEP MILP builder uses to total generator and investment
/// costs term by term.
fn sum_vars(vars: impl IntoIterator<Item = good_lp::Variable>) -> Expression {
    let mut total = Expression::from(0.0);
    for v in vars {
        total += Expression::from(v);
    }
    total
}

/// Per-slot start/end caps: at most one start and one end landing on a given
/// slot across the whole fleet is NOT required by this system (many vehicles
/// may start or end together); instead each slot caps concurrent starts/ends
/// fleet-wide to `max_starts_per_slot` / `max_ends_per_slot`, bounding how
/// fast the dispatcher can ramp capacity up or down.
fn cb1_start_end_caps(input: &ValidatedInput, v: &Variables, out: &mut Vec<Constraint>) {
    for (t_index, _t) in v.slots.iter().enumerate() {
        let starts = sum_vars((0..v.num_vehicles).map(|vehicle| v.start[v.idx(t_index, vehicle)]));
        let ends = sum_vars((0..v.num_vehicles).map(|vehicle| v.end[v.idx(t_index, vehicle)]));
        out.push(constraint!(starts <= input.max_starts_per_slot as f64));
        out.push(constraint!(ends <= input.max_ends_per_slot as f64));
    }
}

/// CB1: at least one vehicle must be dispatched somewhere over the whole
/// horizon. Without this, whenever `revenue - cost` can't pay for any
/// vehicle, the solver's unconstrained optimum is the degenerate empty
/// schedule — every variable at 0, objective 0 — which this system forbids.
fn cb1_at_least_one_dispatch(v: &Variables, out: &mut Vec<Constraint>) {
    let all_starts = sum_vars((0..v.slots.len()).flat_map(|t_index| {
        (0..v.num_vehicles).map(move |vehicle| v.start[v.idx(t_index, vehicle)])
    }));
    out.push(constraint!(all_starts >= 1.0));
}

/// CB2: each vehicle may hold at most one shift across the whole horizon —
/// enforced by capping its lifetime start count (and, symmetrically, end
/// count) at 1, rather than a one-shift-per-day split.
fn cb2_one_shift_per_vehicle(v: &Variables, out: &mut Vec<Constraint>) {
    let last = v.slots.len() - 1;
    for vehicle in 0..v.num_vehicles {
        out.push(constraint!(
            Expression::from(v.cum_start[v.idx(last, vehicle)]) <= 1.0
        ));
        out.push(constraint!(
            Expression::from(v.cum_end[v.idx(last, vehicle)]) <= 1.0
        ));
    }
}

/// CB3: cumulative-count bookkeeping. `cum_start[t,v]` is a running total of
/// `start[t',v]` for `t' <= t`. `cum_end[t,v]` is the same total for `end`,
/// but lagged one slot (`t' < t`, not `t' <= t`): the end slot itself is the
/// *last active* slot (see `model::variables::Variables::end`), so an end
/// firing at `t` must not retire the vehicle until `t`'s own contribution to
/// `state` has been read off by CB6 — only from `t + step` on is it "spent".
fn cb3_cumulative_bookkeeping(v: &Variables, out: &mut Vec<Constraint>) {
    for vehicle in 0..v.num_vehicles {
        let first = v.idx(0, vehicle);
        out.push(constraint!(
            Expression::from(v.cum_start[first]) == Expression::from(v.start[first])
        ));
        out.push(constraint!(Expression::from(v.cum_end[first]) == 0.0));
        for t_index in 1..v.slots.len() {
            let cur = v.idx(t_index, vehicle);
            let prev = v.idx(t_index - 1, vehicle);
            out.push(constraint!(
                Expression::from(v.cum_start[cur])
                    == Expression::from(v.cum_start[prev]) + Expression::from(v.start[cur])
            ));
            out.push(constraint!(
                Expression::from(v.cum_end[cur])
                    == Expression::from(v.cum_end[prev]) + Expression::from(v.end[prev])
            ));
        }
    }
}

/// CB4: a shift that starts must eventually end, and a vehicle may not end a
/// shift it never started: `cum_start` and `cum_end` stay in lockstep to
/// within one at every slot. At the horizon boundary every start must be
/// matched by an end either already counted in (lagged) `cum_end` or firing
/// on the boundary slot itself, hence the `+ end[last]` term.
fn cb4_balanced_starts_and_ends(v: &Variables, out: &mut Vec<Constraint>) {
    let last = v.slots.len() - 1;
    for vehicle in 0..v.num_vehicles {
        let last_i = v.idx(last, vehicle);
        out.push(constraint!(
            Expression::from(v.cum_start[last_i])
                == Expression::from(v.cum_end[last_i]) + Expression::from(v.end[last_i])
        ));
        for t_index in 0..v.slots.len() {
            let i = v.idx(t_index, vehicle);
            let diff: Expression =
                Expression::from(v.cum_start[i]) - Expression::from(v.cum_end[i]);
            out.push(constraint!(diff.clone() >= 0.0));
            out.push(constraint!(diff <= 1.0));
        }
    }
}

/// CB5: minimum gap between consecutive shifts on the same vehicle. For
/// every start at `t`, no end may have occurred in the
/// `min_time_between_shifts` window immediately before it — otherwise the
/// vehicle would be redeployed before its rest window elapses.
fn cb5_minimum_gap(input: &ValidatedInput, v: &Variables, out: &mut Vec<Constraint>) {
    if input.min_time_between_shifts <= 0 {
        return;
    }
    let step = crate::time::STEP_MINUTES;
    let gap_slots = (input.min_time_between_shifts / step) as usize;
    for vehicle in 0..v.num_vehicles {
        for t_index in 0..v.slots.len() {
            let window_start = t_index.saturating_sub(gap_slots);
            if window_start == t_index {
                continue;
            }
            let recent_ends = sum_vars((window_start..t_index).map(|prior| v.end[v.idx(prior, vehicle)]));
            let start_i = Expression::from(v.start[v.idx(t_index, vehicle)]);
            // recent_ends == 0 whenever start_i == 1: recent_ends <= (1 - start_i) * gap_slots
            out.push(constraint!(
                recent_ends <= (gap_slots as f64) * (1.0 - start_i)
            ));
        }
    }
}

/// CB6: links `state` to the cumulative counters without reification —
/// `state[t,v]` is forced to equal `cum_start[t,v] - cum_end[t,v]`, which
/// CB4 already proved is always 0 or 1. Because `cum_end` lags one slot
/// behind `end` (see CB3), the slot an end fires on still reads as active
/// here, matching the last-active-slot convention.
fn cb6_state_from_cumulative(v: &Variables, out: &mut Vec<Constraint>) {
    for vehicle in 0..v.num_vehicles {
        for t_index in 0..v.slots.len() {
            let i = v.idx(t_index, vehicle);
            out.push(constraint!(
                Expression::from(v.state[i])
                    == Expression::from(v.cum_start[i]) - Expression::from(v.cum_end[i])
            ));
        }
    }
}

/// CB7: shift-length bound. A vehicle's single shift, if taken, must span
/// between `min_duration` and `max_duration` minutes; expressed directly off
/// the horizon-wide start/end totals rather than per-slot, since CB2 already
/// pins each vehicle to at most one shift.
fn cb7_duration_bounds(input: &ValidatedInput, v: &Variables, out: &mut Vec<Constraint>) {
    let step = crate::time::STEP_MINUTES as f64;
    let min_slots = input.min_duration as f64 / step;
    let max_slots = input.max_duration as f64 / step;
    for vehicle in 0..v.num_vehicles {
        let active = sum_vars((0..v.slots.len()).map(|t_index| v.state[v.idx(t_index, vehicle)]));
        // active == 0 when the vehicle never starts (cum_start at horizon end == 0);
        // otherwise active is exactly the shift length in slots.
        let took_shift = Expression::from(v.cum_start[v.idx(v.slots.len() - 1, vehicle)]);
        out.push(constraint!(active.clone() >= min_slots * took_shift.clone()));
        out.push(constraint!(active <= max_slots * took_shift));
    }
}

/// Market-hours constraint: a vehicle may not be active in a slot the market
/// is closed.
fn market_hours(input: &ValidatedInput, v: &Variables, out: &mut Vec<Constraint>) {
    if !input.enable_market_hour_constraint {
        return;
    }
    for (t_index, t) in v.slots.iter().enumerate() {
        if input.market_hours.get(t).copied().unwrap_or(1) != 0 {
            continue;
        }
        for vehicle in 0..v.num_vehicles {
            out.push(constraint!(
                Expression::from(v.state[v.idx(t_index, vehicle)]) == 0.0
            ));
        }
    }
}

/// Rush-hour hard mode: when enabled, no vehicle may end its shift inside a
/// rush-hour slot at all. The soft rush penalty in `model::objective` is
/// priced unconditionally and still applies underneath this — it only goes
/// slack once this hard overlay rules the violation out entirely.
fn rush_hour_hard(input: &ValidatedInput, v: &Variables, out: &mut Vec<Constraint>) {
    if !input.enable_rush_hour_constraint {
        return;
    }
    for (t_index, t) in v.slots.iter().enumerate() {
        if input.rush_hours.get(t).copied().unwrap_or(0) == 0 {
            continue;
        }
        for vehicle in 0..v.num_vehicles {
            out.push(constraint!(
                Expression::from(v.end[v.idx(t_index, vehicle)]) == 0.0
            ));
        }
    }
}

/// Fixed-shift constraint: pre-assigned shifts are pinned (`state == 1` for
/// their span, and their endpoints fix `start`/`end`) rather than left for
/// the solver to rediscover. `end_t` is the shift's last active slot
/// (inclusive), so the state pin spans `start_index..=end_index`.
fn fixed_shifts(input: &ValidatedInput, v: &mut Variables, out: &mut Vec<Constraint>) {
    let step = crate::time::STEP_MINUTES;
    for fixed in &input.fixed_shifts {
        let vehicle = fixed.vehicle as usize;
        let start_index = (fixed.start_t / step) as usize;
        let end_index = ((fixed.end_t / step) as usize).min(v.slots.len() - 1);
        out.push(constraint!(
            Expression::from(v.start[v.idx(start_index, vehicle)]) == 1.0
        ));
        out.push(constraint!(
            Expression::from(v.end[v.idx(end_index, vehicle)]) == 1.0
        ));
        for t_index in start_index..=end_index {
            out.push(constraint!(
                Expression::from(v.state[v.idx(t_index, vehicle)]) == 1.0
            ));
            v.fixed_pins.push((t_index, vehicle));
        }
    }
}

/// Served-passengers linking: `served[t] <= demand[t]` is already the
/// variable's upper bound (see `model::variables::build`); this adds the
/// other half, `served[t] <= sum_v state[t,v]`, so the objective's
/// maximization pulls `served[t]` up to `min(demand[t], active vehicles)`
/// without an explicit `min` operator.
fn served_linking(v: &Variables, out: &mut Vec<Constraint>) {
    for (t_index, _) in v.slots.iter().enumerate() {
        let active = sum_vars((0..v.num_vehicles).map(|vehicle| v.state[v.idx(t_index, vehicle)]));
        out.push(constraint!(Expression::from(v.served[t_index]) <= active));
    }
}

/// Minimum-shift deficit linking (soft target, always wired): `deficit[t] >=
/// minimum_shifts[t] - active_vehicles[t]`, minimized in the objective
/// rather than forced to zero, so a shortfall is expensive but not
/// infeasible. When `enable_min_shift_constraint` is on, the hard overlay
/// `active_vehicles[t] >= minimum_shifts[t]` is layered on top of this same
/// linking, forcing the deficit to zero everywhere it applies.
fn minimum_shift_deficit(input: &ValidatedInput, v: &Variables, out: &mut Vec<Constraint>) {
    for (t_index, t) in v.slots.iter().enumerate() {
        let required = *input.minimum_shifts.get(t).unwrap_or(&0) as f64;
        if required <= 0.0 {
            continue;
        }
        let active = sum_vars((0..v.num_vehicles).map(|vehicle| v.state[v.idx(t_index, vehicle)]));
        out.push(constraint!(
            Expression::from(v.deficit[t_index]) >= required - active.clone()
        ));
        if input.enable_min_shift_constraint {
            out.push(constraint!(active >= required));
        }
    }
}

/// Apply every constraint in CB1-CB7 order, plus the supplemented
/// market-hours, fixed-shift, serving, and deficit linkings.
pub fn apply(
    input: &ValidatedInput,
    mut decisions: Variables,
) -> Result<(Variables, Vec<Constraint>), String> {
    let mut constraints = Vec::new();

    cb1_start_end_caps(input, &decisions, &mut constraints);
    cb1_at_least_one_dispatch(&decisions, &mut constraints);
    cb2_one_shift_per_vehicle(&decisions, &mut constraints);
    cb3_cumulative_bookkeeping(&decisions, &mut constraints);
    cb4_balanced_starts_and_ends(&decisions, &mut constraints);
    cb5_minimum_gap(input, &decisions, &mut constraints);
    cb6_state_from_cumulative(&decisions, &mut constraints);
    cb7_duration_bounds(input, &decisions, &mut constraints);
    market_hours(input, &decisions, &mut constraints);
    rush_hour_hard(input, &decisions, &mut constraints);
    fixed_shifts(input, &mut decisions, &mut constraints);
    served_linking(&decisions, &mut constraints);
    minimum_shift_deficit(input, &decisions, &mut constraints);

    Ok((decisions, constraints))
}
