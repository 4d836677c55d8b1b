//! Scenario tests against the full validate -> build -> solve pipeline.

use shiftsched_core::solve::{solve, SolveConfig};
use shiftsched_core::time::{from_t, horizon_minutes, slots};
use shiftsched_core::{validate, InputPayload};

use shiftsched_core::input::{DynamicInputs, RawTable, StaticConfig};

fn demand_table(horizon: i64, demand: i64) -> RawTable {
    let data = slots(horizon)
        .into_iter()
        .map(|t| {
            let (d, h, m) = from_t(t);
            vec![d, h, m, demand]
        })
        .collect();
    RawTable {
        columns: vec!["day".into(), "hour".into(), "minute".into(), "demand".into()],
        index: Vec::new(),
        data,
    }
}

fn flag_table(horizon: i64, column: &str, active_hours: &[i64]) -> RawTable {
    let data = slots(horizon)
        .into_iter()
        .map(|t| {
            let (d, h, m) = from_t(t);
            let value = if active_hours.contains(&h) { 1 } else { 0 };
            vec![d, h, m, value]
        })
        .collect();
    RawTable {
        columns: vec!["day".into(), "hour".into(), "minute".into(), column.into()],
        index: Vec::new(),
        data,
    }
}

fn base_config(num_hours: i64, num_vehicles: i64) -> StaticConfig {
    StaticConfig {
        num_hours,
        num_vehicles,
        min_duration_hours: 2,
        max_duration_hours: 6,
        cost_vehicle_per_15min: 1,
        revenue_passenger: 20,
        max_starts_per_slot: num_vehicles,
        max_ends_per_slot: num_vehicles,
        enable_rush_hour_constraint: false,
        enable_market_hour_constraint: false,
        enable_min_shift_constraint: false,
        rush_hour_soft_constraint_cost: 0,
        minimum_shifts_soft_constraint_cost: 0,
        min_time_between_shifts: 60,
    }
}

#[test]
fn market_closure_keeps_vehicles_idle_outside_open_hours() {
    let horizon = horizon_minutes(24);
    let mut cfg = base_config(24, 3);
    cfg.enable_market_hour_constraint = true;

    let payload = InputPayload {
        run_id: "market-closure".into(),
        num_workers: 1,
        static_config: cfg,
        dynamic: DynamicInputs {
            demand_forecast: demand_table(horizon, 5),
            minimum_shifts: None,
            rush_hours: None,
            market_hours: Some(flag_table(horizon, "market_open", &(8..20).collect::<Vec<_>>())),
            fixed_shifts: None,
        },
    };

    let validated = validate(&payload).expect("payload should validate");
    let schedule = solve(&validated, &SolveConfig::default()).expect("should find a schedule");

    for slot in &schedule.slots {
        if !(8..20).contains(&slot.hour) {
            assert_eq!(
                slot.active_vehicles, 0,
                "vehicle active outside market hours at t={}",
                slot.t
            );
        }
    }
}

#[test]
fn rush_hour_penalty_discourages_ending_shifts_in_the_window() {
    let horizon = horizon_minutes(24);
    let mut cfg = base_config(24, 2);
    cfg.enable_rush_hour_constraint = true;
    cfg.rush_hour_soft_constraint_cost = 1_000;

    let payload = InputPayload {
        run_id: "rush-penalty".into(),
        num_workers: 1,
        static_config: cfg,
        dynamic: DynamicInputs {
            demand_forecast: demand_table(horizon, 2),
            minimum_shifts: None,
            rush_hours: Some(flag_table(horizon, "rush_hour", &[17, 18])),
            market_hours: None,
            fixed_shifts: None,
        },
    };

    let validated = validate(&payload).expect("payload should validate");
    let schedule = solve(&validated, &SolveConfig::default()).expect("should find a schedule");

    for shift in &schedule.shifts {
        let (_, end_hour, _) = from_t(shift.end_t);
        assert!(
            !(17..=18).contains(&end_hour),
            "shift for vehicle {} ends inside the penalized rush window",
            shift.vehicle
        );
    }
}

#[test]
fn minimum_shift_hard_mode_meets_every_slot_and_prices_zero_deficit() {
    // Enough vehicles to satisfy the minimum everywhere, so the hard overlay
    // (P6) is actually satisfiable rather than contradicting fleet size.
    let horizon = horizon_minutes(12);
    let mut cfg = base_config(12, 3);
    cfg.min_duration_hours = 12;
    cfg.max_duration_hours = 12;
    cfg.enable_min_shift_constraint = true;
    cfg.minimum_shifts_soft_constraint_cost = 1;

    let payload = InputPayload {
        run_id: "deficit-hard".into(),
        num_workers: 1,
        static_config: cfg,
        dynamic: DynamicInputs {
            demand_forecast: demand_table(horizon, 3),
            minimum_shifts: Some(
                flag_table(horizon, "minimum_shifts", &(0..12).collect::<Vec<_>>()).tap_demand(2),
            ),
            rush_hours: None,
            market_hours: None,
            fixed_shifts: None,
        },
    };

    let validated = validate(&payload).expect("payload should validate");
    let schedule = solve(&validated, &SolveConfig::default()).expect("should find a schedule");

    // P6: enforced minimum holds at every slot.
    for slot in &schedule.slots {
        assert!(
            slot.active_vehicles >= 2,
            "t={} has only {} active vehicles, below the enforced minimum",
            slot.t,
            slot.active_vehicles
        );
    }
}

#[test]
fn minimum_shift_soft_mode_prices_the_uncapped_deficit() {
    // Mirrors spec Scenario 5: the flag stays off, so the deficit is priced
    // rather than forbidden. Two vehicles against a minimum of 3 over a
    // 3-hour (12-slot) window leaves a deficit of 1 at each of those slots;
    // at a unit penalty that's a constraint_penalty of exactly 12.
    let horizon = horizon_minutes(24);
    let mut cfg = base_config(24, 2);
    cfg.min_duration_hours = 24;
    cfg.max_duration_hours = 24;
    cfg.enable_min_shift_constraint = false;
    cfg.minimum_shifts_soft_constraint_cost = 1;

    let mut minimum_shifts = flag_table(horizon, "minimum_shifts", &[]);
    for (t_index, t) in slots(horizon).into_iter().enumerate() {
        let (_, hour, _) = from_t(t);
        minimum_shifts.data[t_index][3] = if (12..15).contains(&hour) { 3 } else { 0 };
    }

    let payload = InputPayload {
        run_id: "deficit-soft".into(),
        num_workers: 1,
        static_config: cfg,
        dynamic: DynamicInputs {
            demand_forecast: demand_table(horizon, 2),
            minimum_shifts: Some(minimum_shifts),
            rush_hours: None,
            market_hours: None,
            fixed_shifts: None,
        },
    };

    let validated = validate(&payload).expect("payload should validate");

    let (tx, rx) = std::sync::mpsc::channel();
    let schedule = solve(&validated, &SolveConfig::with_progress(tx)).expect("should find a schedule");
    let last_event = rx.into_iter().last().expect("at least one progress event");

    for slot in &schedule.slots {
        let (_, hour, _) = from_t(slot.t);
        if (12..15).contains(&hour) {
            assert_eq!(slot.active_vehicles, 2, "both vehicles should stay dispatched");
        }
    }

    assert_eq!(last_event.deficit_penalty, 12.0);
}

trait TapDemand {
    fn tap_demand(self, value: i64) -> Self;
}

impl TapDemand for RawTable {
    fn tap_demand(mut self, value: i64) -> Self {
        for row in &mut self.data {
            *row.last_mut().unwrap() = value;
        }
        self
    }
}

#[test]
fn conflicting_fixed_shifts_too_close_together_are_infeasible() {
    let horizon = horizon_minutes(12);
    let cfg = base_config(12, 1);
    // Neither fixed shift overlaps the other (so validation passes), but
    // both are pinned to the same vehicle, which only has one shift to
    // give — CB2 (enforced at solve time, not at the validation layer)
    // makes this infeasible.
    let fixed = RawTable {
        columns: vec![
            "shift_id".into(),
            "vehicle".into(),
            "sday".into(),
            "shour".into(),
            "sminute".into(),
            "eday".into(),
            "ehour".into(),
            "eminute".into(),
        ],
        index: Vec::new(),
        data: vec![
            vec![0, 0, 0, 0, 0, 0, 2, 0],
            vec![1, 0, 0, 3, 0, 0, 5, 0],
        ],
    };

    let payload = InputPayload {
        run_id: "conflict".into(),
        num_workers: 1,
        static_config: cfg,
        dynamic: DynamicInputs {
            demand_forecast: demand_table(horizon, 1),
            minimum_shifts: None,
            rush_hours: None,
            market_hours: None,
            fixed_shifts: Some(fixed),
        },
    };

    let validated = validate(&payload).expect("payload should validate");
    let result = solve(&validated, &SolveConfig::default());
    assert!(result.is_err(), "overlapping-gap fixed shifts should be infeasible");
}

#[test]
fn fixed_shift_is_honored_exactly() {
    let horizon = horizon_minutes(12);
    let cfg = base_config(12, 2);

    let mut fixed = RawTable {
        columns: vec![
            "shift_id".into(),
            "vehicle".into(),
            "sday".into(),
            "shour".into(),
            "sminute".into(),
            "eday".into(),
            "ehour".into(),
            "eminute".into(),
        ],
        index: Vec::new(),
        data: vec![vec![0, 0, 0, 2, 0, 0, 6, 0]],
    };
    fixed.index.push(0);

    let payload = InputPayload {
        run_id: "fixed".into(),
        num_workers: 1,
        static_config: cfg,
        dynamic: DynamicInputs {
            demand_forecast: demand_table(horizon, 2),
            minimum_shifts: None,
            rush_hours: None,
            market_hours: None,
            fixed_shifts: Some(fixed),
        },
    };

    let validated = validate(&payload).expect("payload should validate");
    let schedule = solve(&validated, &SolveConfig::default()).expect("should find a schedule");

    let pinned = schedule
        .shifts
        .iter()
        .find(|s| s.vehicle == 0)
        .expect("vehicle 0 should have the fixed shift");
    assert_eq!(pinned.start_t, shiftsched_core::time::to_t(0, 2, 0));
    assert_eq!(pinned.end_t, shiftsched_core::time::to_t(0, 6, 0));
}
