//! Input Validator (C2).
//!
//! Normalizes a raw [`InputPayload`] into a [`ValidatedInput`] the model
//! builder (C3/C4) can consume directly, or rejects it with every problem
//! found at once. Accumulate-then-report mirrors
//! `original_source/scheduler/utils.py::validate_fixed_shifts_input`, which
//! never stops at the first bad row — an operator fixing a payload wants the
//! whole list, not one error per submit.

use std::collections::HashMap;
use std::fmt;

use crate::input::{table_to_fixed_shifts, table_to_t_map, FixedShiftRow, InputPayload};
use crate::time::{horizon_minutes, slots, STEP_MINUTES};

/// A single validation problem, tagged with the field or table it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Normalized, internally-consistent input ready for model building.
///
/// All durations and table keys are minutes (`t`); `_hours` fields from the
/// wire payload do not survive into this type.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    pub run_id: String,
    pub horizon: i64,
    pub num_vehicles: i64,
    pub min_duration: i64,
    pub max_duration: i64,
    pub cost_vehicle_per_15min: i64,
    pub revenue_passenger: i64,
    pub max_starts_per_slot: i64,
    pub max_ends_per_slot: i64,
    pub min_time_between_shifts: i64,
    pub enable_rush_hour_constraint: bool,
    pub enable_market_hour_constraint: bool,
    pub enable_min_shift_constraint: bool,
    pub rush_hour_soft_constraint_cost: i64,
    pub minimum_shifts_soft_constraint_cost: i64,
    pub demand: HashMap<i64, i64>,
    pub minimum_shifts: HashMap<i64, i64>,
    pub rush_hours: HashMap<i64, i64>,
    pub market_hours: HashMap<i64, i64>,
    pub fixed_shifts: Vec<FixedShiftRow>,
}

/// Validate and normalize a raw payload.
///
/// On success, every table referenced by an enabled constraint is complete
/// over the horizon's slot set and every fixed shift is internally
/// consistent. On failure, returns every issue found, not just the first.
pub fn validate(payload: &InputPayload) -> Result<ValidatedInput, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let cfg = &payload.static_config;

    if cfg.num_hours <= 0 {
        issues.push(ValidationIssue::new("static.num_hours", "must be positive"));
    }
    if cfg.num_vehicles <= 0 {
        issues.push(ValidationIssue::new(
            "static.num_vehicles",
            "must be positive",
        ));
    }
    let min_duration = cfg.min_duration_hours * 60;
    let max_duration = cfg.max_duration_hours * 60;
    if min_duration % STEP_MINUTES != 0 || max_duration % STEP_MINUTES != 0 {
        issues.push(ValidationIssue::new(
            "static.{min,max}_duration_hours",
            format!("duration must be a multiple of {STEP_MINUTES} minutes"),
        ));
    }
    if min_duration <= 0 || max_duration < min_duration {
        issues.push(ValidationIssue::new(
            "static.{min,max}_duration_hours",
            "require 0 < min_duration <= max_duration",
        ));
    }
    if cfg.min_time_between_shifts < 0 || cfg.min_time_between_shifts % STEP_MINUTES != 0 {
        issues.push(ValidationIssue::new(
            "static.min_time_between_shifts",
            format!("must be a non-negative multiple of {STEP_MINUTES} minutes"),
        ));
    }
    if cfg.max_starts_per_slot <= 0 || cfg.max_ends_per_slot <= 0 {
        issues.push(ValidationIssue::new(
            "static.{max_starts,max_ends}_per_slot",
            "must be positive",
        ));
    }
    if cfg.cost_vehicle_per_15min < 0 || cfg.revenue_passenger < 0 {
        issues.push(ValidationIssue::new(
            "static.{cost_vehicle_per_15min,revenue_passenger}",
            "must be non-negative",
        ));
    }
    if cfg.enable_rush_hour_constraint && cfg.rush_hour_soft_constraint_cost < 0 {
        issues.push(ValidationIssue::new(
            "static.rush_hour_soft_constraint_cost",
            "must be non-negative when rush-hour constraint is enabled",
        ));
    }
    if cfg.enable_min_shift_constraint && cfg.minimum_shifts_soft_constraint_cost < 0 {
        issues.push(ValidationIssue::new(
            "static.minimum_shifts_soft_constraint_cost",
            "must be non-negative when the minimum-shift constraint is enabled",
        ));
    }

    // Bail before touching tables if the horizon itself is unusable; slot
    // math below assumes a positive, step-aligned horizon.
    if cfg.num_hours <= 0 {
        return Err(issues);
    }
    let horizon = horizon_minutes(cfg.num_hours);
    let expected_slots: Vec<i64> = slots(horizon);

    let demand = match table_to_t_map(&payload.dynamic.demand_forecast, "demand") {
        Ok(map) => {
            check_table_total(&map, &expected_slots, "dynamic.demand_forecast", &mut issues);
            map
        }
        Err(e) => {
            issues.push(ValidationIssue::new("dynamic.demand_forecast", e));
            HashMap::new()
        }
    };

    // Both tables feed the objective's soft penalty pricing unconditionally
    // (see `model::objective`), not just the hard overlay gated by the flag,
    // so a nonzero soft cost also makes the table required.
    let minimum_shifts = optional_t_table(
        &payload.dynamic.minimum_shifts,
        "minimum_shifts",
        cfg.enable_min_shift_constraint || cfg.minimum_shifts_soft_constraint_cost > 0,
        "dynamic.minimum_shifts",
        &expected_slots,
        &mut issues,
    );
    let rush_hours = optional_t_table(
        &payload.dynamic.rush_hours,
        "rush_hour",
        cfg.enable_rush_hour_constraint || cfg.rush_hour_soft_constraint_cost > 0,
        "dynamic.rush_hours",
        &expected_slots,
        &mut issues,
    );
    let market_hours = optional_t_table(
        &payload.dynamic.market_hours,
        "market_open",
        cfg.enable_market_hour_constraint,
        "dynamic.market_hours",
        &expected_slots,
        &mut issues,
    );

    let fixed_shifts = match &payload.dynamic.fixed_shifts {
        Some(table) => match table_to_fixed_shifts(table) {
            Ok(rows) => {
                validate_fixed_shifts(&rows, cfg.num_vehicles, horizon, min_duration, max_duration, &mut issues);
                rows
            }
            Err(e) => {
                issues.push(ValidationIssue::new("dynamic.fixed_shifts", e));
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ValidatedInput {
        run_id: payload.run_id.clone(),
        horizon,
        num_vehicles: cfg.num_vehicles,
        min_duration,
        max_duration,
        cost_vehicle_per_15min: cfg.cost_vehicle_per_15min,
        revenue_passenger: cfg.revenue_passenger,
        max_starts_per_slot: cfg.max_starts_per_slot,
        max_ends_per_slot: cfg.max_ends_per_slot,
        min_time_between_shifts: cfg.min_time_between_shifts,
        enable_rush_hour_constraint: cfg.enable_rush_hour_constraint,
        enable_market_hour_constraint: cfg.enable_market_hour_constraint,
        enable_min_shift_constraint: cfg.enable_min_shift_constraint,
        rush_hour_soft_constraint_cost: cfg.rush_hour_soft_constraint_cost,
        minimum_shifts_soft_constraint_cost: cfg.minimum_shifts_soft_constraint_cost,
        demand,
        minimum_shifts,
        rush_hours,
        market_hours,
        fixed_shifts,
    })
}

fn check_table_total(
    map: &HashMap<i64, i64>,
    expected_slots: &[i64],
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let missing: Vec<i64> = expected_slots
        .iter()
        .filter(|t| !map.contains_key(t))
        .copied()
        .collect();
    if !missing.is_empty() {
        issues.push(ValidationIssue::new(
            field,
            format!("missing {} of {} required slots", missing.len(), expected_slots.len()),
        ));
    }
}

#[allow(clippy::too_many_arguments)]
fn optional_t_table(
    table: &Option<crate::input::RawTable>,
    value_column: &str,
    required_by_flag: bool,
    field: &str,
    expected_slots: &[i64],
    issues: &mut Vec<ValidationIssue>,
) -> HashMap<i64, i64> {
    match table {
        Some(t) => match table_to_t_map(t, value_column) {
            Ok(map) => {
                check_table_total(&map, expected_slots, field, issues);
                map
            }
            Err(e) => {
                issues.push(ValidationIssue::new(field, e));
                HashMap::new()
            }
        },
        None => {
            if required_by_flag {
                issues.push(ValidationIssue::new(
                    field,
                    "table is required because the corresponding constraint or soft cost is enabled",
                ));
            }
            HashMap::new()
        }
    }
}

fn validate_fixed_shifts(
    rows: &[FixedShiftRow],
    num_vehicles: i64,
    horizon: i64,
    min_duration: i64,
    max_duration: i64,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut seen_ids = std::collections::HashSet::new();
    let mut by_vehicle: HashMap<i64, Vec<(i64, i64)>> = HashMap::new();

    for row in rows {
        if !seen_ids.insert(row.shift_id) {
            issues.push(ValidationIssue::new(
                "dynamic.fixed_shifts",
                format!("duplicate shift_id {}", row.shift_id),
            ));
        }
        if row.vehicle < 0 || row.vehicle >= num_vehicles {
            issues.push(ValidationIssue::new(
                "dynamic.fixed_shifts",
                format!(
                    "shift_id {} references vehicle {} outside [0, {num_vehicles})",
                    row.shift_id, row.vehicle
                ),
            ));
        }
        if row.end_t <= row.start_t {
            issues.push(ValidationIssue::new(
                "dynamic.fixed_shifts",
                format!("shift_id {} has end <= start", row.shift_id),
            ));
            continue;
        }
        if row.start_t % STEP_MINUTES != 0 || row.end_t % STEP_MINUTES != 0 {
            issues.push(ValidationIssue::new(
                "dynamic.fixed_shifts",
                format!("shift_id {} is not aligned to the {STEP_MINUTES}-minute step", row.shift_id),
            ));
        }
        if row.start_t < 0 || row.end_t > horizon {
            issues.push(ValidationIssue::new(
                "dynamic.fixed_shifts",
                format!("shift_id {} falls outside the run horizon", row.shift_id),
            ));
        }
        // `end_t` is the shift's last active slot (inclusive), so the real
        // duration is one step longer than the raw endpoint difference.
        let duration = row.end_t - row.start_t + STEP_MINUTES;
        if duration < min_duration || duration > max_duration {
            issues.push(ValidationIssue::new(
                "dynamic.fixed_shifts",
                format!(
                    "shift_id {} has duration {duration} outside [{min_duration}, {max_duration}]",
                    row.shift_id
                ),
            ));
        }
        by_vehicle
            .entry(row.vehicle)
            .or_default()
            .push((row.start_t, row.end_t));
    }

    for (vehicle, mut spans) in by_vehicle {
        spans.sort_unstable();
        for pair in spans.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            // `prev_end` is still an active slot, so a shift starting there
            // or earlier shares it with the previous one.
            if next_start <= prev_end {
                issues.push(ValidationIssue::new(
                    "dynamic.fixed_shifts",
                    format!("vehicle {vehicle} has overlapping fixed shifts"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DynamicInputs, RawTable, StaticConfig};

    fn demand_table(horizon: i64) -> RawTable {
        let mut data = Vec::new();
        for t in slots(horizon) {
            let (d, h, m) = crate::time::from_t(t);
            data.push(vec![d, h, m, 3]);
        }
        RawTable {
            columns: vec!["day".into(), "hour".into(), "minute".into(), "demand".into()],
            index: Vec::new(),
            data,
        }
    }

    fn base_payload() -> InputPayload {
        InputPayload {
            run_id: "run-1".into(),
            num_workers: 1,
            static_config: StaticConfig {
                num_hours: 24,
                num_vehicles: 5,
                min_duration_hours: 4,
                max_duration_hours: 10,
                cost_vehicle_per_15min: 10,
                revenue_passenger: 50,
                max_starts_per_slot: 5,
                max_ends_per_slot: 5,
                enable_rush_hour_constraint: false,
                enable_market_hour_constraint: false,
                enable_min_shift_constraint: false,
                rush_hour_soft_constraint_cost: 0,
                minimum_shifts_soft_constraint_cost: 0,
                min_time_between_shifts: 60,
            },
            dynamic: DynamicInputs {
                demand_forecast: demand_table(horizon_minutes(24)),
                minimum_shifts: None,
                rush_hours: None,
                market_hours: None,
                fixed_shifts: None,
            },
        }
    }

    #[test]
    fn valid_payload_passes() {
        let payload = base_payload();
        let validated = validate(&payload).expect("should validate");
        assert_eq!(validated.num_vehicles, 5);
        assert_eq!(validated.min_duration, 240);
        assert_eq!(validated.demand.len(), 96);
    }

    #[test]
    fn incomplete_demand_table_is_rejected() {
        let mut payload = base_payload();
        payload.dynamic.demand_forecast.data.pop();
        let issues = validate(&payload).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "dynamic.demand_forecast"));
    }

    #[test]
    fn enabled_constraint_without_table_is_rejected() {
        let mut payload = base_payload();
        payload.static_config.enable_rush_hour_constraint = true;
        let issues = validate(&payload).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "dynamic.rush_hours"));
    }

    #[test]
    fn overlapping_fixed_shifts_are_rejected() {
        let mut payload = base_payload();
        payload.dynamic.fixed_shifts = Some(RawTable {
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
                vec![0, 0, 0, 0, 0, 0, 4, 0],
                vec![1, 0, 0, 2, 0, 0, 6, 0],
            ],
        });
        let issues = validate(&payload).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.message.contains("overlapping fixed shifts")));
    }

    #[test]
    fn all_issues_are_collected_not_just_the_first() {
        let mut payload = base_payload();
        payload.static_config.num_vehicles = -1;
        payload.static_config.cost_vehicle_per_15min = -1;
        let issues = validate(&payload).unwrap_err();
        assert!(issues.len() >= 2);
    }
}
