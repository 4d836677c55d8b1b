//! External payload shapes (§6).
//!
//! These are the wire types the host hands to [`crate::validate::validate`].
//! Field names are normative per the external interface contract; tables are
//! accepted in the row-oriented `{columns, index, data}` shape a pandas
//! `DataFrame.to_dict(orient="split")` export produces, since the original
//! system (see `original_source/`) round-trips its constraint tables through
//! pandas before handing them to the solver.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A row-oriented table: `columns` names each column, `data` holds one row
/// per entry (parallel to `index`, which this core does not interpret).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub index: Vec<i64>,
    pub data: Vec<Vec<i64>>,
}

impl RawTable {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up the named columns in each row, failing if any are absent.
    ///
    /// Returns one `Vec<i64>` per row, ordered to match `names`.
    pub fn project(&self, names: &[&str]) -> Result<Vec<Vec<i64>>, String> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| {
                self.column_index(n)
                    .ok_or_else(|| format!("table missing required column '{n}'"))
            })
            .collect::<Result<_, _>>()?;
        Ok(self
            .data
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect())
    }
}

/// Static, per-run configuration (§3 `StaticConfig`).
///
/// Durations arrive in hours on the wire and are normalized to minutes at
/// validation time (see [`crate::validate::validate`]); the `_hours` suffix
/// marks the raw, unconverted field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    pub num_hours: i64,
    pub num_vehicles: i64,
    pub min_duration_hours: i64,
    pub max_duration_hours: i64,
    pub cost_vehicle_per_15min: i64,
    pub revenue_passenger: i64,
    pub max_starts_per_slot: i64,
    pub max_ends_per_slot: i64,
    pub enable_rush_hour_constraint: bool,
    pub enable_market_hour_constraint: bool,
    pub enable_min_shift_constraint: bool,
    pub rush_hour_soft_constraint_cost: i64,
    pub minimum_shifts_soft_constraint_cost: i64,
    pub min_time_between_shifts: i64,
}

/// Dynamic, per-run inputs (§3 `DynamicInputs`), still in wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicInputs {
    pub demand_forecast: RawTable,
    #[serde(default)]
    pub minimum_shifts: Option<RawTable>,
    #[serde(default)]
    pub rush_hours: Option<RawTable>,
    #[serde(default)]
    pub market_hours: Option<RawTable>,
    #[serde(default)]
    pub fixed_shifts: Option<RawTable>,
}

/// The full input payload handed to a run (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPayload {
    pub run_id: String,
    pub num_workers: u32,
    #[serde(rename = "static")]
    pub static_config: StaticConfig,
    pub dynamic: DynamicInputs,
}

/// One fixed-shift descriptor, already projected out of its `RawTable` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedShiftRow {
    pub shift_id: i64,
    pub vehicle: i64,
    pub start_t: i64,
    pub end_t: i64,
}

/// Project a time-indexed table's `(day, hour, minute, value)` rows into a
/// sparse `t -> value` map using the time model (C1).
pub fn table_to_t_map(table: &RawTable, value_column: &str) -> Result<HashMap<i64, i64>, String> {
    let rows = table.project(&["day", "hour", "minute", value_column])?;
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let t = crate::time::to_t(row[0], row[1], row[2]);
        map.insert(t, row[3]);
    }
    Ok(map)
}

/// Project the `fixed_shifts` table into typed rows with both boundaries
/// collapsed to minute indices via the time model.
pub fn table_to_fixed_shifts(table: &RawTable) -> Result<Vec<FixedShiftRow>, String> {
    let rows = table.project(&[
        "shift_id", "vehicle", "sday", "shour", "sminute", "eday", "ehour", "eminute",
    ])?;
    Ok(rows
        .into_iter()
        .map(|r| FixedShiftRow {
            shift_id: r[0],
            vehicle: r[1],
            start_t: crate::time::to_t(r[2], r[3], r[4]),
            end_t: crate::time::to_t(r[5], r[6], r[7]),
        })
        .collect())
}
