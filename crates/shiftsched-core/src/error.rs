//! Unified error type for the scheduling core.
//!
//! Mirrors the single-enum-per-crate convention used across this codebase's
//! solver crates: one `thiserror` enum at the library boundary, `anyhow` only
//! at the CLI layer.

use thiserror::Error;

use crate::validate::ValidationIssue;

/// Errors that can occur while building or solving a shift schedule.
#[derive(Error, Debug)]
pub enum ShiftSchedError {
    /// The payload failed validation (§4.2). Carries every issue found, not
    /// just the first — validation never short-circuits.
    #[error("invalid input: {} issue(s) found", .0.len())]
    InvalidInput(Vec<ValidationIssue>),

    /// The solver proved no feasible schedule exists.
    #[error("no feasible schedule exists for this input")]
    Infeasible,

    /// A cooperative cancellation was observed before a solution was found.
    #[error("run cancelled")]
    Cancelled,

    /// An unexpected failure inside the core (arithmetic overflow, solver
    /// library fault). Never silently downgraded from a more specific kind.
    #[error("internal error: {0}")]
    Internal(String),

    /// Failure talking to the underlying LP/MIP solver backend.
    #[error("solver error: {0}")]
    Solver(String),

    /// JSON (de)serialization failure at the I/O boundary.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ShiftSchedResult<T> = Result<T, ShiftSchedError>;
