//! Model Builder (C3-C5).
//!
//! ```text
//!   ValidatedInput --variables::build--> Variables
//!                  --constraints::apply--> ConstrainedModel
//!                  --objective::build--> a solvable good_lp model
//! ```
//!
//! Split the same way the TEP MILP builder splits variable allocation from
//! constraint assembly from objective assembly, so each stage is testable
//! against the decision-variable indices alone.

pub mod constraints;
pub mod objective;
pub mod variables;

use good_lp::ProblemVariables;

use crate::error::{ShiftSchedError, ShiftSchedResult};
use crate::validate::ValidatedInput;
use variables::Variables;

/// A fully-constrained, not-yet-solved model: the `good_lp` variable
/// registry, the typed index into it, and every constraint CB1-CB7 demands.
pub struct ConstrainedModel {
    pub vars: ProblemVariables,
    pub decisions: Variables,
    pub constraints: Vec<good_lp::Constraint>,
}

/// Build variables and apply every constraint for one run.
pub fn build(input: &ValidatedInput) -> ShiftSchedResult<ConstrainedModel> {
    let (vars, decisions) = Variables::build(input);
    let (decisions, constraints) = constraints::apply(input, decisions)
        .map_err(|e| ShiftSchedError::Internal(format!("model construction failed: {e}")))?;
    Ok(ConstrainedModel {
        vars,
        decisions,
        constraints,
    })
}
