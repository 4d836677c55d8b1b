//! Vehicle shift-scheduling optimization core.
//!
//! Builds and solves a mixed-integer model that assigns each vehicle in a
//! fleet at most one contiguous shift over a 15-minute-stepped horizon,
//! maximizing served-demand revenue minus fleet cost and soft penalties.
//!
//! ```text
//!  InputPayload --validate--> ValidatedInput --model::build--> ConstrainedModel
//!                                             --solve-->      Schedule
//! ```

pub mod aggregate;
pub mod error;
pub mod input;
pub mod model;
pub mod progress;
pub mod session;
pub mod solve;
pub mod time;
pub mod validate;

pub use aggregate::Schedule;
pub use error::{ShiftSchedError, ShiftSchedResult};
pub use input::InputPayload;
pub use progress::ProgressEvent;
pub use session::Session;
pub use validate::{validate, ValidatedInput, ValidationIssue};
