pub mod advisory;
pub mod escalations;
pub mod incidents;
pub mod triage;
