pub mod assistant;
pub mod triage;
