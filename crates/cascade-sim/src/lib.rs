//! Cascade Failure Simulator
//!
//! Produces the alarm set a single failing device is expected to trigger
//! across its dependents, and named fault scenarios built on top of it.

mod scenario;
mod simulator;

pub use scenario::Scenario;
pub use simulator::{CascadeFailureSimulator, PropagationPolicy, Relation};
