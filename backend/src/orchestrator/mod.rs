//! Orchestrator module - main simulation engine
//!
//! The [`Simulator`] owns the world state, the scheduled-event queue, the
//! economy and the supplier registry, and advances them in response to
//! tool steps. [`snapshot`] provides the compact observation types that
//! external tooling (trajectory export, RL observers) consumes.

mod engine;
pub mod snapshot;

pub use engine::{EndOfDayOutcome, Simulator, TerminationReason, ECONOMY_SEED_XOR};
pub use snapshot::{compute_config_hash, StateSnapshot, StepRecord};
