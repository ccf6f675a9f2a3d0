//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic random number
//! generation. CRITICAL: All randomness in the simulator MUST go through
//! this module, drawn from one of the two named streams (episode, economy)
//! in a fixed order per step.

mod xorshift;

pub use xorshift::RngManager;
