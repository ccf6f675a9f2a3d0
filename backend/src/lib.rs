//! Vending Business Simulator Core - Rust Engine
//!
//! Deterministic, seed-reproducible simulation of a small retail vending
//! business, driven by an external decision maker through a tool-call
//! interface.
//!
//! # Architecture
//!
//! - **core**: Clock and money primitives
//! - **models**: Domain types (state, slots, orders, mail, catalog)
//! - **events**: Scheduled-event queue and the audit event log
//! - **economy**: Price-elastic daily demand model
//! - **suppliers**: Supplier registry and order-email parsing
//! - **subagent**: Physical-world operations on slots and prices
//! - **orchestrator**: Main simulation engine and snapshots
//! - **tools**: Main-agent tool dispatcher
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. All randomness is deterministic (two named seeded RNG streams)
//! 3. The simulator exclusively owns state, queue, economy and suppliers

// Module declarations
pub mod config;
pub mod core;
pub mod economy;
pub mod events;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod subagent;
pub mod suppliers;
pub mod tools;

// Re-exports for convenience
pub use config::{ConfigError, EnvConfig};
pub use core::time::SimClock;
pub use economy::Economy;
pub use events::{EventKind, EventQueue, ScheduledEvent};
pub use models::{
    catalog::{ItemInfo, SizeClass},
    email::Email,
    order::{Order, OrderStatus},
    report::DailyReport,
    slot::Slot,
    state::VendingState,
};
pub use orchestrator::{EndOfDayOutcome, Simulator, TerminationReason};
pub use rng::RngManager;
pub use subagent::{SubAgentExecutor, SubAgentResult, SubAgentTool};
pub use suppliers::{OrderResult, Supplier, SupplierRegistry};
pub use tools::{MainTool, ToolOutcome, ToolRuntime};
