//! Environment configuration
//!
//! Defaults follow the benchmark setup: $500 starting cash, $2/day fee,
//! a 4x3 machine with two small and two large rows, bankruptcy after 10
//! consecutive unpaid fee days, and per-tool time costs in minutes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::catalog::SizeClass;

/// Starting cash balance in cents ($500.00)
pub const DEFAULT_INITIAL_CASH_CENTS: i64 = 50_000;

/// Daily operating fee in cents ($2.00)
pub const DEFAULT_DAILY_FEE_CENTS: i64 = 200;

/// Machine rows
pub const DEFAULT_ROWS: usize = 4;

/// Slots per row
pub const DEFAULT_SLOTS_PER_ROW: usize = 3;

/// Consecutive unpaid-fee days before bankruptcy
pub const DEFAULT_BANKRUPTCY_CONSECUTIVE_DAYS: u32 = 10;

/// Episode message cap
pub const DEFAULT_MAX_MESSAGES: u32 = 2000;

/// Episode day cap
pub const DEFAULT_MAX_DAYS: usize = 400;

/// Time cost for tools missing from the table
pub const DEFAULT_FALLBACK_TIME_MINUTES: u32 = 30;

fn default_size_class_by_row() -> Vec<SizeClass> {
    vec![
        SizeClass::Small,
        SizeClass::Small,
        SizeClass::Large,
        SizeClass::Large,
    ]
}

fn default_time_cost_minutes() -> BTreeMap<String, u32> {
    let table: [(&str, u32); 13] = [
        ("get_money_balance", 5),
        ("get_storage_inventory", 5),
        ("read_inbox", 25),
        ("send_email", 25),
        ("search_products", 25),
        // Special: handled by the end-of-day engine, not by the clock table
        ("wait_for_next_day", 0),
        ("sub_agent_specs", 5),
        ("run_sub_agent", 75),
        ("chat_with_sub_agent", 25),
        // sub-agent tools
        ("machine_inventory", 5),
        ("stock_from_storage", 25),
        ("set_price", 5),
        ("collect_cash", 25),
    ];
    table
        .iter()
        .map(|(name, cost)| (name.to_string(), *cost))
        .collect()
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rows must be > 0")]
    ZeroRows,

    #[error("slots_per_row must be > 0")]
    ZeroSlotsPerRow,

    #[error("initial_cash_cents must be non-negative, got {0}")]
    NegativeInitialCash(i64),

    #[error("daily_fee_cents must be non-negative, got {0}")]
    NegativeDailyFee(i64),
}

/// Complete environment configuration
///
/// # Example
/// ```
/// use vending_simulator_core_rs::EnvConfig;
///
/// let config = EnvConfig::default();
/// assert_eq!(config.initial_cash_cents, 50_000);
/// assert_eq!(config.total_slots(), 12);
/// assert_eq!(config.get_time_cost_minutes("read_inbox"), 25);
/// assert_eq!(config.get_time_cost_minutes("unknown_tool"), 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Starting cash balance (cents)
    pub initial_cash_cents: i64,

    /// Daily operating fee (cents)
    pub daily_fee_cents: i64,

    /// Machine rows
    pub rows: usize,

    /// Slots per row
    pub slots_per_row: usize,

    /// Size class per row; rows beyond the list default to small
    pub size_class_by_row: Vec<SizeClass>,

    /// Consecutive unpaid-fee days before bankruptcy
    pub bankruptcy_consecutive_days: u32,

    /// Episode message cap
    pub max_messages: u32,

    /// Episode day cap
    pub max_days: usize,

    /// Per-tool time costs in minutes
    pub time_cost_minutes: BTreeMap<String, u32>,

    /// Time cost for tools missing from the table
    pub fallback_time_minutes: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_cash_cents: DEFAULT_INITIAL_CASH_CENTS,
            daily_fee_cents: DEFAULT_DAILY_FEE_CENTS,
            rows: DEFAULT_ROWS,
            slots_per_row: DEFAULT_SLOTS_PER_ROW,
            size_class_by_row: default_size_class_by_row(),
            bankruptcy_consecutive_days: DEFAULT_BANKRUPTCY_CONSECUTIVE_DAYS,
            max_messages: DEFAULT_MAX_MESSAGES,
            max_days: DEFAULT_MAX_DAYS,
            time_cost_minutes: default_time_cost_minutes(),
            fallback_time_minutes: DEFAULT_FALLBACK_TIME_MINUTES,
        }
    }
}

impl EnvConfig {
    /// Total number of machine slots.
    pub fn total_slots(&self) -> usize {
        self.rows * self.slots_per_row
    }

    /// Time cost in minutes for a tool, falling back for unknown names.
    pub fn get_time_cost_minutes(&self, tool_name: &str) -> u32 {
        self.time_cost_minutes
            .get(tool_name)
            .copied()
            .unwrap_or(self.fallback_time_minutes)
    }

    /// Size class for a machine row; rows beyond the configured list
    /// default to small.
    pub fn size_class_for_row(&self, row: usize) -> SizeClass {
        self.size_class_by_row
            .get(row)
            .copied()
            .unwrap_or(SizeClass::Small)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.slots_per_row == 0 {
            return Err(ConfigError::ZeroSlotsPerRow);
        }
        if self.initial_cash_cents < 0 {
            return Err(ConfigError::NegativeInitialCash(self.initial_cash_cents));
        }
        if self.daily_fee_cents < 0 {
            return Err(ConfigError::NegativeDailyFee(self.daily_fee_cents));
        }
        Ok(())
    }
}
