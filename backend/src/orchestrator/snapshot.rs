//! Snapshots - compact observation types
//!
//! External tooling (trajectory export, RL observers) consumes these
//! serializable views of the simulation; the core itself performs no I/O.
//!
//! # Critical Invariants
//!
//! - **Determinism**: same seed + config produce identical snapshots at
//!   every step
//! - **Config provenance**: the SHA-256 config hash ties a trajectory to
//!   the exact configuration that produced it

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::state::VendingState;

/// Longest result string carried in a step record.
const STEP_RESULT_CHARS: usize = 200;

/// Compact state snapshot for observation and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub day: usize,
    pub cash_balance_cents: i64,
    pub cash_in_machine_cents: i64,
    pub net_worth_cents: i64,
    /// item_id -> quantity
    pub storage: BTreeMap<String, u32>,
    pub open_orders: Vec<OpenOrderSnapshot>,
    pub machine_slots: Vec<SlotSnapshot>,
    /// item_id -> selling price (cents)
    pub prices_cents: BTreeMap<String, i64>,
    pub unread_emails: usize,
}

/// One open order in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrderSnapshot {
    pub order_id: String,
    pub eta_day: usize,
    pub items: BTreeMap<String, u32>,
}

/// One machine slot in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub slot_id: usize,
    pub item_id: Option<String>,
    pub qty: u32,
}

impl From<&VendingState> for StateSnapshot {
    fn from(state: &VendingState) -> Self {
        Self {
            day: state.clock.current_day(),
            cash_balance_cents: state.cash_balance_cents,
            cash_in_machine_cents: state.cash_in_machine_cents,
            net_worth_cents: state.net_worth_cents(),
            storage: state.storage_inventory.clone(),
            open_orders: state
                .open_orders
                .iter()
                .map(|o| OpenOrderSnapshot {
                    order_id: o.order_id.clone(),
                    eta_day: o.eta_day,
                    items: o.items.clone(),
                })
                .collect(),
            machine_slots: state
                .machine_slots
                .iter()
                .map(|s| SlotSnapshot {
                    slot_id: s.slot_id,
                    item_id: s.item_id.clone(),
                    qty: s.quantity,
                })
                .collect(),
            prices_cents: state.prices_cents.clone(),
            unread_emails: state.unread_emails_count(),
        }
    }
}

/// One step of an episode trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub tool_name: String,
    pub tool_args: serde_json::Value,
    /// Result text, truncated to 200 chars
    pub result: String,
    pub net_worth_cents: i64,
    pub day: usize,
    pub terminated: bool,
}

impl StepRecord {
    /// Build a record, truncating the result text to the documented cap.
    pub fn new(
        step: usize,
        tool_name: &str,
        tool_args: serde_json::Value,
        result: &str,
        state: &VendingState,
        terminated: bool,
    ) -> Self {
        Self {
            step,
            tool_name: tool_name.to_string(),
            tool_args,
            result: result.chars().take(STEP_RESULT_CHARS).collect(),
            net_worth_cents: state.net_worth_cents(),
            day: state.clock.current_day(),
            terminated,
        }
    }
}

/// Compute a deterministic SHA-256 hash of a serializable config.
///
/// Object keys are recursively sorted before hashing so the result does
/// not depend on map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, serde_json::Error> {
    use serde_json::Value;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let value = serde_json::to_value(config)?;
    let json = serde_json::to_string(&canonicalize(value))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;

    #[test]
    fn test_config_hash_deterministic() {
        let config = EnvConfig::default();
        let h1 = compute_config_hash(&config).unwrap();
        let h2 = compute_config_hash(&config).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_config_hash_differs_for_different_configs() {
        let a = EnvConfig::default();
        let b = EnvConfig {
            daily_fee_cents: 300,
            ..EnvConfig::default()
        };
        assert_ne!(
            compute_config_hash(&a).unwrap(),
            compute_config_hash(&b).unwrap()
        );
    }

    #[test]
    fn test_snapshot_from_fresh_state() {
        let state = VendingState::new(&EnvConfig::default());
        let snapshot = StateSnapshot::from(&state);
        assert_eq!(snapshot.day, 0);
        assert_eq!(snapshot.cash_balance_cents, 50_000);
        assert_eq!(snapshot.net_worth_cents, 50_000);
        assert_eq!(snapshot.machine_slots.len(), 12);
        assert!(snapshot.storage.is_empty());
        assert_eq!(snapshot.unread_emails, 0);
    }

    #[test]
    fn test_step_record_truncates_result() {
        let state = VendingState::new(&EnvConfig::default());
        let long_result = "x".repeat(500);
        let record = StepRecord::new(
            0,
            "read_inbox",
            serde_json::json!({}),
            &long_result,
            &state,
            false,
        );
        assert_eq!(record.result.len(), 200);
    }
}
