//! Morning report
//!
//! The payload returned by `wait_for_next_day`: what sold yesterday, which
//! deliveries landed, which inbox emails are still unread, and how much
//! cash accrued into the machine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::email::Email;

/// Report handed to the agent at the start of each morning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// The new current day (the morning the agent wakes up on)
    pub day: usize,
    /// item_id -> units sold yesterday
    pub sales: BTreeMap<String, u32>,
    /// Order ids delivered during the just-ended day
    pub deliveries: Vec<String>,
    /// Inbox emails not yet marked read
    pub new_emails: Vec<Email>,
    /// Cash that accrued into the machine yesterday (cents)
    pub cash_collected_cents: i64,
}
