//! Simulation State
//!
//! The complete mutable state of one episode: finances, storage, the
//! vending machine, prices, the product catalog, open orders, mail and
//! the clock. The simulator owns this exclusively; no concurrent access
//! is permitted.
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Storage quantities are strictly positive (zero entries are pruned)
//! 3. A slot holds at most one item id at a time
//! 4. Order and email ids come from monotone counters (`order_N`, `email_N`)
//! 5. Net worth = cash + machine cash + wholesale-valued inventory

use std::collections::BTreeMap;

use crate::config::EnvConfig;
use crate::core::time::SimClock;
use crate::events::log::{EventLog, SimEvent};
use crate::models::catalog::ItemInfo;
use crate::models::email::Email;
use crate::models::order::Order;
use crate::models::slot::Slot;

/// Complete state of a running episode
///
/// # Example
///
/// ```rust
/// use vending_simulator_core_rs::{EnvConfig, VendingState};
///
/// let state = VendingState::new(&EnvConfig::default());
/// assert_eq!(state.cash_balance_cents, 50_000);
/// assert_eq!(state.machine_slots.len(), 12);
/// assert_eq!(state.net_worth_cents(), 50_000);
/// ```
#[derive(Debug, Clone)]
pub struct VendingState {
    // Finances
    pub cash_balance_cents: i64,
    /// Sales revenue accumulated in the machine, not spendable until collected
    pub cash_in_machine_cents: i64,
    pub daily_fee_cents: i64,

    /// Warehouse inventory: item_id -> quantity (zero entries pruned)
    pub storage_inventory: BTreeMap<String, u32>,

    /// Machine slots, in creation order
    pub machine_slots: Vec<Slot>,
    /// Global selling price per item (cents); a slot selling item X uses
    /// the global price of X
    pub prices_cents: BTreeMap<String, i64>,

    /// Merged product catalog from all registered suppliers
    pub item_catalog: BTreeMap<String, ItemInfo>,

    /// Orders accepted but not yet delivered
    pub open_orders: Vec<Order>,

    // Mail
    pub inbox: Vec<Email>,
    pub outbox: Vec<Email>,

    /// Simulation clock
    pub clock: SimClock,

    /// Consecutive day-ends on which the fee could not be paid
    pub consecutive_days_unpaid_fee: u32,

    // Episode counters
    pub total_units_sold: u64,
    pub total_days: usize,

    order_counter: u64,
    email_counter: u64,
    event_log: EventLog,
}

impl VendingState {
    /// Create the initial state for an episode: full cash balance, empty
    /// machine laid out per the config, empty storage and mail.
    pub fn new(config: &EnvConfig) -> Self {
        let mut machine_slots = Vec::with_capacity(config.total_slots());
        let mut slot_id = 0;
        for row in 0..config.rows {
            let size_class = config.size_class_for_row(row);
            for column in 0..config.slots_per_row {
                machine_slots.push(Slot::new(slot_id, row, column, size_class));
                slot_id += 1;
            }
        }

        Self {
            cash_balance_cents: config.initial_cash_cents,
            cash_in_machine_cents: 0,
            daily_fee_cents: config.daily_fee_cents,
            storage_inventory: BTreeMap::new(),
            machine_slots,
            prices_cents: BTreeMap::new(),
            item_catalog: BTreeMap::new(),
            open_orders: Vec::new(),
            inbox: Vec::new(),
            outbox: Vec::new(),
            clock: SimClock::new(),
            consecutive_days_unpaid_fee: 0,
            total_units_sold: 0,
            total_days: 0,
            order_counter: 0,
            email_counter: 0,
            event_log: EventLog::new(),
        }
    }

    /// Allocate the next order id (`order_1`, `order_2`, ...).
    pub fn next_order_id(&mut self) -> String {
        self.order_counter += 1;
        format!("order_{}", self.order_counter)
    }

    /// Allocate the next email id (`email_1`, `email_2`, ...).
    pub fn next_email_id(&mut self) -> String {
        self.email_counter += 1;
        format!("email_{}", self.email_counter)
    }

    /// Find a slot by id.
    pub fn slot_by_id(&self, slot_id: usize) -> Option<&Slot> {
        self.machine_slots.iter().find(|s| s.slot_id == slot_id)
    }

    /// Find a slot by id, mutably.
    pub fn slot_by_id_mut(&mut self, slot_id: usize) -> Option<&mut Slot> {
        self.machine_slots.iter_mut().find(|s| s.slot_id == slot_id)
    }

    /// Credit items to storage (delivery completion).
    pub fn add_to_storage(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self
            .storage_inventory
            .entry(item_id.to_string())
            .or_insert(0) += quantity;
    }

    /// Remove items from storage, pruning the entry at zero.
    ///
    /// # Panics
    ///
    /// Panics if storage holds fewer than `quantity` units; callers must
    /// validate availability first.
    pub fn remove_from_storage(&mut self, item_id: &str, quantity: u32) {
        let have = self.storage_inventory.get(item_id).copied().unwrap_or(0);
        assert!(
            have >= quantity,
            "storage underflow for {}: have {}, remove {}",
            item_id,
            have,
            quantity
        );
        let remaining = have - quantity;
        if remaining == 0 {
            self.storage_inventory.remove(item_id);
        } else {
            self.storage_inventory.insert(item_id.to_string(), remaining);
        }
    }

    /// Net worth in cents: spendable cash + machine cash + inventory
    /// (storage and slots) valued at wholesale prices.
    pub fn net_worth_cents(&self) -> i64 {
        let cash = self.cash_balance_cents + self.cash_in_machine_cents;
        let mut inventory_value = 0i64;
        for (item_id, qty) in &self.storage_inventory {
            if let Some(info) = self.item_catalog.get(item_id) {
                inventory_value += info.wholesale_price_cents * *qty as i64;
            }
        }
        for slot in &self.machine_slots {
            if let Some(item_id) = &slot.item_id {
                if slot.quantity > 0 {
                    if let Some(info) = self.item_catalog.get(item_id) {
                        inventory_value += info.wholesale_price_cents * slot.quantity as i64;
                    }
                }
            }
        }
        cash + inventory_value
    }

    /// Number of inbox emails not yet read.
    pub fn unread_emails_count(&self) -> usize {
        self.inbox.iter().filter(|e| !e.is_read).count()
    }

    /// Number of distinct items currently stocked (non-empty slots).
    pub fn distinct_stocked_items(&self) -> usize {
        let mut items: Vec<&str> = self
            .machine_slots
            .iter()
            .filter(|s| s.quantity > 0)
            .filter_map(|s| s.item_id.as_deref())
            .collect();
        items.sort_unstable();
        items.dedup();
        items.len()
    }

    /// Append to the audit event log.
    pub fn log_event(&mut self, event: SimEvent) {
        self.event_log.log(event);
    }

    /// Read access to the audit event log.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }
}
