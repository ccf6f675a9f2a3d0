//! Simulation engine
//!
//! Integrates all components behind two entry points:
//!
//! - `apply_tool_step`: advance the clock by a tool's time cost and drain
//!   every scheduled event that came due.
//! - `end_day_and_report`: finish the current day (drain events through
//!   minute 1439, run the demand model, charge the fee), jump to the next
//!   morning and build the report, then evaluate termination.
//!
//! # Determinism
//!
//! Two named RNG streams, both derived from the episode seed:
//!
//! - episode stream: supplier lead-time sampling, delivery-minute sampling
//! - economy stream (seed xor'd with a fixed constant): demand-parameter
//!   initialization, weather, per-slot sales noise
//!
//! The call order within each stream is fixed per step; same seed, config
//! and action sequence reproduce every state bit-for-bit.

use crate::config::{ConfigError, EnvConfig};
use crate::core::time::{timestamp, MINUTES_PER_DAY};
use crate::economy::Economy;
use crate::events::log::SimEvent;
use crate::events::{EventKind, EventQueue, ScheduledEvent};
use crate::models::email::Email;
use crate::models::order::OrderStatus;
use crate::models::report::DailyReport;
use crate::models::state::VendingState;
use crate::rng::RngManager;
use crate::suppliers::{OrderResult, Supplier, SupplierRegistry};

/// Constant xor'd into the episode seed to derive the economy stream.
pub const ECONOMY_SEED_XOR: u64 = 0x9E37_79B9_7F4A_7C15;

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Fee unpaid for the configured number of consecutive day-ends
    Bankruptcy,
    /// Day cap reached
    MaxDays,
    /// Message cap reached
    MaxMessages,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Bankruptcy => "bankruptcy",
            TerminationReason::MaxDays => "max_days",
            TerminationReason::MaxMessages => "max_messages",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `end_day_and_report` produced.
#[derive(Debug, Clone)]
pub struct EndOfDayOutcome {
    pub report: DailyReport,
    pub terminated: bool,
    pub reason: Option<TerminationReason>,
}

/// Main simulation engine
///
/// Owns state, scheduled events, economy, suppliers and the episode RNG.
/// External callers drive it through the tool dispatcher; tests may drive
/// it directly.
///
/// # Example
///
/// ```rust
/// use vending_simulator_core_rs::{EnvConfig, Simulator};
/// use vending_simulator_core_rs::suppliers::defaults::default_suppliers;
///
/// let mut sim = Simulator::new(EnvConfig::default(), 42).unwrap();
/// for supplier in default_suppliers() {
///     sim.register_supplier(supplier);
/// }
///
/// let result = sim.process_order_email("supplier_1", "Order", "cola 50");
/// assert!(result.success);
/// assert_eq!(sim.state().cash_balance_cents, 45_000);
/// ```
#[derive(Debug)]
pub struct Simulator {
    config: EnvConfig,
    state: VendingState,
    event_queue: EventQueue,
    economy: Economy,
    suppliers: SupplierRegistry,
    /// Episode RNG stream
    rng: RngManager,
    last_report: Option<DailyReport>,
    message_count: u32,
}

impl Simulator {
    /// Create a simulator from a validated config and episode seed.
    pub fn new(config: EnvConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = VendingState::new(&config);
        Ok(Self {
            state,
            event_queue: EventQueue::new(),
            economy: Economy::new(seed ^ ECONOMY_SEED_XOR),
            suppliers: SupplierRegistry::new(),
            rng: RngManager::new(seed),
            last_report: None,
            message_count: 0,
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn state(&self) -> &VendingState {
        &self.state
    }

    /// Mutable state access for the sub-agent executor and tests.
    pub fn state_mut(&mut self) -> &mut VendingState {
        &mut self.state
    }

    pub fn suppliers(&self) -> &SupplierRegistry {
        &self.suppliers
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Tool messages processed so far (wait_for_next_day excluded).
    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    /// The report from the most recent end-of-day, if any.
    pub fn last_report(&self) -> Option<&DailyReport> {
        self.last_report.as_ref()
    }

    /// Scheduled events not yet fired (deliveries in flight).
    pub fn pending_event_count(&self) -> usize {
        self.event_queue.len()
    }

    /// Register a supplier and refresh the state's merged catalog.
    pub fn register_supplier(&mut self, supplier: Supplier) {
        self.suppliers.register_supplier(supplier);
        self.state.item_catalog = self.suppliers.product_catalog().clone();
    }

    // ========================================================================
    // Tool steps
    // ========================================================================

    /// Apply one tool call (any tool except `wait_for_next_day`).
    ///
    /// Increments the message counter, advances the clock by the tool's
    /// configured time cost, then drains and applies every scheduled event
    /// that came due. Returns the processed events for logging.
    pub fn apply_tool_step(&mut self, tool_name: &str) -> Vec<ScheduledEvent> {
        self.message_count += 1;
        let dt = self.config.get_time_cost_minutes(tool_name);
        self.state.clock.advance_minutes(dt);
        self.state.total_days = self.state.total_days.max(self.state.clock.current_day());
        self.process_events_until(self.state.clock.timestamp())
    }

    /// Drain and apply all scheduled events with `ts <= until_ts`.
    fn process_events_until(&mut self, until_ts: u64) -> Vec<ScheduledEvent> {
        let events = self.event_queue.drain_until(until_ts);
        for event in &events {
            match &event.kind {
                EventKind::Delivery {
                    order_id,
                    supplier_id,
                } => {
                    self.complete_delivery(order_id, supplier_id);
                }
                EventKind::DailyFee { amount_cents } => {
                    // Not scheduled by the reference flow; the end-of-day
                    // engine charges the fee directly
                    self.state.cash_balance_cents -= amount_cents;
                }
                EventKind::DayStart | EventKind::DayEnd => {}
            }
        }
        events
    }

    /// Credit a delivered order to storage, close it and notify by email.
    ///
    /// Storage is credited atomically here and never before; the order was
    /// already paid for at acceptance.
    fn complete_delivery(&mut self, order_id: &str, supplier_id: &str) {
        let Some(position) = self
            .state
            .open_orders
            .iter()
            .position(|o| o.order_id == order_id)
        else {
            return;
        };
        let mut order = self.state.open_orders.remove(position);
        order.status = OrderStatus::Delivered;
        for (item_id, qty) in &order.items {
            self.state.add_to_storage(item_id, *qty);
        }

        let day = self.state.clock.current_day();
        let email_id = self.state.next_email_id();
        self.state.inbox.push(Email::new(
            email_id,
            supplier_id,
            "agent",
            &format!("Delivery completed #{}", order_id),
            &format!(
                "Your order {} has been delivered. Items are now in your storage.",
                order_id
            ),
            day,
        ));
        self.state.log_event(SimEvent::DeliveryCompleted {
            day,
            order_id: order_id.to_string(),
            supplier_id: supplier_id.to_string(),
        });
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Process an outgoing agent email as a supplier order.
    ///
    /// On acceptance the order total is deducted immediately (pre-payment
    /// model) and a delivery event is scheduled at a random minute of the
    /// ETA day. The balance is re-checked here; if it no longer covers the
    /// total, the acceptance is downgraded to a rejection.
    pub fn process_order_email(
        &mut self,
        to_addr: &str,
        subject: &str,
        body: &str,
    ) -> OrderResult {
        let mut result = self.suppliers.parse_order_from_email(
            to_addr,
            subject,
            body,
            &mut self.state,
            &mut self.rng,
        );
        if !result.success {
            return result;
        }
        let Some(order) = result.order.clone() else {
            return result;
        };
        if self.state.cash_balance_cents >= order.total_cost_cents {
            self.state.cash_balance_cents -= order.total_cost_cents;
            let day = self.state.clock.current_day();
            self.state.log_event(SimEvent::OrderPlaced {
                day,
                order_id: order.order_id.clone(),
                supplier_id: order.supplier_id.clone(),
                total_cost_cents: order.total_cost_cents,
            });
            self.schedule_delivery(&order.order_id, &order.supplier_id, order.eta_day);
            self.state.open_orders.push(order);
        } else {
            result.success = false;
            result.order = None;
            result.error_message = Some("Insufficient balance.".to_string());
            result.reply_body = "Insufficient account balance for this order.".to_string();
        }
        result
    }

    /// Schedule a delivery at a random minute of the ETA day.
    ///
    /// Mid-day deliveries are intentional: storage changes under the agent
    /// while it is doing other things.
    fn schedule_delivery(&mut self, order_id: &str, supplier_id: &str, eta_day: usize) {
        let minute = self.rng.range(0, MINUTES_PER_DAY as i64) as u32;
        self.event_queue.push(
            eta_day,
            minute,
            EventKind::Delivery {
                order_id: order_id.to_string(),
                supplier_id: supplier_id.to_string(),
            },
        );
    }

    // ========================================================================
    // End of day
    // ========================================================================

    /// Finish the current day and wake up on the next morning.
    ///
    /// Order of operations is a contract: drain every scheduled event
    /// through minute 1439 of the ending day FIRST (so same-day deliveries
    /// are in storage before sales), then run the demand model, apply slot
    /// decrements and machine cash, charge the fee, advance the clock and
    /// evaluate termination.
    pub fn end_day_and_report(&mut self) -> EndOfDayOutcome {
        let day = self.state.clock.current_day();
        self.state.total_days = self.state.total_days.max(day);

        let processed = self.process_events_until(timestamp(day, MINUTES_PER_DAY - 1));

        let daily = self.economy.compute_daily_sales(&self.state, day);

        // Pull sold units out of slots, in slot order per item
        let mut day_units: u32 = 0;
        for (item_id, qty) in &daily.sales {
            let mut remaining = *qty;
            day_units += *qty;
            self.state.total_units_sold += *qty as u64;
            for slot in self.state.machine_slots.iter_mut() {
                if remaining == 0 {
                    break;
                }
                if slot.holds(item_id) {
                    let take = slot.quantity.min(remaining);
                    slot.quantity -= take;
                    remaining -= take;
                }
            }
        }
        self.state.cash_in_machine_cents += daily.cash_collected_cents;

        // Charge the daily fee; never partially, never into the negative
        if self.state.cash_balance_cents >= self.state.daily_fee_cents {
            self.state.cash_balance_cents -= self.state.daily_fee_cents;
            self.state.consecutive_days_unpaid_fee = 0;
            let fee = self.state.daily_fee_cents;
            self.state.log_event(SimEvent::FeeCharged {
                day,
                amount_cents: fee,
            });
        } else {
            self.state.consecutive_days_unpaid_fee += 1;
            let consecutive = self.state.consecutive_days_unpaid_fee;
            self.state.log_event(SimEvent::FeeMissed {
                day,
                consecutive_days: consecutive,
            });
        }

        self.state.log_event(SimEvent::DayEnded {
            day,
            units_sold: day_units,
            cash_collected_cents: daily.cash_collected_cents,
        });

        // Next morning
        self.state.clock.jump_to_next_morning();
        self.state.total_days = self.state.clock.current_day();

        let deliveries: Vec<String> = processed
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Delivery { order_id, .. } => Some(order_id.clone()),
                _ => None,
            })
            .collect();
        let new_emails: Vec<Email> = self
            .state
            .inbox
            .iter()
            .filter(|e| !e.is_read)
            .cloned()
            .collect();
        let report = DailyReport {
            day: self.state.clock.current_day(),
            sales: daily.sales,
            deliveries,
            new_emails,
            cash_collected_cents: daily.cash_collected_cents,
        };
        self.last_report = Some(report.clone());

        // Termination, in priority order
        let mut reason = None;
        if self.state.consecutive_days_unpaid_fee >= self.config.bankruptcy_consecutive_days {
            reason = Some(TerminationReason::Bankruptcy);
        }
        if self.state.clock.current_day() >= self.config.max_days {
            reason = reason.or(Some(TerminationReason::MaxDays));
        }
        if self.message_count >= self.config.max_messages {
            reason = reason.or(Some(TerminationReason::MaxMessages));
        }

        EndOfDayOutcome {
            report,
            terminated: reason.is_some(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suppliers::defaults::default_suppliers;

    fn sim_with_suppliers(seed: u64) -> Simulator {
        let mut sim = Simulator::new(EnvConfig::default(), seed).unwrap();
        for supplier in default_suppliers() {
            sim.register_supplier(supplier);
        }
        sim
    }

    #[test]
    fn test_new_simulator_initial_state() {
        let sim = sim_with_suppliers(1);
        assert_eq!(sim.state().cash_balance_cents, 50_000);
        assert_eq!(sim.state().clock.current_day(), 0);
        assert_eq!(sim.message_count(), 0);
        assert!(sim.state().item_catalog.contains_key("cola"));
        assert!(sim.state().item_catalog.contains_key("sandwich"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EnvConfig {
            rows: 0,
            ..EnvConfig::default()
        };
        assert!(Simulator::new(config, 1).is_err());
    }

    #[test]
    fn test_apply_tool_step_advances_clock_and_counts() {
        let mut sim = sim_with_suppliers(1);
        sim.apply_tool_step("get_money_balance");
        assert_eq!(sim.state().clock.minute_of_day(), 5);
        sim.apply_tool_step("read_inbox");
        assert_eq!(sim.state().clock.minute_of_day(), 30);
        assert_eq!(sim.message_count(), 2);
    }

    #[test]
    fn test_unknown_tool_uses_fallback_cost() {
        let mut sim = sim_with_suppliers(1);
        sim.apply_tool_step("mystery_tool");
        assert_eq!(sim.state().clock.minute_of_day(), 30);
    }

    #[test]
    fn test_order_prepayment_and_scheduling() {
        let mut sim = sim_with_suppliers(7);
        let result = sim.process_order_email("supplier_1", "Order", "cola 50");
        assert!(result.success);
        assert_eq!(sim.state().cash_balance_cents, 45_000);
        assert_eq!(sim.state().open_orders.len(), 1);
        assert_eq!(sim.pending_event_count(), 1);
        let order = &sim.state().open_orders[0];
        assert!(order.eta_day >= 2 && order.eta_day <= 4);
        assert_eq!(order.total_cost_cents, 5_000);
    }

    #[test]
    fn test_order_rejection_moves_no_cash() {
        let mut sim = sim_with_suppliers(7);
        let result = sim.process_order_email("supplier_1", "Order", "cola 10");
        assert!(!result.success);
        assert_eq!(sim.state().cash_balance_cents, 50_000);
        assert!(sim.state().open_orders.is_empty());
        assert_eq!(sim.pending_event_count(), 0);
    }
}
