//! Audit event log
//!
//! Records significant state changes as they happen, for replay checks,
//! debugging and episode analysis. Unlike the scheduled-event queue this
//! log is purely historical; nothing ever fires from it.

/// A state change worth auditing.
///
/// All variants carry the simulation day on which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// An order was accepted and pre-paid
    OrderPlaced {
        day: usize,
        order_id: String,
        supplier_id: String,
        total_cost_cents: i64,
    },

    /// A delivery event fired and storage was credited
    DeliveryCompleted {
        day: usize,
        order_id: String,
        supplier_id: String,
    },

    /// The daily fee was paid
    FeeCharged { day: usize, amount_cents: i64 },

    /// The daily fee could not be paid
    FeeMissed {
        day: usize,
        consecutive_days: u32,
    },

    /// Machine cash was collected into the balance
    CashCollected { day: usize, amount_cents: i64 },

    /// Units moved from storage into a slot
    SlotRestocked {
        day: usize,
        slot_id: usize,
        item_id: String,
        quantity: u32,
    },

    /// An item's global price changed
    PriceSet {
        day: usize,
        item_id: String,
        price_cents: i64,
    },

    /// End-of-day processing finished for a day
    DayEnded {
        day: usize,
        units_sold: u32,
        cash_collected_cents: i64,
    },
}

impl SimEvent {
    /// Day on which the event occurred.
    pub fn day(&self) -> usize {
        match self {
            SimEvent::OrderPlaced { day, .. } => *day,
            SimEvent::DeliveryCompleted { day, .. } => *day,
            SimEvent::FeeCharged { day, .. } => *day,
            SimEvent::FeeMissed { day, .. } => *day,
            SimEvent::CashCollected { day, .. } => *day,
            SimEvent::SlotRestocked { day, .. } => *day,
            SimEvent::PriceSet { day, .. } => *day,
            SimEvent::DayEnded { day, .. } => *day,
        }
    }

    /// Short name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::OrderPlaced { .. } => "OrderPlaced",
            SimEvent::DeliveryCompleted { .. } => "DeliveryCompleted",
            SimEvent::FeeCharged { .. } => "FeeCharged",
            SimEvent::FeeMissed { .. } => "FeeMissed",
            SimEvent::CashCollected { .. } => "CashCollected",
            SimEvent::SlotRestocked { .. } => "SlotRestocked",
            SimEvent::PriceSet { .. } => "PriceSet",
            SimEvent::DayEnded { .. } => "DayEnded",
        }
    }

    /// Order id, for events tied to a specific order.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            SimEvent::OrderPlaced { order_id, .. } => Some(order_id),
            SimEvent::DeliveryCompleted { order_id, .. } => Some(order_id),
            _ => None,
        }
    }
}

/// Append-only log of simulation events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// All events that occurred on a given day.
    pub fn events_for_day(&self, day: usize) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.day() == day).collect()
    }

    /// All events of a given kind name.
    pub fn events_of_kind(&self, kind: &str) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind() == kind).collect()
    }

    /// All events tied to a given order.
    pub fn events_for_order(&self, order_id: &str) -> Vec<&SimEvent> {
        self.events
            .iter()
            .filter(|e| e.order_id() == Some(order_id))
            .collect()
    }
}
