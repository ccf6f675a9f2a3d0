//! Supplier orders
//!
//! Orders are pre-paid: the total is deducted from the cash balance the
//! moment the supplier accepts the email, and storage is credited only
//! when the delivery event fires.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of a supplier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted and paid for
    Ordered,
    /// On its way (reserved; the reference flow goes straight to delivered)
    InTransit,
    /// Credited to storage
    Delivered,
}

/// An open order with a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub supplier_id: String,
    /// item_id -> quantity
    pub items: BTreeMap<String, u32>,
    /// Total paid at acceptance (cents); equals sum of qty * unit price
    pub total_cost_cents: i64,
    /// Simulation day the delivery is expected
    pub eta_day: usize,
    pub status: OrderStatus,
    /// item_id -> per-unit purchase price (cents)
    pub purchase_prices_cents: BTreeMap<String, i64>,
}

impl Order {
    /// Total units across all items in the order.
    pub fn total_units(&self) -> u32 {
        self.items.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_units() {
        let mut items = BTreeMap::new();
        items.insert("cola".to_string(), 30);
        items.insert("chips".to_string(), 20);
        let order = Order {
            order_id: "order_1".to_string(),
            supplier_id: "supplier_1".to_string(),
            items,
            total_cost_cents: 5_400,
            eta_day: 3,
            status: OrderStatus::Ordered,
            purchase_prices_cents: BTreeMap::new(),
        };
        assert_eq!(order.total_units(), 50);
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InTransit).unwrap(),
            "\"in_transit\""
        );
    }
}
