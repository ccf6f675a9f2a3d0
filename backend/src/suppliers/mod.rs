//! Supplier registry
//!
//! Suppliers carry a price list, a minimum order value and a lead-time
//! window. The registry merges all supplier catalogs into the global
//! product catalog and turns agent emails into validated orders with
//! templated replies. Everything here is deterministic: lead times are
//! sampled from the episode RNG passed in by the simulator.

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::money::format_cents;
use crate::models::catalog::{ItemInfo, SizeClass};
use crate::models::order::{Order, OrderStatus};
use crate::models::state::VendingState;
use crate::rng::RngManager;

/// Longest catalog listing embedded in an unknown-product reply.
const CATALOG_REPLY_CHARS: usize = 200;

/// Longest inbound subject echoed in a `Re:` reply.
const REPLY_SUBJECT_CHARS: usize = 50;

/// One supplier: identity, price list, order constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    /// Lowercase id; doubles as the supplier's email address
    pub supplier_id: String,
    pub name: String,
    /// item_id -> unit price (cents)
    pub catalog: BTreeMap<String, i64>,
    /// Orders below this total are rejected (cents)
    pub min_order_value_cents: i64,
    /// Inclusive (min, max) days until delivery
    pub lead_time_days: (u32, u32),
    /// item_id -> size class; items not listed default to small
    pub size_class_map: BTreeMap<String, SizeClass>,
}

impl Supplier {
    /// Unit price for an item, if carried.
    pub fn unit_price_cents(&self, item_id: &str) -> Option<i64> {
        self.catalog.get(item_id).copied()
    }

    /// Size class for an item (small unless mapped large).
    pub fn size_class(&self, item_id: &str) -> SizeClass {
        self.size_class_map
            .get(item_id)
            .copied()
            .unwrap_or(SizeClass::Small)
    }

    /// Sample a delivery lead time uniformly from the inclusive window.
    pub fn sample_lead_time(&self, rng: &mut RngManager) -> u32 {
        let (lo, hi) = self.lead_time_days;
        rng.range(lo as i64, hi as i64 + 1) as u32
    }
}

/// Outcome of parsing an agent email as an order.
///
/// The reply subject/body are always populated; on failure they carry the
/// rejection explanation that lands in the agent's inbox.
#[derive(Debug, Clone)]
pub struct OrderResult {
    pub success: bool,
    pub order: Option<Order>,
    pub error_message: Option<String>,
    pub reply_subject: String,
    pub reply_body: String,
}

impl OrderResult {
    fn rejection(subject: &str, error: &str, reply_body: String) -> Self {
        Self {
            success: false,
            order: None,
            error_message: Some(error.to_string()),
            reply_subject: format!("Re: {}", truncate_chars(subject, REPLY_SUBJECT_CHARS)),
            reply_body,
        }
    }
}

/// Registry of suppliers plus the merged product database.
#[derive(Debug, Clone, Default)]
pub struct SupplierRegistry {
    suppliers: BTreeMap<String, Supplier>,
    product_db: BTreeMap<String, ItemInfo>,
}

impl SupplierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a supplier. Items not yet in the product database are
    /// imported with this supplier's unit price as the wholesale reference.
    pub fn register_supplier(&mut self, supplier: Supplier) {
        for (item_id, price) in &supplier.catalog {
            self.product_db
                .entry(item_id.clone())
                .or_insert_with(|| ItemInfo::new(item_id, supplier.size_class(item_id), *price));
        }
        self.suppliers
            .insert(supplier.supplier_id.clone(), supplier);
    }

    pub fn get_supplier(&self, supplier_id: &str) -> Option<&Supplier> {
        self.suppliers.get(supplier_id)
    }

    pub fn list_suppliers(&self) -> Vec<&Supplier> {
        self.suppliers.values().collect()
    }

    /// The merged catalog across all registered suppliers.
    pub fn product_catalog(&self) -> &BTreeMap<String, ItemInfo> {
        &self.product_db
    }

    /// Parse an agent email as a supplier order.
    ///
    /// Steps: resolve the recipient as a supplier id; parse body lines as
    /// `item name... quantity` pairs; validate each item against the
    /// supplier catalog; check the minimum order value and the cash
    /// balance; sample a lead time from `rng` and build the order with a
    /// fresh id from `state`. Every outcome carries a templated reply.
    ///
    /// Payment and delivery scheduling are the simulator's job; this
    /// method never moves cash.
    pub fn parse_order_from_email(
        &self,
        to_addr: &str,
        subject: &str,
        body: &str,
        state: &mut VendingState,
        rng: &mut RngManager,
    ) -> OrderResult {
        let supplier_id = to_addr.trim().to_lowercase();
        let Some(supplier) = self.get_supplier(&supplier_id) else {
            return OrderResult::rejection(
                subject,
                &format!("Unknown supplier: {}", to_addr),
                "We don't recognize this address. Please check the supplier ID.".to_string(),
            );
        };

        let items = parse_order_lines(body);
        if items.is_empty() {
            return OrderResult::rejection(
                subject,
                "No valid items/quantities found in email body.",
                "Please specify product names and quantities, e.g.:\n  snickers 50\n  cola 24"
                    .to_string(),
            );
        }

        let mut total_cents = 0i64;
        let mut purchase_prices_cents = BTreeMap::new();
        for (item_id, qty) in &items {
            let Some(price) = supplier.unit_price_cents(item_id) else {
                let catalog_ids = supplier
                    .catalog
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                return OrderResult::rejection(
                    subject,
                    &format!("Product {} not in our catalog.", item_id),
                    format!(
                        "We don't carry product '{}'. Our catalog: {}",
                        item_id,
                        truncate_chars(&catalog_ids, CATALOG_REPLY_CHARS)
                    ),
                );
            };
            total_cents += price * *qty as i64;
            purchase_prices_cents.insert(item_id.clone(), price);
        }

        if total_cents < supplier.min_order_value_cents {
            return OrderResult::rejection(
                subject,
                &format!(
                    "Order below minimum {}.",
                    format_cents(supplier.min_order_value_cents)
                ),
                format!(
                    "Minimum order value is {}. Your total: {}",
                    format_cents(supplier.min_order_value_cents),
                    format_cents(total_cents)
                ),
            );
        }

        if total_cents > state.cash_balance_cents {
            return OrderResult::rejection(
                subject,
                "Insufficient cash balance.",
                format!(
                    "Your order total is {} but your account balance is {}. Please reduce the order.",
                    format_cents(total_cents),
                    format_cents(state.cash_balance_cents)
                ),
            );
        }

        let lead = supplier.sample_lead_time(rng);
        let eta_day = state.clock.current_day() + lead as usize;
        let order = Order {
            order_id: state.next_order_id(),
            supplier_id: supplier_id.clone(),
            items,
            total_cost_cents: total_cents,
            eta_day,
            status: OrderStatus::Ordered,
            purchase_prices_cents,
        };

        OrderResult {
            success: true,
            reply_subject: format!("Order confirmed #{}", order.order_id),
            reply_body: format!(
                "Order confirmed. Total: {}. Expected delivery: day {} (in {} days). \
                 We will charge your account upon shipment.",
                format_cents(total_cents),
                eta_day,
                lead
            ),
            error_message: None,
            order: Some(order),
        }
    }

    /// Templated reply to a "what products do you have" inquiry.
    pub fn reply_to_inquiry(&self, to_addr: &str) -> (String, String) {
        let Some(supplier) = self.get_supplier(&to_addr.trim().to_lowercase()) else {
            return (
                "Re: Your inquiry".to_string(),
                "Unknown supplier. Please use a valid supplier ID.".to_string(),
            );
        };
        let mut lines = vec!["Our products and prices:".to_string(), String::new()];
        for (item_id, price) in &supplier.catalog {
            lines.push(format!("  {}: {}", item_id, format_cents(*price)));
        }
        lines.push(String::new());
        lines.push(format!(
            "Minimum order: {}. Delivery in {}-{} days.",
            format_cents(supplier.min_order_value_cents),
            supplier.lead_time_days.0,
            supplier.lead_time_days.1
        ));
        ("Re: Our products".to_string(), lines.join("\n"))
    }
}

/// Parse order lines from an email body.
///
/// Commas become spaces, each line splits on whitespace; a line with at
/// least two tokens is read as `item name... quantity` with the item id
/// lowercased and joined with `_`. Malformed and non-positive lines are
/// silently dropped; duplicate items accumulate.
fn parse_order_lines(body: &str) -> BTreeMap<String, u32> {
    let mut items = BTreeMap::new();
    for line in body.replace(',', " ").lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }
        let Ok(qty) = parts[parts.len() - 1].parse::<i64>() else {
            continue;
        };
        if qty <= 0 || qty > u32::MAX as i64 {
            continue;
        }
        let item_id = parts[..parts.len() - 1].join("_").to_lowercase();
        *items.entry(item_id).or_insert(0u32) += qty as u32;
    }
    items
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_lines() {
        let items = parse_order_lines("cola 50\nred bull 10\nchips: nope\n\nsnickers 5");
        assert_eq!(items.get("cola"), Some(&50));
        assert_eq!(items.get("red_bull"), Some(&10));
        assert_eq!(items.get("snickers"), Some(&5));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_parse_order_lines_commas_and_accumulation() {
        let items = parse_order_lines("cola, 20\ncola 10");
        assert_eq!(items.get("cola"), Some(&30));
    }

    #[test]
    fn test_parse_order_lines_drops_nonpositive() {
        let items = parse_order_lines("cola 0\nwater -5");
        assert!(items.is_empty());
    }

    #[test]
    fn test_register_imports_catalog_first_price_wins() {
        let mut registry = SupplierRegistry::new();
        for supplier in defaults::default_suppliers() {
            registry.register_supplier(supplier);
        }
        // supplier_1 registers cola at $1.00; supplier_2's $1.10 does not
        // overwrite the wholesale reference
        let cola = registry.product_catalog().get("cola").unwrap();
        assert_eq!(cola.wholesale_price_cents, 100);
        assert_eq!(cola.size_class, SizeClass::Small);
        let sandwich = registry.product_catalog().get("sandwich").unwrap();
        assert_eq!(sandwich.size_class, SizeClass::Large);
    }
}
