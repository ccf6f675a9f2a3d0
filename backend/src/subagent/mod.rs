//! Sub-agent executor
//!
//! The sub-agent performs the physical-world operations the main agent
//! cannot do directly: restocking slots from storage, setting prices and
//! collecting machine cash. The main agent talks to it through short
//! natural-language instructions (`run_sub_agent`) and questions
//! (`chat_with_sub_agent`); both are parsed rule-based, without any model.

use regex::Regex;
use thiserror::Error;

use crate::core::money::{dollars_to_cents, format_cents};
use crate::events::log::SimEvent;
use crate::models::state::VendingState;

/// Price markup applied when an item is priced for the first time.
const INITIAL_PRICE_MARKUP: f64 = 1.5;

/// How many logged actions a "what did you do" chat answer shows.
const CHAT_ACTIONS_FULL: usize = 5;

/// How many logged actions the default chat answer shows.
const CHAT_ACTIONS_BRIEF: usize = 3;

/// Sealed set of operations the sub-agent can perform.
#[derive(Debug, Clone, PartialEq)]
pub enum SubAgentTool {
    MachineInventory,
    StockFromStorage {
        item_id: String,
        quantity: u32,
        slot_id: usize,
    },
    SetPrice {
        item_id: String,
        price_cents: i64,
    },
    CollectCash,
}

impl SubAgentTool {
    /// Tool name as exposed on the external surface.
    pub fn name(&self) -> &'static str {
        match self {
            SubAgentTool::MachineInventory => "machine_inventory",
            SubAgentTool::StockFromStorage { .. } => "stock_from_storage",
            SubAgentTool::SetPrice { .. } => "set_price",
            SubAgentTool::CollectCash => "collect_cash",
        }
    }
}

/// Why a physical operation was refused. Rendered verbatim to the agent.
#[derive(Debug, Error, PartialEq)]
pub enum StockError {
    #[error("Slot {0} not found.")]
    SlotNotFound(usize),

    #[error(
        "Not enough {item_id} in storage (have {have}, need {need}). \
         Check storage later if you just received a delivery."
    )]
    InsufficientStorage {
        item_id: String,
        have: u32,
        need: u32,
    },

    #[error("Unknown item {0}.")]
    UnknownItem(String),

    #[error("Slot {slot_id} is for {slot_size} items, but {item_id} is {item_size}.")]
    SizeMismatch {
        slot_id: usize,
        slot_size: String,
        item_id: String,
        item_size: String,
    },

    #[error("Slot {slot_id} already has {current}. Use an empty slot or same item.")]
    SlotOccupied { slot_id: usize, current: String },

    #[error("Slot {0} is full.")]
    SlotFull(usize),

    #[error("Price cannot be negative.")]
    NegativePrice,
}

/// Result of running one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAgentResult {
    pub success: bool,
    pub message: String,
    /// The operations the instruction parsed into
    pub tool_calls: Vec<SubAgentTool>,
}

/// Executes sub-agent operations against the world state.
///
/// Keeps a rolling log of performed actions so the main agent can ask
/// "what did you do" later. State is passed in by mutable reference; the
/// simulator retains ownership.
#[derive(Debug)]
pub struct SubAgentExecutor {
    last_actions: Vec<String>,
    price_re: Regex,
    restock_re: Regex,
}

impl Default for SubAgentExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubAgentExecutor {
    pub fn new() -> Self {
        Self {
            last_actions: Vec::new(),
            price_re: Regex::new(r"set\s+price\s+(?:of\s+)?(\w+)\s+to\s+([\d.]+)")
                .expect("hardcoded pattern"),
            restock_re: Regex::new(r"(?:restock|stock)\s+(\w+)\s+(\d+)\s+(?:in\s+)?slot\s+(\d+)")
                .expect("hardcoded pattern"),
        }
    }

    /// Recent action log entries.
    pub fn last_actions(&self) -> &[String] {
        &self.last_actions
    }

    // ========================================================================
    // Physical operations
    // ========================================================================

    /// Move up to `quantity` units of `item_id` from storage into a slot.
    ///
    /// Returns the number of units actually moved (limited by slot space).
    /// On the first time an item is priced, initializes its price to
    /// wholesale * 1.5.
    fn apply_stock(
        state: &mut VendingState,
        item_id: &str,
        quantity: u32,
        slot_id: usize,
    ) -> Result<u32, StockError> {
        let Some(slot) = state.slot_by_id(slot_id) else {
            return Err(StockError::SlotNotFound(slot_id));
        };
        let slot_size = slot.size_class;
        let slot_item = slot.item_id.clone();
        let free_space = slot.free_space();

        let Some(info) = state.item_catalog.get(item_id) else {
            return Err(StockError::UnknownItem(item_id.to_string()));
        };
        let have = state.storage_inventory.get(item_id).copied().unwrap_or(0);
        if have < quantity {
            return Err(StockError::InsufficientStorage {
                item_id: item_id.to_string(),
                have,
                need: quantity,
            });
        }
        if slot_size != info.size_class {
            return Err(StockError::SizeMismatch {
                slot_id,
                slot_size: slot_size.to_string(),
                item_id: item_id.to_string(),
                item_size: info.size_class.to_string(),
            });
        }
        if let Some(current) = &slot_item {
            if current != item_id {
                return Err(StockError::SlotOccupied {
                    slot_id,
                    current: current.clone(),
                });
            }
        }
        let put = quantity.min(free_space);
        if put == 0 {
            return Err(StockError::SlotFull(slot_id));
        }

        let wholesale = info.wholesale_price_cents;
        state.remove_from_storage(item_id, put);
        let slot = state
            .slot_by_id_mut(slot_id)
            .expect("slot presence checked above");
        slot.item_id = Some(item_id.to_string());
        slot.quantity += put;

        if !state.prices_cents.contains_key(item_id) {
            let initial = (wholesale as f64 * INITIAL_PRICE_MARKUP).round() as i64;
            state.prices_cents.insert(item_id.to_string(), initial);
        }
        let day = state.clock.current_day();
        state.log_event(SimEvent::SlotRestocked {
            day,
            slot_id,
            item_id: item_id.to_string(),
            quantity: put,
        });
        Ok(put)
    }

    fn apply_set_price(
        state: &mut VendingState,
        item_id: &str,
        price_cents: i64,
    ) -> Result<(), StockError> {
        if price_cents < 0 {
            return Err(StockError::NegativePrice);
        }
        state
            .prices_cents
            .insert(item_id.to_string(), price_cents);
        let day = state.clock.current_day();
        state.log_event(SimEvent::PriceSet {
            day,
            item_id: item_id.to_string(),
            price_cents,
        });
        Ok(())
    }

    /// Move machine cash into the spendable balance; returns the amount.
    fn apply_collect_cash(state: &mut VendingState) -> i64 {
        let amount = state.cash_in_machine_cents;
        state.cash_in_machine_cents = 0;
        state.cash_balance_cents += amount;
        let day = state.clock.current_day();
        state.log_event(SimEvent::CashCollected {
            day,
            amount_cents: amount,
        });
        amount
    }

    /// Formatted table of every slot: id, item (or dash), quantity, price.
    pub fn machine_inventory(state: &VendingState) -> String {
        let mut lines = vec!["Slot | Item    | Qty | Price".to_string()];
        for slot in &state.machine_slots {
            let item = slot.item_id.as_deref().unwrap_or("-");
            let price = slot
                .item_id
                .as_deref()
                .and_then(|id| state.prices_cents.get(id).copied())
                .unwrap_or(0);
            lines.push(format!(
                "{:>4} | {:<8} | {:>3} | {}",
                slot.slot_id,
                item,
                slot.quantity,
                format_cents(price)
            ));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Tool execution
    // ========================================================================

    /// Execute one sub-agent tool. Returns (success, agent-visible message).
    pub fn run_tool(&mut self, state: &mut VendingState, tool: SubAgentTool) -> (bool, String) {
        match tool {
            SubAgentTool::MachineInventory => {
                let msg = Self::machine_inventory(state);
                let preview: String = msg.chars().take(100).collect();
                self.last_actions.push(format!("machine_inventory -> {}", preview));
                (true, msg)
            }
            SubAgentTool::StockFromStorage {
                item_id,
                quantity,
                slot_id,
            } => {
                let item_id = item_id.trim().to_lowercase();
                let (ok, msg) = match Self::apply_stock(state, &item_id, quantity, slot_id) {
                    Ok(put) => (
                        true,
                        format!("Stocked {} x {} into slot {}.", put, item_id, slot_id),
                    ),
                    Err(e) => (false, e.to_string()),
                };
                self.last_actions.push(format!(
                    "stock_from_storage({}, {}, {}) -> {}",
                    item_id, quantity, slot_id, msg
                ));
                (ok, msg)
            }
            SubAgentTool::SetPrice {
                item_id,
                price_cents,
            } => {
                let item_id = item_id.trim().to_lowercase();
                let (ok, msg) = match Self::apply_set_price(state, &item_id, price_cents) {
                    Ok(()) => (
                        true,
                        format!("Set price of {} to {}.", item_id, format_cents(price_cents)),
                    ),
                    Err(e) => (false, e.to_string()),
                };
                self.last_actions
                    .push(format!("set_price({}, {}) -> {}", item_id, price_cents, msg));
                (ok, msg)
            }
            SubAgentTool::CollectCash => {
                let amount = Self::apply_collect_cash(state);
                let msg = format!("Collected {} from the machine.", format_cents(amount));
                self.last_actions.push(format!("collect_cash -> {}", msg));
                (true, msg)
            }
        }
    }

    // ========================================================================
    // Instruction parsing
    // ========================================================================

    /// Parse a natural-language instruction into an operation.
    ///
    /// Recognized (case-insensitive): "collect cash", "set price of X to
    /// N", "restock X N in slot K" (also "stock"), and inventory queries.
    pub fn parse_instruction(&self, instruction: &str) -> Option<SubAgentTool> {
        let instruction = instruction.trim().to_lowercase();

        if instruction.contains("collect") && instruction.contains("cash") {
            return Some(SubAgentTool::CollectCash);
        }
        if let Some(caps) = self.price_re.captures(&instruction) {
            let item_id = caps[1].to_string();
            let price: f64 = caps[2].parse().ok()?;
            return Some(SubAgentTool::SetPrice {
                item_id,
                price_cents: dollars_to_cents(price),
            });
        }
        if let Some(caps) = self.restock_re.captures(&instruction) {
            let item_id = caps[1].to_string();
            let quantity: u32 = caps[2].parse().ok()?;
            let slot_id: usize = caps[3].parse().ok()?;
            return Some(SubAgentTool::StockFromStorage {
                item_id,
                quantity,
                slot_id,
            });
        }
        if instruction.contains("inventory") || instruction.contains("what is in") {
            return Some(SubAgentTool::MachineInventory);
        }
        None
    }

    /// Parse and execute one instruction from the main agent.
    pub fn run_instruction(
        &mut self,
        state: &mut VendingState,
        instruction: &str,
    ) -> SubAgentResult {
        match self.parse_instruction(instruction) {
            Some(tool) => {
                let recorded = tool.clone();
                let (success, message) = self.run_tool(state, tool);
                SubAgentResult {
                    success,
                    message,
                    tool_calls: vec![recorded],
                }
            }
            None => SubAgentResult {
                success: false,
                message: "I didn't understand. Try: 'restock cola 10 in slot 0', \
                          'set price of cola to 2', 'collect cash', or 'show machine inventory'."
                    .to_string(),
                tool_calls: Vec::new(),
            },
        }
    }

    /// Answer a question from the main agent.
    ///
    /// Inventory questions get the slot table, "what did you do" questions
    /// get the last five actions, anything else gets both a short action
    /// recap and the table.
    pub fn chat(&self, state: &VendingState, question: &str) -> String {
        let q = question.trim().to_lowercase();
        if q.contains("inventory") || q.contains("slot") {
            return Self::machine_inventory(state);
        }
        if q.contains("did") || q.contains("last") {
            if self.last_actions.is_empty() {
                return "No actions performed yet.".to_string();
            }
            let start = self.last_actions.len().saturating_sub(CHAT_ACTIONS_FULL);
            return format!("Last actions:\n{}", self.last_actions[start..].join("\n"));
        }
        let mut parts = Vec::new();
        if !self.last_actions.is_empty() {
            let start = self.last_actions.len().saturating_sub(CHAT_ACTIONS_BRIEF);
            parts.push(format!(
                "Last actions:\n{}",
                self.last_actions[start..].join("\n")
            ));
        }
        parts.push(format!(
            "Current machine:\n{}",
            Self::machine_inventory(state)
        ));
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collect_cash() {
        let executor = SubAgentExecutor::new();
        assert_eq!(
            executor.parse_instruction("please COLLECT the CASH"),
            Some(SubAgentTool::CollectCash)
        );
    }

    #[test]
    fn test_parse_set_price() {
        let executor = SubAgentExecutor::new();
        assert_eq!(
            executor.parse_instruction("Set price of cola to 2.5"),
            Some(SubAgentTool::SetPrice {
                item_id: "cola".to_string(),
                price_cents: 250
            })
        );
        assert_eq!(
            executor.parse_instruction("set price gum to 1"),
            Some(SubAgentTool::SetPrice {
                item_id: "gum".to_string(),
                price_cents: 100
            })
        );
    }

    #[test]
    fn test_parse_restock() {
        let executor = SubAgentExecutor::new();
        assert_eq!(
            executor.parse_instruction("restock cola 10 in slot 0"),
            Some(SubAgentTool::StockFromStorage {
                item_id: "cola".to_string(),
                quantity: 10,
                slot_id: 0
            })
        );
        assert_eq!(
            executor.parse_instruction("stock chips 5 slot 3"),
            Some(SubAgentTool::StockFromStorage {
                item_id: "chips".to_string(),
                quantity: 5,
                slot_id: 3
            })
        );
    }

    #[test]
    fn test_parse_inventory_and_garbage() {
        let executor = SubAgentExecutor::new();
        assert_eq!(
            executor.parse_instruction("show machine inventory"),
            Some(SubAgentTool::MachineInventory)
        );
        assert_eq!(executor.parse_instruction("do a backflip"), None);
    }

    #[test]
    fn test_stock_error_messages() {
        assert_eq!(
            StockError::SlotNotFound(7).to_string(),
            "Slot 7 not found."
        );
        assert_eq!(
            StockError::SlotFull(2).to_string(),
            "Slot 2 is full."
        );
        assert_eq!(
            StockError::SlotOccupied {
                slot_id: 1,
                current: "gum".to_string()
            }
            .to_string(),
            "Slot 1 already has gum. Use an empty slot or same item."
        );
    }
}
