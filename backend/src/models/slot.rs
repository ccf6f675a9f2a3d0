//! Vending machine slot
//!
//! One slot holds at most one item id at a time, up to its capacity.
//! Prices are NOT stored here; they live in the global per-item price map.

use serde::{Deserialize, Serialize};

use crate::models::catalog::SizeClass;

/// Default units a slot can hold.
pub const DEFAULT_SLOT_CAPACITY: u32 = 10;

/// A single machine slot: position, size class, stocked item and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub slot_id: usize,
    pub row: usize,
    pub column: usize,
    pub size_class: SizeClass,
    /// Currently stocked item, or None when the slot has never been stocked
    pub item_id: Option<String>,
    pub quantity: u32,
    pub capacity: u32,
}

impl Slot {
    pub fn new(slot_id: usize, row: usize, column: usize, size_class: SizeClass) -> Self {
        Self {
            slot_id,
            row,
            column,
            size_class,
            item_id: None,
            quantity: 0,
            capacity: DEFAULT_SLOT_CAPACITY,
        }
    }

    /// Remaining free units in this slot.
    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.quantity)
    }

    /// True when this slot currently holds the given item.
    pub fn holds(&self, item_id: &str) -> bool {
        self.item_id.as_deref() == Some(item_id)
    }
}
