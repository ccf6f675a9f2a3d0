//! Product catalog types
//!
//! Items are identified by lowercase snake_case ids. The catalog maps each
//! id to its display name, size class and wholesale reference price — the
//! price used to value inventory in net-worth calculations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse physical size of an item; a slot accepts only matching items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Large,
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeClass::Small => write!(f, "small"),
            SizeClass::Large => write!(f, "large"),
        }
    }
}

/// Catalog entry for one item
///
/// # Example
/// ```
/// use vending_simulator_core_rs::{ItemInfo, SizeClass};
///
/// let info = ItemInfo::new("orange_juice", SizeClass::Small, 150);
/// assert_eq!(info.name, "Orange Juice");
/// assert_eq!(info.wholesale_price_cents, 150);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub item_id: String,
    /// Human-readable name derived from the id
    pub name: String,
    pub size_class: SizeClass,
    /// Wholesale reference price (cents), used for net-worth valuation
    pub wholesale_price_cents: i64,
}

impl ItemInfo {
    pub fn new(item_id: &str, size_class: SizeClass, wholesale_price_cents: i64) -> Self {
        Self {
            item_id: item_id.to_string(),
            name: display_name(item_id),
            size_class,
            wholesale_price_cents,
        }
    }
}

/// Title-case an item id: `"red_bull"` -> `"Red Bull"`.
pub fn display_name(item_id: &str) -> String {
    item_id
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
