//! Default suppliers
//!
//! Two suppliers with overlapping catalogs at different prices, for
//! reproducible episodes without any external data source.

use std::collections::BTreeMap;

use crate::models::catalog::SizeClass;
use crate::suppliers::Supplier;

fn catalog(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
    entries
        .iter()
        .map(|(id, cents)| (id.to_string(), *cents))
        .collect()
}

/// Items that take a large slot; everything else is small.
fn large_items() -> BTreeMap<String, SizeClass> {
    [("sandwich", SizeClass::Large), ("nuts", SizeClass::Large)]
        .iter()
        .map(|(id, size)| (id.to_string(), *size))
        .collect()
}

/// The two default suppliers.
///
/// `supplier_1` (Bulk Snacks Co) is cheaper on snacks with a $50 minimum
/// and 2-4 day delivery; `supplier_2` (Beverage & More) carries the large
/// items with a $40 minimum and 3-5 day delivery.
pub fn default_suppliers() -> Vec<Supplier> {
    vec![
        Supplier {
            supplier_id: "supplier_1".to_string(),
            name: "Bulk Snacks Co".to_string(),
            catalog: catalog(&[
                ("cola", 100),
                ("water", 60),
                ("chips", 120),
                ("snickers", 110),
                ("red_bull", 170),
                ("orange_juice", 150),
                ("cookies", 130),
                ("gum", 70),
            ]),
            min_order_value_cents: 5_000,
            lead_time_days: (2, 4),
            size_class_map: large_items(),
        },
        Supplier {
            supplier_id: "supplier_2".to_string(),
            name: "Beverage & More".to_string(),
            catalog: catalog(&[
                ("cola", 110),
                ("water", 65),
                ("red_bull", 180),
                ("orange_juice", 160),
                ("nuts", 190),
                ("sandwich", 260),
                ("chips", 125),
                ("gum", 75),
            ]),
            min_order_value_cents: 4_000,
            lead_time_days: (3, 5),
            size_class_map: large_items(),
        },
    ]
}
