//! Demand model
//!
//! Computes daily per-slot sales from the slot state and the calendar:
//!
//! ```text
//! demand = base_sales * f_price * f_dow * f_season * f_weather * f_variety + noise
//! ```
//!
//! Each item is assigned a demand-parameter triple on first sighting,
//! drawn from the economy RNG stream. The RNG call order per day is part
//! of the determinism contract: one weather draw, then per slot in
//! creation order the lazy parameter draws (for new items) followed by
//! one Gaussian noise draw.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::state::VendingState;
use crate::rng::RngManager;

/// Floor for the price-factor base `1 + pct_diff`.
///
/// The factor is `(1 + pct_diff)^elasticity` with negative elasticity;
/// without a floor, a price at or below zero makes the power undefined.
const PRICE_FACTOR_BASE_FLOOR: f64 = 0.01;

/// Cached demand parameters for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDemandParams {
    pub item_id: String,
    /// Price elasticity; always negative
    pub elasticity: f64,
    /// Price (cents) at which base_sales applies
    pub reference_price_cents: f64,
    /// Expected units/day at the reference price before modifiers
    pub base_sales: f64,
}

/// Result of one day's demand computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySales {
    /// item_id -> units sold
    pub sales: BTreeMap<String, u32>,
    /// item_id -> revenue (cents)
    pub revenue_cents: BTreeMap<String, i64>,
    /// Total cash that landed in the machine (cents)
    pub cash_collected_cents: i64,
}

/// Daily sales engine with its own RNG stream and weather state.
#[derive(Debug, Clone)]
pub struct Economy {
    rng: RngManager,
    demand_params: BTreeMap<String, ItemDemandParams>,
    /// Markov weather: 0 = bad, 1 = normal, 2 = good
    weather_state: u8,
}

impl Economy {
    /// Create an economy seeded with the economy RNG stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RngManager::new(seed),
            demand_params: BTreeMap::new(),
            weather_state: 1,
        }
    }

    /// Demand parameters for an item, if already initialized.
    pub fn demand_params(&self, item_id: &str) -> Option<&ItemDemandParams> {
        self.demand_params.get(item_id)
    }

    /// Current weather state (0, 1 or 2).
    pub fn weather_state(&self) -> u8 {
        self.weather_state
    }

    fn get_or_create_params(&mut self, item_id: &str, wholesale_price_cents: i64) -> ItemDemandParams {
        if let Some(params) = self.demand_params.get(item_id) {
            return params.clone();
        }
        let elasticity = -self.rng.lognormal(0.8, 0.3);
        let reference_price_cents =
            wholesale_price_cents as f64 * (1.0 + self.rng.uniform(0.2, 0.8));
        let base_sales = self.rng.lognormal(1.0, 0.5).max(0.5);
        let params = ItemDemandParams {
            item_id: item_id.to_string(),
            elasticity,
            reference_price_cents,
            base_sales,
        };
        self.demand_params.insert(item_id.to_string(), params.clone());
        params
    }

    /// Price factor `(1 + pct_diff)^elasticity` relative to the reference
    /// price. The base is floored at 0.01 so deep discounts yield a large
    /// but finite boost instead of an undefined power.
    fn price_factor(price_cents: i64, params: &ItemDemandParams) -> f64 {
        if params.reference_price_cents <= 0.0 {
            return 1.0;
        }
        let pct_diff =
            (price_cents as f64 - params.reference_price_cents) / params.reference_price_cents;
        (1.0 + pct_diff).max(PRICE_FACTOR_BASE_FLOOR).powf(params.elasticity)
    }

    /// Weekends sell more.
    fn day_of_week_factor(day: usize) -> f64 {
        if day % 7 >= 5 {
            1.2
        } else {
            1.0
        }
    }

    /// Summer months sell slightly more (30-day months).
    fn season_factor(day: usize) -> f64 {
        let month = (day / 30) % 12;
        if (5..=7).contains(&month) {
            1.1
        } else {
            1.0
        }
    }

    /// One Markov step of the weather chain, then the factor.
    fn weather_factor(&mut self) -> f64 {
        let r = self.rng.next_f64();
        if r < 0.1 {
            self.weather_state = self.weather_state.saturating_sub(1);
        } else if r > 0.9 {
            self.weather_state = (self.weather_state + 1).min(2);
        }
        0.85 + 0.15 * self.weather_state as f64
    }

    /// Variety bonus up to 8 distinct items, penalty beyond (capped at 50%).
    fn variety_factor(num_distinct_items: usize) -> f64 {
        match num_distinct_items {
            0 => 0.5,
            1..=4 => 0.80 + 0.05 * num_distinct_items as f64,
            5..=8 => 1.0,
            n => (1.0 - 0.05 * (n - 8) as f64).max(0.5),
        }
    }

    /// Compute one day of sales over all slots, in slot creation order.
    ///
    /// Does not mutate `state`; the simulator applies the resulting slot
    /// decrements and cash movement itself.
    pub fn compute_daily_sales(&mut self, state: &VendingState, day: usize) -> DailySales {
        let variety = Self::variety_factor(state.distinct_stocked_items());
        let weather = self.weather_factor();
        let f_dow = Self::day_of_week_factor(day);
        let f_season = Self::season_factor(day);

        let mut result = DailySales::default();
        for slot in &state.machine_slots {
            let Some(item_id) = &slot.item_id else {
                continue;
            };
            if slot.quantity == 0 {
                continue;
            }
            let Some(info) = state.item_catalog.get(item_id) else {
                continue;
            };
            let price_cents = state.prices_cents.get(item_id).copied().unwrap_or(0);
            let params = self.get_or_create_params(item_id, info.wholesale_price_cents);

            let raw_demand = params.base_sales
                * Self::price_factor(price_cents, &params)
                * f_dow
                * f_season
                * weather
                * variety;
            let noise = self.rng.gauss(0.0, 0.15 * raw_demand);
            let demand = (raw_demand + noise).max(0.0);
            let sold = (demand.round() as u32).min(slot.quantity);

            if sold > 0 {
                *result.sales.entry(item_id.clone()).or_insert(0) += sold;
                let revenue = sold as i64 * price_cents;
                *result.revenue_cents.entry(item_id.clone()).or_insert(0) += revenue;
                result.cash_collected_cents += revenue;
            }
        }
        result
    }
}
