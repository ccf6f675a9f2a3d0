//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Reproducing an episode bit-for-bit from its seed
//! - Testing (the RNG call order per step is part of the contract)
//! - Training-data generation (identical trajectories on replay)
//!
//! The simulator holds two independent streams: the episode stream
//! (delivery minutes, supplier lead times) and the economy stream
//! (demand parameters, weather, sales noise). They must never be
//! intermixed.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use vending_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let minute = rng.range(0, 1440); // [0, 1440)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Example
    /// ```
    /// use vending_simulator_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// ```
    pub fn new(seed: u64) -> Self {
        // Seed must never be zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// This advances the internal state and returns a random value.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    ///
    /// # Example
    /// ```
    /// use vending_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let lead_days = rng.range(2, 5); // 2, 3 or 4
    /// ```
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) using the top 53 bits
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [lo, hi)
    ///
    /// # Example
    /// ```
    /// use vending_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let markup = rng.uniform(0.2, 0.8);
    /// assert!(markup >= 0.2 && markup < 0.8);
    /// ```
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Sample from a normal distribution with given mean and standard
    /// deviation, via the Box-Muller transform.
    ///
    /// Always consumes exactly two uniform draws, so the stream position
    /// stays predictable even when `std_dev` is zero.
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }

    /// Sample from a log-normal distribution: `exp(N(mu, sigma))`.
    ///
    /// Used for demand-parameter initialization (elasticity magnitude
    /// and base sales are heavy-tailed).
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        (mu + sigma * self.standard_normal()).exp()
    }

    /// Sample from the standard normal distribution using Box-Muller.
    fn standard_normal(&mut self) -> f64 {
        // 1 - u maps [0, 1) to (0, 1], keeping ln() finite
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Get current RNG state (for determinism checks)
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
