//! Money helpers
//!
//! CRITICAL: All money values in the simulation are i64 (cents). Floats
//! appear only in the demand model and at the agent-facing text boundary.

/// Format cents as a dollar string, e.g. `12345` -> `"$123.45"`.
///
/// # Example
/// ```
/// use vending_simulator_core_rs::core::money::format_cents;
///
/// assert_eq!(format_cents(50_000), "$500.00");
/// assert_eq!(format_cents(150), "$1.50");
/// assert_eq!(format_cents(-275), "-$2.75");
/// ```
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Convert a dollar amount to cents, rounding to the nearest cent.
///
/// This is the single point where agent-supplied dollar values (e.g. a
/// price in a natural-language instruction) enter the integer domain.
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

/// Convert cents to a dollar amount (for demand-model math only).
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}
