//! Read state derived from raw records.
//!
//! These are recomputed on every read and never cached. Observers that
//! display or compare values must use these functions so that divisor
//! guards and rounding stay identical everywhere.

/// Number of bytes in one binary gigabyte (2^30).
pub const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Rounds `value` to `places` decimal digits.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// CPU fraction (0..1) as a percentage rounded to 2 decimals. Absent is `0`.
#[must_use]
pub fn cpu_percentage(cpu_fraction: Option<f64>) -> f64 {
    cpu_fraction.map_or(0.0, |cpu| round_to(cpu * 100.0, 2))
}

/// `used / max * 100` rounded to 2 decimals. A zero or absent `max` yields `0`.
#[must_use]
pub fn memory_percentage(used: Option<u64>, max: Option<u64>) -> f64 {
    ratio_percentage(used, max, 2)
}

/// `used / total * 100` rounded to 1 decimal. A zero or absent `total` yields `0`.
#[must_use]
pub fn usage_percentage(used: Option<u64>, total: Option<u64>) -> f64 {
    ratio_percentage(used, total, 1)
}

/// Bytes as binary gigabytes rounded to 2 decimals.
#[must_use]
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB, 2)
}

fn ratio_percentage(used: Option<u64>, max: Option<u64>, places: i32) -> f64 {
    match max {
        Some(max) if max > 0 => round_to(used.unwrap_or(0) as f64 / max as f64 * 100.0, places),
        _ => 0.0,
    }
}
