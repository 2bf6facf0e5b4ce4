//! Numeric helpers shared by every metric.
//!
//! Division by a zero denominator yields 0, never NaN. Percentages are
//! rounded (one decimal for closure rates, integer elsewhere). Monetary sums
//! accumulate in f64 and are rounded to whole units only at the output
//! boundary.

/// numerator / denominator as a percentage; 0 when the denominator is 0.
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Percentage rounded to one decimal place.
pub fn pct_one_decimal(numerator: f64, denominator: f64) -> f64 {
    (pct(numerator, denominator) * 10.0).round() / 10.0
}

/// Percentage rounded to the nearest integer.
#[allow(clippy::cast_possible_truncation)]
pub fn pct_rounded(numerator: f64, denominator: f64) -> i64 {
    pct(numerator, denominator).round() as i64
}

/// Mean of a sum over a count; 0 when the count is 0.
pub fn mean(sum: f64, count: i64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Round a monetary amount to whole currency units for external exposure.
pub fn round_currency(amount: f64) -> f64 {
    amount.round()
}

/// Mean rounded to one decimal place; 0 when the count is 0.
pub fn mean_one_decimal(sum: f64, count: i64) -> f64 {
    (mean(sum, count) * 10.0).round() / 10.0
}
