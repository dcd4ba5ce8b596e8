//! Fractional odds conversion

use crate::error::{FeedError, Result};

/// Parse a wire odds string into decimal odds.
///
/// `EVS`/`EVENS` is 2.0, `a/b` is `1 + a/b`, a plain number is taken as
/// decimal odds already. `0/0`, zero denominators and non-finite results
/// are malformed.
pub fn parse_decimal(odds: &str) -> Result<f64> {
    let od = odds.trim().to_uppercase();
    if od.is_empty() {
        return Err(FeedError::MalformedNumeric(odds.to_string()));
    }
    if od == "EVS" || od == "EVENS" {
        return Ok(2.0);
    }

    if let Some((num, den)) = od.split_once('/') {
        let num: f64 = num
            .trim()
            .parse()
            .map_err(|_| FeedError::MalformedNumeric(odds.to_string()))?;
        let den: f64 = den
            .trim()
            .parse()
            .map_err(|_| FeedError::MalformedNumeric(odds.to_string()))?;
        if den == 0.0 {
            return Err(FeedError::MalformedNumeric(odds.to_string()));
        }
        return Some(round6(1.0 + num / den))
            .filter(|v| v.is_finite())
            .ok_or_else(|| FeedError::MalformedNumeric(odds.to_string()));
    }

    od.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::MalformedNumeric(odds.to_string()))
}

/// Decimal odds, `None` standing for "unknown".
pub fn to_decimal(odds: Option<&str>) -> Option<f64> {
    odds.and_then(|od| parse_decimal(od).ok())
}

/// True for odds values that carry no price (`""` or `0/0`).
pub fn is_unpriced(odds: Option<&str>) -> bool {
    match odds.map(str::trim) {
        None | Some("") | Some("0/0") => true,
        Some(_) => false,
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
