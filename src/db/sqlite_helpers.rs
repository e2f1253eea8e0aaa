//! SQLite helper utilities for type conversion
//!
//! SQLite has no array or decimal types. Keyword sets are stored as JSON TEXT
//! and decimals as REAL; this module converts between those and the Rust types.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

// ============================================================================
// Keyword Helpers (stored as JSON arrays in TEXT)
// ============================================================================

/// Serialize a keyword set to a JSON array for the `keywords` column.
///
/// The set is sorted, so the same keywords always produce the same string.
#[inline]
pub fn keywords_to_json(keywords: &BTreeSet<String>) -> String {
    serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize the `keywords` column (empty or invalid JSON means no keywords)
#[inline]
pub fn json_to_keywords(s: &str) -> BTreeSet<String> {
    serde_json::from_str(s).unwrap_or_default()
}

/// LIKE pattern matching one keyword inside the serialized JSON array
#[inline]
pub fn keyword_like_pattern(keyword: &str) -> String {
    format!("%{}%", serde_json::Value::from(keyword))
}

// ============================================================================
// Decimal Helpers (stored as REAL)
// ============================================================================

/// Convert a decimal to the REAL value written to SQLite.
///
/// Goes through the decimal string so the result is the nearest `f64`, identical to
/// parsing the same literal; equality filters on REAL columns depend on that.
#[inline]
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_string()
        .parse()
        .unwrap_or_else(|_| d.to_f64().unwrap_or_default())
}

/// Convert a REAL read from SQLite back to a decimal with `scale` fractional digits
#[inline]
pub fn f64_to_decimal(f: f64, scale: u32) -> Decimal {
    Decimal::from_f64(f).unwrap_or_default().round_dp(scale)
}
