// src/parser.rs
//! Explicit coercions from raw JSON fields. Every function is total:
//! malformed input maps to `None`, never to a panic or an error.
use std::str::FromStr;

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

fn hex_digits(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a non-negative quantity: JSON number, decimal string (plain or
/// scientific) or `0x` hex quantity.
pub fn parse_value(raw: &Value) -> Option<Decimal> {
    let parsed = match raw {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            match hex_digits(s) {
                Some(digits) => parse_hex_decimal(digits),
                None => parse_decimal_str(s),
            }
        }
        _ => None,
    }?;

    if parsed.is_sign_negative() && !parsed.is_zero() {
        return None;
    }
    Some(parsed.normalize())
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

fn parse_hex_decimal(digits: &str) -> Option<Decimal> {
    if digits.is_empty() {
        return None;
    }
    // U256 covers every EVM quantity; Decimal rejects what it cannot hold.
    let wide = U256::from_str_radix(digits, 16).ok()?;
    Decimal::from_str(&wide.to_string()).ok()
}

/// Parse an unsigned integer given as JSON integer, decimal string or hex.
pub fn parse_u64(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match hex_digits(s) {
                Some(digits) => u64::from_str_radix(digits, 16).ok(),
                None => s.parse().ok(),
            }
        }
        _ => None,
    }
}

/// Interpret a timestamp as seconds since the Unix epoch. Fractional
/// seconds are truncated toward zero.
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    let secs = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| parse_decimal_str(&n.to_string()).and_then(whole_seconds)),
        Value::String(s) => {
            let s = s.trim();
            match hex_digits(s) {
                Some(digits) => i64::from_str_radix(digits, 16).ok(),
                None => s
                    .parse()
                    .ok()
                    .or_else(|| parse_decimal_str(s).and_then(whole_seconds)),
            }
        }
        _ => None,
    }?;
    DateTime::from_timestamp(secs, 0)
}

fn whole_seconds(secs: Decimal) -> Option<i64> {
    secs.trunc().to_i64()
}

/// Lower-cased, trimmed address used for comparisons.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;
    use serde_json::json;

    #[test]
    fn value_accepts_decimal_strings_and_numbers() {
        assert_eq!(parse_value(&json!("10.5")), Decimal::from_str("10.5").ok());
        assert_eq!(parse_value(&json!(42)), Decimal::from_u64(42));
        assert_eq!(parse_value(&json!(" 7 ")), Decimal::from_u64(7));
        assert_eq!(parse_value(&json!("1e3")), Decimal::from_u64(1000));
    }

    #[test]
    fn value_accepts_hex_quantities() {
        assert_eq!(parse_value(&json!("0x0")), Some(Decimal::ZERO));
        // 1 ether in wei
        assert_eq!(
            parse_value(&json!("0xde0b6b3a7640000")),
            Decimal::from_str("1000000000000000000").ok()
        );
    }

    #[test]
    fn value_rejects_garbage() {
        assert_eq!(parse_value(&json!("N/A")), None);
        assert_eq!(parse_value(&json!("")), None);
        assert_eq!(parse_value(&json!("0x")), None);
        assert_eq!(parse_value(&json!("0xzz")), None);
        assert_eq!(parse_value(&json!("-5")), None);
        assert_eq!(parse_value(&json!(true)), None);
        assert_eq!(parse_value(&json!({"v": 1})), None);
    }

    #[test]
    fn value_rejects_quantities_beyond_decimal_range() {
        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(parse_value(&json!(max)), None);
    }

    #[test]
    fn timestamp_parses_all_encodings() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(parse_timestamp(&json!(1_700_000_000)), expected);
        assert_eq!(parse_timestamp(&json!("1700000000")), expected);
        assert_eq!(parse_timestamp(&json!("0x6553f100")), expected);
    }

    #[test]
    fn fractional_timestamps_truncate_to_whole_seconds() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(parse_timestamp(&json!(1_700_000_000.0)), expected);
        assert_eq!(parse_timestamp(&json!(1_700_000_000.75)), expected);
        assert_eq!(parse_timestamp(&json!("1700000000.9")), expected);
        assert_eq!(parse_timestamp(&json!(" 1700000000.0 ")), expected);
        assert_eq!(parse_timestamp(&json!(1.5)), DateTime::from_timestamp(1, 0));
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
        assert_eq!(parse_timestamp(&json!(i64::MAX)), None);
    }

    #[test]
    fn block_numbers() {
        assert_eq!(parse_u64(&json!("0x10")), Some(16));
        assert_eq!(parse_u64(&json!("16")), Some(16));
        assert_eq!(parse_u64(&json!(16)), Some(16));
        assert_eq!(parse_u64(&json!("-1")), None);
    }
}
