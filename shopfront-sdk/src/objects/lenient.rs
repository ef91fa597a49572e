//! Tolerant decoders for values the upstream API does not type strictly.
//!
//! The storefront's settings documents are edited by hand in an admin form,
//! so numbers arrive as JSON numbers, numeric strings, `null`, or garbage
//! such as `"NaN"`. Anything that is not a finite number decodes to `None`
//! and the caller substitutes its default.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

/// Decode an optional decimal, mapping unparseable values to `None`.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Decode an optional non-negative integer count.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

/// Decode a list of strings, dropping non-string entries.
pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(entries)) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Value::String(s) if !s.trim().is_empty() => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Decode a calendar date from `YYYY-MM-DD` or a full ISO timestamp.
pub fn date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Parse the calendar part of an ISO date or timestamp.
pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    let day = raw.trim().split('T').next().unwrap_or_default();
    Date::parse(day, format_description!("[year]-[month]-[day]"))
}

pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn count_from_value(value: &Value) -> Option<u32> {
    let decimal = decimal_from_value(value)?;
    if decimal.is_sign_negative() {
        return None;
    }
    decimal.trunc().to_u32()
}
