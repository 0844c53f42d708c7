use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::models::Relationship;

/// Custom deserializer for resource ids that accepts both strings and integers
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::String(_) => Err(Error::custom("resource id cannot be empty")),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::custom("resource id must be a string or number")),
    }
}

/// Deserialize `null` as the type's default (empty map, empty list)
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a relationships object into a list that keeps the service's key order
pub fn deserialize_relationships<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, Relationship)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    map.into_iter()
        .map(|(name, value)| {
            let relationship = serde_json::from_value::<Relationship>(value)
                .map_err(|e| Error::custom(format!("invalid relationship '{}': {}", name, e)))?;
            Ok((name, relationship))
        })
        .collect()
}

/// Parse a timestamp value: RFC3339 strings, naive `YYYY-MM-DD HH:MM:SS` strings
/// (taken as UTC) and integer Unix milliseconds
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<DateTime<Utc>>().ok().or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok().map(|dt| dt.and_utc())
            })
        }
        _ => None,
    }
}
