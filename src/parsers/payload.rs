use serde_json::Value;

use crate::models::Payload;

/// Parse a JSON:API response body into a [`Payload`]
pub fn parse_payload(text: &str) -> Result<Payload, serde_json::Error> {
    serde_json::from_str(text)
}

/// Parse an already-decoded JSON value into a [`Payload`]
pub fn parse_payload_value(value: Value) -> Result<Payload, serde_json::Error> {
    serde_json::from_value(value)
}
