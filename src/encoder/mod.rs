//! Output encoding
//!
//! Every tool result is encoded once, at the edge, in the format selected by
//! configuration:
//!
//! - [`OutputFormat::Json`] - compact JSON, keys in insertion order
//! - [`OutputFormat::Toon`] - indentation-based text that lists the keys of a uniform
//!   array once in a header
//!
//! # Error Handling Strategy
//!
//! Some shapes cannot be expressed in TOON (arrays of arrays, arrays mixing primitives
//! and objects, empty objects as array elements). [`encode`] never returns a partial
//! document for them: it logs the reason at info level and emits JSON instead. Only a
//! value that cannot be serialized at all is an error.

pub mod toon;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

pub use toon::{DecodeError, ToonEncoder, decode};

/// Serialization format for tool results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Toon,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Toon => "toon",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toon" => Ok(OutputFormat::Toon),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format '{}'. Valid formats: toon, json", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot encode {path} as TOON: {reason}")]
    Unrepresentable { path: String, reason: String },
}

/// A text encoding of JSON values
pub trait Encoder {
    fn format(&self) -> OutputFormat;

    fn encode_value(&self, value: &Value) -> Result<String, EncodeError>;
}

/// Compact JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn encode_value(&self, value: &Value) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(value)?)
    }
}

/// Encode any serializable value, falling back to JSON when TOON cannot express it
pub fn encode<T>(value: &T, format: OutputFormat) -> Result<String, EncodeError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    match format {
        OutputFormat::Json => JsonEncoder.encode_value(&value),
        OutputFormat::Toon => match ToonEncoder.encode_value(&value) {
            Ok(text) => Ok(text),
            Err(EncodeError::Unrepresentable { path, reason }) => {
                info!(%path, %reason, "TOON cannot express value, falling back to JSON");
                JsonEncoder.encode_value(&value)
            }
            Err(err) => Err(err),
        },
    }
}
