use serde_json::{Map, Number, Value};

use super::INDENT;
use crate::encoder::{EncodeError, Encoder, OutputFormat};

/// TOON encoder; reports [`EncodeError::Unrepresentable`] for shapes it cannot express
#[derive(Debug, Clone, Copy, Default)]
pub struct ToonEncoder;

impl Encoder for ToonEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Toon
    }

    fn encode_value(&self, value: &Value) -> Result<String, EncodeError> {
        let mut writer = Writer::default();
        match value {
            Value::Object(map) => writer.object(map, 0, "$")?,
            Value::Array(items) => writer.array(None, items, 0, "$")?,
            primitive => writer.lines.push(primitive_text(primitive)),
        }
        Ok(writer.lines.join("\n"))
    }
}

#[derive(Default)]
struct Writer {
    lines: Vec<String>,
}

enum ArrayShape<'a> {
    Empty,
    Primitives,
    Table(Vec<&'a String>),
    Items,
}

impl Writer {
    fn object(&mut self, map: &Map<String, Value>, depth: usize, path: &str) -> Result<(), EncodeError> {
        for (key, value) in map {
            self.field(key, value, depth, &format!("{}.{}", path, key))?;
        }
        Ok(())
    }

    fn field(&mut self, key: &str, value: &Value, depth: usize, path: &str) -> Result<(), EncodeError> {
        match value {
            Value::Object(map) => {
                self.lines.push(format!("{}{}:", INDENT.repeat(depth), key_text(key)));
                self.object(map, depth + 1, path)
            }
            Value::Array(items) => self.array(Some(key), items, depth, path),
            primitive => {
                self.lines.push(format!(
                    "{}{}: {}",
                    INDENT.repeat(depth),
                    key_text(key),
                    primitive_text(primitive)
                ));
                Ok(())
            }
        }
    }

    fn array(
        &mut self,
        key: Option<&str>,
        items: &[Value],
        depth: usize,
        path: &str,
    ) -> Result<(), EncodeError> {
        let indent = INDENT.repeat(depth);
        let key = key.map(key_text).unwrap_or_default();
        let len = items.len();

        match array_shape(items, path)? {
            ArrayShape::Empty => self.lines.push(format!("{indent}{key}[0]:")),
            ArrayShape::Primitives => {
                let values: Vec<String> = items.iter().map(primitive_text).collect();
                self.lines.push(format!("{indent}{key}[{len}]: {}", values.join(",")));
            }
            ArrayShape::Table(fields) => {
                let header: Vec<String> = fields.iter().map(|field| key_text(field)).collect();
                self.lines.push(format!("{indent}{key}[{len}]{{{}}}:", header.join(",")));
                let row_indent = INDENT.repeat(depth + 1);
                for item in items {
                    let row: Vec<String> = item
                        .as_object()
                        .into_iter()
                        .flat_map(|map| map.values())
                        .map(primitive_text)
                        .collect();
                    self.lines.push(format!("{row_indent}{}", row.join(",")));
                }
            }
            ArrayShape::Items => {
                self.lines.push(format!("{indent}{key}[{len}]:"));
                for (index, item) in items.iter().enumerate() {
                    if let Some(map) = item.as_object() {
                        self.list_item(map, depth + 1, &format!("{}[{}]", path, index))?;
                    }
                }
            }
        }
        Ok(())
    }

    // The first field shares the `- ` line; the marker is as wide as one indent level,
    // so the item's fields sit at depth + 1
    fn list_item(&mut self, map: &Map<String, Value>, depth: usize, path: &str) -> Result<(), EncodeError> {
        let first_line = self.lines.len();
        self.object(map, depth + 1, path)?;
        if let Some(line) = self.lines.get_mut(first_line) {
            let content = line[INDENT.len() * (depth + 1)..].to_string();
            *line = format!("{}- {}", INDENT.repeat(depth), content);
        }
        Ok(())
    }
}

fn array_shape<'a>(items: &'a [Value], path: &str) -> Result<ArrayShape<'a>, EncodeError> {
    if items.is_empty() {
        return Ok(ArrayShape::Empty);
    }

    let unrepresentable = |reason: &str| EncodeError::Unrepresentable {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if items.iter().any(Value::is_array) {
        return Err(unrepresentable("array contains an array"));
    }
    let objects: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
    if objects.is_empty() {
        return Ok(ArrayShape::Primitives);
    }
    if objects.len() != items.len() {
        return Err(unrepresentable("array mixes primitives and objects"));
    }
    if objects.iter().any(|map| map.is_empty()) {
        return Err(unrepresentable("array contains an empty object"));
    }

    let fields: Vec<&String> = objects[0].keys().collect();
    let uniform = objects.iter().all(|map| {
        map.len() == fields.len()
            && map.keys().zip(&fields).all(|(key, field)| key == *field)
            && map.values().all(is_primitive)
    });

    Ok(if uniform { ArrayShape::Table(fields) } else { ArrayShape::Items })
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Keys are bare when they look like identifiers, quoted otherwise
pub(super) fn key_text(key: &str) -> String {
    let mut chars = key.chars();
    let bare = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if bare { key.to_string() } else { quote(key) }
}

pub(super) fn primitive_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if needs_quotes(s) => quote(s),
        Value::String(s) => s.clone(),
        // Containers never reach here; keep the output valid anyway
        other => other.to_string(),
    }
}

fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if matches!(s, "true" | "false" | "null") {
        return true;
    }
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '-')
        || serde_json::from_str::<Number>(s).is_ok()
        || s.parse::<f64>().is_ok()
    {
        return true;
    }
    s.chars().any(|c| matches!(c, ',' | ':' | '"' | '\\' | '[' | ']' | '{' | '}') || c.is_control())
}

fn quote(s: &str) -> String {
    // A string always serializes
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}
