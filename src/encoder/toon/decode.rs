use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::INDENT;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct DecodeError {
    pub line: usize,
    pub message: String,
}

/// Parse TOON text back into a JSON value
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let content = raw.trim_start_matches(' ');
        let spaces = raw.len() - content.len();
        if spaces % INDENT.len() != 0 {
            return Err(DecodeError { line: index + 1, message: "indentation is not a multiple of two".into() });
        }
        lines.push(Line { number: index + 1, depth: spaces / INDENT.len(), text: content.to_string() });
    }

    let mut parser = Parser { lines, pos: 0 };
    let value = parser.root()?;
    if let Some(line) = parser.lines.get(parser.pos) {
        return Err(line.error("unexpected trailing content"));
    }
    Ok(value)
}

#[derive(Debug, Clone)]
struct Line {
    number: usize,
    depth: usize,
    text: String,
}

impl Line {
    fn error(&self, message: &str) -> DecodeError {
        DecodeError { line: self.number, message: message.to_string() }
    }
}

/// `key[len]{fields}: rest`, with every part but the colon optional
#[derive(Debug)]
struct Header {
    key: Option<String>,
    len: Option<usize>,
    fields: Option<Vec<String>>,
    rest: String,
}

struct Parser {
    lines: Vec<Line>,
    pos: usize,
}

impl Parser {
    fn root(&mut self) -> Result<Value, DecodeError> {
        let Some(first) = self.lines.first().cloned() else {
            return Ok(Value::Object(Map::new()));
        };
        if first.depth != 0 {
            return Err(first.error("document must start at column zero"));
        }

        match parse_header(&first.text) {
            Some(header) if header.key.is_none() => {
                self.pos += 1;
                self.array_body(&first, header, 0)
            }
            Some(_) => Ok(Value::Object(self.object(0)?)),
            None if self.lines.len() == 1 => {
                self.pos += 1;
                Ok(parse_primitive(&first.text))
            }
            None => Err(first.error("expected `key: value`")),
        }
    }

    fn object(&mut self, depth: usize) -> Result<Map<String, Value>, DecodeError> {
        let mut map = Map::new();
        while let Some(line) = self.lines.get(self.pos).cloned() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(line.error("unexpected indentation"));
            }
            if line.text.starts_with("- ") {
                break;
            }
            let header = parse_header(&line.text).ok_or_else(|| line.error("expected `key: value`"))?;
            let Some(key) = header.key.clone() else {
                return Err(line.error("missing key"));
            };
            self.pos += 1;
            let value = self.field_value(&line, header, depth)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn field_value(&mut self, line: &Line, header: Header, depth: usize) -> Result<Value, DecodeError> {
        if header.len.is_some() {
            return self.array_body(line, header, depth);
        }
        if header.fields.is_some() {
            return Err(line.error("field list without a length"));
        }
        if header.rest.is_empty() {
            Ok(Value::Object(self.object(depth + 1)?))
        } else {
            Ok(parse_primitive(&header.rest))
        }
    }

    fn array_body(&mut self, line: &Line, header: Header, depth: usize) -> Result<Value, DecodeError> {
        let len = header.len.ok_or_else(|| line.error("missing array length"))?;

        if let Some(fields) = header.fields {
            let mut rows = Vec::with_capacity(len);
            for _ in 0..len {
                let row = self.next_at(depth + 1, line)?;
                let cells = split_cells(&row.text);
                if cells.len() != fields.len() {
                    return Err(row.error(&format!("expected {} cells, found {}", fields.len(), cells.len())));
                }
                let object: Map<String, Value> = fields
                    .iter()
                    .cloned()
                    .zip(cells.iter().map(|cell| parse_primitive(cell)))
                    .collect();
                rows.push(Value::Object(object));
            }
            return Ok(Value::Array(rows));
        }

        if !header.rest.is_empty() {
            let values: Vec<Value> = split_cells(&header.rest).iter().map(|cell| parse_primitive(cell)).collect();
            if values.len() != len {
                return Err(line.error(&format!("declared {} values, found {}", len, values.len())));
            }
            return Ok(Value::Array(values));
        }

        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            let item = self.next_at(depth + 1, line)?;
            let Some(first_field) = item.text.strip_prefix("- ") else {
                return Err(item.error("expected a `- ` list item"));
            };
            // Re-read the marker line as the item's first field, one level deeper
            let current = self.pos - 1;
            self.lines[current] = Line { number: item.number, depth: depth + 2, text: first_field.to_string() };
            self.pos = current;
            items.push(Value::Object(self.object(depth + 2)?));
        }
        Ok(Value::Array(items))
    }

    fn next_at(&mut self, depth: usize, parent: &Line) -> Result<Line, DecodeError> {
        match self.lines.get(self.pos).cloned() {
            Some(line) if line.depth == depth => {
                self.pos += 1;
                Ok(line)
            }
            Some(line) => Err(line.error("array has fewer elements than declared")),
            None => Err(parent.error("array has fewer elements than declared")),
        }
    }
}

fn parse_header(text: &str) -> Option<Header> {
    let (key, rest) = if text.starts_with('"') {
        let end = quoted_end(text)?;
        let key: String = serde_json::from_str(&text[..end]).ok()?;
        (Some(key), &text[end..])
    } else {
        let end = text.find(['[', ':'])?;
        let key = &text[..end];
        if key.is_empty() {
            (None, &text[end..])
        } else if key.contains(|c: char| c.is_whitespace() || c == '"') {
            return None;
        } else {
            (Some(key.to_string()), &text[end..])
        }
    };

    let mut rest = rest;
    let mut len = None;
    if let Some(after) = rest.strip_prefix('[') {
        let close = after.find(']')?;
        len = Some(after[..close].parse().ok()?);
        rest = &after[close + 1..];
    }

    let mut fields = None;
    if let Some(after) = rest.strip_prefix('{') {
        let close = after.find("}:")?;
        let names = split_cells(&after[..close])
            .iter()
            .map(|name| {
                if name.starts_with('"') {
                    serde_json::from_str(name).ok()
                } else {
                    Some(name.to_string())
                }
            })
            .collect::<Option<Vec<String>>>()?;
        fields = Some(names);
        rest = &after[close + 1..];
    }

    let rest = rest.strip_prefix(':')?;
    if key.is_none() && len.is_none() {
        return None;
    }
    Some(Header { key, len, fields, rest: rest.trim_start().to_string() })
}

/// Byte offset just past the closing quote of a leading JSON string literal
fn quoted_end(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(offset + 1),
            _ => {}
        }
    }
    None
}

/// Split on commas outside string literals
fn split_cells(text: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        match c {
            _ if escaped => {
                escaped = false;
                current.push(c);
            }
            '\\' if in_string => {
                escaped = true;
                current.push(c);
            }
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            ',' if !in_string => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

fn parse_primitive(token: &str) -> Value {
    let token = token.trim();
    match token {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if token.starts_with('"') {
        if let Ok(s) = serde_json::from_str::<String>(token) {
            return Value::String(s);
        }
    }
    if token.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        if let Ok(n) = serde_json::from_str::<Number>(token) {
            return Value::Number(n);
        }
    }
    Value::String(token.to_string())
}
