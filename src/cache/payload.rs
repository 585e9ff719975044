//! Inbound cache update payloads
//!
//! A payload maps type names to table fragments. Fragments overlay the
//! cache record by record; the `LogEntry` pseudo-type carries deletions.

use super::record::EntityRecord;
use crate::error::{BoardError, BoardResult};
use serde_json::Value;

/// Pseudo-type whose records signal deletions instead of data
pub const LOG_ENTRY_TYPE: &str = "LogEntry";

/// `action_flag` value meaning "delete this id"
pub const DELETE_ACTION_FLAG: i64 = 3;

/// Records for one type inside a payload, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub type_name: String,
    pub records: Vec<(String, EntityRecord)>,
}

impl Fragment {
    pub fn is_log_entry(&self) -> bool {
        self.type_name == LOG_ENTRY_TYPE
    }
}

/// A `resource_updated` / `initialize-cache` payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fragments: Vec<Fragment>,
}

impl UpdatePayload {
    /// Validate and convert the `content` of a cache event.
    ///
    /// Content must be an object of objects of objects. Key order is
    /// preserved, which fixes the application order within one payload.
    pub fn from_value(event_type: &str, content: Value) -> BoardResult<Self> {
        let types = match content {
            Value::Object(types) => types,
            other => {
                return Err(BoardError::payload_shape(
                    event_type,
                    format!("expected an object of type tables, got {}", kind(&other)),
                ))
            }
        };

        let mut fragments = Vec::with_capacity(types.len());
        for (type_name, table) in types {
            let table = match table {
                Value::Object(table) => table,
                other => {
                    return Err(BoardError::payload_shape(
                        event_type,
                        format!("table {} is {}, expected an object", type_name, kind(&other)),
                    ))
                }
            };

            let mut records = Vec::with_capacity(table.len());
            for (id, record) in table {
                let fields = match record {
                    Value::Object(fields) => fields,
                    other => {
                        return Err(BoardError::payload_shape(
                            event_type,
                            format!("record {}[{}] is {}", type_name, id, kind(&other)),
                        ))
                    }
                };
                records.push((id, EntityRecord::from(fields)));
            }

            fragments.push(Fragment { type_name, records });
        }

        Ok(Self { fragments })
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Parse an `action_flag` the way the dashboard always has: numbers are
/// truncated, strings contribute their leading integer after whitespace.
pub fn parse_action_flag(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_integer(s.trim_start()),
        _ => None,
    }
}

/// Whether a `LogEntry` record asks for deletion
pub fn is_delete(record: &EntityRecord) -> bool {
    record
        .field("action_flag")
        .and_then(parse_action_flag)
        .is_some_and(|flag| flag == DELETE_ACTION_FLAG)
}

fn leading_integer(s: &str) -> Option<i64> {
    let (sign, digits) = match *s.as_bytes().first()? {
        b'-' => (-1, &s[1..]),
        b'+' => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
