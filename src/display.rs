//! Display lists: which fields to render for each entity type
//!
//! A display list is only ever replaced as a whole.

use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered field names per entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayList(BTreeMap<String, Vec<String>>);

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `content` of an `initialize-display-list` event.
    ///
    /// The server announces "nothing registered yet" as an empty array or
    /// null; both become an empty list. A type mapped to null has no fields.
    pub fn from_value(event_type: &str, content: Value) -> BoardResult<Self> {
        let types: BTreeMap<String, Option<Vec<String>>> = match content {
            Value::Null => return Ok(Self::new()),
            Value::Array(items) if items.is_empty() => return Ok(Self::new()),
            content => serde_json::from_value(content)
                .map_err(|e| BoardError::payload_shape(event_type, e.to_string()))?,
        };

        Ok(Self(
            types
                .into_iter()
                .map(|(type_name, fields)| (type_name, fields.unwrap_or_default()))
                .collect(),
        ))
    }

    /// Replace the current list with `next`; nothing is carried over.
    pub fn replace(&self, next: DisplayList) -> DisplayList {
        next
    }

    /// Fields to show for a type. Unknown types have no fields.
    pub fn field_names(&self, type_name: &str) -> &[String] {
        self.0.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn with_type(mut self, type_name: impl Into<String>, fields: &[&str]) -> Self {
        self.0.insert(
            type_name.into(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }
}
