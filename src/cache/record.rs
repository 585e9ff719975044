//! Entity records and cross-type links

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One resource instance: field name to JSON value.
///
/// Values are normally scalars. Foreign keys arrive as link objects
/// (`{"link": {"id": .., "type": ..}}`) and are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Get a raw field value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set a field, returning the record for chaining
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Record id as a string (numbers are stringified)
    pub fn id(&self) -> Option<String> {
        self.field("id").and_then(id_string)
    }

    /// Display name of the record
    pub fn name(&self) -> Option<&str> {
        self.non_empty_str("name")
    }

    /// Current owner, if any
    pub fn owner(&self) -> Option<&str> {
        self.non_empty_str("owner")
    }

    /// Current reservation holder, if any
    pub fn reserved(&self) -> Option<&str> {
        self.non_empty_str("reserved")
    }

    /// Whether the resource reports itself available. Missing means available.
    pub fn is_available(&self) -> bool {
        !matches!(self.field("is_available"), Some(Value::Bool(false)))
    }

    /// The user holding the resource: owner first, then reservation
    pub fn user(&self) -> Option<&str> {
        self.owner().or_else(|| self.reserved())
    }

    /// Whether somebody owns or reserved the resource
    pub fn is_locked(&self) -> bool {
        self.user().is_some()
    }

    /// Field rendered as display text; `None` for missing fields.
    pub fn display_value(&self, name: &str) -> Option<String> {
        self.field(name).map(display_text)
    }

    /// Iterate over fields in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for EntityRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A reference from one record to another record of some type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub type_name: String,
    pub id: String,
}

impl Link {
    /// Parse a `{"link": {"id": .., "type": ..}}` value
    pub fn parse(value: &Value) -> Option<Self> {
        let link = value.get("link")?;
        let id = link.get("id").and_then(id_string)?;
        let type_name = link.get("type")?.as_str()?.to_string();
        Some(Self { type_name, id })
    }
}

/// Ids travel as JSON numbers or strings; the cache keys them as strings.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => match Link::parse(other) {
            Some(link) => format!("{}#{}", link.type_name, link.id),
            None => other.to_string(),
        },
    }
}
