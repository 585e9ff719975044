//! Push feed envelopes
//!
//! Every frame on the feed is `{"event_type": <string>, "content": <value>}`.

use crate::cache::UpdatePayload;
use crate::display::DisplayList;
use crate::error::{BoardError, BoardResult};
use crate::store::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESOURCE_UPDATED: &str = "resource_updated";
pub const INITIALIZE_CACHE: &str = "initialize-cache";
pub const INITIALIZE_DISPLAY_LIST: &str = "initialize-display-list";

/// Recognized event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ResourceUpdated,
    InitializeCache,
    InitializeDisplayList,
}

impl EventKind {
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            RESOURCE_UPDATED => Some(Self::ResourceUpdated),
            INITIALIZE_CACHE => Some(Self::InitializeCache),
            INITIALIZE_DISPLAY_LIST => Some(Self::InitializeDisplayList),
            _ => None,
        }
    }
}

/// One parsed feed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event_type: String,
    #[serde(default)]
    pub content: Value,
}

impl Envelope {
    pub fn new(event_type: impl Into<String>, content: Value) -> Self {
        Self {
            event_type: event_type.into(),
            content,
        }
    }

    /// Parse a text frame
    pub fn parse(text: &str) -> BoardResult<Self> {
        serde_json::from_str(text).map_err(|e| BoardError::MalformedFrame(e.to_string()))
    }

    /// Parse a binary frame carrying UTF-8 JSON
    pub fn parse_bytes(bytes: &[u8]) -> BoardResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| BoardError::MalformedFrame(e.to_string()))
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_event_type(&self.event_type)
    }

    /// Convert into a store action.
    ///
    /// `Ok(None)` for event types the board does not route.
    pub fn into_action(self) -> BoardResult<Option<Action>> {
        let Some(kind) = self.kind() else {
            return Ok(None);
        };

        let action = match kind {
            EventKind::ResourceUpdated | EventKind::InitializeCache => Action::ResourcesUpdated(
                UpdatePayload::from_value(&self.event_type, self.content)?,
            ),
            EventKind::InitializeDisplayList => Action::DisplayListReplaced(
                DisplayList::from_value(&self.event_type, self.content)?,
            ),
        };
        Ok(Some(action))
    }
}

/// Item on the channel from the feed client to the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// A connection other than the first came up. The server re-sends its
    /// whole cache next, which replaces the local one.
    Reconnected,
    Envelope(Envelope),
}

impl From<Envelope> for FeedMessage {
    fn from(envelope: Envelope) -> Self {
        Self::Envelope(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_frames() {
        let env = Envelope::parse(r#"{"event_type":"resource_updated","content":{"T":{}}}"#)
            .unwrap();
        assert_eq!(env.kind(), Some(EventKind::ResourceUpdated));
        assert_eq!(env.content, json!({"T": {}}));
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            Envelope::parse("not json"),
            Err(BoardError::MalformedFrame(_))
        ));
        assert!(matches!(
            Envelope::parse(r#"{"content": {}}"#),
            Err(BoardError::MalformedFrame(_))
        ));
        assert!(Envelope::parse_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn cache_events_become_updates() {
        for event_type in [RESOURCE_UPDATED, INITIALIZE_CACHE] {
            let action = Envelope::new(event_type, json!({"T": {"1": {"id": "1"}}}))
                .into_action()
                .unwrap();
            assert!(matches!(action, Some(Action::ResourcesUpdated(_))));
        }
    }

    #[test]
    fn display_list_event_becomes_replace() {
        let action = Envelope::new(INITIALIZE_DISPLAY_LIST, json!({"T": ["name"]}))
            .into_action()
            .unwrap();
        assert_eq!(
            action,
            Some(Action::DisplayListReplaced(
                DisplayList::new().with_type("T", &["name"])
            ))
        );
    }

    #[test]
    fn unknown_event_is_not_routed() {
        // The backend's legacy bulk event name is not part of the contract.
        let action = Envelope::new("initialize", json!({})).into_action().unwrap();
        assert_eq!(action, None);
    }

    #[test]
    fn bad_content_is_an_error() {
        let err = Envelope::new(RESOURCE_UPDATED, json!("oops"))
            .into_action()
            .unwrap_err();
        assert!(matches!(err, BoardError::PayloadShape { .. }));
    }
}
