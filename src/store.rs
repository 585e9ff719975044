//! Board state container
//!
//! `BoardState` owns the cache and the display list of one session.
//! `reduce` is the only way to derive a new state; `Store` holds the current
//! snapshot and publishes every settled snapshot to subscribers.

use crate::cache::{Cache, EntityRecord, UpdatePayload};
use crate::display::DisplayList;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Immutable view of the board at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    cache: Cache,
    display_list: DisplayList,
    revision: u64,
    cache_initialized: bool,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.display_list
    }

    /// Number of actions reduced into this state
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether any cache payload has arrived yet
    pub fn cache_initialized(&self) -> bool {
        self.cache_initialized
    }

    /// Read a record for rendering
    pub fn get_entity(&self, type_name: &str, id: &str) -> Option<&EntityRecord> {
        self.cache.get(type_name, id)
    }

    /// Fields to render for a type, empty when the type has no display list
    pub fn field_names(&self, type_name: &str) -> &[String] {
        self.display_list.field_names(type_name)
    }
}

/// State transitions driven by the push feed
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `resource_updated` and `initialize-cache`
    ResourcesUpdated(UpdatePayload),
    /// `initialize-cache` after a reconnect: the payload is the whole cache
    CacheReplaced(UpdatePayload),
    /// `initialize-display-list`
    DisplayListReplaced(DisplayList),
}

/// Derive the next state from `state` and `action`
pub fn reduce(state: &BoardState, action: Action) -> BoardState {
    match action {
        Action::ResourcesUpdated(payload) => BoardState {
            cache: state.cache.apply_update(&payload),
            display_list: state.display_list.clone(),
            revision: state.revision + 1,
            cache_initialized: true,
        },
        Action::CacheReplaced(payload) => BoardState {
            cache: Cache::new().apply_update(&payload),
            display_list: state.display_list.clone(),
            revision: state.revision + 1,
            cache_initialized: true,
        },
        Action::DisplayListReplaced(list) => BoardState {
            cache: state.cache.clone(),
            display_list: state.display_list.replace(list),
            revision: state.revision + 1,
            cache_initialized: state.cache_initialized,
        },
    }
}

/// Single-writer owner of the current board state.
///
/// Clones share the same state. Readers take `Arc` snapshots or subscribe
/// to changes; they never observe a half-applied action.
#[derive(Debug, Clone)]
pub struct Store {
    state: Arc<watch::Sender<Arc<BoardState>>>,
}

impl Store {
    /// Create a store holding an empty board
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(BoardState::new()));
        Self {
            state: Arc::new(state),
        }
    }

    /// Reduce `action` into the current state and publish the result
    pub fn dispatch(&self, action: Action) {
        self.state.send_modify(|current| {
            let next = reduce(&**current, action);
            debug!("Board state advanced to revision {}", next.revision);
            *current = Arc::new(next);
        });
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<BoardState> {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after each dispatched action
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardState>> {
        self.state.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
