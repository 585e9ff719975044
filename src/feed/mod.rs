//! Push feed: WebSocket client, envelope parsing and dispatch into the store

pub mod backoff;
pub mod client;
pub mod dispatcher;
pub mod envelope;

pub use backoff::Backoff;
pub use client::{ConnectionStatus, FeedClient};
pub use dispatcher::dispatch_envelope;
pub use envelope::{
    EventKind, Envelope, FeedMessage, INITIALIZE_CACHE, INITIALIZE_DISPLAY_LIST, RESOURCE_UPDATED,
};
