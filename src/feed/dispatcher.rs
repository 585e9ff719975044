//! Routes feed envelopes into the store
//!
//! The dispatcher is the only writer of the store. Envelopes reduce one at
//! a time in arrival order. After a reconnect the first `initialize-cache`
//! replaces the cache instead of merging into it, so records deleted while
//! offline disappear.

use super::envelope::{Envelope, EventKind, FeedMessage};
use crate::store::{Action, Store};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Apply one envelope to the store. Returns whether the store changed.
pub fn dispatch_envelope(store: &Store, envelope: Envelope) -> bool {
    route(store, envelope, false)
}

fn route(store: &Store, envelope: Envelope, replace_cache: bool) -> bool {
    let event_type = envelope.event_type.clone();
    match envelope.into_action() {
        Ok(Some(Action::ResourcesUpdated(payload))) if replace_cache => {
            debug!("Replacing cache from {}", event_type);
            store.dispatch(Action::CacheReplaced(payload));
            true
        }
        Ok(Some(action)) => {
            debug!("Dispatching {}", event_type);
            store.dispatch(action);
            true
        }
        Ok(None) => {
            warn!("Can't route feed event: {}", event_type);
            false
        }
        Err(e) => {
            warn!("Dropping {} event: {}", event_type, e);
            false
        }
    }
}

/// Drain `envelopes` into `store` until the channel closes or `shutdown`
/// fires. Returns the number of envelopes applied.
///
/// On shutdown the receiver is closed, which stops the feed client.
pub async fn run(
    mut envelopes: mpsc::Receiver<FeedMessage>,
    store: Store,
    mut shutdown: oneshot::Receiver<()>,
) -> usize {
    let mut applied = 0;
    let mut resync = false;

    loop {
        let message = tokio::select! {
            _ = &mut shutdown => {
                envelopes.close();
                break;
            }
            message = envelopes.recv() => message,
        };

        match message {
            Some(FeedMessage::Reconnected) => {
                info!("Push feed reconnected, waiting for a fresh cache");
                resync = true;
            }
            Some(FeedMessage::Envelope(envelope)) => {
                let replace = resync && envelope.kind() == Some(EventKind::InitializeCache);
                if route(&store, envelope, replace) {
                    if replace {
                        resync = false;
                    }
                    applied += 1;
                }
            }
            None => break,
        }
    }

    debug!("Dispatcher stopped after {} update(s)", applied);
    applied
}
