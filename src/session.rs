//! One client session: feed client, dispatcher and store wired together
//!
//! ```text
//! FeedClient --mpsc<FeedMessage>--> dispatcher --Action--> Store --watch--> readers
//! ```
//!
//! Shutting down fires the dispatcher's shutdown signal; the dispatcher
//! closes the channel and the feed client sees the closed channel and
//! disconnects.

use crate::config::Config;
use crate::error::{BoardError, BoardResult};
use crate::feed::{dispatcher, ConnectionStatus, FeedClient};
use crate::store::{BoardState, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

enum Waited {
    Ready(BoardResult<Arc<BoardState>>),
    FeedEnded(BoardResult<()>),
}

/// Running client session
pub struct Session {
    store: Store,
    status: watch::Receiver<ConnectionStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    feed: Option<JoinHandle<BoardResult<()>>>,
    dispatcher: JoinHandle<usize>,
}

impl Session {
    /// Spawn the feed client and dispatcher. Must be called inside a
    /// tokio runtime.
    pub fn start(config: &Config) -> BoardResult<Self> {
        let client = FeedClient::new(&config.feed)?;
        let status = client.status();
        info!("Starting session against {}", client.url());

        let store = Store::new();
        let (sender, receiver) = mpsc::channel(config.feed.channel_capacity.max(1));
        let (shutdown, shutdown_rx) = oneshot::channel();

        let feed = tokio::spawn(client.run(sender));
        let dispatcher = tokio::spawn(dispatcher::run(receiver, store.clone(), shutdown_rx));

        Ok(Self {
            store,
            status,
            shutdown: Some(shutdown),
            feed: Some(feed),
            dispatcher,
        })
    }

    /// Store holding this session's board state
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Connection status updates
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Wait until the first cache-bearing update has been applied.
    ///
    /// Fails with `SnapshotTimeout` after `timeout`, or with the feed's
    /// error if the feed client gives up first.
    pub async fn wait_for_cache(&mut self, timeout: Duration) -> BoardResult<Arc<BoardState>> {
        let mut states = self.store.subscribe();
        let feed = &mut self.feed;

        let waited = tokio::time::timeout(timeout, async {
            let ready = async {
                states
                    .wait_for(|state| state.cache_initialized())
                    .await
                    .map(|state| (*state).clone())
                    .map_err(|_| BoardError::Internal("board state closed".to_string()))
            };

            match feed.as_mut() {
                Some(handle) => tokio::select! {
                    state = ready => Waited::Ready(state),
                    joined = handle => Waited::FeedEnded(flatten(joined)),
                },
                None => Waited::Ready(ready.await),
            }
        })
        .await;

        match waited {
            Err(_) => Err(BoardError::SnapshotTimeout {
                secs: timeout.as_secs(),
            }),
            Ok(Waited::Ready(state)) => state,
            Ok(Waited::FeedEnded(result)) => {
                self.feed = None;
                result?;
                Err(BoardError::Internal("push feed stopped".to_string()))
            }
        }
    }

    /// Resolve when the feed client stops on its own, with its result.
    ///
    /// Pends forever once the feed has already been reaped.
    pub async fn feed_stopped(&mut self) -> BoardResult<()> {
        let Some(handle) = self.feed.as_mut() else {
            return std::future::pending().await;
        };
        let result = flatten(handle.await);
        self.feed = None;
        result
    }

    /// Stop both tasks and wait for them. Returns the number of envelopes
    /// the dispatcher applied.
    pub async fn shutdown(mut self) -> BoardResult<usize> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        let applied = self
            .dispatcher
            .await
            .map_err(|e| BoardError::Internal(format!("dispatcher task failed: {}", e)))?;

        if let Some(feed) = self.feed.take() {
            flatten(feed.await)?;
        }

        debug!("Session closed after {} update(s)", applied);
        Ok(applied)
    }
}

fn flatten(joined: Result<BoardResult<()>, tokio::task::JoinError>) -> BoardResult<()> {
    joined.map_err(|e| BoardError::Internal(format!("feed task failed: {}", e)))?
}
