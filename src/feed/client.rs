//! WebSocket client for the rotest push feed
//!
//! The client owns the sending half of a bounded channel of parsed
//! envelopes. Dropping the receiver is the cancellation signal: the client
//! closes the socket and returns, whether it is connected or waiting to
//! reconnect. Every connection after the first is announced with
//! [`FeedMessage::Reconnected`] ahead of its envelopes.

use super::backoff::Backoff;
use super::envelope::{Envelope, FeedMessage};
use crate::config::FeedConfig;
use crate::error::{BoardError, BoardResult};
use async_tungstenite::tungstenite::Message;
use futures_util::{SinkExt, Stream, StreamExt};
use std::fmt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use url::Url;

/// Connection state, published for status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting { attempt } => write!(f, "reconnecting (attempt {})", attempt),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// How a connected session ended
enum SessionEnd {
    /// The envelope receiver is gone; stop for good
    ChannelClosed,
    /// The server or network dropped us; reconnect
    Dropped,
}

/// Push feed client with reconnect
pub struct FeedClient {
    url: Url,
    backoff: Backoff,
    status: watch::Sender<ConnectionStatus>,
}

impl FeedClient {
    /// Build a client from configuration, validating the feed address
    pub fn new(config: &FeedConfig) -> BoardResult<Self> {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        Ok(Self {
            url: config.url()?,
            backoff: Backoff::new(&config.reconnect),
            status,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Subscribe to connection status changes
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Connect and forward envelopes until `sender`'s receiver is dropped.
    ///
    /// Returns `Ok(())` on cancellation and `FeedGaveUp` once the reconnect
    /// limit is exhausted.
    pub async fn run(mut self, sender: mpsc::Sender<FeedMessage>) -> BoardResult<()> {
        self.status.send_replace(ConnectionStatus::Connecting);
        let mut connected_before = false;

        loop {
            let connect = async_tungstenite::tokio::connect_async(self.url.as_str());
            let attempt = tokio::select! {
                _ = sender.closed() => break,
                attempt = connect => attempt,
            };

            match attempt {
                Ok((socket, _response)) => {
                    info!("Connected to push feed at {}", self.url);
                    self.backoff.reset();
                    self.status.send_replace(ConnectionStatus::Connected);

                    if connected_before && sender.send(FeedMessage::Reconnected).await.is_err() {
                        break;
                    }
                    connected_before = true;

                    match forward_frames(socket, &sender).await {
                        SessionEnd::ChannelClosed => break,
                        SessionEnd::Dropped => warn!("Push feed connection lost"),
                    }
                }
                Err(e) => warn!("Failed to connect to {}: {}", self.url, e),
            }

            let Some(delay) = self.backoff.next_delay() else {
                self.status.send_replace(ConnectionStatus::Disconnected);
                return Err(BoardError::FeedGaveUp {
                    attempts: self.backoff.attempts(),
                });
            };
            self.status.send_replace(ConnectionStatus::Reconnecting {
                attempt: self.backoff.attempts(),
            });
            debug!("Reconnecting in {:?}", delay);

            tokio::select! {
                _ = sender.closed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        debug!("Envelope receiver closed, stopping feed client");
        self.status.send_replace(ConnectionStatus::Disconnected);
        Ok(())
    }
}

/// Pump frames from one connection into the channel
async fn forward_frames<S>(mut socket: S, sender: &mpsc::Sender<FeedMessage>) -> SessionEnd
where
    S: Stream<Item = Result<Message, async_tungstenite::tungstenite::Error>>
        + futures_util::Sink<Message>
        + Unpin,
{
    loop {
        let frame = tokio::select! {
            _ = sender.closed() => {
                let _ = SinkExt::close(&mut socket).await;
                return SessionEnd::ChannelClosed;
            }
            frame = socket.next() => frame,
        };

        let parsed = match frame {
            Some(Ok(Message::Text(text))) => Envelope::parse(text.as_str()),
            Some(Ok(Message::Binary(bytes))) => Envelope::parse_bytes(&bytes),
            Some(Ok(Message::Close(frame))) => {
                debug!("Server closed the feed: {:?}", frame);
                return SessionEnd::Dropped;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!("Push feed read error: {}", e);
                return SessionEnd::Dropped;
            }
            None => return SessionEnd::Dropped,
        };

        let envelope = match parsed {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping feed frame: {}", e);
                continue;
            }
        };

        if sender.send(envelope.into()).await.is_err() {
            let _ = SinkExt::close(&mut socket).await;
            return SessionEnd::ChannelClosed;
        }
    }
}
