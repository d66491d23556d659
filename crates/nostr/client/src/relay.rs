//! Single relay connection management
//!
//! One WebSocket per relay, split into a writer task fed by an outgoing
//! channel and a reader task that parses relay frames. `OK` frames resolve
//! pending publish confirmations; every other frame is forwarded to the
//! channel handed to [`RelayConnection::connect`].

use crate::error::{ClientError, Result};
use crate::message::{ClientMessage, Filter, RelayMessage};
use futures::{SinkExt, StreamExt};
use nostr::Event;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Disconnected
    Disconnected,
    /// Currently connecting
    Connecting,
    /// Connected and ready
    Connected,
}

/// Confirmation result for event publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfirmation {
    /// Event ID that was published
    pub event_id: String,
    /// Whether the relay accepted the event
    pub accepted: bool,
    /// Message from the relay (empty if accepted, error message if rejected)
    pub message: String,
}

type ConfirmationSender = oneshot::Sender<PublishConfirmation>;

/// Relay connection configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// A connection to a single relay
pub struct RelayConnection {
    url: Url,
    config: RelayConfig,
    state: Arc<RwLock<ConnectionState>>,
    /// Sender feeding the writer task; `None` while disconnected
    outgoing: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
    /// Publishes waiting for an `OK`, keyed by event id
    pending_confirmations: Arc<Mutex<HashMap<String, ConfirmationSender>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl RelayConnection {
    /// Create a new relay connection (does not connect yet)
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, RelayConfig::default())
    }

    /// Create a new relay connection with custom config
    pub fn with_config(url: &str, config: RelayConfig) -> Result<Self> {
        let url = Url::parse(url)?;

        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ClientError::InvalidUrl(format!(
                "URL must use ws:// or wss:// scheme, got: {}",
                url.scheme()
            )));
        }

        Ok(Self {
            url,
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            outgoing: Arc::new(Mutex::new(None)),
            pending_confirmations: Arc::new(Mutex::new(HashMap::new())),
            reader: Mutex::new(None),
        })
    }

    /// Connect to the relay.
    ///
    /// Every parsed frame other than `OK` and `NOTICE` is sent to `inbound`.
    /// The sender is dropped when the connection ends, which is how the
    /// receiving side learns about a disconnect.
    pub async fn connect(&self, inbound: mpsc::UnboundedSender<RelayMessage>) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != ConnectionState::Disconnected {
                return Err(ClientError::AlreadyConnected);
            }
            *state = ConnectionState::Connecting;
        }

        if self.url.scheme() == "wss" {
            // Err only means a provider is already installed.
            let _ = rustls::crypto::ring::default_provider().install_default();
        }

        info!("Connecting to relay: {}", self.url);
        let connect_start = Instant::now();

        let ws_stream = match timeout(
            self.config.connect_timeout,
            connect_async(self.url.as_str()),
        )
        .await
        {
            Ok(Ok((stream, _))) => stream,
            Ok(Err(e)) => {
                *self.state.write().await = ConnectionState::Disconnected;
                return Err(ClientError::WebSocket(e.to_string()));
            }
            Err(_) => {
                *self.state.write().await = ConnectionState::Disconnected;
                return Err(ClientError::Timeout(format!(
                    "Connection timeout after {:?}",
                    self.config.connect_timeout
                )));
            }
        };

        let (mut sink, mut stream) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

        *self.outgoing.lock().await = Some(out_tx.clone());
        *self.state.write().await = ConnectionState::Connected;
        info!(
            "Connected to relay: {} (took {:?})",
            self.url,
            connect_start.elapsed()
        );

        // The writer ends once every sender is gone, after flushing a close frame.
        let url = self.url.to_string();
        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = sink.send(message).await {
                    debug!("Write to {} failed: {}", url, e);
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let url = self.url.to_string();
        let state = Arc::clone(&self.state);
        let outgoing = Arc::clone(&self.outgoing);
        let pending_confirmations = Arc::clone(&self.pending_confirmations);
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match RelayMessage::from_json(text.as_str()) {
                        Ok(RelayMessage::Ok {
                            event_id,
                            success,
                            message,
                        }) => {
                            let sender = pending_confirmations.lock().await.remove(&event_id);
                            match sender {
                                Some(tx) => {
                                    let _ = tx.send(PublishConfirmation {
                                        event_id,
                                        accepted: success,
                                        message,
                                    });
                                }
                                None => debug!("Unsolicited OK from {} for {}", url, event_id),
                            }
                        }
                        Ok(RelayMessage::Notice { message }) => {
                            info!("NOTICE from {}: {}", url, message);
                        }
                        Ok(message) => {
                            if inbound.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => debug!("Ignoring malformed frame from {}: {}", url, e),
                    },
                    Ok(Message::Ping(data)) => {
                        let _ = out_tx.send(Message::Pong(data));
                    }
                    Ok(Message::Close(_)) => {
                        info!("Relay {} closed the connection", url);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Connection to {} failed: {}", url, e);
                        break;
                    }
                }
            }

            *state.write().await = ConnectionState::Disconnected;
            outgoing.lock().await.take();
            pending_confirmations.lock().await.clear();
            debug!("Receive loop ended for {}", url);
        });

        *self.reader.lock().await = Some(reader);

        Ok(())
    }

    /// Disconnect from the relay
    pub async fn disconnect(&self) -> Result<()> {
        if *self.state.read().await == ConnectionState::Disconnected {
            return Ok(());
        }

        info!("Disconnecting from relay: {}", self.url);

        if let Some(tx) = self.outgoing.lock().await.take() {
            let _ = tx.send(Message::Close(None));
        }
        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }

        self.pending_confirmations.lock().await.clear();
        *self.state.write().await = ConnectionState::Disconnected;
        info!("Disconnected from relay: {}", self.url);
        Ok(())
    }

    /// Get current connection state
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Check if connected
    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Connected
    }

    /// Relay URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send a client message to the relay
    pub async fn send(&self, message: &ClientMessage) -> Result<()> {
        let text = message.to_json()?;
        let outgoing = self.outgoing.lock().await;
        let tx = outgoing.as_ref().ok_or(ClientError::NotConnected)?;
        tx.send(Message::Text(text.into()))
            .map_err(|_| ClientError::NotConnected)
    }

    /// Send a `REQ` for the given filters
    pub async fn subscribe(&self, subscription_id: &str, filters: &[Filter]) -> Result<()> {
        debug!("REQ {} -> {}", subscription_id, self.url);
        self.send(&ClientMessage::Req {
            subscription_id: subscription_id.to_string(),
            filters: filters.to_vec(),
        })
        .await
    }

    /// Send a `CLOSE` for a subscription
    pub async fn close_subscription(&self, subscription_id: &str) -> Result<()> {
        debug!("CLOSE {} -> {}", subscription_id, self.url);
        self.send(&ClientMessage::Close {
            subscription_id: subscription_id.to_string(),
        })
        .await
    }

    /// Publish an event and wait for confirmation from the relay
    ///
    /// Sends the event and waits for the matching `OK` frame. A rejection is
    /// returned as a confirmation with `accepted == false`, not as an error.
    pub async fn publish_event(
        &self,
        event: &Event,
        confirmation_timeout: Duration,
    ) -> Result<PublishConfirmation> {
        let (tx, rx) = oneshot::channel();
        let event_id = event.id.clone();

        self.pending_confirmations
            .lock()
            .await
            .insert(event_id.clone(), tx);
        let _pending = PendingGuard {
            pending: Arc::clone(&self.pending_confirmations),
            event_id,
        };

        self.send(&ClientMessage::Event(event.clone())).await?;

        match timeout(confirmation_timeout, rx).await {
            Ok(Ok(confirmation)) => Ok(confirmation),
            Ok(Err(_)) => Err(ClientError::PublishFailed(
                "connection closed before confirmation".to_string(),
            )),
            Err(_) => Err(ClientError::Timeout(format!(
                "Event confirmation timeout after {:?}",
                confirmation_timeout
            ))),
        }
    }
}

/// Removes a publish's confirmation slot however the publish ends,
/// including when the caller drops the future early.
struct PendingGuard {
    pending: Arc<Mutex<HashMap<String, ConfirmationSender>>>,
    event_id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.try_lock() {
            pending.remove(&self.event_id);
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let pending = Arc::clone(&self.pending);
            let event_id = std::mem::take(&mut self.event_id);
            handle.spawn(async move {
                pending.lock().await.remove(&event_id);
            });
        }
    }
}

impl std::fmt::Debug for RelayConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConnection")
            .field("url", &self.url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
