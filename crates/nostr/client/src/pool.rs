//! Relay pool for managing connections to multiple Nostr relays.
//!
//! The pool is constructed explicitly with its relay list and shared by
//! reference with everything that reads from or publishes to the network.
//! Each connected relay gets a forwarding task that routes its frames, by
//! subscription id, into the channel owned by the matching [`Subscription`].

use crate::error::{ClientError, Result};
use crate::message::{Filter, RelayMessage};
use crate::relay::{RelayConfig, RelayConnection};
use crate::subscription::{Subscription, SubscriptionEvent, generate_subscription_id};
use futures::StreamExt;
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use nostr::Event;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

type Connections = Arc<RwLock<HashMap<String, Arc<RelayConnection>>>>;
type Routes = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<SubscriptionEvent>>>>;

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Per-relay connection settings
    pub relay: RelayConfig,
    /// How long to wait for relays to answer a published event
    pub publish_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            publish_timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub event_id: String,
    /// First relay that accepted the event
    pub accepted_by: String,
    /// Relays that rejected or failed before the first acceptance, with reasons
    pub rejected: Vec<(String, String)>,
}

/// A pool of Nostr relay connections.
pub struct RelayPool {
    relays: Vec<String>,
    config: PoolConfig,
    /// Live connections indexed by configured URL
    connections: Connections,
    /// Open subscriptions indexed by subscription ID
    routes: Routes,
}

impl RelayPool {
    /// Create a pool for the given relays. Nothing connects until [`RelayPool::connect`].
    ///
    /// A URL listed more than once is kept at its first position only.
    pub fn new(relays: Vec<String>, config: PoolConfig) -> Self {
        let mut seen = HashSet::new();
        let relays = relays
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();
        Self {
            relays,
            config,
            connections: Arc::new(RwLock::new(HashMap::new())),
            routes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a pool with default configuration.
    pub fn with_relays(relays: Vec<String>) -> Self {
        Self::new(relays, PoolConfig::default())
    }

    /// Configured relay URLs, in configuration order.
    pub fn relay_urls(&self) -> &[String] {
        &self.relays
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Connect every configured relay that is not already connected.
    ///
    /// Relays are dialled concurrently. Failures are logged and the relay is
    /// left out of subsequent subscriptions. Returns the number of relays
    /// connected afterwards.
    pub async fn connect(&self) -> usize {
        let existing: Vec<String> = self.connections.read().await.keys().cloned().collect();
        let attempts = self
            .relays
            .iter()
            .filter(|url| !existing.contains(url))
            .map(|url| self.dial(url.clone()));

        for (url, connection, inbound) in join_all(attempts).await.into_iter().flatten() {
            self.connections
                .write()
                .await
                .insert(url.clone(), Arc::clone(&connection));
            tokio::spawn(forward(
                url,
                connection,
                inbound,
                Arc::clone(&self.routes),
                Arc::clone(&self.connections),
            ));
        }

        let connected = self.connections.read().await.len();
        info!("Connected to {}/{} relays", connected, self.relays.len());
        connected
    }

    async fn dial(
        &self,
        url: String,
    ) -> Option<(
        String,
        Arc<RelayConnection>,
        mpsc::UnboundedReceiver<RelayMessage>,
    )> {
        let connection = match RelayConnection::with_config(&url, self.config.relay.clone()) {
            Ok(connection) => connection,
            Err(e) => {
                warn!("Skipping relay {}: {}", url, e);
                return None;
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        match connection.connect(tx).await {
            Ok(()) => Some((url, Arc::new(connection), rx)),
            Err(e) => {
                warn!("Failed to connect to {}: {}", url, e);
                None
            }
        }
    }

    /// Connected relays, in configuration order.
    pub async fn connected_relays(&self) -> Vec<String> {
        let connections = self.connections.read().await;
        self.relays
            .iter()
            .filter(|url| connections.contains_key(*url))
            .cloned()
            .collect()
    }

    async fn connected(&self) -> Vec<(String, Arc<RelayConnection>)> {
        let connections = self.connections.read().await;
        self.relays
            .iter()
            .filter_map(|url| {
                connections
                    .get(url)
                    .map(|connection| (url.clone(), Arc::clone(connection)))
            })
            .collect()
    }

    /// Open one subscription carrying `filters` on every connected relay.
    pub async fn subscribe(&self, filters: Vec<Filter>) -> Result<Subscription> {
        let subscription_id = generate_subscription_id();
        let (tx, rx) = mpsc::unbounded_channel();

        // Route first so frames that race the REQ are not dropped.
        self.routes
            .write()
            .await
            .insert(subscription_id.clone(), tx);

        let mut reached = Vec::new();
        for (url, connection) in self.connected().await {
            match connection.subscribe(&subscription_id, &filters).await {
                Ok(()) => reached.push(url),
                Err(e) => warn!("REQ {} not sent to {}: {}", subscription_id, url, e),
            }
        }

        if reached.is_empty() {
            self.routes.write().await.remove(&subscription_id);
            return Err(ClientError::NoRelays);
        }

        info!(
            "Opened subscription {} on {} relays",
            subscription_id,
            reached.len()
        );
        Ok(Subscription::new(subscription_id, reached, rx))
    }

    /// Close a subscription on every relay it reached. Closing twice is a no-op.
    pub async fn close(&self, subscription: &Subscription) {
        if self.routes.write().await.remove(subscription.id()).is_none() {
            return;
        }

        let connections = self.connections.read().await;
        for url in subscription.relays() {
            if let Some(connection) = connections.get(url)
                && let Err(e) = connection.close_subscription(subscription.id()).await
            {
                debug!("CLOSE {} not sent to {}: {}", subscription.id(), url, e);
            }
        }
        info!("Closed subscription {}", subscription.id());
    }

    /// Publish an event to every connected relay.
    ///
    /// Succeeds as soon as one relay accepts. Fails only when every relay
    /// rejected the event, errored, or timed out.
    pub async fn publish(&self, event: &Event) -> Result<PublishReport> {
        let connections = self.connected().await;
        if connections.is_empty() {
            return Err(ClientError::NoRelays);
        }

        let publish_timeout = self.config.publish_timeout;
        let mut outcomes: FuturesUnordered<_> = connections
            .into_iter()
            .map(|(url, connection)| async move {
                let outcome = connection.publish_event(event, publish_timeout).await;
                (url, outcome)
            })
            .collect();

        let mut rejected = Vec::new();
        while let Some((url, outcome)) = outcomes.next().await {
            match outcome {
                Ok(confirmation) if confirmation.accepted => {
                    info!("Event {} accepted by {}", event.id, url);
                    return Ok(PublishReport {
                        event_id: event.id.clone(),
                        accepted_by: url,
                        rejected,
                    });
                }
                Ok(confirmation) => {
                    warn!("Event {} rejected by {}: {}", event.id, url, confirmation.message);
                    rejected.push((url, confirmation.message));
                }
                Err(e) => {
                    warn!("Event {} not confirmed by {}: {}", event.id, url, e);
                    rejected.push((url, e.to_string()));
                }
            }
        }

        let reasons: Vec<String> = rejected
            .iter()
            .map(|(url, reason)| format!("{url}: {reason}"))
            .collect();
        Err(ClientError::PublishFailed(reasons.join("; ")))
    }

    /// Disconnect every relay and drop all open subscriptions.
    pub async fn disconnect_all(&self) {
        let connections: Vec<(String, Arc<RelayConnection>)> =
            self.connections.write().await.drain().collect();
        for (url, connection) in connections {
            if let Err(e) = connection.disconnect().await {
                debug!("Error disconnecting {}: {}", url, e);
            }
        }
        self.routes.write().await.clear();
    }
}

impl std::fmt::Debug for RelayPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayPool")
            .field("relays", &self.relays)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Route one relay's frames to subscriptions until the connection ends.
async fn forward(
    relay_url: String,
    connection: Arc<RelayConnection>,
    mut inbound: mpsc::UnboundedReceiver<RelayMessage>,
    routes: Routes,
    connections: Connections,
) {
    while let Some(message) = inbound.recv().await {
        let (subscription_id, event) = match message {
            RelayMessage::Event {
                subscription_id,
                event,
            } => (
                subscription_id,
                SubscriptionEvent::Event {
                    relay_url: relay_url.clone(),
                    event,
                },
            ),
            RelayMessage::Eose { subscription_id } => {
                debug!("EOSE {} from {}", subscription_id, relay_url);
                (
                    subscription_id,
                    SubscriptionEvent::Eose {
                        relay_url: relay_url.clone(),
                    },
                )
            }
            RelayMessage::Closed {
                subscription_id,
                message,
            } => {
                info!("{} closed {}: {}", relay_url, subscription_id, message);
                (
                    subscription_id,
                    SubscriptionEvent::Closed {
                        relay_url: relay_url.clone(),
                        message,
                    },
                )
            }
            RelayMessage::Auth { .. } => {
                debug!("Ignoring AUTH challenge from {}", relay_url);
                continue;
            }
            other => {
                debug!("Unrouted frame from {}: {:?}", relay_url, other);
                continue;
            }
        };

        match routes.read().await.get(&subscription_id) {
            Some(tx) => {
                let _ = tx.send(event);
            }
            None => debug!("No route for {} from {}", subscription_id, relay_url),
        }
    }

    info!("Relay {} disconnected", relay_url);
    {
        let mut connections = connections.write().await;
        if connections
            .get(&relay_url)
            .is_some_and(|current| Arc::ptr_eq(current, &connection))
        {
            connections.remove(&relay_url);
        }
    }
    for tx in routes.read().await.values() {
        let _ = tx.send(SubscriptionEvent::Disconnected {
            relay_url: relay_url.clone(),
        });
    }
}
