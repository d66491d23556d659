//! Subscription management for Nostr relay connections.
//!
//! A pool subscription fans one `REQ` out to several relays and fans their
//! answers back in over a single channel. [`SubscriptionTracker`] keeps the
//! per-relay end-of-stored-events bookkeeping.

use nostr::Event;
use std::collections::HashSet;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Generate a unique subscription ID.
pub fn generate_subscription_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Something a relay reported for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// An event matching one of the subscription's filters
    Event { relay_url: String, event: Event },
    /// The relay has sent every stored event matching the filters
    Eose { relay_url: String },
    /// The relay refused or ended the subscription
    Closed { relay_url: String, message: String },
    /// The relay connection dropped
    Disconnected { relay_url: String },
}

impl SubscriptionEvent {
    /// The relay this event came from.
    pub fn relay_url(&self) -> &str {
        match self {
            SubscriptionEvent::Event { relay_url, .. }
            | SubscriptionEvent::Eose { relay_url }
            | SubscriptionEvent::Closed { relay_url, .. }
            | SubscriptionEvent::Disconnected { relay_url } => relay_url,
        }
    }
}

/// A live multi-relay subscription.
///
/// Owns the receiving end of the fan-in channel, so exactly one task consumes
/// its events. Close it with [`crate::RelayPool::close`].
#[derive(Debug)]
pub struct Subscription {
    id: String,
    relays: Vec<String>,
    events: mpsc::UnboundedReceiver<SubscriptionEvent>,
}

impl Subscription {
    pub fn new(
        id: impl Into<String>,
        relays: Vec<String>,
        events: mpsc::UnboundedReceiver<SubscriptionEvent>,
    ) -> Self {
        Self {
            id: id.into(),
            relays,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Relays that accepted the `REQ`.
    pub fn relays(&self) -> &[String] {
        &self.relays
    }

    /// Wait for the next event. `None` once the pool dropped the route.
    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }

    /// A tracker primed with this subscription's relays.
    pub fn tracker(&self) -> SubscriptionTracker {
        let mut tracker = SubscriptionTracker::new(self.id.clone());
        for relay in &self.relays {
            tracker.add_relay(relay.clone());
        }
        tracker
    }
}

/// Tracks which relays have finished sending stored events for a subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionTracker {
    /// Subscription ID
    pub id: String,
    /// Relays that have this subscription
    pub relays: HashSet<String>,
    /// Relays that have sent EOSE (or otherwise finished)
    pub eose_relays: HashSet<String>,
}

impl SubscriptionTracker {
    /// Create a new subscription tracker.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            relays: HashSet::new(),
            eose_relays: HashSet::new(),
        }
    }

    /// Add a relay to this subscription.
    pub fn add_relay(&mut self, relay_url: impl Into<String>) {
        self.relays.insert(relay_url.into());
    }

    /// Mark a relay as finished. Returns false for unknown or already finished relays.
    pub fn mark_eose(&mut self, relay_url: &str) -> bool {
        self.relays.contains(relay_url) && self.eose_relays.insert(relay_url.to_string())
    }

    /// Whether every relay has finished. A tracker with no relays is never complete.
    pub fn all_eose(&self) -> bool {
        !self.relays.is_empty() && self.relays.len() == self.eose_relays.len()
    }

    /// Relays still expected to send EOSE, sorted for stable reporting.
    pub fn pending(&self) -> Vec<String> {
        let mut pending: Vec<String> = self
            .relays
            .difference(&self.eose_relays)
            .cloned()
            .collect();
        pending.sort();
        pending
    }

    /// Check if a relay has this subscription.
    pub fn has_relay(&self, relay_url: &str) -> bool {
        self.relays.contains(relay_url)
    }

    /// Get the number of relays with this subscription.
    pub fn relay_count(&self) -> usize {
        self.relays.len()
    }
}
