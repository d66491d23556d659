//! Event aggregation across relays.
//!
//! One subscription carries a profile filter and a post filter. Every relay
//! answers independently, so the collection loop owns the result buffers and
//! only finishes once each relay has reported end of stored events, closed
//! the subscription, dropped its connection, or run past the EOSE deadline.

use crate::config::FeedConfig;
use crate::error::FeedError;
use nostr::{Event, KIND_METADATA, KIND_SHORT_TEXT_NOTE};
use nostr_client::{Filter, RelayPool, Subscription, SubscriptionEvent};
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

/// Raw results of one aggregation, possibly holding duplicates across relays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedEvents {
    /// Kind 0 events
    pub profiles: Vec<Event>,
    /// Kind 1 events
    pub posts: Vec<Event>,
    /// Relays that had not finished when the EOSE deadline passed
    pub timed_out: Vec<String>,
}

/// Appends received events to the collection matching their kind.
#[derive(Debug, Default)]
pub struct EventCollector {
    profiles: Vec<Event>,
    posts: Vec<Event>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an event by kind. Returns false when the kind is not collected.
    pub fn push(&mut self, event: Event) -> bool {
        match event.kind {
            KIND_METADATA => self.profiles.push(event),
            KIND_SHORT_TEXT_NOTE => self.posts.push(event),
            other => {
                debug!("Dropping event {} of unexpected kind {}", event.id, other);
                return false;
            }
        }
        true
    }

    /// Number of events collected so far.
    pub fn len(&self) -> usize {
        self.profiles.len() + self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn finish(self, timed_out: Vec<String>) -> FetchedEvents {
        FetchedEvents {
            profiles: self.profiles,
            posts: self.posts,
            timed_out,
        }
    }
}

/// Drain `subscription` until every relay it reached has finished.
///
/// `CLOSED` and disconnects count as a relay finishing. Returns the relays
/// still pending when `eose_timeout` ran out, or when the pool dropped the
/// subscription's route.
pub async fn collect_until_eose<F>(
    subscription: &mut Subscription,
    eose_timeout: Option<Duration>,
    mut on_event: F,
) -> Vec<String>
where
    F: FnMut(Event),
{
    let mut tracker = subscription.tracker();
    let deadline = eose_timeout.map(|limit| Instant::now() + limit);

    while !tracker.all_eose() {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline, subscription.next()).await {
                Ok(next) => next,
                Err(_) => {
                    let pending = tracker.pending();
                    warn!(
                        "Subscription {}: no EOSE from {} before deadline",
                        subscription.id(),
                        pending.join(", ")
                    );
                    return pending;
                }
            },
            None => subscription.next().await,
        };

        match next {
            Some(SubscriptionEvent::Event { event, .. }) => on_event(event),
            Some(SubscriptionEvent::Eose { relay_url }) => {
                if tracker.mark_eose(&relay_url) {
                    debug!("Subscription {}: EOSE from {}", subscription.id(), relay_url);
                }
            }
            Some(SubscriptionEvent::Closed { relay_url, message }) => {
                warn!("{} closed subscription {}: {}", relay_url, subscription.id(), message);
                tracker.mark_eose(&relay_url);
            }
            Some(SubscriptionEvent::Disconnected { relay_url }) => {
                if tracker.mark_eose(&relay_url) {
                    warn!("{} disconnected during subscription {}", relay_url, subscription.id());
                }
            }
            None => return tracker.pending(),
        }
    }

    Vec::new()
}

/// Fetch profile metadata and posts for `authors` from every connected relay.
///
/// `progress` receives the running count of collected events. An empty
/// author set returns empty collections without touching the network.
pub async fn aggregate<P>(
    pool: &RelayPool,
    authors: &[String],
    config: &FeedConfig,
    mut progress: P,
) -> Result<FetchedEvents, FeedError>
where
    P: FnMut(usize),
{
    if authors.is_empty() {
        return Ok(FetchedEvents::default());
    }

    let filters = vec![
        Filter::new()
            .kinds(vec![KIND_METADATA])
            .authors(authors.to_vec()),
        Filter::new()
            .kinds(vec![KIND_SHORT_TEXT_NOTE])
            .authors(authors.to_vec())
            .limit(config.page_size),
    ];

    let mut subscription = pool.subscribe(filters).await?;
    let mut collector = EventCollector::new();

    let timed_out = collect_until_eose(&mut subscription, config.eose_timeout, |event| {
        if collector.push(event) {
            progress(collector.len());
        }
    })
    .await;

    pool.close(&subscription).await;

    let fetched = collector.finish(timed_out);
    info!(
        "Aggregated {} profiles and {} posts for {} authors",
        fetched.profiles.len(),
        fetched.posts.len(),
        authors.len()
    );
    Ok(fetched)
}
