//! Follow-list resolution.

use crate::aggregator::collect_until_eose;
use crate::config::FeedConfig;
use crate::error::FeedError;
use nostr::{ContactList, Event, KIND_CONTACTS};
use nostr_client::{Filter, RelayPool};
use tracing::{info, warn};

/// Keep `candidate` if it is a newer follow list by `owner` than the one in `slot`.
///
/// Relays may hold different versions of the list, so the greatest
/// `created_at` wins regardless of arrival order; equal timestamps fall back
/// to the greater id.
pub fn keep_newest(slot: &mut Option<Event>, owner: &str, candidate: Event) {
    if candidate.kind != KIND_CONTACTS || candidate.pubkey != owner {
        return;
    }
    if slot
        .as_ref()
        .is_none_or(|current| candidate.is_newer_than(current))
    {
        *slot = Some(candidate);
    }
}

/// Followed authors of a follow-list event, in tag order without repeats.
pub fn followed_authors(follow_list: Option<Event>) -> Vec<String> {
    let Some(event) = follow_list else {
        return Vec::new();
    };
    match ContactList::from_event(event) {
        Ok(contacts) => contacts.pubkeys(),
        Err(e) => {
            warn!("Unusable follow list: {}", e);
            Vec::new()
        }
    }
}

/// Resolve the authors `owner` follows.
///
/// No follow list on any relay is not an error: the result is empty and the
/// feed is simply empty.
pub async fn resolve_follows(
    pool: &RelayPool,
    owner: &str,
    config: &FeedConfig,
) -> Result<Vec<String>, FeedError> {
    let filter = Filter::new()
        .kinds(vec![KIND_CONTACTS])
        .authors(vec![owner.to_string()]);
    let mut subscription = pool.subscribe(vec![filter]).await?;

    let mut newest = None;
    let timed_out = collect_until_eose(&mut subscription, config.eose_timeout, |event| {
        keep_newest(&mut newest, owner, event)
    })
    .await;
    pool.close(&subscription).await;

    if !timed_out.is_empty() {
        warn!(
            "Follow list resolved without {} relays",
            timed_out.len()
        );
    }

    let authors = followed_authors(newest);
    info!("Resolved {} followed authors", authors.len());
    Ok(authors)
}
