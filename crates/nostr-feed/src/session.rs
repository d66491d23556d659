//! Loading feeds for one owner over a shared relay pool.

use crate::aggregator::{FetchedEvents, aggregate};
use crate::config::FeedConfig;
use crate::cursor::FeedCursor;
use crate::error::FeedError;
use crate::follows::resolve_follows;
use crate::profile::Profiles;
use crate::timeline::Timeline;
use nostr_client::RelayPool;
use tracing::info;

/// A loaded feed: the assembled timeline and the profiles of its authors.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub timeline: Timeline,
    pub profiles: Profiles,
    /// Relays that missed the EOSE deadline while this feed loaded
    pub timed_out: Vec<String>,
}

impl Feed {
    pub fn from_fetched(fetched: FetchedEvents) -> Self {
        Self {
            timeline: Timeline::assemble(fetched.posts),
            profiles: Profiles::from_events(fetched.profiles),
            timed_out: fetched.timed_out,
        }
    }

    /// A cursor positioned on the newest post.
    pub fn into_cursor(self) -> FeedCursor {
        FeedCursor::new(self)
    }
}

/// Reads the network on behalf of one owner.
///
/// The pool is borrowed, so connections outlive any single load and are
/// shared with the composer.
#[derive(Debug)]
pub struct FeedSession<'a> {
    pool: &'a RelayPool,
    owner: String,
    config: FeedConfig,
}

impl<'a> FeedSession<'a> {
    pub fn new(pool: &'a RelayPool, owner: impl Into<String>, config: FeedConfig) -> Self {
        Self {
            pool,
            owner: owner.into(),
            config,
        }
    }

    /// Hex public key of the owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn pool(&self) -> &'a RelayPool {
        self.pool
    }

    /// Posts of everyone the owner follows.
    pub async fn load_feed<P>(&self, progress: P) -> Result<Feed, FeedError>
    where
        P: FnMut(usize),
    {
        let authors = resolve_follows(self.pool, &self.owner, &self.config).await?;
        if authors.is_empty() {
            info!("Owner follows nobody; feed is empty");
            return Ok(Feed::default());
        }
        let fetched = aggregate(self.pool, &authors, &self.config, progress).await?;
        Ok(Feed::from_fetched(fetched))
    }

    /// The owner's own posts.
    pub async fn load_profile<P>(&self, progress: P) -> Result<Feed, FeedError>
    where
        P: FnMut(usize),
    {
        let authors = [self.owner.clone()];
        let fetched = aggregate(self.pool, &authors, &self.config, progress).await?;
        Ok(Feed::from_fetched(fetched))
    }
}
