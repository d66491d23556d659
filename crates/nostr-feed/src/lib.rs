//! Follow-list feed reading and note composing for Nostr.
//!
//! This crate provides:
//! - Follow-list resolution (NIP-02) across every configured relay
//! - Aggregation of profiles and posts that waits for each relay's EOSE
//! - Timeline assembly: dedup by event id, newest first, author names
//! - A cursor for paging through a feed one post at a time
//! - A composer for plain notes, quotes and replies
//!
//! # Example
//!
//! ```rust,no_run
//! use nostr_client::RelayPool;
//! use nostr_feed::{FeedConfig, FeedSession};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = RelayPool::with_relays(vec!["wss://nos.lol".to_string()]);
//!     pool.connect().await;
//!
//!     let session = FeedSession::new(&pool, "<owner hex pubkey>", FeedConfig::default());
//!     let feed = session.load_feed(|count| eprint!("\r{count} events")).await.unwrap();
//!
//!     let mut cursor = feed.into_cursor();
//!     while let Some(entry) = cursor.current() {
//!         println!("{}: {}", entry.author, entry.content);
//!         cursor.next();
//!     }
//! }
//! ```

mod aggregator;
mod composer;
mod config;
mod cursor;
mod error;
mod follows;
mod profile;
mod session;
mod timeline;

pub use aggregator::{EventCollector, FetchedEvents, aggregate, collect_until_eose};
pub use composer::{Composer, Draft, event_frame, unescape_newlines};
pub use config::FeedConfig;
pub use cursor::{CursorState, FeedCursor};
pub use error::{ComposeError, FeedError};
pub use follows::{followed_authors, keep_newest, resolve_follows};
pub use profile::{NAME_NOT_FOUND, ProfileMetadata, ProfileRecord, Profiles};
pub use session::{Feed, FeedSession};
pub use timeline::{FeedEntry, NOTE_LINK_BASE, Timeline, rewrite_note_link};

// Re-export the types callers need alongside the feed API
pub use nostr::Event;
pub use nostr_client::{PublishReport, RelayPool};
