//! Profile metadata (kind 0) and author display names.

use nostr::{Event, KIND_METADATA};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Shown when an author has neither a profile nor a usable key.
pub const NAME_NOT_FOUND: &str = "Name Not Found";

const SHORT_ID_LEN: usize = 7;

/// The JSON object carried in a kind 0 event's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Legacy camel-case spelling still published by some clients
    #[serde(
        default,
        rename = "displayName",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name_legacy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
}

impl ProfileMetadata {
    /// Parse profile content. Content that is not a profile object yields empty metadata.
    pub fn parse(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            debug!("Unparsable profile content: {}", e);
            Self::default()
        })
    }

    /// First non-empty of `display_name`, `displayName`, `name`, then the
    /// shortened `npub` field.
    pub fn display_name(&self) -> Option<String> {
        [&self.display_name, &self.display_name_legacy, &self.name]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .cloned()
            .or_else(|| {
                self.npub
                    .as_deref()
                    .filter(|npub| !npub.is_empty())
                    .map(shorten)
            })
    }
}

/// The newest known profile of one author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub pubkey: String,
    pub created_at: u64,
    pub metadata: ProfileMetadata,
}

/// Profiles indexed by author.
#[derive(Debug, Clone, Default)]
pub struct Profiles {
    by_author: HashMap<String, ProfileRecord>,
}

impl Profiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut profiles = Self::new();
        for event in events {
            profiles.insert(&event);
        }
        profiles
    }

    /// Record a kind 0 event. A newer `created_at` replaces the stored
    /// profile; an equal one keeps whichever arrived first.
    pub fn insert(&mut self, event: &Event) -> bool {
        if event.kind != KIND_METADATA {
            return false;
        }
        if let Some(current) = self.by_author.get(&event.pubkey)
            && current.created_at >= event.created_at
        {
            return false;
        }

        self.by_author.insert(
            event.pubkey.clone(),
            ProfileRecord {
                pubkey: event.pubkey.clone(),
                created_at: event.created_at,
                metadata: ProfileMetadata::parse(&event.content),
            },
        );
        true
    }

    pub fn get(&self, pubkey: &str) -> Option<&ProfileRecord> {
        self.by_author.get(pubkey)
    }

    /// Name to show for `pubkey`, falling back to a shortened key.
    pub fn display_name(&self, pubkey: &str) -> String {
        self.get(pubkey)
            .and_then(|record| record.metadata.display_name())
            .unwrap_or_else(|| {
                if pubkey.is_empty() {
                    NAME_NOT_FOUND.to_string()
                } else {
                    shorten(pubkey)
                }
            })
    }

    pub fn len(&self) -> usize {
        self.by_author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }
}

fn shorten(id: &str) -> String {
    let prefix: String = id.chars().take(SHORT_ID_LEN).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pubkey: &str, created_at: u64, content: &str) -> Event {
        Event {
            id: format!("{pubkey}-{created_at}"),
            pubkey: pubkey.to_string(),
            created_at,
            kind: KIND_METADATA,
            tags: vec![],
            content: content.to_string(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_display_name_chain() {
        let full = ProfileMetadata::parse(
            r#"{"display_name":"Alice","displayName":"alice_old","name":"alice"}"#,
        );
        assert_eq!(full.display_name().as_deref(), Some("Alice"));

        let legacy = ProfileMetadata::parse(r#"{"display_name":"","displayName":"Bobby","name":"bob"}"#);
        assert_eq!(legacy.display_name().as_deref(), Some("Bobby"));

        let name_only = ProfileMetadata::parse(r#"{"name":"carol"}"#);
        assert_eq!(name_only.display_name().as_deref(), Some("carol"));

        let npub_only = ProfileMetadata::parse(r#"{"npub":"npub1abcdefghijk"}"#);
        assert_eq!(npub_only.display_name().as_deref(), Some("npub1ab..."));

        assert_eq!(ProfileMetadata::parse("{}").display_name(), None);
    }

    #[test]
    fn test_unparsable_content_is_empty_metadata() {
        assert_eq!(ProfileMetadata::parse("not json"), ProfileMetadata::default());
    }

    #[test]
    fn test_unknown_author_gets_short_key() {
        let profiles = Profiles::new();
        assert_eq!(profiles.display_name("abcdef0123456789"), "abcdef0...");
        assert_eq!(profiles.display_name(""), NAME_NOT_FOUND);
    }

    #[test]
    fn test_newest_profile_wins() {
        let profiles = Profiles::from_events(vec![
            profile("pk", 200, r#"{"name":"new"}"#),
            profile("pk", 100, r#"{"name":"old"}"#),
        ]);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles.display_name("pk"), "new");
    }

    #[test]
    fn test_equal_timestamp_keeps_first() {
        let mut profiles = Profiles::new();
        assert!(profiles.insert(&profile("pk", 100, r#"{"name":"first"}"#)));
        assert!(!profiles.insert(&profile("pk", 100, r#"{"name":"second"}"#)));
        assert_eq!(profiles.display_name("pk"), "first");
    }

    #[test]
    fn test_profile_without_names_falls_back_to_key() {
        let profiles = Profiles::from_events(vec![profile("abcdef0123", 1, r#"{"about":"hi"}"#)]);
        assert_eq!(profiles.display_name("abcdef0123"), "abcdef0...");
    }
}
