//! NIP-02: Follow List (Contact List and Petnames)
//!
//! A user's follow list is a kind 3 event. Each followed profile is a "p" tag
//! with an optional relay URL and petname.
//!
//! See: <https://github.com/nostr-protocol/nips/blob/master/02.md>

use crate::Event;
use crate::nip01::KIND_CONTACTS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during NIP-02 operations
#[derive(Debug, Error)]
pub enum Nip02Error {
    #[error("invalid event kind: expected 3, got {0}")]
    InvalidKind(u16),

    #[error("invalid p-tag format: {0}")]
    InvalidPTag(String),
}

/// A single contact in a follow list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// The public key of the followed profile
    pub pubkey: String,

    /// Optional relay URL where this profile can be found
    pub relay_url: Option<String>,

    /// Optional local petname for this contact
    pub petname: Option<String>,
}

fn non_empty(tag: &[String], index: usize) -> Option<String> {
    tag.get(index).filter(|value| !value.is_empty()).cloned()
}

impl Contact {
    /// Create a new contact with just a public key
    pub fn new(pubkey: impl Into<String>) -> Self {
        Self {
            pubkey: pubkey.into(),
            relay_url: None,
            petname: None,
        }
    }

    /// Convert contact to a p-tag array
    pub fn to_tag(&self) -> Vec<String> {
        let mut tag = vec![
            "p".to_string(),
            self.pubkey.clone(),
            self.relay_url.clone().unwrap_or_default(),
        ];
        if let Some(ref petname) = self.petname {
            tag.push(petname.clone());
        }
        tag
    }

    /// Parse a contact from a p-tag array.
    ///
    /// The pubkey is taken verbatim; relays are the authority on what a valid
    /// key looks like and the feed only uses it as a filter value.
    pub fn from_tag(tag: &[String]) -> Result<Self, Nip02Error> {
        if tag.first().map(String::as_str) != Some("p") {
            return Err(Nip02Error::InvalidPTag(
                "tag must start with 'p'".to_string(),
            ));
        }

        let pubkey = non_empty(tag, 1).ok_or_else(|| {
            Nip02Error::InvalidPTag("p-tag must have a pubkey".to_string())
        })?;

        Ok(Self {
            pubkey,
            relay_url: non_empty(tag, 2),
            petname: non_empty(tag, 3),
        })
    }
}

/// Contact list (follow list) event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactList {
    pub event: Event,
    pub contacts: Vec<Contact>,
}

impl ContactList {
    /// Build a contact list from a kind 3 event.
    ///
    /// Malformed p-tags are skipped rather than failing the whole list.
    pub fn from_event(event: Event) -> Result<Self, Nip02Error> {
        if event.kind != KIND_CONTACTS {
            return Err(Nip02Error::InvalidKind(event.kind));
        }

        let contacts = event
            .tags
            .iter()
            .filter(|tag| tag.first().map(String::as_str) == Some("p"))
            .filter_map(|tag| Contact::from_tag(tag).ok())
            .collect();

        Ok(Self { event, contacts })
    }

    /// Followed public keys in tag order, each listed once.
    pub fn pubkeys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.contacts
            .iter()
            .filter(|c| seen.insert(c.pubkey.as_str()))
            .map(|c| c.pubkey.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
