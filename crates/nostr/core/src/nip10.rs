//! NIP-10: Text Notes and Threads
//!
//! Replies reference their thread with marked e-tags (`root`, `reply`,
//! `mention`) and notify participants with p-tags.
//!
//! See: <https://github.com/nostr-protocol/nips/blob/master/10.md>

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during NIP-10 operations
#[derive(Debug, Error)]
pub enum Nip10Error {
    #[error("invalid e-tag format: {0}")]
    InvalidETag(String),

    #[error("unknown e-tag marker: {0}")]
    UnknownMarker(String),
}

/// E-tag marker types for thread structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ETagMarker {
    /// The root event of a thread
    Root,

    /// The immediate parent event being replied to
    Reply,

    /// A mentioned event (not part of reply chain)
    Mention,
}

impl ETagMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            ETagMarker::Root => "root",
            ETagMarker::Reply => "reply",
            ETagMarker::Mention => "mention",
        }
    }
}

impl FromStr for ETagMarker {
    type Err = Nip10Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(ETagMarker::Root),
            "reply" => Ok(ETagMarker::Reply),
            "mention" => Ok(ETagMarker::Mention),
            other => Err(Nip10Error::UnknownMarker(other.to_string())),
        }
    }
}

/// An e-tag reference to another event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReference {
    /// Event ID being referenced
    pub event_id: String,

    /// Recommended relay URL (optional)
    pub relay_url: Option<String>,

    /// Marker indicating role in thread (optional)
    pub marker: Option<ETagMarker>,
}

impl EventReference {
    /// A `root` reference, the marker used when replying to a top-level note.
    pub fn root(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            relay_url: None,
            marker: Some(ETagMarker::Root),
        }
    }

    /// Parse an event reference from an e-tag. Unknown markers are dropped.
    pub fn from_tag(tag: &[String]) -> Result<Self, Nip10Error> {
        if tag.first().map(String::as_str) != Some("e") {
            return Err(Nip10Error::InvalidETag("tag must start with 'e'".to_string()));
        }

        let event_id = tag
            .get(1)
            .filter(|id| !id.is_empty())
            .cloned()
            .ok_or_else(|| Nip10Error::InvalidETag("e-tag must have an event ID".to_string()))?;

        let relay_url = tag.get(2).filter(|url| !url.is_empty()).cloned();
        let marker = tag.get(3).and_then(|m| ETagMarker::from_str(m).ok());

        Ok(Self {
            event_id,
            relay_url,
            marker,
        })
    }

    /// Convert to an e-tag array: `["e", <id>, <relay or "">, <marker>]`.
    pub fn to_tag(&self) -> Vec<String> {
        let mut tag = vec![
            "e".to_string(),
            self.event_id.clone(),
            self.relay_url.clone().unwrap_or_default(),
        ];
        if let Some(marker) = self.marker {
            tag.push(marker.as_str().to_string());
        }
        tag
    }
}

/// Find the thread root referenced by a note's tags, if any.
pub fn thread_root(tags: &[Vec<String>]) -> Option<EventReference> {
    tags.iter()
        .filter_map(|tag| EventReference::from_tag(tag).ok())
        .find(|reference| reference.marker == Some(ETagMarker::Root))
}
