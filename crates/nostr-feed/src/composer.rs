//! Composing, signing and broadcasting notes.
//!
//! A [`Draft`] is plain text, a quote of another note, or a reply to one.
//! The [`Composer`] signs drafts with the owner's secret key, checks the
//! signature before anything leaves the process, and publishes through the
//! relay pool.

use crate::error::ComposeError;
use nostr::{
    Event, EventReference, EventTemplate, KIND_SHORT_TEXT_NOTE, event_id_to_note,
    finalize_event, get_public_key_hex, to_nostr_uri, unix_now, verify_event,
};
use nostr_client::{ClientMessage, PublishReport, RelayPool};
use tracing::{info, warn};

/// Turn the two-character sequence `\n` typed at a prompt into a newline.
pub fn unescape_newlines(input: &str) -> String {
    input.replace("\\n", "\n")
}

/// An unsigned note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

impl Draft {
    /// A standalone note.
    pub fn plain(content: &str) -> Result<Self, ComposeError> {
        if content.trim().is_empty() {
            return Err(ComposeError::EmptyContent);
        }
        Ok(Self {
            tags: Vec::new(),
            content: content.to_string(),
        })
    }

    /// A note quoting `event_id`, whose `nostr:note…` URI is appended to the
    /// text unless the text already carries it.
    pub fn quote(content: &str, event_id: &str) -> Result<Self, ComposeError> {
        let uri = to_nostr_uri(&event_id_to_note(event_id)?);
        let content = if content.contains(&uri) {
            content.to_string()
        } else if content.trim().is_empty() {
            uri
        } else {
            format!("{content} {uri}")
        };
        Ok(Self {
            tags: Vec::new(),
            content,
        })
    }

    /// A reply to `event_id`, threaded with a `root` e-tag. The parent's
    /// author, when known, is tagged as well.
    pub fn reply(
        content: &str,
        event_id: &str,
        parent_author: Option<&str>,
    ) -> Result<Self, ComposeError> {
        let mut draft = Self::plain(content)?;
        draft.tags.push(EventReference::root(event_id).to_tag());
        if let Some(author) = parent_author.filter(|author| !author.is_empty()) {
            draft.tags.push(vec!["p".to_string(), author.to_string()]);
        }
        Ok(draft)
    }

    pub fn kind(&self) -> u16 {
        KIND_SHORT_TEXT_NOTE
    }

    fn template(&self, created_at: u64) -> EventTemplate {
        EventTemplate {
            created_at,
            kind: self.kind(),
            tags: self.tags.clone(),
            content: self.content.clone(),
        }
    }
}

/// Signs drafts for one identity and broadcasts them.
pub struct Composer {
    secret_key: [u8; 32],
    pubkey: String,
}

impl Composer {
    pub fn new(secret_key: [u8; 32]) -> Result<Self, ComposeError> {
        let pubkey = get_public_key_hex(&secret_key)?;
        Ok(Self { secret_key, pubkey })
    }

    /// Hex public key of the signing identity.
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    /// Sign a draft stamped with the current time.
    pub fn sign(&self, draft: &Draft) -> Result<Event, ComposeError> {
        self.sign_at(draft, unix_now())
    }

    /// Sign a draft and verify the result. A draft whose signature does not
    /// verify is never returned.
    pub fn sign_at(&self, draft: &Draft, created_at: u64) -> Result<Event, ComposeError> {
        let event = finalize_event(&draft.template(created_at), &self.secret_key)?;
        if !verify_event(&event)? {
            warn!("Discarding draft: signature of {} did not verify", event.id);
            return Err(ComposeError::VerificationFailed);
        }
        Ok(event)
    }

    /// Publish a signed note to every connected relay; one acceptance is enough.
    pub async fn broadcast(
        &self,
        pool: &RelayPool,
        event: &Event,
    ) -> Result<PublishReport, ComposeError> {
        let report = pool.publish(event).await?;
        info!("Broadcast {} accepted by {}", event.id, report.accepted_by);
        Ok(report)
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}

/// The relay `EVENT` frame a signed note is published as.
pub fn event_frame(event: &Event) -> Result<String, ComposeError> {
    Ok(ClientMessage::Event(event.clone()).to_json()?)
}
