//! Feed and composer error types

use nostr::{Nip01Error, Nip19Error};
use nostr_client::{ClientError, MessageError};
use thiserror::Error;

/// Errors that can occur while loading a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("relay error: {0}")]
    Relay(#[from] ClientError),
}

/// Errors that can occur while composing and broadcasting a note.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("note content is empty")]
    EmptyContent,

    #[error("event signing error: {0}")]
    Signing(#[from] Nip01Error),

    #[error("signed event failed verification")]
    VerificationFailed,

    #[error("invalid note reference: {0}")]
    Reference(#[from] Nip19Error),

    #[error("event frame error: {0}")]
    Frame(#[from] MessageError),

    #[error("broadcast failed: {0}")]
    Broadcast(#[from] ClientError),
}
