//! Nostr protocol implementation for the terminal feed client.
//!
//! This crate provides:
//! - NIP-01: Basic protocol (events, signing, verification)
//! - NIP-02: Follow List (Contact List and Petnames)
//! - NIP-10: Text Notes and Threads
//! - NIP-19: bech32-encoded entities
//! - NIP-27: Text Note References (`nostr:` URIs in content)

mod nip01;
mod nip02;
mod nip10;
pub mod nip19;
pub mod nip27;

// NIP-01: Basic protocol
pub use nip01::{
    Event, EventTemplate, KIND_CONTACTS, KIND_METADATA, KIND_SHORT_TEXT_NOTE, Nip01Error,
    UnsignedEvent, finalize_event, generate_secret_key, get_event_hash, get_public_key,
    get_public_key_hex, serialize_event, sort_events, unix_now, validate_event, verify_event,
};

// NIP-02: Follow List
pub use nip02::{Contact, ContactList, Nip02Error};

// NIP-10: Threads
pub use nip10::{ETagMarker, EventReference, Nip10Error, thread_root};

// NIP-19: bech32 entities
pub use nip19::{
    Nip19Error, event_id_to_note, note_to_event_id, npub_to_public_key, nsec_to_private_key,
    private_key_to_nsec, public_key_to_npub,
};

// NIP-27: content references
pub use nip27::{ContentReference, find_note_reference, to_nostr_uri};
