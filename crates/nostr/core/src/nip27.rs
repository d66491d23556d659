//! NIP-27: Text Note References
//!
//! Notes mention other events and profiles inline using NIP-21 `nostr:` URIs,
//! for example `check this nostr:note1... out`. Readers locate these tokens
//! to link or preview them; writers append them to quote another note.

/// URI scheme prefix defined by NIP-21.
pub const NOSTR_URI_PREFIX: &str = "nostr:";

/// Prefix of a URI that points at a single note.
pub const NOTE_URI_PREFIX: &str = "nostr:note";

/// A `nostr:` URI located inside note content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentReference<'a> {
    /// The full URI text, including the `nostr:` scheme
    pub uri: &'a str,
    /// Byte offset where the URI starts
    pub start: usize,
    /// Byte offset one past the end of the URI
    pub end: usize,
}

impl<'a> ContentReference<'a> {
    /// The bech32 entity after the scheme (`note1…`, `npub1…`, …).
    pub fn entity(&self) -> &'a str {
        &self.uri[NOSTR_URI_PREFIX.len()..]
    }
}

/// Find the first `nostr:note…` token. The token runs to the next space or
/// to the end of the content.
pub fn find_note_reference(content: &str) -> Option<ContentReference<'_>> {
    let start = content.find(NOTE_URI_PREFIX)?;
    let end = content[start..]
        .find(' ')
        .map(|offset| start + offset)
        .unwrap_or(content.len());

    Some(ContentReference {
        uri: &content[start..end],
        start,
        end,
    })
}

/// Wrap a bech32 entity in a `nostr:` URI.
pub fn to_nostr_uri(entity: &str) -> String {
    format!("{NOSTR_URI_PREFIX}{entity}")
}
