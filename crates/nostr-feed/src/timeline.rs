//! Timeline assembly: dedup, ordering, author join and link rewriting.

use crate::profile::Profiles;
use nostr::{Event, find_note_reference, sort_events};
use std::collections::HashSet;

/// Web viewer that quoted notes are linked to.
pub const NOTE_LINK_BASE: &str = "http://www.primal.net/e/";

/// Posts ready for display, newest first, each id exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    posts: Vec<Event>,
}

impl Timeline {
    /// Build a timeline from raw posts as delivered by any number of relays.
    ///
    /// Copies of one id are content-equal, so the first copy is kept. Posts
    /// are ordered by `created_at` descending, equal timestamps by ascending id.
    pub fn assemble(posts: impl IntoIterator<Item = Event>) -> Self {
        let mut seen = HashSet::new();
        let mut posts: Vec<Event> = posts
            .into_iter()
            .filter(|post| seen.insert(post.id.clone()))
            .collect();
        sort_events(&mut posts);
        Self { posts }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.posts.get(index)
    }

    pub fn posts(&self) -> &[Event] {
        &self.posts
    }

    /// The post at `index` joined with its author's display name.
    pub fn entry<'a>(&'a self, index: usize, profiles: &Profiles) -> Option<FeedEntry<'a>> {
        self.get(index).map(|event| FeedEntry::new(event, profiles))
    }
}

/// A post as it is shown to the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry<'a> {
    pub event: &'a Event,
    pub author: String,
    /// Content with the first note reference turned into a web link
    pub content: String,
}

impl<'a> FeedEntry<'a> {
    pub fn new(event: &'a Event, profiles: &Profiles) -> Self {
        Self {
            event,
            author: profiles.display_name(&event.pubkey),
            content: rewrite_note_link(&event.content),
        }
    }
}

/// Replace the first `nostr:note…` token with a readable web link.
pub fn rewrite_note_link(content: &str) -> String {
    match find_note_reference(content) {
        Some(reference) => format!(
            "{}QUOTED: {}{}{}",
            &content[..reference.start],
            NOTE_LINK_BASE,
            reference.entity(),
            &content[reference.end..]
        ),
        None => content.to_string(),
    }
}
