//! Paging through a loaded feed one post at a time.

use crate::session::Feed;
use crate::timeline::FeedEntry;

/// Where the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Showing the post at this index
    Viewing(usize),
    /// Moved past the last post, or the feed had nothing to page through
    Ended,
}

/// A navigator over a loaded [`Feed`].
///
/// A feed of one post or none starts out [`CursorState::Ended`]: there is
/// nothing to page to, but the single post is still available from
/// [`FeedCursor::last_entry`]. Moving past
/// the last post ends the cursor instead of wrapping around; moving back from
/// the first post stays on the first post.
#[derive(Debug, Clone)]
pub struct FeedCursor {
    feed: Feed,
    index: usize,
    ended: bool,
}

impl FeedCursor {
    pub fn new(feed: Feed) -> Self {
        let ended = feed.timeline.len() <= 1;
        Self {
            feed,
            index: 0,
            ended,
        }
    }

    pub fn state(&self) -> CursorState {
        if self.ended {
            CursorState::Ended
        } else {
            CursorState::Viewing(self.index)
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Index of the last post viewed.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn len(&self) -> usize {
        self.feed.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feed.timeline.is_empty()
    }

    /// The post being viewed, joined with its author's name.
    pub fn current(&self) -> Option<FeedEntry<'_>> {
        match self.state() {
            CursorState::Viewing(index) => self.feed.timeline.entry(index, &self.feed.profiles),
            CursorState::Ended => None,
        }
    }

    /// The post at [`FeedCursor::index`], whether or not the cursor has ended.
    pub fn last_entry(&self) -> Option<FeedEntry<'_>> {
        self.feed.timeline.entry(self.index, &self.feed.profiles)
    }

    /// Advance one post, ending the cursor when already on the last post.
    pub fn next(&mut self) -> CursorState {
        if !self.ended {
            if self.index + 1 < self.len() {
                self.index += 1;
            } else {
                self.ended = true;
            }
        }
        self.state()
    }

    /// Step back one post, stopping at the first.
    pub fn previous(&mut self) -> CursorState {
        if self.len() > 1 {
            if self.ended {
                self.ended = false;
            } else {
                self.index = self.index.saturating_sub(1);
            }
        }
        self.state()
    }
}
