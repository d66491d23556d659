//! Interactive menus.

use crate::prompt::{Prompt, choice};
use crate::render;
use anyhow::Result;
use nostr_client::RelayPool;
use nostr_feed::{
    Composer, Draft, Feed, FeedCursor, FeedEntry, FeedError, FeedSession, event_frame,
    unescape_newlines,
};

/// Which posts a feed view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Follows,
    Own,
}

/// What a new note refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Standalone,
    Quote { event_id: String },
    Reply { event_id: String, author: String },
}

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainChoice {
    ViewFeed,
    Profile,
    Write,
    Help,
    Exit,
}

impl MainChoice {
    fn parse(answer: &str) -> Option<Self> {
        match choice(answer)? {
            'v' | 'f' => Some(Self::ViewFeed),
            'p' => Some(Self::Profile),
            'w' => Some(Self::Write),
            'h' => Some(Self::Help),
            'e' | 'x' => Some(Self::Exit),
            _ => None,
        }
    }
}

/// How a feed view ended.
enum Navigation {
    Reload,
    MainMenu,
}

/// What to show once the cursor has nothing left to page to.
#[derive(Debug, PartialEq, Eq)]
enum Closing<'c> {
    Empty,
    /// A one-post feed: the post has not been drawn yet
    OnlyPost(FeedEntry<'c>),
    End,
}

fn closing(cursor: &FeedCursor) -> Closing<'_> {
    match cursor.last_entry() {
        None => Closing::Empty,
        Some(entry) if cursor.len() == 1 => Closing::OnlyPost(entry),
        Some(_) => Closing::End,
    }
}

pub struct App<'a> {
    pool: &'a RelayPool,
    session: FeedSession<'a>,
    composer: Option<Composer>,
    npub: String,
    prompt: Prompt,
}

impl<'a> App<'a> {
    pub fn new(
        pool: &'a RelayPool,
        session: FeedSession<'a>,
        composer: Option<Composer>,
        npub: String,
    ) -> Self {
        Self {
            pool,
            session,
            composer,
            npub,
            prompt: Prompt::new(),
        }
    }

    /// Show the main menu until the user exits.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            render::title(&self.npub);
            let answer = self.prompt.ask(render::MAIN_MENU).await?;
            match MainChoice::parse(&answer) {
                Some(MainChoice::ViewFeed) => self.browse(FeedKind::Follows).await?,
                Some(MainChoice::Profile) => self.browse(FeedKind::Own).await?,
                Some(MainChoice::Write) => self.write(Target::Standalone).await?,
                Some(MainChoice::Help) => {
                    render::help();
                    self.prompt.pause().await?;
                }
                Some(MainChoice::Exit) => return Ok(()),
                None => {}
            }
        }
    }

    async fn load(&self, kind: FeedKind) -> Result<Feed, FeedError> {
        let feed = match kind {
            FeedKind::Follows => self.session.load_feed(render::progress).await,
            FeedKind::Own => self.session.load_profile(render::progress).await,
        };
        render::finish_progress();
        feed
    }

    async fn browse(&mut self, kind: FeedKind) -> Result<()> {
        loop {
            render::clear_screen();
            let feed = match self.load(kind).await {
                Ok(feed) => feed,
                Err(e) => {
                    render::error(&format!("Could not load the feed: {e}"));
                    return self.prompt.pause().await;
                }
            };
            match self.page(feed).await? {
                Navigation::Reload => continue,
                Navigation::MainMenu => return Ok(()),
            }
        }
    }

    async fn page(&mut self, feed: Feed) -> Result<Navigation> {
        let mut notice = feed.timed_out.clone();
        let mut cursor = feed.into_cursor();

        loop {
            let Some(entry) = cursor.current() else {
                match closing(&cursor) {
                    Closing::Empty => {
                        render::timed_out(&notice);
                        render::empty_feed();
                    }
                    Closing::OnlyPost(entry) => {
                        render::note(&entry, cursor.index(), cursor.len());
                        render::timed_out(&notice);
                        render::end_of_feed();
                    }
                    Closing::End => render::end_of_feed(),
                }
                self.prompt.pause().await?;
                return Ok(Navigation::MainMenu);
            };

            render::note(&entry, cursor.index(), cursor.len());
            render::timed_out(&std::mem::take(&mut notice));
            let event_id = entry.event.id.clone();
            let author = entry.event.pubkey.clone();

            let answer = self.prompt.ask(render::FEED_PROMPT).await?;
            match choice(&answer) {
                None => {
                    cursor.next();
                }
                Some('b') => {
                    cursor.previous();
                }
                Some('q') => self.write(Target::Quote { event_id }).await?,
                Some('r') => self.write(Target::Reply { event_id, author }).await?,
                Some('t') | Some('l') => return Ok(Navigation::Reload),
                Some('m') => return Ok(Navigation::MainMenu),
                Some(_) => {}
            }
        }
    }

    async fn write(&mut self, target: Target) -> Result<()> {
        let Some(composer) = self.composer.as_ref() else {
            render::error("Writing is disabled: set NSEC to sign notes.");
            return self.prompt.pause().await;
        };

        loop {
            let heading = match &target {
                Target::Standalone => "New note",
                Target::Quote { .. } => "Quoting the note on screen",
                Target::Reply { .. } => "Replying to the note on screen",
            };
            render::info(heading);

            let text = self
                .prompt
                .ask("Note text (\\n for a new line, empty to cancel): ")
                .await?;
            if text.trim().is_empty() {
                return Ok(());
            }
            let text = unescape_newlines(&text);

            let draft = match &target {
                Target::Standalone => Draft::plain(&text),
                Target::Quote { event_id } => Draft::quote(&text, event_id),
                Target::Reply { event_id, author } => {
                    Draft::reply(&text, event_id, Some(author.as_str()))
                }
            };
            let signed = draft.and_then(|draft| composer.sign(&draft));
            let event = match signed {
                Ok(event) => event,
                Err(e) => {
                    render::error(&format!("The note was discarded: {e}. Please try again."));
                    continue;
                }
            };

            loop {
                let answer = self.prompt.ask(render::BROADCAST_MENU).await?;
                match choice(&answer) {
                    Some('v') => match event_frame(&event) {
                        Ok(frame) => println!("{frame}"),
                        Err(e) => render::error(&e.to_string()),
                    },
                    Some('b') => {
                        match composer.broadcast(self.pool, &event).await {
                            Ok(report) => render::success(&format!(
                                "Broadcast accepted by {}",
                                report.accepted_by
                            )),
                            Err(e) => render::error(&format!("Broadcast failed: {e}")),
                        }
                        return self.prompt.pause().await;
                    }
                    Some('m') => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::{Event, KIND_SHORT_TEXT_NOTE};
    use nostr_feed::{Profiles, Timeline};

    fn feed(posts: usize) -> Feed {
        let posts = (0..posts).map(|i| Event {
            id: format!("{i:064x}"),
            pubkey: "b".repeat(64),
            created_at: 500 - i as u64,
            kind: KIND_SHORT_TEXT_NOTE,
            tags: vec![],
            content: format!("note {i}"),
            sig: String::new(),
        });
        Feed {
            timeline: Timeline::assemble(posts),
            profiles: Profiles::new(),
            timed_out: vec![],
        }
    }

    #[test]
    fn test_single_post_feed_shows_its_post() {
        let cursor = feed(1).into_cursor();
        assert!(cursor.current().is_none());
        match closing(&cursor) {
            Closing::OnlyPost(entry) => assert_eq!(entry.content, "note 0"),
            other => panic!("Expected the only post, got {:?}", other),
        }
    }

    #[test]
    fn test_closing_after_paging() {
        assert_eq!(closing(&feed(0).into_cursor()), Closing::Empty);

        let mut cursor = feed(2).into_cursor();
        cursor.next();
        cursor.next();
        assert!(cursor.current().is_none());
        assert_eq!(closing(&cursor), Closing::End);
    }

    #[test]
    fn test_main_menu_choices() {
        assert_eq!(MainChoice::parse("v"), Some(MainChoice::ViewFeed));
        assert_eq!(MainChoice::parse("F"), Some(MainChoice::ViewFeed));
        assert_eq!(MainChoice::parse("profile"), Some(MainChoice::Profile));
        assert_eq!(MainChoice::parse("Write"), Some(MainChoice::Write));
        assert_eq!(MainChoice::parse("h"), Some(MainChoice::Help));
        assert_eq!(MainChoice::parse("exit"), Some(MainChoice::Exit));
        assert_eq!(MainChoice::parse("X"), Some(MainChoice::Exit));
        assert_eq!(MainChoice::parse("z"), None);
        assert_eq!(MainChoice::parse(""), None);
    }
}
