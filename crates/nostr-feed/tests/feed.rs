mod common;

use common::{Behaviour, Identity, MockRelay};
use nostr_client::RelayPool;
use nostr_feed::{CursorState, FeedConfig, FeedSession};
use std::time::Duration;

fn config() -> FeedConfig {
    FeedConfig::default().with_eose_timeout(Some(Duration::from_secs(5)))
}

async fn pool(relays: &[&MockRelay]) -> RelayPool {
    let pool = RelayPool::with_relays(relays.iter().map(|r| r.url.clone()).collect());
    assert_eq!(pool.connect().await, relays.len());
    pool
}

#[tokio::test]
async fn test_feed_merges_relays_and_dedups() {
    let owner = Identity::generate();
    let alice = Identity::generate();
    let bob = Identity::generate();

    let first = alice.note(100, "first post");
    let second = bob.note(200, "second post");

    let relay_one = MockRelay::spawn(vec![owner.follows(10, &[&alice, &bob]), first.clone()]).await;
    let relay_two = MockRelay::spawn(vec![
        second.clone(),
        first.clone(),
        alice.profile(5, r#"{"display_name":"Alice"}"#),
    ])
    .await;

    let pool = pool(&[&relay_one, &relay_two]).await;
    let session = FeedSession::new(&pool, owner.pubkey.clone(), config());

    let mut counts = Vec::new();
    let feed = session.load_feed(|count| counts.push(count)).await.unwrap();

    let ids: Vec<&str> = feed
        .timeline
        .posts()
        .iter()
        .map(|post| post.id.as_str())
        .collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    assert!(feed.timed_out.is_empty());
    assert_eq!(counts.last(), Some(&4));

    let mut cursor = feed.into_cursor();
    let newest = cursor.current().unwrap();
    assert_eq!(newest.content, "second post");
    assert!(newest.author.ends_with("..."));

    assert_eq!(cursor.next(), CursorState::Viewing(1));
    assert_eq!(cursor.current().unwrap().author, "Alice");
    assert_eq!(cursor.next(), CursorState::Ended);

    pool.disconnect_all().await;
}

#[tokio::test]
async fn test_newest_follow_list_across_relays_wins() {
    let owner = Identity::generate();
    let old_friend = Identity::generate();
    let new_friend = Identity::generate();

    let old_post = old_friend.note(100, "from the old list");
    let new_post = new_friend.note(110, "from the new list");
    let another = new_friend.note(120, "again from the new list");

    let newer_list = MockRelay::spawn(vec![
        owner.follows(500, &[&new_friend]),
        old_post,
        new_post.clone(),
        another.clone(),
    ])
    .await;
    let older_list = MockRelay::spawn(vec![owner.follows(400, &[&old_friend])]).await;

    let pool = pool(&[&newer_list, &older_list]).await;
    let session = FeedSession::new(&pool, owner.pubkey.clone(), config());
    let feed = session.load_feed(|_| {}).await.unwrap();

    let authors: Vec<&str> = feed
        .timeline
        .posts()
        .iter()
        .map(|post| post.pubkey.as_str())
        .collect();
    assert_eq!(authors, vec![new_friend.pubkey.as_str(); 2]);
    assert_eq!(feed.timeline.get(0).unwrap().id, another.id);

    pool.disconnect_all().await;
}

#[tokio::test]
async fn test_missing_follow_list_is_an_empty_feed() {
    let owner = Identity::generate();
    let relay = MockRelay::spawn(vec![]).await;
    let pool = pool(&[&relay]).await;

    let session = FeedSession::new(&pool, owner.pubkey.clone(), config());
    let feed = session.load_feed(|_| {}).await.unwrap();

    assert!(feed.timeline.is_empty());
    assert!(feed.into_cursor().is_ended());
    pool.disconnect_all().await;
}

#[tokio::test]
async fn test_hung_relay_times_out_without_losing_events() {
    let owner = Identity::generate();
    let friend = Identity::generate();
    let list = owner.follows(10, &[&friend]);
    let quick_post = friend.note(300, "from the quick relay");
    let slow_post = friend.note(200, "from the hung relay");

    let quick = MockRelay::spawn(vec![list.clone(), quick_post]).await;
    let hung = MockRelay::spawn_with(vec![list, slow_post.clone()], Behaviour::NeverEose).await;

    let pool = pool(&[&quick, &hung]).await;
    let config = FeedConfig::default().with_eose_timeout(Some(Duration::from_millis(300)));
    let session = FeedSession::new(&pool, owner.pubkey.clone(), config);
    let feed = session.load_feed(|_| {}).await.unwrap();

    assert_eq!(feed.timed_out, vec![hung.url.clone()]);
    assert_eq!(feed.timeline.len(), 2);
    assert_eq!(feed.timeline.get(1).unwrap().id, slow_post.id);

    pool.disconnect_all().await;
}

#[tokio::test]
async fn test_page_size_is_sent_as_limit() {
    let owner = Identity::generate();
    let relay = MockRelay::spawn(
        (0..10)
            .map(|i| owner.note(1_000 + i, &format!("note {i}")))
            .collect(),
    )
    .await;
    let pool = pool(&[&relay]).await;

    let session = FeedSession::new(&pool, owner.pubkey.clone(), config().with_page_size(3));
    let feed = session.load_profile(|_| {}).await.unwrap();

    assert_eq!(feed.timeline.len(), 3);
    assert_eq!(feed.timeline.get(0).unwrap().content, "note 9");
    pool.disconnect_all().await;
}
