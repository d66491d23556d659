//! In-process relays for exercising the feed against real WebSocket traffic.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use nostr::{Event, EventTemplate, finalize_event, get_public_key_hex, verify_event};
use nostr_client::Filter;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Answer REQs with stored events and EOSE, accept valid events
    Normal,
    /// Answer REQs with stored events but never send EOSE
    NeverEose,
    /// Refuse every published event
    RejectWrites,
}

/// A relay listening on `127.0.0.1` that keeps events in memory.
pub struct MockRelay {
    pub url: String,
    stored: Arc<Mutex<Vec<Event>>>,
}

impl MockRelay {
    pub async fn spawn(events: Vec<Event>) -> Self {
        Self::spawn_with(events, Behaviour::Normal).await
    }

    pub async fn spawn_with(events: Vec<Event>, behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let stored = Arc::new(Mutex::new(events));

        let shared = Arc::clone(&stored);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let stored = Arc::clone(&shared);
                tokio::spawn(async move {
                    let Ok(mut ws) = accept_async(stream).await else {
                        return;
                    };
                    while let Some(Ok(Message::Text(text))) = ws.next().await {
                        let frame: Value = serde_json::from_str(text.as_str()).unwrap();
                        for reply in answer(&frame, &stored, behaviour) {
                            if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                                return;
                            }
                        }
                    }
                });
            }
        });

        Self { url, stored }
    }

    /// Events the relay holds, including accepted publishes.
    pub fn stored(&self) -> Vec<Event> {
        self.stored.lock().unwrap().clone()
    }
}

fn answer(frame: &Value, stored: &Mutex<Vec<Event>>, behaviour: Behaviour) -> Vec<Value> {
    match frame[0].as_str() {
        Some("REQ") => {
            let sub_id = frame[1].clone();
            let events = stored.lock().unwrap().clone();
            let mut replies = Vec::new();
            for raw in frame.as_array().unwrap().iter().skip(2) {
                let filter: Filter = serde_json::from_value(raw.clone()).unwrap();
                let mut matching: Vec<&Event> =
                    events.iter().filter(|e| matches(&filter, e)).collect();
                matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                let limit = filter.limit.map(|l| l as usize).unwrap_or(usize::MAX);
                replies.extend(
                    matching
                        .into_iter()
                        .take(limit)
                        .map(|event| json!(["EVENT", sub_id, event])),
                );
            }
            if behaviour != Behaviour::NeverEose {
                replies.push(json!(["EOSE", sub_id]));
            }
            replies
        }
        Some("EVENT") => {
            let event: Event = serde_json::from_value(frame[1].clone()).unwrap();
            let (accepted, reason) = if behaviour == Behaviour::RejectWrites {
                (false, "blocked: read-only relay")
            } else if !verify_event(&event).unwrap_or(false) {
                (false, "invalid: bad signature")
            } else {
                stored.lock().unwrap().push(event.clone());
                (true, "")
            };
            vec![json!(["OK", event.id, accepted, reason])]
        }
        _ => Vec::new(),
    }
}

fn matches(filter: &Filter, event: &Event) -> bool {
    filter
        .kinds
        .as_ref()
        .is_none_or(|kinds| kinds.contains(&event.kind))
        && filter
            .authors
            .as_ref()
            .is_none_or(|authors| authors.contains(&event.pubkey))
        && filter
            .ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&event.id))
}

/// A signing identity for building fixtures.
pub struct Identity {
    pub secret_key: [u8; 32],
    pub pubkey: String,
}

impl Identity {
    pub fn generate() -> Self {
        let secret_key = nostr::generate_secret_key();
        let pubkey = get_public_key_hex(&secret_key).unwrap();
        Self { secret_key, pubkey }
    }

    pub fn sign(&self, kind: u16, created_at: u64, tags: Vec<Vec<String>>, content: &str) -> Event {
        let template = EventTemplate {
            created_at,
            kind,
            tags,
            content: content.to_string(),
        };
        finalize_event(&template, &self.secret_key).unwrap()
    }

    pub fn note(&self, created_at: u64, content: &str) -> Event {
        self.sign(nostr::KIND_SHORT_TEXT_NOTE, created_at, vec![], content)
    }

    pub fn profile(&self, created_at: u64, content: &str) -> Event {
        self.sign(nostr::KIND_METADATA, created_at, vec![], content)
    }

    pub fn follows(&self, created_at: u64, follows: &[&Identity]) -> Event {
        let tags = follows
            .iter()
            .map(|other| vec!["p".to_string(), other.pubkey.clone()])
            .collect();
        self.sign(nostr::KIND_CONTACTS, created_at, tags, "")
    }
}
