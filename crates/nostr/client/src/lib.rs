//! Nostr relay WebSocket client.
//!
//! This crate provides:
//! - WebSocket connections to Nostr relays
//! - Message parsing (NIP-01 relay protocol)
//! - Subscriptions that fan in events and per-relay EOSE over a channel
//! - A relay pool with first-acceptance publishing
//!
//! # Example
//!
//! ```rust,no_run
//! use nostr_client::{Filter, RelayPool, SubscriptionEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = RelayPool::with_relays(vec![
//!         "wss://nos.lol".to_string(),
//!         "wss://relay.primal.net".to_string(),
//!     ]);
//!     pool.connect().await;
//!
//!     let filter = Filter::new().kinds(vec![1]).limit(10);
//!     let mut subscription = pool.subscribe(vec![filter]).await.unwrap();
//!     let mut tracker = subscription.tracker();
//!
//!     while let Some(event) = subscription.next().await {
//!         match event {
//!             SubscriptionEvent::Event { event, .. } => println!("{}", event.content),
//!             other => {
//!                 tracker.mark_eose(other.relay_url());
//!                 if tracker.all_eose() {
//!                     break;
//!                 }
//!             }
//!         }
//!     }
//!
//!     pool.close(&subscription).await;
//! }
//! ```

mod error;
mod message;
mod pool;
mod relay;
mod subscription;

pub use error::{ClientError, Result};
pub use message::{ClientMessage, Filter, MessageError, RelayMessage};
pub use pool::{PoolConfig, PublishReport, RelayPool};
pub use relay::{ConnectionState, PublishConfirmation, RelayConfig, RelayConnection};
pub use subscription::{
    Subscription, SubscriptionEvent, SubscriptionTracker, generate_subscription_id,
};

/// Relays used when none are configured.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.satoshidnc.com/",
    "wss://nos.lol",
    "wss://relay.primal.net",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relays() {
        assert!(!DEFAULT_RELAYS.is_empty());
        for relay in DEFAULT_RELAYS {
            assert!(relay.starts_with("wss://"));
        }
    }

}
