//! Startup configuration from the environment and command line.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use nostr::{get_public_key_hex, npub_to_public_key, nsec_to_private_key, public_key_to_npub};
use nostr_client::DEFAULT_RELAYS;
use nostr_feed::FeedConfig;
use std::env;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nostr-terminal",
    about = "Read your Nostr feed and write notes from the terminal",
    version
)]
pub struct Args {
    /// Relay to use; repeat for several. Replaces NOSTR_RELAYS
    #[arg(long = "relay", value_name = "URL")]
    pub relays: Vec<String>,

    /// Posts requested per load
    #[arg(long, default_value_t = 100)]
    pub page_size: u64,

    /// Seconds to wait for each relay to finish sending stored events (0 waits forever)
    #[arg(long, default_value_t = 10)]
    pub eose_timeout: u64,
}

/// Everything the client needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Owner public key, hex
    pub owner: String,
    pub owner_npub: String,
    /// Owner secret key; writing is disabled without it
    pub secret_key: Option<[u8; 32]>,
    pub relays: Vec<String>,
    pub feed: FeedConfig,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn load(args: &Args) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(args: &Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let secret_key = first(&["NSEC", "NOSTR_NSEC"])
            .map(|nsec| nsec_to_private_key(&nsec).context("NSEC is not a valid nsec1 key"))
            .transpose()?;

        let owner = match first(&["NPUB", "NOSTR_NPUB"]) {
            Some(npub) => parse_public_key(&npub)?,
            None => {
                let secret = secret_key
                    .as_ref()
                    .ok_or_else(|| anyhow!("NPUB is not set; add it to the environment or .env"))?;
                get_public_key_hex(secret).context("NSEC does not yield a public key")?
            }
        };

        let owner_bytes: [u8; 32] = hex::decode(&owner)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| anyhow!("owner public key is not 32 bytes"))?;
        let owner_npub = public_key_to_npub(&owner_bytes)?;

        let relays = if !args.relays.is_empty() {
            args.relays.clone()
        } else if let Some(list) = first(&["NOSTR_RELAYS"]) {
            split_relays(&list)
        } else {
            DEFAULT_RELAYS.iter().map(|s| s.to_string()).collect()
        };
        if relays.is_empty() {
            return Err(anyhow!("no relays configured"));
        }

        let eose_timeout = (args.eose_timeout > 0).then(|| Duration::from_secs(args.eose_timeout));
        let feed = FeedConfig::default()
            .with_page_size(args.page_size)
            .with_eose_timeout(eose_timeout);

        Ok(Self {
            owner,
            owner_npub,
            secret_key,
            relays,
            feed,
        })
    }
}

/// Accept `npub1…` or a 64-character hex key.
fn parse_public_key(value: &str) -> Result<String> {
    if value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(value.to_ascii_lowercase());
    }
    let bytes = npub_to_public_key(value).context("NPUB is not a valid npub1 key")?;
    Ok(hex::encode(bytes))
}

fn split_relays(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}
