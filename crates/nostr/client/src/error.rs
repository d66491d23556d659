//! Errors raised while talking to relays

use crate::message::MessageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure while dialing or writing to a relay
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Relay address is not a ws:// or wss:// URL
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    #[error("Relay URL could not be parsed: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Frame could not be encoded or decoded
    #[error("Malformed relay frame: {0}")]
    Message(#[from] MessageError),

    /// Relay did not answer in time
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not connected to relay")]
    NotConnected,

    #[error("Already connected to relay")]
    AlreadyConnected,

    /// No relay in the pool could take the request
    #[error("No connected relays")]
    NoRelays,

    /// Every relay refused or ignored the event; carries their reasons
    #[error("Event was not accepted by any relay: {0}")]
    PublishFailed(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
