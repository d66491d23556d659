//! NIP-19: bech32-encoded entities
//!
//! Human-facing encodings of raw keys and ids: `npub` (public key), `nsec`
//! (secret key) and `note` (event id). Decoding checks the human-readable
//! prefix so a secret key can never be accepted where a public key is expected.
//!
//! See: <https://github.com/nostr-protocol/nips/blob/master/19.md>

use bech32::{Bech32, Hrp};
use thiserror::Error;

pub const NPUB_HRP: &str = "npub";
pub const NSEC_HRP: &str = "nsec";
pub const NOTE_HRP: &str = "note";

/// Errors that can occur during NIP-19 operations
#[derive(Debug, Error)]
pub enum Nip19Error {
    #[error("bech32 encoding error: {0}")]
    Bech32Encode(String),

    #[error("bech32 decoding error: {0}")]
    Bech32Decode(String),

    #[error("invalid address format: expected {expected}, got {got}")]
    InvalidHrp { expected: String, got: String },

    #[error("invalid length: expected 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Decode a bech32 string, checking that its prefix is `expected_hrp`.
pub fn decode(encoded: &str, expected_hrp: &str) -> Result<Vec<u8>, Nip19Error> {
    let expected = Hrp::parse(expected_hrp).map_err(|e| Nip19Error::Bech32Decode(e.to_string()))?;
    let (hrp, data) =
        bech32::decode(encoded.trim()).map_err(|e| Nip19Error::Bech32Decode(e.to_string()))?;

    if hrp != expected {
        return Err(Nip19Error::InvalidHrp {
            expected: expected_hrp.to_string(),
            got: hrp.to_string(),
        });
    }

    Ok(data)
}

/// Encode bytes as bech32 with the given human-readable part.
pub fn encode(hrp: &str, data: &[u8]) -> Result<String, Nip19Error> {
    let hrp = Hrp::parse(hrp).map_err(|e| Nip19Error::Bech32Encode(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| Nip19Error::Bech32Encode(e.to_string()))
}

fn decode_32(encoded: &str, expected_hrp: &str) -> Result<[u8; 32], Nip19Error> {
    let bytes = decode(encoded, expected_hrp)?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| Nip19Error::InvalidLength(bytes.len()))
}

fn hex_32(value: &str) -> Result<[u8; 32], Nip19Error> {
    let bytes = hex::decode(value).map_err(|e| Nip19Error::InvalidHex(e.to_string()))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| Nip19Error::InvalidLength(bytes.len()))
}

/// Decode an npub bech32 string to a 32-byte public key.
pub fn npub_to_public_key(npub: &str) -> Result<[u8; 32], Nip19Error> {
    decode_32(npub, NPUB_HRP)
}

/// Decode an nsec bech32 string to a 32-byte secret key.
pub fn nsec_to_private_key(nsec: &str) -> Result<[u8; 32], Nip19Error> {
    decode_32(nsec, NSEC_HRP)
}

/// Encode a 32-byte public key as an npub bech32 string.
pub fn public_key_to_npub(public_key: &[u8; 32]) -> Result<String, Nip19Error> {
    encode(NPUB_HRP, public_key)
}

/// Encode a 32-byte secret key as an nsec bech32 string.
pub fn private_key_to_nsec(private_key: &[u8; 32]) -> Result<String, Nip19Error> {
    encode(NSEC_HRP, private_key)
}

/// Encode a hex event id as a `note1…` string.
pub fn event_id_to_note(event_id_hex: &str) -> Result<String, Nip19Error> {
    encode(NOTE_HRP, &hex_32(event_id_hex)?)
}

/// Decode a `note1…` string to a hex event id.
pub fn note_to_event_id(note: &str) -> Result<String, Nip19Error> {
    Ok(hex::encode(decode_32(note, NOTE_HRP)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY_HEX: &str = "7f7ff03d123792d6ac594bfa67bf6d0c0ab55b6b1fdb6249303fe861f1ccba9a";
    const NSEC: &str = "nsec10allq0gjx7fddtzef0ax00mdps9t2kmtrldkyjfs8l5xruwvh2dq0lhhkp";

    #[test]
    fn test_nsec_known_vector() {
        let bytes = hex_32(PRIVATE_KEY_HEX).unwrap();
        assert_eq!(private_key_to_nsec(&bytes).unwrap(), NSEC);
        assert_eq!(nsec_to_private_key(NSEC).unwrap(), bytes);
    }

    #[test]
    fn test_prefix_mismatch_is_rejected() {
        let err = npub_to_public_key(NSEC).unwrap_err();
        match err {
            Nip19Error::InvalidHrp { expected, got } => {
                assert_eq!(expected, "npub");
                assert_eq!(got, "nsec");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_bech32() {
        assert!(matches!(
            nsec_to_private_key("nsec1invalid"),
            Err(Nip19Error::Bech32Decode(_))
        ));
    }

    #[test]
    fn test_npub_roundtrip_through_raw_bytes() {
        let key = [7u8; 32];
        let npub = public_key_to_npub(&key).unwrap();
        assert!(npub.starts_with("npub1"));
        assert_eq!(decode(&npub, NPUB_HRP).unwrap(), key.to_vec());
    }

    #[test]
    fn test_note_encoding() {
        let id = "ab".repeat(32);
        let note = event_id_to_note(&id).unwrap();
        assert!(note.starts_with("note1"));
        assert_eq!(note_to_event_id(&note).unwrap(), id);
    }

    #[test]
    fn test_note_rejects_short_id() {
        assert!(matches!(
            event_id_to_note("abcd"),
            Err(Nip19Error::InvalidLength(2))
        ));
        assert!(matches!(
            event_id_to_note("zz"),
            Err(Nip19Error::InvalidHex(_))
        ));
    }

    #[test]
    fn test_decode_wrong_length() {
        let short = encode(NPUB_HRP, &[1, 2, 3]).unwrap();
        assert!(matches!(
            npub_to_public_key(&short),
            Err(Nip19Error::InvalidLength(3))
        ));
    }
}
