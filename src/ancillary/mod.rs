//! Ancillary Data Codec Module
//!
//! This module decodes the opaque ancillary-data payloads that accompany
//! optimistic-oracle price requests. The wire format is owned by the on-chain
//! protocol: a UTF-8 string of comma-separated `key:value` pairs, e.g.
//! `relayHash:2b4c...,ooRequester:ab12...`. The verifier only needs the
//! `relayHash` field, but the decoder returns the full mapping so callers can
//! inspect the rest.
//!
//! Decoding failure is a fatal input error for the adjudication call that
//! supplied the bytes. It is deliberately distinct from an Invalid verdict:
//! "cannot adjudicate" must never be reported as "adjudicated as invalid".

use std::collections::BTreeMap;

use thiserror::Error;

/// Ancillary-data key carrying the relay hash.
pub const RELAY_HASH_KEY: &str = "relayHash";

// ============================================================================
// ERRORS
// ============================================================================

/// Errors produced while decoding ancillary-data bytes.
///
/// These indicate malformed input from the caller, not an adjudication
/// outcome. Callers must not retry without fixing the input.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid UTF-8
    #[error("ancillary data is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// Payload is empty
    #[error("ancillary data is empty")]
    Empty,

    /// A `key:value` pair is missing its separator
    #[error("ancillary data pair '{0}' has no ':' separator")]
    MissingSeparator(String),

    /// A pair has an empty key
    #[error("ancillary data contains a pair with an empty key")]
    EmptyKey,

    /// A required key is absent from the decoded mapping
    #[error("ancillary data is missing required key '{0}'")]
    MissingKey(&'static str),

    /// A field that must be hex-encoded is not
    #[error("ancillary data field '{key}' is not valid hex: {value}")]
    InvalidHex { key: &'static str, value: String },
}

// ============================================================================
// DECODING
// ============================================================================

/// Relay claim identification decoded from ancillary data.
///
/// Only the fields the verifier consumes; the raw mapping may carry more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayAncillaryData {
    /// Hex-encoded relay hash, without the `0x` marker (the on-chain encoder
    /// strips it; matching code re-applies it)
    pub relay_hash: String,
}

/// Decodes ancillary-data bytes into a key-value mapping.
///
/// The format is `key:value` pairs separated by commas. Whitespace around
/// keys and values is trimmed. Duplicate keys keep the last occurrence,
/// matching the upstream encoder's behavior.
///
/// # Arguments
///
/// * `data` - Raw ancillary-data bytes as passed to the oracle request
///
/// # Returns
///
/// * `Ok(BTreeMap<String, String>)` - Decoded key-value mapping
/// * `Err(DecodeError)` - Payload is malformed
pub fn decode(data: &[u8]) -> Result<BTreeMap<String, String>, DecodeError> {
    let text = std::str::from_utf8(data)?;
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut mapping = BTreeMap::new();
    for pair in text.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair
            .split_once(':')
            .ok_or_else(|| DecodeError::MissingSeparator(pair.to_string()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(DecodeError::EmptyKey);
        }

        mapping.insert(key.to_string(), value.trim().to_string());
    }

    if mapping.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(mapping)
}

/// Decodes ancillary data and extracts the relay claim identification.
///
/// # Arguments
///
/// * `data` - Raw ancillary-data bytes
///
/// # Returns
///
/// * `Ok(RelayAncillaryData)` - Decoded relay claim with validated hex hash
/// * `Err(DecodeError)` - Payload is malformed or missing `relayHash`
pub fn parse_relay_ancillary_data(data: &[u8]) -> Result<RelayAncillaryData, DecodeError> {
    let mapping = decode(data)?;

    let relay_hash = mapping
        .get(RELAY_HASH_KEY)
        .ok_or(DecodeError::MissingKey(RELAY_HASH_KEY))?;

    // The hash names a 32-byte identifier; reject anything that is not plain
    // hex so garbage never reaches the relay lookup.
    let bare = relay_hash.strip_prefix("0x").unwrap_or(relay_hash);
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex {
            key: RELAY_HASH_KEY,
            value: relay_hash.clone(),
        });
    }

    Ok(RelayAncillaryData {
        relay_hash: bare.to_string(),
    })
}

/// Encodes a key-value mapping into ancillary-data bytes.
///
/// Inverse of [`decode`], used by tests and demo tooling to build payloads
/// the way the on-chain encoder does.
pub fn encode<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<u8> {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join(",")
        .into_bytes()
}
