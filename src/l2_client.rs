//! L2 Deposit Client Module
//!
//! This module provides a client for the L2 deposit-box view served by an
//! indexer node. It maintains a local cache of deposit records and enforces
//! the on-chain deposit-hash convention: each record's hash is recomputed
//! from its parameters and records with a disagreeing reported hash are
//! rejected, so a misbehaving indexer cannot poison the snapshot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use tokio::sync::RwLock;
use tracing::info;

use crate::validator::DepositStateSource;

// ============================================================================
// DEPOSIT DATA STRUCTURES
// ============================================================================

/// An L2-originated transfer request observed on the deposit box.
///
/// Read-only projection of on-chain state, replaced wholesale each refresh.
/// `deposit_hash` is derived deterministically from the other fields; see
/// [`compute_deposit_hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    /// Chain id of the L2 the deposit originated on
    pub chain_id: u64,
    /// Sequence number assigned by the deposit box
    pub deposit_id: u64,
    /// Recipient address on L1, `0x`-prefixed hex
    pub l1_recipient: String,
    /// Sender address on L2, `0x`-prefixed hex
    pub l2_sender: String,
    /// Deposited amount in the token's smallest unit, decimal string
    pub amount: String,
    /// Fee offered to the slow relayer, 18-decimal fixed-point decimal string
    pub slow_relay_fee_pct: String,
    /// Fee offered for instant relay, 18-decimal fixed-point decimal string
    pub instant_relay_fee_pct: String,
    /// L1 timestamp the LP fee is quoted against
    pub quote_timestamp: u64,
    /// Keccak-256 over the 32-byte-word encoding of the fields above,
    /// `0x`-prefixed hex
    pub deposit_hash: String,
}

// ============================================================================
// DEPOSIT HASH CONVENTION
// ============================================================================

/// Left-pads a big-endian byte value to a 32-byte word.
fn encode_word(bytes: &[u8]) -> [u8; 32] {
    let mut word = [0u8; 32];
    let len = bytes.len().min(32);
    word[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    word
}

/// Decodes a `0x`-prefixed (or bare) hex string into bytes.
fn decode_hex_field(value: &str, field: &str) -> Result<Vec<u8>> {
    let bare = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(bare).with_context(|| format!("Field '{}' is not valid hex: {}", field, value))
}

/// Parses a decimal string into a u128 for word encoding.
fn decode_decimal_field(value: &str, field: &str) -> Result<u128> {
    value
        .parse::<u128>()
        .with_context(|| format!("Field '{}' is not a decimal number: {}", field, value))
}

/// Computes the deposit hash for a record's parameters.
///
/// Convention inherited from the on-chain deposit box: Keccak-256 over the
/// concatenation of each parameter encoded as a 32-byte word, in declaration
/// order (chain id, deposit id, L1 recipient, L2 sender, amount, slow relay
/// fee, instant relay fee, quote timestamp). Addresses are right-aligned in
/// their word like any other big-endian value.
///
/// # Arguments
///
/// * `deposit` - The deposit whose parameters are hashed (its `deposit_hash`
///   field is ignored)
///
/// # Returns
///
/// * `Ok(String)` - `0x`-prefixed lowercase hex digest
/// * `Err(anyhow::Error)` - A field could not be decoded
pub fn compute_deposit_hash(deposit: &DepositRecord) -> Result<String> {
    let mut hasher = Keccak256::new();
    hasher.update(encode_word(&deposit.chain_id.to_be_bytes()));
    hasher.update(encode_word(&deposit.deposit_id.to_be_bytes()));
    hasher.update(encode_word(&decode_hex_field(
        &deposit.l1_recipient,
        "l1Recipient",
    )?));
    hasher.update(encode_word(&decode_hex_field(
        &deposit.l2_sender,
        "l2Sender",
    )?));
    hasher.update(encode_word(
        &decode_decimal_field(&deposit.amount, "amount")?.to_be_bytes(),
    ));
    hasher.update(encode_word(
        &decode_decimal_field(&deposit.slow_relay_fee_pct, "slowRelayFeePct")?.to_be_bytes(),
    ));
    hasher.update(encode_word(
        &decode_decimal_field(&deposit.instant_relay_fee_pct, "instantRelayFeePct")?.to_be_bytes(),
    ));
    hasher.update(encode_word(&deposit.quote_timestamp.to_be_bytes()));

    Ok(format!("0x{}", hex::encode(hasher.finalize())))
}

// ============================================================================
// L2 CLIENT IMPLEMENTATION
// ============================================================================

/// Client for the L2 deposit box state.
///
/// Same snapshot discipline as the L1 client: each successful refresh swaps
/// the whole cached deposit set, and a failed refresh leaves the previous
/// snapshot untouched.
pub struct DepositClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the L2 indexer node
    base_url: String,
    /// Address of the deposit box contract whose state is served
    bridge_address: String,
    /// Cached deposits, swapped wholesale on refresh
    deposit_cache: Arc<RwLock<Vec<DepositRecord>>>,
}

impl DepositClient {
    /// Creates a new L2 deposit client.
    ///
    /// # Arguments
    ///
    /// * `node_url` - Base URL of the L2 indexer node
    /// * `bridge_address` - Address of the deposit box contract
    /// * `timeout_ms` - Request timeout in milliseconds
    ///
    /// # Returns
    ///
    /// * `Ok(DepositClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create HTTP client
    pub fn new(node_url: &str, bridge_address: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: node_url.trim_end_matches('/').to_string(),
            bridge_address: bridge_address.to_string(),
            deposit_cache: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Fetches the current deposit set and replaces the local cache.
    ///
    /// Every record's deposit hash is recomputed from its parameters before
    /// the swap; a record whose reported hash disagrees fails the whole
    /// refresh, leaving the previous snapshot in place.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Cache now holds the node's current deposit set
    /// * `Err(anyhow::Error)` - Fetch, parse, or hash verification failed, cache unchanged
    pub async fn refresh_deposits(&self) -> Result<()> {
        let url = format!(
            "{}/deposits?bridge={}",
            self.base_url, self.bridge_address
        );

        let deposits: Vec<DepositRecord> = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch deposits from {}", url))?
            .error_for_status()
            .with_context(|| format!("Deposit request to {} was rejected", url))?
            .json()
            .await
            .with_context(|| format!("Failed to parse deposit response from {}", url))?;

        for deposit in &deposits {
            let computed = compute_deposit_hash(deposit)?;
            if !computed.eq_ignore_ascii_case(&deposit.deposit_hash) {
                return Err(anyhow::anyhow!(
                    "Deposit {} on chain {} reports hash {} but parameters hash to {}",
                    deposit.deposit_id,
                    deposit.chain_id,
                    deposit.deposit_hash,
                    computed
                ));
            }
        }

        info!("Refreshed L2 deposit snapshot: {} deposits", deposits.len());

        let mut cache = self.deposit_cache.write().await;
        *cache = deposits;

        Ok(())
    }

    /// Returns a copy of the cached deposit set.
    ///
    /// Pure cache read; performs no network I/O.
    pub async fn cached_deposits(&self) -> Vec<DepositRecord> {
        self.deposit_cache.read().await.clone()
    }

    /// Returns the base URL of this client
    #[allow(dead_code)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DepositStateSource for DepositClient {
    async fn refresh(&self) -> Result<()> {
        self.refresh_deposits().await
    }

    async fn all_deposits(&self) -> Vec<DepositRecord> {
        self.cached_deposits().await
    }
}
