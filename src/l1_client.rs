//! L1 Bridge Pool Client Module
//!
//! This module provides a client for the L1 bridge pool view served by an
//! indexer node. It maintains a local cache of pending relay records and
//! exposes the pool's realized-LP-fee computation, which depends on live
//! pool utilization and therefore stays on the node side.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::l2_client::DepositRecord;
use crate::validator::RelayStateSource;

// ============================================================================
// RELAY DATA STRUCTURES
// ============================================================================

/// A pending relay attempt observed on the L1 bridge pool.
///
/// Relay records are read-only projections of on-chain state: the client
/// never mutates them, and each refresh replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRecord {
    /// Sequence number assigned by the bridge pool
    pub relay_id: u64,
    /// Hash of the relay's encoded parameters, `0x`-prefixed hex; unique key
    /// used to match oracle price requests to relays
    pub relay_ancillary_data_hash: String,
    /// Hash of the deposit this relay claims to fulfill, `0x`-prefixed hex
    pub deposit_hash: String,
    /// True once the dispute-challenge window has elapsed without a
    /// successful dispute
    pub settleable: bool,
    /// Liquidity-provider fee the relay claims, as an 18-decimal fixed-point
    /// fraction in decimal string form (e.g. "100000000000000000" for 0.1)
    pub realized_lp_fee_pct: String,
    /// Address of the relayer that submitted the slow relay leg
    pub slow_relayer: String,
}

/// Response body of the pool's realized-LP-fee computation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LpFeeResponse {
    /// Expected realized LP fee as an 18-decimal fixed-point decimal string
    realized_lp_fee_pct: String,
}

// ============================================================================
// L1 CLIENT IMPLEMENTATION
// ============================================================================

/// Client for the L1 bridge pool state.
///
/// Holds an in-memory snapshot of pending relays that is replaced wholesale
/// by each successful [`refresh`](BridgePoolClient::refresh). A failed
/// refresh leaves the previous snapshot untouched, so readers always see a
/// complete, internally consistent relay set.
pub struct BridgePoolClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the L1 indexer node
    base_url: String,
    /// Address of the bridge pool contract whose state is served
    bridge_address: String,
    /// Cached pending relays, swapped wholesale on refresh
    relay_cache: Arc<RwLock<Vec<RelayRecord>>>,
}

impl BridgePoolClient {
    /// Creates a new L1 bridge pool client.
    ///
    /// # Arguments
    ///
    /// * `node_url` - Base URL of the L1 indexer node
    /// * `bridge_address` - Address of the bridge pool contract
    /// * `timeout_ms` - Request timeout in milliseconds
    ///
    /// # Returns
    ///
    /// * `Ok(BridgePoolClient)` - Successfully created client
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
            relay_cache: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Fetches the current pending relay set and replaces the local cache.
    ///
    /// The cache is only swapped after the response has been fully fetched
    /// and parsed; any failure leaves the previous snapshot in place.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Cache now holds the node's current pending relay set
    /// * `Err(anyhow::Error)` - Fetch or parse failed, cache unchanged
    pub async fn refresh_relays(&self) -> Result<()> {
        let url = format!(
            "{}/relays/pending?bridge={}",
            self.base_url, self.bridge_address
        );

        let relays: Vec<RelayRecord> = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch pending relays from {}", url))?
            .error_for_status()
            .with_context(|| format!("Pending relay request to {} was rejected", url))?
            .json()
            .await
            .with_context(|| format!("Failed to parse pending relay response from {}", url))?;

        info!("Refreshed L1 relay snapshot: {} pending relays", relays.len());

        let mut cache = self.relay_cache.write().await;
        *cache = relays;

        Ok(())
    }

    /// Returns a copy of the cached pending relay set.
    ///
    /// Pure cache read; performs no network I/O.
    pub async fn cached_relays(&self) -> Vec<RelayRecord> {
        self.relay_cache.read().await.clone()
    }

    /// Computes the expected realized LP fee for a deposit.
    ///
    /// The fee depends on the pool's current utilization, so the computation
    /// is delegated to the node. The result is returned as an exact decimal
    /// string and must be compared as such, never through floating-point.
    ///
    /// # Arguments
    ///
    /// * `deposit` - The deposit to price
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Expected fee as an 18-decimal fixed-point decimal string
    /// * `Err(anyhow::Error)` - Request failed or the node returned a non-numeric fee
    pub async fn realized_lp_fee_for_deposit(&self, deposit: &DepositRecord) -> Result<String> {
        let url = format!("{}/lp-fee?bridge={}", self.base_url, self.bridge_address);

        let response: LpFeeResponse = self
            .client
            .post(&url)
            .json(deposit)
            .send()
            .await
            .with_context(|| format!("Failed to request LP fee from {}", url))?
            .error_for_status()
            .with_context(|| format!("LP fee request to {} was rejected", url))?
            .json()
            .await
            .with_context(|| format!("Failed to parse LP fee response from {}", url))?;

        let fee = response.realized_lp_fee_pct;
        if fee.is_empty() || !fee.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow::anyhow!(
                "Node returned non-numeric LP fee '{}' for deposit {}",
                fee,
                deposit.deposit_hash
            ));
        }

        Ok(fee)
    }

    /// Returns the base URL of this client
    #[allow(dead_code)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RelayStateSource for BridgePoolClient {
    async fn refresh(&self) -> Result<()> {
        self.refresh_relays().await
    }

    async fn pending_relays(&self) -> Vec<RelayRecord> {
        self.cached_relays().await
    }

    async fn calculate_realized_lp_fee(&self, deposit: &DepositRecord) -> Result<String> {
        self.realized_lp_fee_for_deposit(deposit).await
    }
}
