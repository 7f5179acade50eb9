//! Relay Verifier Service
//!
//! A verifier service for an insured-bridge protocol. It watches pending
//! relay attempts on L1 and deposit events on L2, and answers
//! optimistic-oracle price requests with a verdict on whether a claimed
//! relay faithfully represents a real deposit.
//!
//! ## Overview
//!
//! The relay verifier:
//! 1. Periodically refreshes its L1 relay and L2 deposit snapshots
//! 2. Serves verdict requests by decoding the request's ancillary data and
//!    cross-checking the named relay against the deposit it claims to fulfill
//! 3. Exposes the cached snapshots over a REST API for operator inspection

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use relay_verifier::api::ApiServer;
use relay_verifier::config::Config;
use relay_verifier::l1_client::BridgePoolClient;
use relay_verifier::l2_client::DepositClient;
use relay_verifier::validator::{PriceAdjudicator, RelayValidator};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point that initializes and runs the relay verifier.
///
/// This function:
/// 1. Initializes logging and tracing
/// 2. Loads configuration from the TOML file
/// 3. Wires together the L1/L2 clients and the validator
/// 4. Spawns the background snapshot refresh loop
/// 5. Runs the API server until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging for debugging and monitoring
    tracing_subscriber::fmt::init();

    info!("Starting Relay Verifier Service");

    // Load configuration from config/verifier.toml
    let config = Config::load()?;
    info!("Configuration loaded successfully");

    // Wire the collaborators. Clients are long-lived shared components; the
    // validator holds handles to them rather than owning them.
    let l1 = Arc::new(BridgePoolClient::new(
        &config.l1_chain.node_url,
        &config.l1_chain.bridge_address,
        config.verifier.request_timeout_ms,
    )?);
    let l2 = Arc::new(DepositClient::new(
        &config.l2_chain.node_url,
        &config.l2_chain.bridge_address,
        config.verifier.request_timeout_ms,
    )?);
    let validator = Arc::new(RelayValidator::new(l1.clone(), l2.clone()));

    info!("All components initialized successfully");

    // Background refresh loop. This is the only caller of update(), which
    // keeps refreshes single-flight per validator instance. A failed refresh
    // leaves the previous snapshots authoritative, so the loop just logs and
    // retries on the next tick.
    let refresh_validator = validator.clone();
    let polling_interval =
        std::time::Duration::from_millis(config.verifier.polling_interval_ms);
    tokio::spawn(async move {
        loop {
            if let Err(e) = refresh_validator.update().await {
                error!("Snapshot refresh failed, keeping previous state: {}", e);
            }
            tokio::time::sleep(polling_interval).await;
        }
    });

    // Run the API server (this blocks until shutdown)
    let api_server = ApiServer::new(config, l1, validator);
    api_server.run().await?;

    Ok(())
}
