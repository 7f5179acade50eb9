//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the relay
//! verifier service. Configuration includes L1/L2 node endpoints, polling
//! settings, and API server settings.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
///
/// This structure holds configuration for:
/// - L1 chain connection details (bridge pool / relay state)
/// - L2 chain connection details (deposit box state)
/// - Verifier timing parameters
/// - API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 chain configuration (where relays are attempted and disputed)
    pub l1_chain: ChainConfig,
    /// L2 chain configuration (where deposits originate)
    pub l2_chain: ChainConfig,
    /// Verifier-specific configuration (polling, timeouts)
    pub verifier: VerifierConfig,
    /// API server configuration (host, port)
    pub api: ApiConfig,
}

/// Configuration for a blockchain data-source connection.
///
/// Contains the information needed to reach the indexer node serving a
/// chain's bridge state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Human-readable name for the chain
    pub name: String,
    /// Base URL of the node serving bridge state
    pub node_url: String,
    /// Unique chain identifier
    pub chain_id: u64,
    /// Address of the bridge contract on this chain
    pub bridge_address: String,
}

/// Verifier-specific timing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Polling interval between snapshot refreshes in milliseconds
    pub polling_interval_ms: u64,
    /// Timeout for HTTP requests to chain nodes in milliseconds
    pub request_timeout_ms: u64,
}

/// API server configuration for external communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from the TOML file.
    ///
    /// This function:
    /// 1. Resolves the config path (env override for tests, else
    ///    config/verifier.toml)
    /// 2. If the file exists, loads and parses the configuration
    /// 3. If it doesn't exist, returns an error asking the user to copy the
    ///    template
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded configuration
    /// - `Err(anyhow::Error)` - Failed to load configuration or file doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        // Check for custom config path via environment variable (for tests)
        let config_path = std::env::var("RELAY_VERIFIER_CONFIG_PATH")
            .unwrap_or_else(|_| "config/verifier.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/verifier.template.toml config/verifier.toml\n\
                Then edit config/verifier.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Creates a default configuration with placeholder values.
    ///
    /// This configuration is suitable for local development and testing.
    /// For production use, the node URLs and bridge addresses must be
    /// replaced with actual values.
    #[allow(dead_code)]
    pub fn default() -> Self {
        Self {
            l1_chain: ChainConfig {
                name: "L1 Chain".to_string(),
                node_url: "http://127.0.0.1:8545".to_string(),
                chain_id: 1,
                bridge_address: "0x0000000000000000000000000000000000000001".to_string(),
            },
            l2_chain: ChainConfig {
                name: "L2 Chain".to_string(),
                node_url: "http://127.0.0.1:8546".to_string(),
                chain_id: 10,
                bridge_address: "0x0000000000000000000000000000000000000002".to_string(),
            },
            verifier: VerifierConfig {
                polling_interval_ms: 2000,
                request_timeout_ms: 30000,
            },
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3334,
            },
        }
    }
}
