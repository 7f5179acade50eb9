//! Relay Verifier Service Library
//!
//! This crate provides a verifier service for an insured-bridge protocol:
//! it arbitrates whether claimed L1 relays faithfully represent L2 deposits,
//! answering optimistic-oracle price requests with a fixed-point verdict.

pub mod ancillary;
pub mod api;
pub mod config;
pub mod l1_client;
pub mod l2_client;
pub mod validator;

// Re-export commonly used types
pub use config::{ApiConfig, ChainConfig, Config, VerifierConfig};
pub use l1_client::{BridgePoolClient, RelayRecord};
pub use l2_client::{DepositClient, DepositRecord};
pub use validator::{
    DepositStateSource, PriceAdjudicator, RefreshError, RelayStateSource, RelayValidator, Verdict,
    VerdictError,
};
