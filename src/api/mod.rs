//! REST API Server Module
//!
//! This module provides a REST API server for the relay verifier service,
//! exposing endpoints for inspecting the cached snapshots and requesting a
//! verdict for an ancillary-data payload. It handles HTTP requests and
//! provides JSON responses for external system integration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::config::Config;
use crate::l1_client::BridgePoolClient;
use crate::l2_client::DepositClient;
use crate::validator::{PriceAdjudicator, RelayValidator, VerdictError};

/// Concrete validator type the service wires together.
pub type ServiceValidator = RelayValidator<BridgePoolClient, DepositClient>;

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
///
/// This structure provides a consistent response format for all API
/// endpoints, including success/error status and relevant data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Request structure for verdict adjudication.
#[derive(Debug, Deserialize)]
pub struct VerdictRequest {
    /// Oracle request timestamp (accepted for interface uniformity)
    #[serde(default)]
    pub time: u64,
    /// Hex-encoded ancillary data, with or without `0x` prefix
    pub ancillary_data: String,
}

/// Response structure for verdict adjudication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictResponse {
    /// Fixed-point verdict as a decimal string ("0" or "1000000000000000000")
    pub verdict: String,
    /// Number of decimals in the fixed-point encoding
    pub decimals: u8,
    /// Unix timestamp when the verdict was produced
    pub timestamp: u64,
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// Handler for the health endpoint.
async fn health_handler() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&ApiResponse {
        success: true,
        data: Some("ok"),
        error: None,
    }))
}

/// Handler for the relays endpoint.
///
/// Returns the cached L1 pending relay snapshot.
async fn get_relays_handler(l1: Arc<BridgePoolClient>) -> Result<impl Reply, Rejection> {
    let relays = l1.cached_relays().await;

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        data: Some(relays),
        error: None,
    }))
}

/// Handler for the deposits endpoint.
///
/// Returns the deposit snapshot adjudication currently runs against.
async fn get_deposits_handler(validator: Arc<ServiceValidator>) -> Result<impl Reply, Rejection> {
    let deposits = validator.cached_deposits().await;

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        data: Some(deposits),
        error: None,
    }))
}

/// Handler for the verdict endpoint.
///
/// Decodes the hex payload, adjudicates it, and maps the error taxonomy onto
/// HTTP statuses: malformed input is the caller's fault (400), a failed fee
/// computation is an upstream failure (502). An Invalid verdict is a normal
/// 200 response carrying "0".
async fn post_verdict_handler(
    request: VerdictRequest,
    validator: Arc<ServiceValidator>,
) -> Result<impl Reply, Rejection> {
    let hex_payload = request
        .ancillary_data
        .strip_prefix("0x")
        .unwrap_or(&request.ancillary_data);

    let ancillary_bytes = match hex::decode(hex_payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            return Ok(warp::reply::with_status(
                warp::reply::json(&ApiResponse::<VerdictResponse> {
                    success: false,
                    data: None,
                    error: Some(format!("ancillary_data is not valid hex: {}", e)),
                }),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    match validator.get_verdict(request.time, &ancillary_bytes).await {
        Ok(verdict) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse {
                success: true,
                data: Some(VerdictResponse {
                    verdict: verdict.to_fixed_point().to_string(),
                    decimals: validator.decimals(),
                    timestamp: chrono::Utc::now().timestamp() as u64,
                }),
                error: None,
            }),
            StatusCode::OK,
        )),
        Err(e @ VerdictError::Decode(_)) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse::<VerdictResponse> {
                success: false,
                data: None,
                error: Some(e.to_string()),
            }),
            StatusCode::BAD_REQUEST,
        )),
        Err(e @ VerdictError::FeeComputation(_)) => {
            error!("Verdict request failed on fee computation: {}", e);
            Ok(warp::reply::with_status(
                warp::reply::json(&ApiResponse::<VerdictResponse> {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }),
                StatusCode::BAD_GATEWAY,
            ))
        }
    }
}

// ============================================================================
// API SERVER
// ============================================================================

/// REST API server exposing the verifier's state and verdict capability.
pub struct ApiServer {
    /// Service configuration
    config: Config,
    /// L1 collaborator (for relay snapshot access)
    l1: Arc<BridgePoolClient>,
    /// The validator serving verdict requests
    validator: Arc<ServiceValidator>,
}

impl ApiServer {
    /// Creates a new API server over the wired service components.
    pub fn new(config: Config, l1: Arc<BridgePoolClient>, validator: Arc<ServiceValidator>) -> Self {
        Self {
            config,
            l1,
            validator,
        }
    }

    /// Builds the route tree served by [`run`](ApiServer::run).
    fn routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let l1 = self.l1.clone();
        let validator = self.validator.clone();

        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and_then(health_handler);

        let relays = warp::path("relays")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::any().map(move || l1.clone()))
            .and_then(get_relays_handler);

        let deposits_validator = validator.clone();
        let deposits = warp::path("deposits")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::any().map(move || deposits_validator.clone()))
            .and_then(get_deposits_handler);

        let verdict = warp::path("verdict")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(warp::any().map(move || validator.clone()))
            .and_then(post_verdict_handler);

        health.or(relays).or(deposits).or(verdict)
    }

    /// Returns the route tree for in-process testing with `warp::test`.
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        self.routes()
    }

    /// Runs the API server until shutdown.
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr: std::net::SocketAddr =
            format!("{}:{}", self.config.api.host, self.config.api.port)
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid API bind address: {}", e))?;

        info!("Starting API server on {}", addr);
        warp::serve(self.routes()).run(addr).await;

        Ok(())
    }
}
