//! Relay Validation Module
//!
//! This module holds the core decision procedure of the service: given the
//! ancillary data of an oracle price request, decide whether the L1 relay it
//! names is a faithful representation of a real L2 deposit. The decision
//! reconciles two independently refreshed snapshots (L1 pending relays, L2
//! deposits) through a fixed sequence of short-circuiting rules.
//!
//! The verdict is a value, not an error: a relay that fails a rule is
//! adjudicated Invalid. Only malformed input (decode failure) and collaborator
//! failures (refresh, fee computation) surface as errors, because "cannot
//! adjudicate" must stay distinguishable from "adjudicated as invalid".

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::ancillary::{self, DecodeError};
use crate::l1_client::RelayRecord;
use crate::l2_client::DepositRecord;

// ============================================================================
// VERDICT ENCODING
// ============================================================================

/// Outcome of adjudicating a relay claim.
///
/// The consuming on-chain system expects a fixed-point price value, so the
/// verdict is encoded as 0 (Invalid) or 1 scaled to 18 decimals (Valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The relay does not faithfully represent a deposit
    Invalid,
    /// The relay is valid (or no longer disputable)
    Valid,
}

impl Verdict {
    /// Number of decimals in the fixed-point verdict encoding.
    pub const DECIMALS: u8 = 18;

    /// Returns the verdict as an 18-decimal fixed-point value.
    pub fn to_fixed_point(self) -> u128 {
        match self {
            Verdict::Invalid => 0,
            Verdict::Valid => 1_000_000_000_000_000_000,
        }
    }

    /// True if the verdict is [`Verdict::Valid`].
    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure to produce a verdict for a single adjudication call.
///
/// Distinct from an Invalid verdict: callers must treat these as "cannot
/// adjudicate". Cached snapshots are unaffected.
#[derive(Debug, Error)]
pub enum VerdictError {
    /// The ancillary data could not be decoded; retrying without fixing the
    /// input will fail again
    #[error("malformed ancillary data: {0}")]
    Decode(#[from] DecodeError),

    /// The L1 collaborator's fee computation failed (network or node error);
    /// retrying may succeed
    #[error("expected fee computation failed: {0}")]
    FeeComputation(#[source] anyhow::Error),
}

/// Failure to refresh the cached snapshots.
///
/// The refresh fails as a unit: the previously cached state remains
/// authoritative and usable for subsequent adjudication calls.
#[derive(Debug, Error)]
#[error("snapshot refresh failed: {0}")]
pub struct RefreshError(#[source] pub anyhow::Error);

// ============================================================================
// COLLABORATOR CAPABILITIES
// ============================================================================

/// Capability exposed by the L1 collaborator: pending relay state and the
/// pool's fee computation.
///
/// `pending_relays` is a cache read and must not perform I/O; all fetching
/// belongs in `refresh`. `calculate_realized_lp_fee` may perform I/O since
/// the fee depends on live pool utilization.
#[allow(async_fn_in_trait)]
pub trait RelayStateSource {
    /// Re-synchronizes the relay snapshot; may perform network I/O.
    async fn refresh(&self) -> Result<()>;

    /// Returns the current pending relay snapshot (cache read).
    async fn pending_relays(&self) -> Vec<RelayRecord>;

    /// Computes the expected realized LP fee for a deposit as an exact
    /// decimal string.
    async fn calculate_realized_lp_fee(&self, deposit: &DepositRecord) -> Result<String>;
}

/// Capability exposed by the L2 collaborator: deposit state.
#[allow(async_fn_in_trait)]
pub trait DepositStateSource {
    /// Re-synchronizes the deposit snapshot; may perform network I/O.
    async fn refresh(&self) -> Result<()>;

    /// Returns the full current deposit snapshot (cache read).
    async fn all_deposits(&self) -> Vec<DepositRecord>;
}

/// Capability implemented by any adjudicator the oracle plumbing can consume.
#[allow(async_fn_in_trait)]
pub trait PriceAdjudicator {
    /// Adjudicates the relay claim identified by `ancillary_data`.
    ///
    /// The `time` parameter is accepted for interface uniformity with other
    /// price feeds but plays no part in the decision.
    async fn get_verdict(&self, time: u64, ancillary_data: &[u8]) -> Result<Verdict, VerdictError>;

    /// Refreshes the snapshots the next adjudications will run against.
    async fn update(&self) -> Result<(), RefreshError>;

    /// Number of decimals in the fixed-point verdict encoding.
    fn decimals(&self) -> u8;
}

// ============================================================================
// RELAY VALIDATOR IMPLEMENTATION
// ============================================================================

/// Validator that arbitrates whether a claimed L1 relay correctly reflects an
/// L2 deposit.
///
/// Holds shared handles to the two long-lived collaborators (constructor
/// injection; the wiring process owns their lifetime) and a local deposit
/// snapshot that `update` replaces wholesale. Concurrent `get_verdict` calls
/// against the same snapshot are safe; `update` calls should be serialized by
/// the caller.
pub struct RelayValidator<L1, L2> {
    /// L1 collaborator (pending relays, fee computation)
    l1: Arc<L1>,
    /// L2 collaborator (deposit state)
    l2: Arc<L2>,
    /// Deposit snapshot adjudication runs against; replaced wholesale by a
    /// successful `update`, never partially
    deposits: RwLock<Vec<DepositRecord>>,
}

impl<L1, L2> RelayValidator<L1, L2>
where
    L1: RelayStateSource,
    L2: DepositStateSource,
{
    /// Creates a new relay validator over the given collaborators.
    ///
    /// The validator starts with empty snapshots; until the first successful
    /// [`update`](PriceAdjudicator::update), every adjudication returns
    /// Invalid because nothing can match. That is correct behavior, not an
    /// error.
    pub fn new(l1: Arc<L1>, l2: Arc<L2>) -> Self {
        Self {
            l1,
            l2,
            deposits: RwLock::new(Vec::new()),
        }
    }

    /// Returns a copy of the deposit snapshot adjudication currently runs
    /// against.
    pub async fn cached_deposits(&self) -> Vec<DepositRecord> {
        self.deposits.read().await.clone()
    }

    /// Finds the pending relay matching a decoded ancillary hash.
    ///
    /// The decoded hash carries bare hex; the on-chain convention prefixes
    /// the `0x` marker before hashing lookups. Hex digit casing differs
    /// between indexers, so matching ignores case.
    async fn find_relay(&self, relay_hash: &str) -> Option<RelayRecord> {
        let target = format!("0x{}", relay_hash);
        self.l1
            .pending_relays()
            .await
            .into_iter()
            .find(|relay| relay.relay_ancillary_data_hash.eq_ignore_ascii_case(&target))
    }

    /// Finds the cached deposit matching a relay's deposit hash.
    async fn find_deposit(&self, deposit_hash: &str) -> Option<DepositRecord> {
        self.deposits
            .read()
            .await
            .iter()
            .find(|deposit| deposit.deposit_hash.eq_ignore_ascii_case(deposit_hash))
            .cloned()
    }
}

impl<L1, L2> PriceAdjudicator for RelayValidator<L1, L2>
where
    L1: RelayStateSource,
    L2: DepositStateSource,
{
    /// Adjudicates a relay claim through the fixed rule sequence.
    ///
    /// Rule order, first match wins:
    /// 1. Decode the ancillary data (failure → [`VerdictError::Decode`])
    /// 2. No matching pending relay → Invalid
    /// 3. Relay already settleable → Valid, regardless of deposit/fee state
    /// 4. No matching deposit → Invalid
    /// 5. Claimed fee differs from the computed expected fee → Invalid
    /// 6. Otherwise → Valid
    ///
    /// Rule 3 is inherited from the on-chain dispute economics: once the
    /// challenge window has closed a relay can no longer be disputed, so for
    /// adjudication purposes it is treated as valid whether or not it was
    /// correct. Preserve this behavior; it is load-bearing.
    async fn get_verdict(
        &self,
        _time: u64,
        ancillary_data: &[u8],
    ) -> Result<Verdict, VerdictError> {
        // 1. Decode. Malformed input propagates; it is never an Invalid verdict.
        let parsed = ancillary::parse_relay_ancillary_data(ancillary_data)?;

        // 2. Match relay.
        let relay = match self.find_relay(&parsed.relay_hash).await {
            Some(relay) => relay,
            None => {
                warn!(
                    "No pending relay matches ancillary hash 0x{} - relay was finalized, removed, or fabricated",
                    parsed.relay_hash
                );
                return Ok(Verdict::Invalid);
            }
        };

        // 3. Liveness bypass: an expired dispute window means the relay can no
        // longer be disputed, so it is valid by protocol definition.
        if relay.settleable {
            info!(
                "Relay {} is settleable; dispute window elapsed, returning Valid without further checks",
                relay.relay_id
            );
            return Ok(Verdict::Valid);
        }

        // 4. Match deposit.
        let deposit = match self.find_deposit(&relay.deposit_hash).await {
            Some(deposit) => deposit,
            None => {
                warn!(
                    "No deposit matches hash {} claimed by relay {:?} - fabricated relay, or a misconfigured L2 data source",
                    relay.deposit_hash, relay
                );
                return Ok(Verdict::Invalid);
            }
        };

        // 5. Fee cross-check. Exact decimal string comparison; floating-point
        // would invite precision-induced false mismatches.
        let expected_fee = self
            .l1
            .calculate_realized_lp_fee(&deposit)
            .await
            .map_err(VerdictError::FeeComputation)?;

        if expected_fee != relay.realized_lp_fee_pct {
            warn!(
                "Relay {} claims LP fee {} but expected fee is {}; relay: {:?}",
                relay.relay_id, relay.realized_lp_fee_pct, expected_fee, relay
            );
            return Ok(Verdict::Invalid);
        }

        // 6. Every rule passed.
        Ok(Verdict::Valid)
    }

    /// Refreshes both collaborators concurrently, then swaps the deposit
    /// snapshot wholesale.
    ///
    /// The two refreshes may complete in either order, but both must succeed
    /// before the snapshot is replaced. If either fails the whole operation
    /// fails and the previous snapshot stays in place, so readers never see a
    /// half-updated state.
    async fn update(&self) -> Result<(), RefreshError> {
        tokio::try_join!(self.l1.refresh(), self.l2.refresh()).map_err(RefreshError)?;

        let fresh = self.l2.all_deposits().await;
        let mut deposits = self.deposits.write().await;
        *deposits = fresh;

        Ok(())
    }

    fn decimals(&self) -> u8 {
        Verdict::DECIMALS
    }
}
