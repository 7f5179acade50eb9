//! Shared test helpers for unit tests
//!
//! This module provides helper functions used by the test suites:
//! - **Constants**: Dummy hashes, addresses, and fee values
//! - **Record Builders**: Functions to create default relay and deposit records
//! - **Mock Collaborators**: In-memory implementations of the L1/L2 capability
//!   traits with switchable failure modes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use relay_verifier::ancillary;
use relay_verifier::l1_client::RelayRecord;
use relay_verifier::l2_client::DepositRecord;
use relay_verifier::validator::{DepositStateSource, RelayStateSource, RelayValidator};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy relay hash as it appears decoded from ancillary data (bare hex)
pub const DUMMY_RELAY_HASH: &str =
    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Dummy deposit hash linking relay and deposit (0x-prefixed)
pub const DUMMY_DEPOSIT_HASH: &str =
    "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Relay hash with no matching L1 record
#[allow(dead_code)]
pub const UNMATCHED_RELAY_HASH: &str =
    "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

/// Dummy L1 recipient address (EVM format, 20 bytes)
pub const DUMMY_L1_RECIPIENT: &str = "0x00000000000000000000000000000000000000a1";

/// Dummy L2 sender address (EVM format, 20 bytes)
pub const DUMMY_L2_SENDER: &str = "0x00000000000000000000000000000000000000b2";

/// Dummy slow relayer address (EVM format, 20 bytes)
pub const DUMMY_SLOW_RELAYER: &str = "0x00000000000000000000000000000000000000c3";

/// Realized LP fee of 0.1 in 18-decimal fixed point
pub const DUMMY_LP_FEE: &str = "100000000000000000";

/// A different LP fee of 0.2 in 18-decimal fixed point
#[allow(dead_code)]
pub const MISMATCHED_LP_FEE: &str = "200000000000000000";

// ============================================================================
// RECORD BUILDERS
// ============================================================================

/// Creates a pending, non-settleable relay claiming the dummy deposit.
#[allow(dead_code)]
pub fn create_default_relay() -> RelayRecord {
    RelayRecord {
        relay_id: 1,
        relay_ancillary_data_hash: format!("0x{}", DUMMY_RELAY_HASH),
        deposit_hash: DUMMY_DEPOSIT_HASH.to_string(),
        settleable: false,
        realized_lp_fee_pct: DUMMY_LP_FEE.to_string(),
        slow_relayer: DUMMY_SLOW_RELAYER.to_string(),
    }
}

/// Creates a deposit matching the default relay's deposit hash.
///
/// The hash field is asserted by the validator through string comparison
/// only, so tests may use the dummy constant rather than the computed value.
#[allow(dead_code)]
pub fn create_default_deposit() -> DepositRecord {
    DepositRecord {
        chain_id: 10,
        deposit_id: 7,
        l1_recipient: DUMMY_L1_RECIPIENT.to_string(),
        l2_sender: DUMMY_L2_SENDER.to_string(),
        amount: "1000000000000000000".to_string(),
        slow_relay_fee_pct: "10000000000000000".to_string(),
        instant_relay_fee_pct: "10000000000000000".to_string(),
        quote_timestamp: 1_600_000_000,
        deposit_hash: DUMMY_DEPOSIT_HASH.to_string(),
    }
}

/// Encodes ancillary-data bytes naming the given relay hash.
#[allow(dead_code)]
pub fn relay_ancillary_bytes(relay_hash: &str) -> Vec<u8> {
    ancillary::encode([
        ("relayHash", relay_hash),
        ("ooRequester", DUMMY_SLOW_RELAYER),
    ])
}

// ============================================================================
// MOCK COLLABORATORS
// ============================================================================

/// In-memory L1 collaborator with switchable refresh and fee failure modes.
#[allow(dead_code)]
pub struct MockRelaySource {
    relays: RwLock<Vec<RelayRecord>>,
    fee: RwLock<Result<String, String>>,
    fail_refresh: AtomicBool,
}

impl MockRelaySource {
    #[allow(dead_code)]
    pub fn new(relays: Vec<RelayRecord>, fee: &str) -> Self {
        Self {
            relays: RwLock::new(relays),
            fee: RwLock::new(Ok(fee.to_string())),
            fail_refresh: AtomicBool::new(false),
        }
    }

    /// Replaces the fee the mock will return for any deposit.
    #[allow(dead_code)]
    pub async fn set_fee(&self, fee: &str) {
        *self.fee.write().await = Ok(fee.to_string());
    }

    /// Makes the fee computation fail with the given message.
    #[allow(dead_code)]
    pub async fn fail_fee(&self, message: &str) {
        *self.fee.write().await = Err(message.to_string());
    }

    /// Makes every subsequent refresh fail.
    #[allow(dead_code)]
    pub fn fail_refresh(&self) {
        self.fail_refresh.store(true, Ordering::SeqCst);
    }
}

impl RelayStateSource for MockRelaySource {
    async fn refresh(&self) -> Result<()> {
        if self.fail_refresh.load(Ordering::SeqCst) {
            anyhow::bail!("mock L1 refresh failure");
        }
        Ok(())
    }

    async fn pending_relays(&self) -> Vec<RelayRecord> {
        self.relays.read().await.clone()
    }

    async fn calculate_realized_lp_fee(&self, _deposit: &DepositRecord) -> Result<String> {
        match &*self.fee.read().await {
            Ok(fee) => Ok(fee.clone()),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

/// In-memory L2 collaborator with a switchable refresh failure mode.
#[allow(dead_code)]
pub struct MockDepositSource {
    deposits: RwLock<Vec<DepositRecord>>,
    fail_refresh: AtomicBool,
}

impl MockDepositSource {
    #[allow(dead_code)]
    pub fn new(deposits: Vec<DepositRecord>) -> Self {
        Self {
            deposits: RwLock::new(deposits),
            fail_refresh: AtomicBool::new(false),
        }
    }

    /// Replaces the deposit set the mock serves on the next refresh.
    #[allow(dead_code)]
    pub async fn set_deposits(&self, deposits: Vec<DepositRecord>) {
        *self.deposits.write().await = deposits;
    }

    /// Makes every subsequent refresh fail.
    #[allow(dead_code)]
    pub fn fail_refresh(&self) {
        self.fail_refresh.store(true, Ordering::SeqCst);
    }
}

impl DepositStateSource for MockDepositSource {
    async fn refresh(&self) -> Result<()> {
        if self.fail_refresh.load(Ordering::SeqCst) {
            anyhow::bail!("mock L2 refresh failure");
        }
        Ok(())
    }

    async fn all_deposits(&self) -> Vec<DepositRecord> {
        self.deposits.read().await.clone()
    }
}

// ============================================================================
// VALIDATOR BUILDERS
// ============================================================================

/// Builds a validator over mock collaborators, without refreshing it.
///
/// Returns the collaborator handles alongside the validator so tests can
/// steer their failure modes.
#[allow(dead_code)]
pub fn build_unrefreshed_validator(
    relays: Vec<RelayRecord>,
    deposits: Vec<DepositRecord>,
    fee: &str,
) -> (
    Arc<MockRelaySource>,
    Arc<MockDepositSource>,
    RelayValidator<MockRelaySource, MockDepositSource>,
) {
    let l1 = Arc::new(MockRelaySource::new(relays, fee));
    let l2 = Arc::new(MockDepositSource::new(deposits));
    let validator = RelayValidator::new(l1.clone(), l2.clone());
    (l1, l2, validator)
}

/// Builds a validator over mock collaborators and performs one refresh so the
/// deposit snapshot is populated.
#[allow(dead_code)]
pub async fn build_test_validator(
    relays: Vec<RelayRecord>,
    deposits: Vec<DepositRecord>,
    fee: &str,
) -> (
    Arc<MockRelaySource>,
    Arc<MockDepositSource>,
    RelayValidator<MockRelaySource, MockDepositSource>,
) {
    use relay_verifier::validator::PriceAdjudicator;

    let (l1, l2, validator) = build_unrefreshed_validator(relays, deposits, fee);
    validator
        .update()
        .await
        .expect("initial refresh over mocks should succeed");
    (l1, l2, validator)
}
