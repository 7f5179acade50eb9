//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_test_validator, build_unrefreshed_validator, create_default_deposit,
    create_default_relay, relay_ancillary_bytes, MockDepositSource, MockRelaySource,
    DUMMY_DEPOSIT_HASH, DUMMY_L1_RECIPIENT, DUMMY_L2_SENDER, DUMMY_LP_FEE, DUMMY_RELAY_HASH,
    DUMMY_SLOW_RELAYER, MISMATCHED_LP_FEE, UNMATCHED_RELAY_HASH,
};
