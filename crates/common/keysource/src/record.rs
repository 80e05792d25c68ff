use alloy_primitives::B256;
use cinder_bls::PubKey;

/// One validator to seed into the genesis registry, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRecord {
    pub pubkey: PubKey,
    pub withdrawal_credentials: B256,
    /// Starting balance in Gwei.
    pub balance: u64,
}
