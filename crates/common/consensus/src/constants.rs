use alloy_primitives::{aliases::B32, fixed_bytes};

pub const DEPOSIT_CONTRACT_TREE_DEPTH: u64 = 32;
pub const DOMAIN_SYNC_COMMITTEE: B32 = fixed_bytes!("0x07000000");
pub const EFFECTIVE_BALANCE_INCREMENT: u64 = 1_000_000_000;
pub const EPOCHS_PER_HISTORICAL_VECTOR: u64 = 65536;
pub const EPOCHS_PER_SLASHINGS_VECTOR: u64 = 8192;
pub const FAR_FUTURE_EPOCH: u64 = 18446744073709551615;
pub const GENESIS_EPOCH: u64 = 0;
pub const GENESIS_SLOT: u64 = 0;
pub const JUSTIFICATION_BITS_LENGTH: usize = 4;
pub const MAX_EXTRA_DATA_BYTES: usize = 32;
pub const MAX_RANDOM_BYTE: u64 = 255;
pub const MAX_RANDOM_VALUE: u64 = 65535;
pub const SHUFFLE_ROUND_COUNT: u8 = 90;
pub const SLOTS_PER_EPOCH: u64 = 32;
pub const SLOTS_PER_HISTORICAL_ROOT: u64 = 8192;
pub const SYNC_COMMITTEE_SIZE: u64 = 512;

// Gwei values
pub const MAX_EFFECTIVE_BALANCE: u64 = 32_000_000_000;
pub const MAX_EFFECTIVE_BALANCE_ELECTRA: u64 = 2_048_000_000_000;
pub const MIN_ACTIVATION_BALANCE: u64 = 32_000_000_000;

// Withdrawal prefixes
pub const BLS_WITHDRAWAL_PREFIX: &[u8] = &[0];
pub const COMPOUNDING_WITHDRAWAL_PREFIX: &[u8] = &[2];
pub const ETH1_ADDRESS_WITHDRAWAL_PREFIX: &[u8] = &[1];

// Misc
pub const UNSET_DEPOSIT_REQUESTS_START_INDEX: u64 = u64::MAX;

// State list lengths
pub const PENDING_CONSOLIDATIONS_LIMIT: u64 = 262_144;
pub const PENDING_PARTIAL_WITHDRAWALS_LIMIT: u64 = 134_217_728;
