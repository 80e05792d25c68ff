use std::sync::Arc;

use alloy_primitives::B256;
use anyhow::{anyhow, ensure};
use cinder_consensus::{
    BeaconState, altair,
    beacon_block_header::BeaconBlockHeader,
    bellatrix, capella,
    constants::{EPOCHS_PER_HISTORICAL_VECTOR, GENESIS_EPOCH, UNSET_DEPOSIT_REQUESTS_START_INDEX},
    deneb, electra,
    eth_1_data::Eth1Data,
    fork_name::ForkName,
    phase0,
    sync_committee::SyncCommittee,
};
use cinder_eth1::Eth1Input;
use cinder_keysource::ValidatorRecord;
use cinder_network_spec::NetworkSpec;
use ssz_types::{
    FixedVector, VariableList,
    typenum::{U1099511627776, U4294967296},
};
use tracing::{info, warn};
use tree_hash::TreeHash;

use crate::{
    payload_header,
    registry::{self, AssembledRegistry},
    sync_committee::{PubkeyCache, compute_sync_committee},
};

/// Everything the genesis state depends on, gathered before any state field
/// is written.
#[derive(Debug)]
pub struct GenesisInputs<'a> {
    pub fork: ForkName,
    pub spec: &'a NetworkSpec,
    pub eth1: &'a Eth1Input,
    pub validators: &'a [ValidatorRecord],
    /// Positive value replaces every balance and the activation threshold.
    pub effective_balance_override: Option<u64>,
    /// Take the beacon genesis time from the execution-layer genesis config.
    pub match_genesis_time: bool,
    /// Fallback genesis time when neither the config nor the chain spec
    /// provides one.
    pub cli_timestamp: u64,
}

/// Root of the empty deposit tree, committed by the genesis `Eth1Data`.
fn empty_deposit_root() -> B256 {
    VariableList::<B256, U4294967296>::default().tree_hash_root()
}

/// Pick the pre-delay genesis timestamp.
///
/// A genesis config with `--eth1-match-genesis-time` wins, then a nonzero
/// `MIN_GENESIS_TIME` from the chain spec, then the CLI timestamp.
fn genesis_timestamp(inputs: &GenesisInputs) -> u64 {
    if inputs.match_genesis_time && inputs.eth1.from_genesis_config {
        return inputs.eth1.timestamp;
    }
    if inputs.spec.min_genesis_time != 0 {
        info!(
            "using MIN_GENESIS_TIME {} from the chain spec as the genesis timestamp",
            inputs.spec.min_genesis_time
        );
        return inputs.spec.min_genesis_time;
    }
    inputs.cli_timestamp
}

/// The key sources are measured as a whole against the configured minimum,
/// funded or not.
fn meets_minimum_validator_count(total: usize, minimum: u64) -> bool {
    total as u64 >= minimum
}

fn zeroed_participation(count: usize) -> anyhow::Result<VariableList<u8, U1099511627776>> {
    VariableList::new(vec![0; count])
        .map_err(|err| anyhow!("Participation list over capacity: {err:?}"))
}

fn zeroed_inactivity_scores(count: usize) -> anyhow::Result<VariableList<u64, U1099511627776>> {
    VariableList::new(vec![0; count])
        .map_err(|err| anyhow!("Inactivity score list over capacity: {err:?}"))
}

/// Build the complete genesis state for the requested fork.
///
/// The state is assembled in one pass and returned by value; the caller only
/// ever sees the finished product.
pub fn build_genesis_state(inputs: &GenesisInputs) -> anyhow::Result<BeaconState> {
    let genesis_time = genesis_timestamp(inputs) + inputs.spec.genesis_delay;
    let fork = inputs.spec.fork_at_genesis(inputs.fork);

    let AssembledRegistry {
        validators,
        balances,
        genesis_validators_root,
        active_count,
    } = registry::assemble(
        inputs.validators,
        inputs.fork,
        inputs.effective_balance_override,
    )?;
    if !meets_minimum_validator_count(
        validators.len(),
        inputs.spec.min_genesis_active_validator_count,
    ) {
        warn!(
            "not enough validators for genesis: key sources sum up to {}, but {} are needed",
            validators.len(),
            inputs.spec.min_genesis_active_validator_count
        );
    }

    let eth1_data = Eth1Data {
        deposit_root: empty_deposit_root(),
        deposit_count: 0,
        block_hash: inputs.eth1.block_hash,
    };
    let latest_block_header = BeaconBlockHeader {
        body_root: inputs.fork.empty_body_root(),
        ..BeaconBlockHeader::default()
    };
    // All of RANDAO history is seeded from the eth1 block hash.
    let randao_mixes: FixedVector<B256, _> = FixedVector::from(vec![
        inputs.eth1.block_hash;
        EPOCHS_PER_HISTORICAL_VECTOR
            as usize
    ]);

    // The same committee serves as current and next at genesis.
    let sync_committee = if inputs.fork.supports_sync_committee() {
        let pubkey_cache = PubkeyCache::new(&validators);
        let max_effective_balance = inputs
            .effective_balance_override
            .unwrap_or(inputs.fork.max_effective_balance());
        Arc::new(compute_sync_committee(
            &validators,
            GENESIS_EPOCH,
            inputs.eth1.block_hash,
            inputs.fork,
            max_effective_balance,
            &pubkey_cache,
        )?)
    } else {
        Arc::new(SyncCommittee::default())
    };

    let validator_count = validators.len();
    let state = match inputs.fork {
        ForkName::Phase0 => BeaconState::Phase0(phase0::BeaconState {
            genesis_time,
            genesis_validators_root,
            fork,
            latest_block_header,
            eth1_data,
            validators,
            balances,
            randao_mixes,
            ..phase0::BeaconState::default()
        }),
        ForkName::Altair => BeaconState::Altair(altair::BeaconState {
            genesis_time,
            genesis_validators_root,
            fork,
            latest_block_header,
            eth1_data,
            validators,
            balances,
            randao_mixes,
            previous_epoch_participation: zeroed_participation(validator_count)?,
            current_epoch_participation: zeroed_participation(validator_count)?,
            inactivity_scores: zeroed_inactivity_scores(validator_count)?,
            current_sync_committee: sync_committee.clone(),
            next_sync_committee: sync_committee,
            ..altair::BeaconState::default()
        }),
        ForkName::Bellatrix => BeaconState::Bellatrix(bellatrix::BeaconState {
            genesis_time,
            genesis_validators_root,
            fork,
            latest_block_header,
            eth1_data,
            validators,
            balances,
            randao_mixes,
            previous_epoch_participation: zeroed_participation(validator_count)?,
            current_epoch_participation: zeroed_participation(validator_count)?,
            inactivity_scores: zeroed_inactivity_scores(validator_count)?,
            current_sync_committee: sync_committee.clone(),
            next_sync_committee: sync_committee,
            latest_execution_payload_header: match &inputs.eth1.block {
                Some(block) => payload_header::bellatrix_header(block)?,
                None => bellatrix::ExecutionPayloadHeader::default(),
            },
            ..bellatrix::BeaconState::default()
        }),
        ForkName::Capella => BeaconState::Capella(capella::BeaconState {
            genesis_time,
            genesis_validators_root,
            fork,
            latest_block_header,
            eth1_data,
            validators,
            balances,
            randao_mixes,
            previous_epoch_participation: zeroed_participation(validator_count)?,
            current_epoch_participation: zeroed_participation(validator_count)?,
            inactivity_scores: zeroed_inactivity_scores(validator_count)?,
            current_sync_committee: sync_committee.clone(),
            next_sync_committee: sync_committee,
            latest_execution_payload_header: match &inputs.eth1.block {
                Some(block) => payload_header::capella_header(block)?,
                None => capella::ExecutionPayloadHeader::default(),
            },
            ..capella::BeaconState::default()
        }),
        ForkName::Deneb => BeaconState::Deneb(deneb::BeaconState {
            genesis_time,
            genesis_validators_root,
            fork,
            latest_block_header,
            eth1_data,
            validators,
            balances,
            randao_mixes,
            previous_epoch_participation: zeroed_participation(validator_count)?,
            current_epoch_participation: zeroed_participation(validator_count)?,
            inactivity_scores: zeroed_inactivity_scores(validator_count)?,
            current_sync_committee: sync_committee.clone(),
            next_sync_committee: sync_committee,
            latest_execution_payload_header: match &inputs.eth1.block {
                Some(block) => payload_header::deneb_header(block)?,
                None => deneb::ExecutionPayloadHeader::default(),
            },
            ..deneb::BeaconState::default()
        }),
        ForkName::Electra => BeaconState::Electra(electra::BeaconState {
            genesis_time,
            genesis_validators_root,
            fork,
            latest_block_header,
            eth1_data,
            validators,
            balances,
            randao_mixes,
            previous_epoch_participation: zeroed_participation(validator_count)?,
            current_epoch_participation: zeroed_participation(validator_count)?,
            inactivity_scores: zeroed_inactivity_scores(validator_count)?,
            current_sync_committee: sync_committee.clone(),
            next_sync_committee: sync_committee,
            latest_execution_payload_header: match &inputs.eth1.block {
                Some(block) => payload_header::deneb_header(block)?,
                None => electra::ExecutionPayloadHeader::default(),
            },
            deposit_requests_start_index: UNSET_DEPOSIT_REQUESTS_START_INDEX,
            ..electra::BeaconState::default()
        }),
    };

    // No deposits happened at genesis, so the index must still be zero.
    ensure!(
        state.eth1_deposit_index() == 0,
        "expected 0 deposit index in state, got {}",
        state.eth1_deposit_index()
    );
    info!(
        "built {} genesis state: {} validators ({active_count} active), genesis time {}",
        inputs.fork,
        validator_count,
        state.genesis_time()
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, Bloom, Bytes, U256, b256};
    use bls12_381::Scalar;
    use cinder_bls::PrivateKey;
    use cinder_consensus::constants::MAX_EFFECTIVE_BALANCE;
    use cinder_eth1::CanonicalBlock;
    use cinder_network_spec::DEV;

    use super::*;

    fn record(key: u64, balance: u64) -> ValidatorRecord {
        let private_key = PrivateKey::from_scalar(Scalar::from(key)).expect("nonzero scalar");
        ValidatorRecord {
            pubkey: private_key.public_key(),
            withdrawal_credentials: B256::repeat_byte(0x01),
            balance,
        }
    }

    fn block() -> CanonicalBlock {
        CanonicalBlock {
            parent_hash: B256::ZERO,
            fee_recipient: Address::ZERO,
            state_root: b256!("0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"),
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            prev_randao: B256::ZERO,
            block_number: 0,
            gas_limit: 30_000_000,
            gas_used: 0,
            timestamp: 1_700_000_000,
            extra_data: Bytes::new(),
            base_fee_per_gas: U256::from(1_000_000_000u64),
            block_hash: b256!("0x63d5a7a8f0e163eb6ff5cd7e93cc66c5f1a543dcdbba80faeb63badd0e2ed528"),
            withdrawals: Some(vec![]),
            transactions: vec![],
            blob_gas_used: 0,
            excess_blob_gas: 0,
        }
    }

    fn config_input() -> Eth1Input {
        let block = block();
        Eth1Input {
            block_hash: block.block_hash,
            timestamp: block.timestamp,
            block: Some(block),
            from_genesis_config: true,
        }
    }

    fn inputs<'a>(
        eth1: &'a Eth1Input,
        validators: &'a [ValidatorRecord],
    ) -> GenesisInputs<'a> {
        GenesisInputs {
            fork: ForkName::Deneb,
            spec: &DEV,
            eth1,
            validators,
            effective_balance_override: None,
            match_genesis_time: true,
            cli_timestamp: 0,
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let eth1 = config_input();
        let validators: Vec<_> = (1..=4).map(|key| record(key, MAX_EFFECTIVE_BALANCE)).collect();
        let a = build_genesis_state(&inputs(&eth1, &validators)).unwrap();
        let b = build_genesis_state(&inputs(&eth1, &validators)).unwrap();
        assert_eq!(a.as_ssz_bytes(), b.as_ssz_bytes());
        assert_eq!(a.tree_hash_root(), b.tree_hash_root());
    }

    #[test]
    fn current_and_next_committee_are_the_same_value() {
        let eth1 = config_input();
        let validators: Vec<_> = (1..=4).map(|key| record(key, MAX_EFFECTIVE_BALANCE)).collect();
        let state = build_genesis_state(&inputs(&eth1, &validators)).unwrap();
        let current = state.current_sync_committee().unwrap();
        let next = state.next_sync_committee().unwrap();
        assert_eq!(current, next);
        assert_ne!(**current, SyncCommittee::default());
    }

    #[test]
    fn zero_validators_still_produce_a_state() {
        let eth1 = config_input();
        let state = build_genesis_state(&inputs(&eth1, &[])).unwrap();
        assert_eq!(state.validators().len(), 0);
        assert_eq!(state.eth1_deposit_index(), 0);
        assert_eq!(
            **state.current_sync_committee().unwrap(),
            SyncCommittee::default()
        );
        // The payload header still reflects the derived block.
        let BeaconState::Deneb(inner) = &state else {
            panic!("expected a deneb state");
        };
        assert_eq!(
            inner.latest_execution_payload_header,
            payload_header::deneb_header(&block()).unwrap()
        );
    }

    #[test]
    fn underfunded_validators_are_present_but_sidelined() {
        let eth1 = config_input();
        let validators = vec![record(1, MAX_EFFECTIVE_BALANCE - 1)];
        let state = build_genesis_state(&inputs(&eth1, &validators)).unwrap();
        assert_eq!(state.validators().len(), 1);
        assert!(!state.validators()[0].is_active_validator(GENESIS_EPOCH));
        // No active validators means the committee stays at its default.
        assert_eq!(
            **state.current_sync_committee().unwrap(),
            SyncCommittee::default()
        );
    }

    #[test]
    fn matched_genesis_time_follows_the_execution_layer() {
        let eth1 = config_input();
        let state = build_genesis_state(&inputs(&eth1, &[])).unwrap();
        // DEV has no genesis delay, so the times line up exactly.
        assert_eq!(state.genesis_time(), eth1.timestamp);
    }

    #[test]
    fn spec_genesis_time_beats_the_cli_timestamp() {
        let eth1 = config_input();
        let mut spec = DEV.clone();
        spec.min_genesis_time = 1_800_000_000;
        spec.genesis_delay = 10;
        let mut genesis_inputs = inputs(&eth1, &[]);
        genesis_inputs.spec = &spec;
        genesis_inputs.match_genesis_time = false;
        genesis_inputs.cli_timestamp = 42;
        let state = build_genesis_state(&genesis_inputs).unwrap();
        assert_eq!(state.genesis_time(), 1_800_000_000 + 10);
    }

    #[test]
    fn cli_timestamp_is_the_fallback() {
        let eth1 = config_input();
        let mut genesis_inputs = inputs(&eth1, &[]);
        genesis_inputs.match_genesis_time = false;
        genesis_inputs.cli_timestamp = 1_750_000_000;
        let state = build_genesis_state(&genesis_inputs).unwrap();
        assert_eq!(state.genesis_time(), 1_750_000_000);
    }

    #[test]
    fn bare_hash_input_yields_an_empty_payload_header() {
        let block_hash =
            b256!("0x2222222222222222222222222222222222222222222222222222222222222222");
        let eth1 = Eth1Input {
            block: None,
            block_hash,
            timestamp: 1_700_000_000,
            from_genesis_config: false,
        };
        let mut genesis_inputs = inputs(&eth1, &[]);
        genesis_inputs.match_genesis_time = false;
        genesis_inputs.cli_timestamp = 1_700_000_000;
        let state = build_genesis_state(&genesis_inputs).unwrap();
        let BeaconState::Deneb(inner) = &state else {
            panic!("expected a deneb state");
        };
        assert_eq!(
            inner.latest_execution_payload_header,
            deneb::ExecutionPayloadHeader::default()
        );
        assert_eq!(state.eth1_data().block_hash, block_hash);
        assert_eq!(state.randao_mix(0), Some(block_hash));
    }

    #[test]
    fn every_fork_produces_its_own_variant() {
        let eth1 = config_input();
        for fork in ForkName::ALL {
            let mut genesis_inputs = inputs(&eth1, &[]);
            genesis_inputs.fork = fork;
            let state = build_genesis_state(&genesis_inputs).unwrap();
            assert_eq!(state.fork_name(), fork);
            assert_eq!(state.fork().current_version, DEV.fork_version(fork));
            assert_eq!(
                state.latest_block_header().body_root,
                fork.empty_body_root()
            );
        }
    }

    #[test]
    fn underfunded_validators_still_count_toward_the_minimum() {
        // The check is on registry size, not on how many entries activate.
        assert!(meets_minimum_validator_count(1, 1));
        assert!(meets_minimum_validator_count(2, 1));
        assert!(!meets_minimum_validator_count(0, 1));
    }

    #[test]
    fn the_override_drives_activation_and_sampling() {
        let eth1 = config_input();
        let validators = vec![record(1, 1_000_000_000)];
        let mut genesis_inputs = inputs(&eth1, &validators);
        genesis_inputs.effective_balance_override = Some(7_000_000_000);
        let state = build_genesis_state(&genesis_inputs).unwrap();
        assert!(state.validators()[0].is_active_validator(GENESIS_EPOCH));
        assert_eq!(state.balances()[0], 7_000_000_000);
        // The single active validator fills the whole committee.
        let committee = state.current_sync_committee().unwrap();
        let pubkey = &state.validators()[0].pubkey;
        assert!(committee.pubkeys.iter().all(|key| key == pubkey));
    }
}
