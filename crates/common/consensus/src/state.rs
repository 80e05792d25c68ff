use std::sync::Arc;

use alloy_primitives::B256;
use ssz::Encode;
use ssz_types::{VariableList, typenum::U1099511627776};
use tree_hash::TreeHash;

use crate::{
    altair, beacon_block_header::BeaconBlockHeader, bellatrix, capella, deneb, electra,
    eth_1_data::Eth1Data, fork::Fork, fork_name::ForkName, phase0, sync_committee::SyncCommittee,
    validator::Validator,
};

/// A beacon state at any supported fork.
///
/// The set of variants is closed: adding a fork means adding a variant here
/// and extending the dispatch arms, never downcasting at runtime.
#[derive(Debug, PartialEq, Clone)]
pub enum BeaconState {
    Phase0(phase0::BeaconState),
    Altair(altair::BeaconState),
    Bellatrix(bellatrix::BeaconState),
    Capella(capella::BeaconState),
    Deneb(deneb::BeaconState),
    Electra(electra::BeaconState),
}

/// Run `$body` with `$state` bound to the fork-specific inner state.
///
/// The body is expanded once per variant, so it may only touch fields and
/// methods every fork's state shares.
#[macro_export]
macro_rules! map_beacon_state {
    ($value:expr, $state:ident, $body:expr) => {
        match $value {
            $crate::BeaconState::Phase0($state) => $body,
            $crate::BeaconState::Altair($state) => $body,
            $crate::BeaconState::Bellatrix($state) => $body,
            $crate::BeaconState::Capella($state) => $body,
            $crate::BeaconState::Deneb($state) => $body,
            $crate::BeaconState::Electra($state) => $body,
        }
    };
}

impl BeaconState {
    pub fn fork_name(&self) -> ForkName {
        match self {
            BeaconState::Phase0(_) => ForkName::Phase0,
            BeaconState::Altair(_) => ForkName::Altair,
            BeaconState::Bellatrix(_) => ForkName::Bellatrix,
            BeaconState::Capella(_) => ForkName::Capella,
            BeaconState::Deneb(_) => ForkName::Deneb,
            BeaconState::Electra(_) => ForkName::Electra,
        }
    }

    pub fn genesis_time(&self) -> u64 {
        map_beacon_state!(self, state, state.genesis_time)
    }

    pub fn genesis_validators_root(&self) -> B256 {
        map_beacon_state!(self, state, state.genesis_validators_root)
    }

    pub fn fork(&self) -> &Fork {
        map_beacon_state!(self, state, &state.fork)
    }

    pub fn latest_block_header(&self) -> &BeaconBlockHeader {
        map_beacon_state!(self, state, &state.latest_block_header)
    }

    pub fn eth1_data(&self) -> &Eth1Data {
        map_beacon_state!(self, state, &state.eth1_data)
    }

    pub fn eth1_deposit_index(&self) -> u64 {
        map_beacon_state!(self, state, state.eth1_deposit_index)
    }

    pub fn validators(&self) -> &VariableList<Validator, U1099511627776> {
        map_beacon_state!(self, state, &state.validators)
    }

    pub fn balances(&self) -> &VariableList<u64, U1099511627776> {
        map_beacon_state!(self, state, &state.balances)
    }

    pub fn randao_mix(&self, index: usize) -> Option<B256> {
        map_beacon_state!(self, state, state.randao_mixes.get(index).copied())
    }

    /// The current sync committee, absent before Altair.
    pub fn current_sync_committee(&self) -> Option<&Arc<SyncCommittee>> {
        match self {
            BeaconState::Phase0(_) => None,
            BeaconState::Altair(state) => Some(&state.current_sync_committee),
            BeaconState::Bellatrix(state) => Some(&state.current_sync_committee),
            BeaconState::Capella(state) => Some(&state.current_sync_committee),
            BeaconState::Deneb(state) => Some(&state.current_sync_committee),
            BeaconState::Electra(state) => Some(&state.current_sync_committee),
        }
    }

    /// The next sync committee, absent before Altair.
    pub fn next_sync_committee(&self) -> Option<&Arc<SyncCommittee>> {
        match self {
            BeaconState::Phase0(_) => None,
            BeaconState::Altair(state) => Some(&state.next_sync_committee),
            BeaconState::Bellatrix(state) => Some(&state.next_sync_committee),
            BeaconState::Capella(state) => Some(&state.next_sync_committee),
            BeaconState::Deneb(state) => Some(&state.next_sync_committee),
            BeaconState::Electra(state) => Some(&state.next_sync_committee),
        }
    }

    /// Canonical SSZ encoding of the inner state, without a variant prefix.
    pub fn as_ssz_bytes(&self) -> Vec<u8> {
        map_beacon_state!(self, state, state.as_ssz_bytes())
    }

    pub fn ssz_bytes_len(&self) -> usize {
        map_beacon_state!(self, state, state.ssz_bytes_len())
    }

    pub fn tree_hash_root(&self) -> B256 {
        map_beacon_state!(self, state, state.tree_hash_root())
    }
}
