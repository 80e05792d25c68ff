use alloy_primitives::B256;
use anyhow::{anyhow, ensure};
use cinder_bls::{PubKey, aggregate_pubkeys};
use cinder_consensus::{
    constants::{DOMAIN_SYNC_COMMITTEE, MAX_RANDOM_BYTE, MAX_RANDOM_VALUE, SYNC_COMMITTEE_SIZE},
    fork_name::ForkName,
    misc::{bytes_to_int64, compute_shuffled_index},
    sync_committee::SyncCommittee,
    validator::Validator,
};
use ethereum_hashing::{hash, hash_fixed};
use ssz_types::FixedVector;

/// Per-run index-to-pubkey lookup, built once from the finished registry.
///
/// Committee selection resolves the same validator index many times when the
/// active set is small, so the keys are cloned out of the registry up front.
#[derive(Debug)]
pub struct PubkeyCache {
    pubkeys: Vec<PubKey>,
}

impl PubkeyCache {
    pub fn new(validators: &[Validator]) -> Self {
        PubkeyCache {
            pubkeys: validators
                .iter()
                .map(|validator| validator.pubkey.clone())
                .collect(),
        }
    }

    pub fn get(&self, index: u64) -> Option<&PubKey> {
        self.pubkeys.get(index as usize)
    }
}

/// Return the indices of the validators active at ``epoch``, in registry order.
pub fn active_validator_indices(validators: &[Validator], epoch: u64) -> Vec<u64> {
    validators
        .iter()
        .enumerate()
        .filter(|(_, validator)| validator.is_active_validator(epoch))
        .map(|(index, _)| index as u64)
        .collect()
}

/// Return the committee selection seed at ``epoch``.
pub fn sync_committee_seed(epoch: u64, randao_mix: B256) -> B256 {
    let epoch_with_index = [
        DOMAIN_SYNC_COMMITTEE.as_slice(),
        &epoch.to_le_bytes(),
        randao_mix.as_slice(),
    ]
    .concat();
    B256::from(hash_fixed(&epoch_with_index))
}

/// Return the sync committee indices, with possible duplicates.
///
/// Candidates are drawn by shuffled index over the active set and kept with
/// probability proportional to effective balance. Electra widened the random
/// value from one byte to sixteen bits.
pub fn compute_sync_committee_indices(
    validators: &[Validator],
    active_validator_indices: &[u64],
    seed: B256,
    fork: ForkName,
    max_effective_balance: u64,
) -> anyhow::Result<Vec<u64>> {
    ensure!(
        !active_validator_indices.is_empty(),
        "Cannot sample a sync committee from an empty active set"
    );
    let active_validator_count = active_validator_indices.len();
    let mut i = 0;
    let mut sync_committee_indices: Vec<u64> = vec![];
    while sync_committee_indices.len() < SYNC_COMMITTEE_SIZE as usize {
        let shuffled_index =
            compute_shuffled_index(i % active_validator_count, active_validator_count, seed)?;
        let candidate_index = active_validator_indices[shuffled_index];

        let effective_balance = validators
            .get(candidate_index as usize)
            .ok_or_else(|| anyhow!("Active index {candidate_index} is not in the registry"))?
            .effective_balance;
        let selected = if fork.uses_wide_committee_sampling() {
            let random_bytes = hash(&[seed.as_slice(), &(i / 16).to_le_bytes()].concat());
            let offset = i % 16 * 2;
            let random_value = bytes_to_int64(&random_bytes[offset..offset + 2]);
            effective_balance * MAX_RANDOM_VALUE >= max_effective_balance * random_value
        } else {
            let random_bytes = hash(&[seed.as_slice(), &(i / 32).to_le_bytes()].concat());
            let random_byte = random_bytes[i % 32];
            effective_balance * MAX_RANDOM_BYTE >= max_effective_balance * random_byte as u64
        };
        if selected {
            sync_committee_indices.push(candidate_index)
        }
        i += 1
    }

    Ok(sync_committee_indices)
}

/// Compute the genesis sync committee for the given registry.
///
/// An empty active set yields the all-zero committee rather than an error, so
/// a state can still be produced for a registry with no activated validators.
pub fn compute_sync_committee(
    validators: &[Validator],
    epoch: u64,
    randao_mix: B256,
    fork: ForkName,
    max_effective_balance: u64,
    pubkey_cache: &PubkeyCache,
) -> anyhow::Result<SyncCommittee> {
    let active = active_validator_indices(validators, epoch);
    if active.is_empty() {
        return Ok(SyncCommittee::default());
    }

    let seed = sync_committee_seed(epoch, randao_mix);
    let indices =
        compute_sync_committee_indices(validators, &active, seed, fork, max_effective_balance)?;

    let mut pubkeys = vec![];
    for index in indices {
        let pubkey = pubkey_cache
            .get(index)
            .ok_or_else(|| anyhow!("Committee index {index} is not in the pubkey cache"))?;
        pubkeys.push(pubkey.clone());
    }
    let aggregate_pubkey = aggregate_pubkeys(pubkeys.iter())
        .map_err(|err| anyhow!("Failed to aggregate the committee pubkeys: {err}"))?;

    Ok(SyncCommittee {
        pubkeys: FixedVector::from(pubkeys),
        aggregate_pubkey,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bls12_381::Scalar;
    use cinder_bls::PrivateKey;
    use cinder_consensus::constants::{GENESIS_EPOCH, MAX_EFFECTIVE_BALANCE};

    use super::*;

    fn validator(key: u64, effective_balance: u64, active: bool) -> Validator {
        let private_key = PrivateKey::from_scalar(Scalar::from(key)).expect("nonzero scalar");
        let mut validator = Validator::new(
            private_key.public_key(),
            B256::repeat_byte(0x01),
            effective_balance,
        );
        if active {
            validator.activation_eligibility_epoch = GENESIS_EPOCH;
            validator.activation_epoch = GENESIS_EPOCH;
        }
        validator
    }

    fn registry(count: u64) -> Vec<Validator> {
        (1..=count)
            .map(|key| validator(key, MAX_EFFECTIVE_BALANCE, true))
            .collect()
    }

    #[test]
    fn committee_selection_is_deterministic() {
        let validators = registry(8);
        let cache = PubkeyCache::new(&validators);
        let mix = B256::repeat_byte(0x42);
        let a = compute_sync_committee(
            &validators,
            GENESIS_EPOCH,
            mix,
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
            &cache,
        )
        .unwrap();
        let b = compute_sync_committee(
            &validators,
            GENESIS_EPOCH,
            mix,
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
            &cache,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn small_active_sets_produce_duplicates() {
        let validators = registry(4);
        let active = active_validator_indices(&validators, GENESIS_EPOCH);
        let seed = sync_committee_seed(GENESIS_EPOCH, B256::repeat_byte(0x42));
        let indices = compute_sync_committee_indices(
            &validators,
            &active,
            seed,
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
        )
        .unwrap();
        assert_eq!(indices.len(), SYNC_COMMITTEE_SIZE as usize);
        let distinct: HashSet<_> = indices.iter().collect();
        assert!(distinct.len() <= 4);
        assert!(indices.iter().all(|index| *index < 4));
    }

    #[test]
    fn inactive_validators_are_never_drawn() {
        let mut validators = registry(4);
        validators.push(validator(5, MAX_EFFECTIVE_BALANCE - 1_000_000_000, false));
        let cache = PubkeyCache::new(&validators);
        let committee = compute_sync_committee(
            &validators,
            GENESIS_EPOCH,
            B256::repeat_byte(0x42),
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
            &cache,
        )
        .unwrap();
        let excluded = &validators[4].pubkey;
        assert!(committee.pubkeys.iter().all(|pubkey| pubkey != excluded));
    }

    #[test]
    fn empty_active_set_yields_the_default_committee() {
        let validators = vec![validator(1, MAX_EFFECTIVE_BALANCE, false)];
        let cache = PubkeyCache::new(&validators);
        let committee = compute_sync_committee(
            &validators,
            GENESIS_EPOCH,
            B256::repeat_byte(0x42),
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
            &cache,
        )
        .unwrap();
        assert_eq!(committee, SyncCommittee::default());
    }

    #[test]
    fn the_aggregate_is_the_sum_of_the_selected_keys() {
        let validators = registry(4);
        let cache = PubkeyCache::new(&validators);
        let committee = compute_sync_committee(
            &validators,
            GENESIS_EPOCH,
            B256::repeat_byte(0x42),
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
            &cache,
        )
        .unwrap();
        let expected = aggregate_pubkeys(committee.pubkeys.iter()).unwrap();
        assert_eq!(committee.aggregate_pubkey, expected);
    }

    #[test]
    fn the_sampling_seed_tracks_the_randao_mix() {
        let a = sync_committee_seed(GENESIS_EPOCH, B256::repeat_byte(0x01));
        let b = sync_committee_seed(GENESIS_EPOCH, B256::repeat_byte(0x02));
        assert_ne!(a, b);
    }

    #[test]
    fn fully_funded_registries_sample_identically_across_flavors() {
        // At the maximum effective balance every candidate passes the
        // rejection test in both flavors, so the shuffled draws line up.
        let validators = registry(8);
        let active = active_validator_indices(&validators, GENESIS_EPOCH);
        let seed = sync_committee_seed(GENESIS_EPOCH, B256::repeat_byte(0x42));
        let narrow = compute_sync_committee_indices(
            &validators,
            &active,
            seed,
            ForkName::Deneb,
            MAX_EFFECTIVE_BALANCE,
        )
        .unwrap();
        let wide = compute_sync_committee_indices(
            &validators,
            &active,
            seed,
            ForkName::Electra,
            MAX_EFFECTIVE_BALANCE,
        )
        .unwrap();
        assert_eq!(narrow, wide);
    }
}
