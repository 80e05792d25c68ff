use std::cmp::min;

use alloy_primitives::B256;
use anyhow::anyhow;
use cinder_consensus::{
    constants::{EFFECTIVE_BALANCE_INCREMENT, GENESIS_EPOCH},
    fork_name::ForkName,
    validator::Validator,
};
use cinder_keysource::ValidatorRecord;
use ssz_types::{VariableList, typenum::U1099511627776};
use tree_hash::TreeHash;

/// The finalized genesis registry. `genesis_validators_root` is computed
/// from the registry only after every insertion and activation is done.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRegistry {
    pub validators: VariableList<Validator, U1099511627776>,
    pub balances: VariableList<u64, U1099511627776>,
    pub genesis_validators_root: B256,
    pub active_count: usize,
}

/// Insert the given records in input order and activate the fully funded
/// ones.
///
/// A positive `effective_balance_override` replaces both balance and
/// effective balance uniformly and becomes the activation threshold;
/// otherwise the effective balance is the record balance rounded down to an
/// increment and capped at the fork maximum, and a validator activates at
/// genesis only when it hits that maximum exactly.
pub fn assemble(
    records: &[ValidatorRecord],
    fork: ForkName,
    effective_balance_override: Option<u64>,
) -> anyhow::Result<AssembledRegistry> {
    let activation_threshold = effective_balance_override.unwrap_or(fork.max_effective_balance());

    let mut validators = Vec::with_capacity(records.len());
    let mut balances = Vec::with_capacity(records.len());
    let mut active_count = 0;
    for (index, record) in records.iter().enumerate() {
        record
            .pubkey
            .decompress()
            .map_err(|err| anyhow!("validator {index} has an invalid pubkey: {err}"))?;

        let balance = effective_balance_override.unwrap_or(record.balance);
        let effective_balance = match effective_balance_override {
            Some(effective_balance) => effective_balance,
            None => min(
                balance - balance % EFFECTIVE_BALANCE_INCREMENT,
                fork.max_effective_balance(),
            ),
        };

        let mut validator = Validator::new(
            record.pubkey.clone(),
            record.withdrawal_credentials,
            effective_balance,
        );
        if effective_balance == activation_threshold {
            validator.activation_eligibility_epoch = GENESIS_EPOCH;
            validator.activation_epoch = GENESIS_EPOCH;
            active_count += 1;
        }
        validators.push(validator);
        balances.push(balance);
    }

    let validators: VariableList<Validator, U1099511627776> = VariableList::new(validators)
        .map_err(|err| anyhow!("Validator registry over capacity: {err:?}"))?;
    let balances = VariableList::new(balances)
        .map_err(|err| anyhow!("Validator registry over capacity: {err:?}"))?;
    let genesis_validators_root = validators.tree_hash_root();

    Ok(AssembledRegistry {
        validators,
        balances,
        genesis_validators_root,
        active_count,
    })
}

#[cfg(test)]
mod tests {
    use bls12_381::Scalar;
    use cinder_bls::{PrivateKey, PubKey};
    use cinder_consensus::constants::{FAR_FUTURE_EPOCH, MAX_EFFECTIVE_BALANCE};
    use rstest::rstest;

    use super::*;

    fn record(key: u64, balance: u64) -> ValidatorRecord {
        let private_key = PrivateKey::from_scalar(Scalar::from(key)).expect("nonzero scalar");
        ValidatorRecord {
            pubkey: private_key.public_key(),
            withdrawal_credentials: B256::repeat_byte(0x01),
            balance,
        }
    }

    #[test]
    fn fully_funded_validators_activate_at_genesis() {
        let registry = assemble(&[record(1, MAX_EFFECTIVE_BALANCE)], ForkName::Deneb, None)
            .expect("valid registry");
        assert_eq!(registry.active_count, 1);
        let validator = &registry.validators[0];
        assert_eq!(validator.effective_balance, MAX_EFFECTIVE_BALANCE);
        assert_eq!(validator.activation_epoch, GENESIS_EPOCH);
        assert_eq!(validator.activation_eligibility_epoch, GENESIS_EPOCH);
    }

    #[test]
    fn one_gwei_short_stays_inactive() {
        let registry = assemble(&[record(1, MAX_EFFECTIVE_BALANCE - 1)], ForkName::Deneb, None)
            .expect("valid registry");
        assert_eq!(registry.active_count, 0);
        let validator = &registry.validators[0];
        // Rounded down a full increment, and never activated.
        assert_eq!(
            validator.effective_balance,
            MAX_EFFECTIVE_BALANCE - EFFECTIVE_BALANCE_INCREMENT
        );
        assert_eq!(validator.activation_epoch, FAR_FUTURE_EPOCH);
        // The raw balance is carried unrounded.
        assert_eq!(registry.balances[0], MAX_EFFECTIVE_BALANCE - 1);
    }

    #[test]
    fn balances_above_the_cap_are_clamped() {
        let registry = assemble(
            &[record(1, 2 * MAX_EFFECTIVE_BALANCE)],
            ForkName::Deneb,
            None,
        )
        .expect("valid registry");
        assert_eq!(registry.validators[0].effective_balance, MAX_EFFECTIVE_BALANCE);
        assert_eq!(registry.active_count, 1);
    }

    #[rstest]
    #[case::deneb(ForkName::Deneb, MAX_EFFECTIVE_BALANCE)]
    #[case::electra(ForkName::Electra, 2048_000_000_000)]
    fn the_cap_follows_the_fork(#[case] fork: ForkName, #[case] cap: u64) {
        let registry =
            assemble(&[record(1, u64::MAX / 2)], fork, None).expect("valid registry");
        assert_eq!(registry.validators[0].effective_balance, cap);
    }

    #[test]
    fn override_replaces_balance_and_threshold() {
        let override_balance = 7_000_000_000;
        let registry = assemble(
            &[record(1, MAX_EFFECTIVE_BALANCE)],
            ForkName::Deneb,
            Some(override_balance),
        )
        .expect("valid registry");
        assert_eq!(registry.balances[0], override_balance);
        assert_eq!(registry.validators[0].effective_balance, override_balance);
        // The override is the activation threshold.
        assert_eq!(registry.active_count, 1);
    }

    #[test]
    fn malformed_pubkey_fails_the_whole_assembly() {
        let mut bad = record(1, MAX_EFFECTIVE_BALANCE);
        bad.pubkey = PubKey {
            inner: ssz_types::FixedVector::from(vec![0xffu8; 48]),
        };
        let records = [record(2, MAX_EFFECTIVE_BALANCE), bad];
        let err = assemble(&records, ForkName::Deneb, None).unwrap_err().to_string();
        assert!(err.contains("validator 1"), "{err}");
    }

    #[test]
    fn root_depends_on_the_registry_contents() {
        let a = assemble(&[record(1, MAX_EFFECTIVE_BALANCE)], ForkName::Deneb, None).unwrap();
        let b = assemble(&[record(2, MAX_EFFECTIVE_BALANCE)], ForkName::Deneb, None).unwrap();
        assert_ne!(a.genesis_validators_root, b.genesis_validators_root);
    }
}
