use std::{fmt, str::FromStr};

use alloy_primitives::B256;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tree_hash::TreeHash;

use crate::constants::{MAX_EFFECTIVE_BALANCE, MAX_EFFECTIVE_BALANCE_ELECTRA};

/// The consensus forks a genesis state can be anchored at, in activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
}

impl ForkName {
    pub const ALL: [ForkName; 6] = [
        ForkName::Phase0,
        ForkName::Altair,
        ForkName::Bellatrix,
        ForkName::Capella,
        ForkName::Deneb,
        ForkName::Electra,
    ];

    /// Sync committees exist from Altair onwards.
    pub fn supports_sync_committee(&self) -> bool {
        *self >= ForkName::Altair
    }

    /// Execution payload headers exist from Bellatrix onwards.
    pub fn has_execution_payload(&self) -> bool {
        *self >= ForkName::Bellatrix
    }

    /// Electra widened the sampling domain for sync committee selection.
    pub fn uses_wide_committee_sampling(&self) -> bool {
        *self >= ForkName::Electra
    }

    /// The highest effective balance a validator can hold at this fork.
    pub fn max_effective_balance(&self) -> u64 {
        if *self >= ForkName::Electra {
            MAX_EFFECTIVE_BALANCE_ELECTRA
        } else {
            MAX_EFFECTIVE_BALANCE
        }
    }

    /// Hash tree root of this fork's empty beacon block body.
    ///
    /// The genesis latest block header commits to a body with no operations,
    /// so the root only depends on the body's shape at each fork.
    pub fn empty_body_root(&self) -> B256 {
        match self {
            ForkName::Phase0 => crate::phase0::BeaconBlockBody::default().tree_hash_root(),
            ForkName::Altair => crate::altair::BeaconBlockBody::default().tree_hash_root(),
            ForkName::Bellatrix => crate::bellatrix::BeaconBlockBody::default().tree_hash_root(),
            ForkName::Capella => crate::capella::BeaconBlockBody::default().tree_hash_root(),
            ForkName::Deneb => crate::deneb::BeaconBlockBody::default().tree_hash_root(),
            ForkName::Electra => crate::electra::BeaconBlockBody::default().tree_hash_root(),
        }
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForkName::Phase0 => "phase0",
            ForkName::Altair => "altair",
            ForkName::Bellatrix => "bellatrix",
            ForkName::Capella => "capella",
            ForkName::Deneb => "deneb",
            ForkName::Electra => "electra",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ForkName {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "phase0" => Ok(ForkName::Phase0),
            "altair" => Ok(ForkName::Altair),
            "bellatrix" | "merge" => Ok(ForkName::Bellatrix),
            "capella" => Ok(ForkName::Capella),
            "deneb" => Ok(ForkName::Deneb),
            "electra" => Ok(ForkName::Electra),
            _ => Err(anyhow!("unknown fork name: {name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_names_round_trip() {
        for fork in ForkName::ALL {
            assert_eq!(fork.to_string().parse::<ForkName>().unwrap(), fork);
        }
    }

    #[test]
    fn merge_is_an_alias_for_bellatrix() {
        assert_eq!("merge".parse::<ForkName>().unwrap(), ForkName::Bellatrix);
    }

    #[test]
    fn feature_gates_follow_activation_order() {
        assert!(!ForkName::Phase0.supports_sync_committee());
        assert!(ForkName::Altair.supports_sync_committee());
        assert!(!ForkName::Altair.has_execution_payload());
        assert!(ForkName::Bellatrix.has_execution_payload());
        assert!(!ForkName::Deneb.uses_wide_committee_sampling());
        assert!(ForkName::Electra.uses_wide_committee_sampling());
    }

    #[test]
    fn empty_body_roots_differ_across_forks() {
        // Each fork appends fields to the body, so no two roots can collide.
        let roots: Vec<_> = ForkName::ALL.iter().map(|f| f.empty_body_root()).collect();
        for (i, a) in roots.iter().enumerate() {
            for b in roots.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn deneb_and_electra_share_the_payload_shape() {
        // The bodies still differ through execution requests.
        assert_ne!(
            ForkName::Deneb.empty_body_root(),
            ForkName::Electra.empty_body_root()
        );
    }
}
