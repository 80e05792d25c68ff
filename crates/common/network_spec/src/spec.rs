use std::{fs, path::Path, sync::LazyLock};

use alloy_primitives::{Address, address, aliases::B32, fixed_bytes};
use anyhow::{Context, anyhow};
use cinder_consensus::{
    constants::GENESIS_EPOCH, fork::Fork, fork_name::ForkName, misc::checksummed_address,
};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Sepolia,
    Hoodi,
    Dev,
    Custom(String),
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match String::deserialize(deserializer)?.as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "sepolia" => Ok(Network::Sepolia),
            "hoodi" => Ok(Network::Hoodi),
            "dev" => Ok(Network::Dev),
            custom => Ok(Network::Custom(custom.to_string())),
        }
    }
}

/// The chain-spec knobs that shape a genesis state.
///
/// Field names follow the upstream UPPERCASE config format, so any standard
/// `config.yaml` loads directly. Unknown keys are ignored.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct NetworkSpec {
    pub preset_base: String,
    #[serde(rename = "CONFIG_NAME")]
    pub network: Network,

    // Genesis
    pub min_genesis_active_validator_count: u64,
    pub min_genesis_time: u64,
    #[serde(with = "crate::b32_hex")]
    pub genesis_fork_version: B32,
    pub genesis_delay: u64,

    // Forking
    #[serde(with = "crate::b32_hex")]
    pub altair_fork_version: B32,
    pub altair_fork_epoch: u64,
    #[serde(with = "crate::b32_hex")]
    pub bellatrix_fork_version: B32,
    pub bellatrix_fork_epoch: u64,
    #[serde(with = "crate::b32_hex")]
    pub capella_fork_version: B32,
    pub capella_fork_epoch: u64,
    #[serde(with = "crate::b32_hex")]
    pub deneb_fork_version: B32,
    pub deneb_fork_epoch: u64,
    #[serde(with = "crate::b32_hex")]
    pub electra_fork_version: B32,
    pub electra_fork_epoch: u64,

    // Deposit contract
    pub deposit_chain_id: u64,
    pub deposit_network_id: u64,
    #[serde(with = "checksummed_address")]
    pub deposit_contract_address: Address,
}

impl NetworkSpec {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read chain spec file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse chain spec file {}", path.display()))
    }

    /// The version tag first used at `fork`.
    pub fn fork_version(&self, fork: ForkName) -> B32 {
        match fork {
            ForkName::Phase0 => self.genesis_fork_version,
            ForkName::Altair => self.altair_fork_version,
            ForkName::Bellatrix => self.bellatrix_fork_version,
            ForkName::Capella => self.capella_fork_version,
            ForkName::Deneb => self.deneb_fork_version,
            ForkName::Electra => self.electra_fork_version,
        }
    }

    /// The fork record a state anchored at `fork` carries at genesis.
    ///
    /// Fork history is strictly linear, so the previous version is the tag of
    /// the preceding fork; the oldest fork maps previous = current.
    pub fn fork_at_genesis(&self, fork: ForkName) -> Fork {
        let previous_version = match fork {
            ForkName::Phase0 => self.genesis_fork_version,
            ForkName::Altair => self.genesis_fork_version,
            ForkName::Bellatrix => self.altair_fork_version,
            ForkName::Capella => self.bellatrix_fork_version,
            ForkName::Deneb => self.capella_fork_version,
            ForkName::Electra => self.deneb_fork_version,
        };
        Fork {
            previous_version,
            current_version: self.fork_version(fork),
            epoch: GENESIS_EPOCH,
        }
    }
}

/// Look up a bundled preset by name.
pub fn preset_from_name(name: &str) -> anyhow::Result<NetworkSpec> {
    match name {
        "mainnet" => Ok(MAINNET.clone()),
        "sepolia" => Ok(SEPOLIA.clone()),
        "hoodi" => Ok(HOODI.clone()),
        "dev" => Ok(DEV.clone()),
        _ => Err(anyhow!("unknown network preset: {name}")),
    }
}

pub static MAINNET: LazyLock<NetworkSpec> = LazyLock::new(|| NetworkSpec {
    preset_base: "mainnet".to_string(),
    network: Network::Mainnet,
    min_genesis_active_validator_count: 16384,
    min_genesis_time: 1606824000,
    genesis_fork_version: fixed_bytes!("0x00000000"),
    genesis_delay: 604800,
    altair_fork_version: fixed_bytes!("0x01000000"),
    altair_fork_epoch: 74240,
    bellatrix_fork_version: fixed_bytes!("0x02000000"),
    bellatrix_fork_epoch: 144896,
    capella_fork_version: fixed_bytes!("0x03000000"),
    capella_fork_epoch: 194048,
    deneb_fork_version: fixed_bytes!("0x04000000"),
    deneb_fork_epoch: 269568,
    electra_fork_version: fixed_bytes!("0x05000000"),
    electra_fork_epoch: 364032,
    deposit_chain_id: 1,
    deposit_network_id: 1,
    deposit_contract_address: address!("0x00000000219ab540356cBB839Cbe05303d7705Fa"),
});

pub static SEPOLIA: LazyLock<NetworkSpec> = LazyLock::new(|| NetworkSpec {
    preset_base: "mainnet".to_string(),
    network: Network::Sepolia,
    min_genesis_active_validator_count: 1300,
    min_genesis_time: 1655647200,
    genesis_fork_version: fixed_bytes!("0x90000069"),
    genesis_delay: 86400,
    altair_fork_version: fixed_bytes!("0x90000070"),
    altair_fork_epoch: 50,
    bellatrix_fork_version: fixed_bytes!("0x90000071"),
    bellatrix_fork_epoch: 100,
    capella_fork_version: fixed_bytes!("0x90000072"),
    capella_fork_epoch: 56832,
    deneb_fork_version: fixed_bytes!("0x90000073"),
    deneb_fork_epoch: 132608,
    electra_fork_version: fixed_bytes!("0x90000074"),
    electra_fork_epoch: 222464,
    deposit_chain_id: 11155111,
    deposit_network_id: 11155111,
    deposit_contract_address: address!("0x7f02C3E3c98b133055B8B348B2Ac625669Ed295D"),
});

pub static HOODI: LazyLock<NetworkSpec> = LazyLock::new(|| NetworkSpec {
    preset_base: "mainnet".to_string(),
    network: Network::Hoodi,
    min_genesis_active_validator_count: 16384,
    min_genesis_time: 1742212800,
    genesis_fork_version: fixed_bytes!("0x10000910"),
    genesis_delay: 600,
    altair_fork_version: fixed_bytes!("0x20000910"),
    altair_fork_epoch: 0,
    bellatrix_fork_version: fixed_bytes!("0x30000910"),
    bellatrix_fork_epoch: 0,
    capella_fork_version: fixed_bytes!("0x40000910"),
    capella_fork_epoch: 0,
    deneb_fork_version: fixed_bytes!("0x50000910"),
    deneb_fork_epoch: 0,
    electra_fork_version: fixed_bytes!("0x60000910"),
    electra_fork_epoch: 2048,
    deposit_chain_id: 560048,
    deposit_network_id: 560048,
    deposit_contract_address: address!("0x00000000219ab540356cBB839Cbe05303d7705Fa"),
});

/// Local devnet defaults: every fork at epoch 0 and no genesis delay to speak
/// of, so a freshly built state is immediately usable.
pub static DEV: LazyLock<NetworkSpec> = LazyLock::new(|| NetworkSpec {
    preset_base: "mainnet".to_string(),
    network: Network::Dev,
    min_genesis_active_validator_count: 64,
    min_genesis_time: 0,
    genesis_fork_version: fixed_bytes!("0x10000000"),
    genesis_delay: 0,
    altair_fork_version: fixed_bytes!("0x20000000"),
    altair_fork_epoch: 0,
    bellatrix_fork_version: fixed_bytes!("0x30000000"),
    bellatrix_fork_epoch: 0,
    capella_fork_version: fixed_bytes!("0x40000000"),
    capella_fork_epoch: 0,
    deneb_fork_version: fixed_bytes!("0x50000000"),
    deneb_fork_epoch: 0,
    electra_fork_version: fixed_bytes!("0x60000000"),
    electra_fork_epoch: 0,
    deposit_chain_id: 1337,
    deposit_network_id: 1337,
    deposit_contract_address: address!("0x4242424242424242424242424242424242424242"),
});

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn fork_at_genesis_is_linear() {
        let spec = &*MAINNET;
        let fork = spec.fork_at_genesis(ForkName::Deneb);
        assert_eq!(fork.previous_version, spec.capella_fork_version);
        assert_eq!(fork.current_version, spec.deneb_fork_version);
        assert_eq!(fork.epoch, GENESIS_EPOCH);

        let genesis = spec.fork_at_genesis(ForkName::Phase0);
        assert_eq!(genesis.previous_version, genesis.current_version);
    }

    #[test]
    fn loads_uppercase_yaml() {
        let yaml = r#"
PRESET_BASE: "mainnet"
CONFIG_NAME: "testnet-7"
MIN_GENESIS_ACTIVE_VALIDATOR_COUNT: 4
MIN_GENESIS_TIME: 1700000000
GENESIS_FORK_VERSION: 0x10000038
GENESIS_DELAY: 300
ALTAIR_FORK_VERSION: 0x20000038
ALTAIR_FORK_EPOCH: 0
BELLATRIX_FORK_VERSION: 0x30000038
BELLATRIX_FORK_EPOCH: 0
CAPELLA_FORK_VERSION: 0x40000038
CAPELLA_FORK_EPOCH: 0
DENEB_FORK_VERSION: 0x50000038
DENEB_FORK_EPOCH: 0
ELECTRA_FORK_VERSION: 0x60000038
ELECTRA_FORK_EPOCH: 0
DEPOSIT_CHAIN_ID: 1337
DEPOSIT_NETWORK_ID: 1337
DEPOSIT_CONTRACT_ADDRESS: 0x4242424242424242424242424242424242424242
SECONDS_PER_SLOT: 12
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let spec = NetworkSpec::from_file(file.path()).unwrap();
        assert_eq!(spec.network, Network::Custom("testnet-7".to_string()));
        assert_eq!(spec.min_genesis_active_validator_count, 4);
        assert_eq!(
            spec.fork_version(ForkName::Electra),
            fixed_bytes!("0x60000038")
        );
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(preset_from_name("badnet").is_err());
        assert_eq!(preset_from_name("mainnet").unwrap(), *MAINNET);
    }
}
