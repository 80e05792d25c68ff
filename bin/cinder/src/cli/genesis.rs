use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy_primitives::{Address, B256};
use anyhow::Context;
use cinder_consensus::fork_name::ForkName;
use cinder_eth1::Eth1Source;
use cinder_genesis::{GenesisInputs, build_genesis_state, writer::write_state};
use cinder_keysource::load_validator_keys;
use cinder_network_spec::{NetworkSpec, preset_from_name};
use clap::Parser;
use tracing::info;
use url::Url;

const DEFAULT_FORK: &str = "deneb";
const DEFAULT_PRESET: &str = "mainnet";
const DEFAULT_STATE_OUTPUT: &str = "genesis.ssz";

#[derive(Debug, Parser)]
pub struct GenesisConfig {
    /// Verbosity level
    #[arg(short, long, default_value_t = 2)]
    pub verbosity: u8,

    #[arg(long, help = "Consensus fork to anchor the state at", default_value = DEFAULT_FORK)]
    pub fork: ForkName,

    #[arg(long, help = "Captured eth1 block JSON (raw or wrapped in a JSON-RPC response)")]
    pub eth1_block_file: Option<PathBuf>,

    #[arg(long, help = "Execution-layer JSON-RPC endpoint to fetch the latest block from")]
    pub eth1_rpc: Option<Url>,

    #[arg(long, help = "Execution-layer genesis config to derive the genesis block from")]
    pub eth1_config: Option<PathBuf>,

    #[arg(long, help = "Bare eth1 block hash, for a pre-transition genesis")]
    pub eth1_block_hash: Option<B256>,

    #[arg(long, help = "Eth1 block timestamp, defaults to the current time")]
    pub timestamp: Option<u64>,

    #[arg(
        long,
        help = "Use the execution-layer genesis time as the beacon genesis time. Overrides other genesis time settings."
    )]
    pub eth1_match_genesis_time: bool,

    #[arg(long, help = "YAML file of mnemonics and per-mnemonic validator counts")]
    pub mnemonics: Option<PathBuf>,

    #[arg(long, help = "YAML file of externally supplied validators")]
    pub additional_validators: Option<PathBuf>,

    #[arg(long, help = "Directory to write per-tranche pubkey listings into")]
    pub tranches_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Use this execution-layer address for the withdrawal credentials of every derived validator"
    )]
    pub eth1_withdrawal_address: Option<Address>,

    #[arg(
        long,
        help = "Replace every balance and the activation threshold with this value, in Gwei. 0 keeps the fork defaults.",
        default_value_t = 0
    )]
    pub max_effective_balance: u64,

    #[arg(long, help = "Chain spec YAML, overrides --preset")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Choose mainnet, sepolia, hoodi, or dev", default_value = DEFAULT_PRESET)]
    pub preset: String,

    #[arg(long, help = "Where to write the SSZ-encoded state", default_value = DEFAULT_STATE_OUTPUT)]
    pub state_output: PathBuf,
}

impl GenesisConfig {
    pub async fn run(self) -> anyhow::Result<()> {
        let spec = match &self.config {
            Some(path) => NetworkSpec::from_file(path)?,
            None => preset_from_name(&self.preset)?,
        };

        let timestamp = match self.timestamp {
            Some(timestamp) => timestamp,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("System clock is before the unix epoch")?
                .as_secs(),
        };
        let eth1 = Eth1Source::from_options(
            self.eth1_block_file,
            self.eth1_rpc,
            self.eth1_config,
            self.eth1_block_hash,
            timestamp,
        )?
        .resolve()
        .await?;

        let validators = load_validator_keys(
            self.mnemonics.as_deref(),
            self.additional_validators.as_deref(),
            self.tranches_dir.as_deref(),
            self.eth1_withdrawal_address,
            self.fork.max_effective_balance(),
        )?;

        let effective_balance_override =
            (self.max_effective_balance != 0).then_some(self.max_effective_balance);
        let state = build_genesis_state(&GenesisInputs {
            fork: self.fork,
            spec: &spec,
            eth1: &eth1,
            validators: &validators,
            effective_balance_override,
            match_genesis_time: self.eth1_match_genesis_time,
            cli_timestamp: timestamp,
        })?;

        write_state(&self.state_output, &state)?;
        info!(
            "genesis time {}, genesis validators root {}, fork {}",
            state.genesis_time(),
            state.genesis_validators_root(),
            state.fork_name()
        );
        Ok(())
    }
}
