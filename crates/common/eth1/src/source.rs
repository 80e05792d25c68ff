use std::path::PathBuf;

use alloy_primitives::B256;
use anyhow::bail;
use tracing::info;
use url::Url;

use crate::{block::CanonicalBlock, capture, genesis_config, rpc::Eth1Client};

/// Where the execution-layer block for genesis comes from.
///
/// When several flags are given the richest source wins: a captured block
/// file beats a live endpoint, which beats a static genesis config, which
/// beats a bare hash.
#[derive(Debug, Clone)]
pub enum Eth1Source {
    BlockFile(PathBuf),
    Rpc(Url),
    GenesisConfig(PathBuf),
    BareHash { block_hash: B256, timestamp: u64 },
}

/// The resolved execution-layer input to the genesis pipeline.
#[derive(Debug, Clone)]
pub struct Eth1Input {
    /// `None` only for the bare-hash source, which yields an empty
    /// pre-transition payload header.
    pub block: Option<CanonicalBlock>,
    pub block_hash: B256,
    pub timestamp: u64,
    /// Set when the block was derived from a static genesis config, which
    /// makes `--eth1-match-genesis-time` applicable.
    pub from_genesis_config: bool,
}

impl Eth1Source {
    /// Pick the source from the CLI flag values, by priority.
    pub fn from_options(
        block_file: Option<PathBuf>,
        rpc_url: Option<Url>,
        genesis_config: Option<PathBuf>,
        block_hash: Option<B256>,
        timestamp: u64,
    ) -> anyhow::Result<Eth1Source> {
        if let Some(path) = block_file {
            return Ok(Eth1Source::BlockFile(path));
        }
        if let Some(url) = rpc_url {
            return Ok(Eth1Source::Rpc(url));
        }
        if let Some(path) = genesis_config {
            return Ok(Eth1Source::GenesisConfig(path));
        }
        if let Some(block_hash) = block_hash {
            return Ok(Eth1Source::BareHash {
                block_hash,
                timestamp,
            });
        }
        bail!(
            "no eth1 source given: pass --eth1-block-file, --eth1-rpc, --eth1-config or --eth1-block-hash"
        )
    }

    pub async fn resolve(&self) -> anyhow::Result<Eth1Input> {
        match self {
            Eth1Source::BlockFile(path) => {
                let block = capture::load_block_file(path)?;
                info!(
                    "loaded eth1 block {} (number {}) from {}",
                    block.block_hash,
                    block.block_number,
                    path.display()
                );
                Ok(Eth1Input::from_block(block, false))
            }
            Eth1Source::Rpc(url) => {
                let block = Eth1Client::new(url.clone()).fetch_latest_block().await?;
                info!(
                    "fetched eth1 block {} (number {}) from {url}",
                    block.block_hash, block.block_number
                );
                Ok(Eth1Input::from_block(block, false))
            }
            Eth1Source::GenesisConfig(path) => {
                let block = genesis_config::load_genesis_config(path)?;
                info!(
                    "derived eth1 genesis block {} from {}",
                    block.block_hash,
                    path.display()
                );
                Ok(Eth1Input::from_block(block, true))
            }
            Eth1Source::BareHash {
                block_hash,
                timestamp,
            } => Ok(Eth1Input {
                block: None,
                block_hash: *block_hash,
                timestamp: *timestamp,
                from_genesis_config: false,
            }),
        }
    }
}

impl Eth1Input {
    fn from_block(block: CanonicalBlock, from_genesis_config: bool) -> Eth1Input {
        Eth1Input {
            block_hash: block.block_hash,
            timestamp: block.timestamp,
            block: Some(block),
            from_genesis_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::*;

    #[test]
    fn block_file_outranks_everything() {
        let source = Eth1Source::from_options(
            Some(PathBuf::from("block.json")),
            Some(Url::parse("http://localhost:8545").unwrap()),
            Some(PathBuf::from("genesis.json")),
            Some(B256::ZERO),
            0,
        )
        .unwrap();
        assert!(matches!(source, Eth1Source::BlockFile(_)));
    }

    #[test]
    fn rpc_outranks_config_and_bare_hash() {
        let source = Eth1Source::from_options(
            None,
            Some(Url::parse("http://localhost:8545").unwrap()),
            Some(PathBuf::from("genesis.json")),
            Some(B256::ZERO),
            0,
        )
        .unwrap();
        assert!(matches!(source, Eth1Source::Rpc(_)));
    }

    #[test]
    fn bare_hash_is_the_last_resort() {
        let hash = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let source = Eth1Source::from_options(None, None, None, Some(hash), 1700000000).unwrap();
        assert!(matches!(
            source,
            Eth1Source::BareHash { block_hash, timestamp: 1700000000 } if block_hash == hash
        ));
    }

    #[test]
    fn no_source_at_all_is_an_error() {
        assert!(Eth1Source::from_options(None, None, None, None, 0).is_err());
    }
}
