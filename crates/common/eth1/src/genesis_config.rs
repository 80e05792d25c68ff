use std::{fs, path::Path};

use alloy_consensus::{Header, constants::EMPTY_OMMER_ROOT_HASH};
use alloy_eips::{eip1559::INITIAL_BASE_FEE, eip7685::EMPTY_REQUESTS_HASH};
use alloy_genesis::Genesis;
use alloy_primitives::{B64, B256, Bloom, KECCAK256_EMPTY, U256, keccak256};
use alloy_trie::{
    EMPTY_ROOT_HASH, TrieAccount,
    root::{state_root_unhashed, storage_root_unhashed},
};
use anyhow::Context;

use crate::block::CanonicalBlock;

/// Load an execution-layer genesis config (`genesis.json`) and derive the
/// genesis block it describes.
pub fn load_genesis_config(path: &Path) -> anyhow::Result<CanonicalBlock> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read eth1 genesis config {}", path.display()))?;
    let genesis: Genesis = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse eth1 genesis config {}", path.display()))?;
    derive_genesis_block(&genesis)
}

/// Derive the genesis block per the standard execution-layer rules: state
/// root from the allocation trie, block hash from the RLP header.
pub fn derive_genesis_block(genesis: &Genesis) -> anyhow::Result<CanonicalBlock> {
    let header = genesis_header(genesis);
    let block_hash = header.hash_slow();

    // Shanghai genesis blocks declare an empty withdrawals list; earlier
    // configs have none at all.
    let withdrawals = header.withdrawals_root.map(|_| vec![]);

    Ok(CanonicalBlock {
        parent_hash: header.parent_hash,
        fee_recipient: header.beneficiary,
        state_root: header.state_root,
        receipts_root: header.receipts_root,
        logs_bloom: header.logs_bloom,
        // A genesis config carries no randao history; the mix is all zeros.
        prev_randao: B256::ZERO,
        block_number: header.number,
        gas_limit: header.gas_limit,
        gas_used: header.gas_used,
        timestamp: header.timestamp,
        extra_data: header.extra_data.clone(),
        base_fee_per_gas: U256::from(header.base_fee_per_gas.unwrap_or_default()),
        block_hash,
        withdrawals,
        transactions: vec![],
        blob_gas_used: header
            .blob_gas_used
            .context("eth1 genesis config predates Cancun, blobGasUsed is unavailable")?,
        excess_blob_gas: header
            .excess_blob_gas
            .context("eth1 genesis config predates Cancun, excessBlobGas is unavailable")?,
    })
}

fn genesis_header(genesis: &Genesis) -> Header {
    let state_root = state_root_unhashed(genesis.alloc.iter().map(|(address, account)| {
        let storage_root = account
            .storage
            .as_ref()
            .map(|storage| {
                storage_root_unhashed(
                    storage
                        .iter()
                        .filter(|(_, value)| !value.is_zero())
                        .map(|(slot, value)| (*slot, U256::from_be_bytes(value.0))),
                )
            })
            .unwrap_or(EMPTY_ROOT_HASH);
        let code_hash = account
            .code
            .as_ref()
            .map(keccak256)
            .unwrap_or(KECCAK256_EMPTY);
        (
            *address,
            TrieAccount {
                nonce: account.nonce.unwrap_or_default(),
                balance: account.balance,
                storage_root,
                code_hash,
            },
        )
    }));

    let number = genesis.number.unwrap_or_default();
    let is_london = genesis.config.is_london_active_at_block(number);
    let is_shanghai = genesis
        .config
        .is_shanghai_active_at_block_and_timestamp(number, genesis.timestamp);
    let is_cancun = genesis
        .config
        .is_cancun_active_at_block_and_timestamp(number, genesis.timestamp);
    let is_prague = genesis
        .config
        .prague_time
        .is_some_and(|prague_time| prague_time <= genesis.timestamp);

    let base_fee_per_gas = is_london.then(|| {
        genesis
            .base_fee_per_gas
            .map(|base_fee| base_fee as u64)
            .unwrap_or(INITIAL_BASE_FEE)
    });

    Header {
        parent_hash: B256::ZERO,
        ommers_hash: EMPTY_OMMER_ROOT_HASH,
        beneficiary: genesis.coinbase,
        state_root,
        transactions_root: EMPTY_ROOT_HASH,
        receipts_root: EMPTY_ROOT_HASH,
        logs_bloom: Bloom::ZERO,
        difficulty: genesis.difficulty,
        number,
        gas_limit: genesis.gas_limit,
        gas_used: 0,
        timestamp: genesis.timestamp,
        extra_data: genesis.extra_data.clone(),
        mix_hash: genesis.mix_hash,
        nonce: B64::from(genesis.nonce),
        base_fee_per_gas,
        withdrawals_root: is_shanghai.then_some(EMPTY_ROOT_HASH),
        blob_gas_used: is_cancun.then(|| genesis.blob_gas_used.unwrap_or_default()),
        excess_blob_gas: is_cancun.then(|| genesis.excess_blob_gas.unwrap_or_default()),
        parent_beacon_block_root: is_cancun.then_some(B256::ZERO),
        requests_hash: is_prague.then_some(EMPTY_REQUESTS_HASH),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const GENESIS_JSON: &str = r#"{
        "config": {
            "chainId": 1337,
            "homesteadBlock": 0,
            "eip150Block": 0,
            "eip155Block": 0,
            "eip158Block": 0,
            "byzantiumBlock": 0,
            "constantinopleBlock": 0,
            "petersburgBlock": 0,
            "istanbulBlock": 0,
            "berlinBlock": 0,
            "londonBlock": 0,
            "mergeNetsplitBlock": 0,
            "shanghaiTime": 0,
            "cancunTime": 0,
            "terminalTotalDifficulty": 0,
            "terminalTotalDifficultyPassed": true
        },
        "nonce": "0x0",
        "timestamp": "0x659b9720",
        "extraData": "0x",
        "gasLimit": "0x1c9c380",
        "difficulty": "0x0",
        "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
        "coinbase": "0x0000000000000000000000000000000000000000",
        "alloc": {
            "0x0000000000000000000000000000000000000001": { "balance": "0xde0b6b3a7640000" }
        }
    }"#;

    fn load(json: &str) -> anyhow::Result<CanonicalBlock> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        load_genesis_config(file.path())
    }

    #[test]
    fn derives_a_cancun_genesis_block() {
        let block = load(GENESIS_JSON).unwrap();
        assert_eq!(block.block_number, 0);
        assert_eq!(block.parent_hash, B256::ZERO);
        assert_eq!(block.prev_randao, B256::ZERO);
        assert_eq!(block.base_fee_per_gas, U256::from(INITIAL_BASE_FEE));
        // Shanghai is active, so the block declares an empty withdrawals list.
        assert_eq!(block.withdrawals, Some(vec![]));
        assert_eq!(block.blob_gas_used, 0);
        // The allocation must show up in the state root.
        assert_ne!(block.state_root, EMPTY_ROOT_HASH);
        assert_ne!(block.block_hash, B256::ZERO);
    }

    #[test]
    fn state_root_tracks_the_allocation() {
        let block = load(GENESIS_JSON).unwrap();
        let other = load(&GENESIS_JSON.replace(
            "0x0000000000000000000000000000000000000001",
            "0x0000000000000000000000000000000000000002",
        ))
        .unwrap();
        assert_ne!(block.state_root, other.state_root);
        assert_ne!(block.block_hash, other.block_hash);
    }

    #[test]
    fn prague_activation_shows_up_in_the_block_hash() {
        let block = load(GENESIS_JSON).unwrap();
        let prague = load(&GENESIS_JSON.replace(
            r#""cancunTime": 0,"#,
            r#""cancunTime": 0, "pragueTime": 0,"#,
        ))
        .unwrap();
        // The requests hash only lands in the header, so the state root is
        // unchanged while the block hash moves.
        assert_eq!(block.state_root, prague.state_root);
        assert_ne!(block.block_hash, prague.block_hash);
    }

    #[test]
    fn pre_cancun_config_is_rejected() {
        let err = load(&GENESIS_JSON.replace(r#""cancunTime": 0,"#, ""))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Cancun"), "{err}");
    }
}
