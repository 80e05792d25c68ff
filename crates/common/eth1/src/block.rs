use alloy_eips::{eip2718::Encodable2718, eip4895::Withdrawal};
use alloy_primitives::{Address, B256, Bloom, Bytes, U256};
use alloy_rpc_types_eth::{Block, BlockTransactions};
use anyhow::{bail, ensure};

/// Normalized execution-layer block record every eth1 source converges on.
///
/// Built once per run and read-only afterwards; the genesis pipeline derives
/// the execution payload header from this and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBlock {
    pub parent_hash: B256,
    pub fee_recipient: Address,
    pub state_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    /// Pre-merge blocks carry difficulty instead of a randao mix; the
    /// genesis state reinterprets it as 32 big-endian bytes.
    pub prev_randao: B256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub base_fee_per_gas: U256,
    pub block_hash: B256,
    /// `None` when the block predates withdrawals, `Some` (possibly empty)
    /// when it declares a withdrawals list.
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// EIP-2718 opaque transaction encodings, in block order.
    pub transactions: Vec<Bytes>,
    pub blob_gas_used: u64,
    pub excess_blob_gas: u64,
}

impl CanonicalBlock {
    /// Normalize an RPC block (live fetch or captured response).
    pub fn from_rpc_block(block: Block) -> anyhow::Result<Self> {
        let Some(blob_gas_used) = block.header.blob_gas_used else {
            bail!("eth1 block {} has no blobGasUsed field", block.header.hash);
        };
        let Some(excess_blob_gas) = block.header.excess_blob_gas else {
            bail!(
                "eth1 block {} has no excessBlobGas field",
                block.header.hash
            );
        };

        let transactions = match &block.transactions {
            BlockTransactions::Full(transactions) => transactions
                .iter()
                .map(|transaction| Bytes::from(transaction.inner.inner().encoded_2718()))
                .collect(),
            BlockTransactions::Hashes(hashes) => {
                ensure!(
                    hashes.is_empty(),
                    "eth1 block {} was fetched without full transaction bodies",
                    block.header.hash
                );
                vec![]
            }
            BlockTransactions::Uncle => {
                bail!("eth1 block {} is an uncle block", block.header.hash)
            }
        };

        Ok(CanonicalBlock {
            parent_hash: block.header.parent_hash,
            fee_recipient: block.header.beneficiary,
            state_root: block.header.state_root,
            receipts_root: block.header.receipts_root,
            logs_bloom: block.header.logs_bloom,
            prev_randao: B256::from(block.header.difficulty.to_be_bytes::<32>()),
            block_number: block.header.number,
            gas_limit: block.header.gas_limit,
            gas_used: block.header.gas_used,
            timestamp: block.header.timestamp,
            extra_data: block.header.extra_data.clone(),
            base_fee_per_gas: U256::from(block.header.base_fee_per_gas.unwrap_or_default()),
            block_hash: block.header.hash,
            withdrawals: block
                .withdrawals
                .as_ref()
                .map(|withdrawals| withdrawals.to_vec()),
            transactions,
            blob_gas_used,
            excess_blob_gas,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_consensus::Header;

    use super::*;

    fn rpc_block(header: Header) -> Block {
        Block {
            header: alloy_rpc_types_eth::Header {
                hash: header.hash_slow(),
                inner: header,
                total_difficulty: None,
                size: None,
            },
            uncles: vec![],
            transactions: BlockTransactions::Full(vec![]),
            withdrawals: None,
        }
    }

    fn cancun_header() -> Header {
        Header {
            blob_gas_used: Some(0),
            excess_blob_gas: Some(0),
            ..Header::default()
        }
    }

    #[test]
    fn missing_blob_gas_fields_are_fatal() {
        let err = CanonicalBlock::from_rpc_block(rpc_block(Header::default())).unwrap_err();
        assert!(err.to_string().contains("blobGasUsed"));

        let header = Header {
            blob_gas_used: Some(0),
            ..Header::default()
        };
        let err = CanonicalBlock::from_rpc_block(rpc_block(header)).unwrap_err();
        assert!(err.to_string().contains("excessBlobGas"));
    }

    #[test]
    fn difficulty_becomes_the_randao_mix() {
        let header = Header {
            difficulty: U256::from(0xdeadbeefu64),
            ..cancun_header()
        };
        let block = CanonicalBlock::from_rpc_block(rpc_block(header)).unwrap();
        assert_eq!(&block.prev_randao[28..], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&block.prev_randao[..28], &[0u8; 28]);
    }

    #[test]
    fn absent_withdrawals_stay_absent() {
        let block = CanonicalBlock::from_rpc_block(rpc_block(cancun_header())).unwrap();
        assert_eq!(block.withdrawals, None);
    }
}
