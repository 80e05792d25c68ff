use alloy_primitives::B256;
use anyhow::{anyhow, ensure};
use cinder_consensus::{
    bellatrix::{
        self,
        execution_payload::{Transaction, Transactions},
    },
    capella,
    constants::MAX_EXTRA_DATA_BYTES,
    deneb,
    withdrawal::Withdrawal,
};
use cinder_eth1::CanonicalBlock;
use ssz_types::{
    FixedVector, VariableList,
    typenum::{U16, U32},
};
use tree_hash::TreeHash;

fn extra_data(block: &CanonicalBlock) -> anyhow::Result<VariableList<u8, U32>> {
    ensure!(
        block.extra_data.len() <= MAX_EXTRA_DATA_BYTES,
        "eth1 block {} has {} bytes of extra data, the maximum is {MAX_EXTRA_DATA_BYTES}",
        block.block_hash,
        block.extra_data.len(),
    );
    VariableList::new(block.extra_data.to_vec())
        .map_err(|err| anyhow!("Invalid extra data: {err:?}"))
}

/// Hash tree root of the block's opaque transaction list.
///
/// A block without transactions commits to the root of the empty list, which
/// is a well-defined non-zero value.
pub fn transactions_root(block: &CanonicalBlock) -> anyhow::Result<B256> {
    let transactions = block
        .transactions
        .iter()
        .map(|transaction| {
            Transaction::new(transaction.to_vec())
                .map_err(|err| anyhow!("Oversized transaction in eth1 block: {err:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let transactions: Transactions = VariableList::new(transactions)
        .map_err(|err| anyhow!("Too many transactions in eth1 block: {err:?}"))?;
    Ok(transactions.tree_hash_root())
}

/// Hash tree root of the block's withdrawals.
///
/// A block that declares a withdrawals list (even an empty one) commits to
/// the list's root; a block that predates withdrawals commits to zero.
pub fn withdrawals_root(block: &CanonicalBlock) -> anyhow::Result<B256> {
    let Some(block_withdrawals) = &block.withdrawals else {
        return Ok(B256::ZERO);
    };
    let withdrawals = block_withdrawals
        .iter()
        .map(|withdrawal| Withdrawal {
            index: withdrawal.index,
            validator_index: withdrawal.validator_index,
            address: withdrawal.address,
            amount: withdrawal.amount,
        })
        .collect::<Vec<_>>();
    let withdrawals: VariableList<Withdrawal, U16> = VariableList::new(withdrawals)
        .map_err(|err| anyhow!("Too many withdrawals in eth1 block: {err:?}"))?;
    Ok(withdrawals.tree_hash_root())
}

pub fn bellatrix_header(
    block: &CanonicalBlock,
) -> anyhow::Result<bellatrix::ExecutionPayloadHeader> {
    Ok(bellatrix::ExecutionPayloadHeader {
        parent_hash: block.parent_hash,
        fee_recipient: block.fee_recipient,
        state_root: block.state_root,
        receipts_root: block.receipts_root,
        logs_bloom: FixedVector::from(block.logs_bloom.as_slice().to_vec()),
        prev_randao: block.prev_randao,
        block_number: block.block_number,
        gas_limit: block.gas_limit,
        gas_used: block.gas_used,
        timestamp: block.timestamp,
        extra_data: extra_data(block)?,
        base_fee_per_gas: block.base_fee_per_gas,
        block_hash: block.block_hash,
        transactions_root: transactions_root(block)?,
    })
}

pub fn capella_header(block: &CanonicalBlock) -> anyhow::Result<capella::ExecutionPayloadHeader> {
    let header = bellatrix_header(block)?;
    Ok(capella::ExecutionPayloadHeader {
        parent_hash: header.parent_hash,
        fee_recipient: header.fee_recipient,
        state_root: header.state_root,
        receipts_root: header.receipts_root,
        logs_bloom: header.logs_bloom,
        prev_randao: header.prev_randao,
        block_number: header.block_number,
        gas_limit: header.gas_limit,
        gas_used: header.gas_used,
        timestamp: header.timestamp,
        extra_data: header.extra_data,
        base_fee_per_gas: header.base_fee_per_gas,
        block_hash: header.block_hash,
        transactions_root: header.transactions_root,
        withdrawals_root: withdrawals_root(block)?,
    })
}

pub fn deneb_header(block: &CanonicalBlock) -> anyhow::Result<deneb::ExecutionPayloadHeader> {
    let header = capella_header(block)?;
    Ok(deneb::ExecutionPayloadHeader {
        parent_hash: header.parent_hash,
        fee_recipient: header.fee_recipient,
        state_root: header.state_root,
        receipts_root: header.receipts_root,
        logs_bloom: header.logs_bloom,
        prev_randao: header.prev_randao,
        block_number: header.block_number,
        gas_limit: header.gas_limit,
        gas_used: header.gas_used,
        timestamp: header.timestamp,
        extra_data: header.extra_data,
        base_fee_per_gas: header.base_fee_per_gas,
        block_hash: header.block_hash,
        transactions_root: header.transactions_root,
        withdrawals_root: header.withdrawals_root,
        blob_gas_used: block.blob_gas_used,
        excess_blob_gas: block.excess_blob_gas,
    })
}

#[cfg(test)]
mod tests {
    use alloy_eips::eip4895::Withdrawal as Eip4895Withdrawal;
    use alloy_primitives::{Address, Bloom, Bytes, U256, b256};

    use super::*;

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
            withdrawals: None,
            transactions: vec![],
            blob_gas_used: 0,
            excess_blob_gas: 0,
        }
    }

    #[test]
    fn extra_data_at_the_maximum_passes() {
        let mut block = block();
        block.extra_data = Bytes::from(vec![0xaa; MAX_EXTRA_DATA_BYTES]);
        let header = deneb_header(&block).unwrap();
        assert_eq!(header.extra_data.len(), MAX_EXTRA_DATA_BYTES);
    }

    #[test]
    fn extra_data_over_the_maximum_is_fatal() {
        let mut block = block();
        block.extra_data = Bytes::from(vec![0xaa; MAX_EXTRA_DATA_BYTES + 1]);
        let err = deneb_header(&block).unwrap_err().to_string();
        assert!(err.contains("extra data"), "{err}");
    }

    #[test]
    fn empty_transaction_list_root_is_non_zero() {
        let root = transactions_root(&block()).unwrap();
        assert_ne!(root, B256::ZERO);
        // And it matches the SSZ default of the transactions list type.
        assert_eq!(root, Transactions::default().tree_hash_root());
    }

    #[test]
    fn absent_withdrawals_commit_to_zero() {
        assert_eq!(withdrawals_root(&block()).unwrap(), B256::ZERO);
    }

    #[test]
    fn declared_empty_withdrawals_commit_to_the_empty_list() {
        let mut block = block();
        block.withdrawals = Some(vec![]);
        let root = withdrawals_root(&block).unwrap();
        assert_ne!(root, B256::ZERO);
        assert_eq!(
            root,
            VariableList::<Withdrawal, U16>::default().tree_hash_root()
        );
    }

    #[test]
    fn withdrawals_root_merkleizes_the_records() {
        let mut block = block();
        block.withdrawals = Some(
            (0..3)
                .map(|i| Eip4895Withdrawal {
                    index: i,
                    validator_index: i,
                    address: Address::repeat_byte(i as u8),
                    amount: 1_000_000_000 * (i + 1),
                })
                .collect(),
        );
        let root = withdrawals_root(&block).unwrap();

        let expected: VariableList<Withdrawal, U16> = VariableList::new(
            (0..3)
                .map(|i| Withdrawal {
                    index: i,
                    validator_index: i,
                    address: Address::repeat_byte(i as u8),
                    amount: 1_000_000_000 * (i + 1),
                })
                .collect(),
        )
        .unwrap();
        assert_eq!(root, expected.tree_hash_root());
        assert_ne!(root, B256::ZERO);
    }
}
