use std::{fs, path::Path};

use alloy_rpc_types_eth::Block;
use anyhow::Context;
use serde::Deserialize;

use crate::block::CanonicalBlock;

/// A captured eth1 block file: either a raw `eth_getBlockByNumber` response
/// with the block under `result`, or the block object itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum CapturedBlock {
    Response { result: Block },
    Bare(Block),
}

pub fn load_block_file(path: &Path) -> anyhow::Result<CanonicalBlock> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read eth1 block file {}", path.display()))?;
    let captured: CapturedBlock = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse eth1 block file {}", path.display()))?;
    let block = match captured {
        CapturedBlock::Response { result } => result,
        CapturedBlock::Bare(block) => block,
    };
    CanonicalBlock::from_rpc_block(block)
        .with_context(|| format!("Invalid eth1 block in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use alloy_primitives::b256;

    use super::*;

    const BLOCK_JSON: &str = r#"{
        "hash": "0x63d5a7a8f0e163eb6ff5cd7e93cc66c5f1a543dcdbba80faeb63badd0e2ed528",
        "parentHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
        "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        "miner": "0x0000000000000000000000000000000000000000",
        "stateRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "logsBloom": "0x00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
        "difficulty": "0x0",
        "number": "0x0",
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": "0x659b9720",
        "extraData": "0x",
        "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x3b9aca00",
        "blobGasUsed": "0x0",
        "excessBlobGas": "0x0",
        "transactions": [],
        "uncles": []
    }"#;

    #[test]
    fn loads_a_bare_block_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BLOCK_JSON.as_bytes()).unwrap();

        let block = load_block_file(file.path()).unwrap();
        assert_eq!(block.block_number, 0);
        assert_eq!(block.timestamp, 0x659b9720);
        assert_eq!(
            block.block_hash,
            b256!("0x63d5a7a8f0e163eb6ff5cd7e93cc66c5f1a543dcdbba80faeb63badd0e2ed528")
        );
    }

    #[test]
    fn loads_a_json_rpc_response_capture() {
        let wrapped = format!(r#"{{"jsonrpc":"2.0","id":1,"result":{BLOCK_JSON}}}"#);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(wrapped.as_bytes()).unwrap();

        let block = load_block_file(file.path()).unwrap();
        assert_eq!(block.gas_limit, 0x1c9c380);
    }

    #[test]
    fn rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json at all").unwrap();
        assert!(load_block_file(file.path()).is_err());
    }
}
