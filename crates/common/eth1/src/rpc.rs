use alloy_primitives::U64;
use alloy_rpc_types_eth::Block;
use anyhow::{Context, bail};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::block::CanonicalBlock;

#[derive(serde::Serialize)]
struct JsonRpcRequest {
    id: i32,
    jsonrpc: String,
    method: String,
    params: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRpcResponse<T> {
    Result { result: T },
    Error(Value),
}

impl<T> JsonRpcResponse<T> {
    fn to_result(self) -> anyhow::Result<T> {
        match self {
            JsonRpcResponse::Result { result } => Ok(result),
            JsonRpcResponse::Error(err) => bail!("eth1 endpoint returned an error: {err:?}"),
        }
    }
}

/// Plain (unauthenticated) eth namespace client, enough to pull one block.
#[derive(Clone)]
pub struct Eth1Client {
    http_client: Client,
    rpc_url: Url,
}

impl Eth1Client {
    pub fn new(rpc_url: Url) -> Self {
        Eth1Client {
            http_client: Client::new(),
            rpc_url,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> anyhow::Result<T> {
        let request_body = JsonRpcRequest {
            id: 1,
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        };

        self.http_client
            .post(self.rpc_url.clone())
            .json(&request_body)
            .send()
            .await
            .with_context(|| format!("Failed to reach eth1 endpoint {}", self.rpc_url))?
            .json::<JsonRpcResponse<T>>()
            .await
            .with_context(|| format!("Invalid JSON-RPC response for {method}"))?
            .to_result()
    }

    pub async fn eth_block_number(&self) -> anyhow::Result<u64> {
        let number: U64 = self.call("eth_blockNumber", vec![]).await?;
        Ok(number.to::<u64>())
    }

    pub async fn eth_get_block_by_number(&self, number: u64) -> anyhow::Result<Block> {
        let block: Option<Block> = self
            .call(
                "eth_getBlockByNumber",
                vec![json!(format!("0x{number:x}")), json!(true)],
            )
            .await?;
        block.with_context(|| format!("eth1 endpoint has no block {number}"))
    }

    /// Fetch the endpoint's latest block, with full transaction bodies.
    pub async fn fetch_latest_block(&self) -> anyhow::Result<CanonicalBlock> {
        let number = self.eth_block_number().await?;
        let block = self.eth_get_block_by_number(number).await?;
        CanonicalBlock::from_rpc_block(block)
    }
}
