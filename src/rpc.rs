// src/rpc.rs
use std::time::Duration;

use eyre::{eyre, Result};
use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::MAX_SCAN_BLOCKS;
use crate::models::RawTxRecord;
use crate::parser;
use crate::source::{RecordSource, ScanRange};

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RpcResponse<T> {
    Success { result: T },
    Error { error: RpcError },
}

/// One entry of a batch reply; replies may arrive in any order.
#[derive(Debug, Deserialize)]
struct BatchReply {
    id: u64,
    #[serde(default)]
    result: Option<Block>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct Block {
    pub number: String,
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<Value>,
}

/// Scans a block range over JSON-RPC for transactions touching an address.
pub struct RpcScanner {
    client: Client,
    rpc_url: String,
}

impl RpcScanner {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Latest block number. One attempt, no retry.
    pub async fn get_block_number(&self) -> Result<u64> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_blockNumber",
            "params": []
        });

        info!("📡 Sending eth_blockNumber → {}", self.rpc_url);

        let resp = self.client.post(&self.rpc_url).json(&payload).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(eyre!("RPC error: HTTP {}", resp.status()));
        }
        let text = resp.text().await?;

        match serde_json::from_str::<RpcResponse<String>>(&text)? {
            RpcResponse::Success { result } => parser::parse_u64(&Value::String(result.clone()))
                .ok_or_else(|| eyre!("RPC returned malformed block number {}", result)),
            RpcResponse::Error { error } => Err(eyre!(
                "eth_blockNumber failed ({}): {}",
                error.code,
                error.message
            )),
        }
    }

    /// Fetch blocks `from..=to` with full transactions in one batch request.
    pub async fn get_blocks(&self, from: u64, to: u64) -> Result<Vec<Block>> {
        let batch: Vec<Value> = (from..=to)
            .map(|n| {
                json!({
                    "jsonrpc": "2.0",
                    "id": n,
                    "method": "eth_getBlockByNumber",
                    "params": [format!("0x{:x}", n), true]
                })
            })
            .collect();

        info!("📡 Sending eth_getBlockByNumber batch → {} (range {} → {})", self.rpc_url, from, to);

        let resp = self.client.post(&self.rpc_url).json(&batch).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(eyre!("RPC error: HTTP {}", resp.status()));
        }
        let text = resp.text().await?;
        let mut replies: Vec<BatchReply> = serde_json::from_str(&text)?;
        replies.sort_by_key(|r| r.id);

        let mut blocks = Vec::with_capacity(replies.len());
        for reply in replies {
            match (reply.result, reply.error) {
                (Some(block), _) => blocks.push(block),
                (None, Some(err)) => warn!("Block {} failed ({}): {}", reply.id, err.code, err.message),
                (None, None) => warn!("Block {} not available", reply.id),
            }
        }
        Ok(blocks)
    }

    pub async fn scan(&self, address: &str, range: ScanRange) -> Result<Vec<RawTxRecord>> {
        if range.depth() > MAX_SCAN_BLOCKS {
            return Err(eyre!(
                "Scan of {} blocks exceeds the limit of {}",
                range.depth(),
                MAX_SCAN_BLOCKS
            ));
        }

        let (from, to) = match range {
            ScanRange::Latest { .. } => range.resolve(self.get_block_number().await?),
            ScanRange::Blocks { .. } => range.resolve(0),
        };

        let blocks = self.get_blocks(from, to).await?;
        let records = extract_records(&blocks, address);
        info!("Scanned {} blocks ({} → {}), {} matching transactions", blocks.len(), from, to, records.len());
        Ok(records)
    }
}

impl RecordSource for RpcScanner {
    fn name(&self) -> &'static str {
        "rpc"
    }

    fn fetch<'a>(
        &'a self,
        address: &'a str,
        range: ScanRange,
    ) -> BoxFuture<'a, Result<Vec<RawTxRecord>>> {
        Box::pin(self.scan(address, range))
    }
}

/// Keep transactions sent from or to `address`, stamped with their block's
/// timestamp. Fields stay in their wire (hex) form.
pub fn extract_records(blocks: &[Block], address: &str) -> Vec<RawTxRecord> {
    let wanted = parser::normalize_address(address);
    let touches = |tx: &Value, key: &str| {
        tx.get(key)
            .and_then(Value::as_str)
            .is_some_and(|a| parser::normalize_address(a) == wanted)
    };

    let mut out = Vec::new();
    for block in blocks {
        for tx in &block.transactions {
            if !(touches(tx, "from") || touches(tx, "to")) {
                continue;
            }
            let mut record = RawTxRecord::new();
            for key in ["hash", "from", "to", "value", "blockNumber"] {
                if let Some(v) = tx.get(key) {
                    record.0.insert(key.to_string(), v.clone());
                }
            }
            if record.field("blockNumber").is_none() {
                record = record.with("blockNumber", block.number.clone());
            }
            out.push(record.with("timestamp", block.timestamp.clone()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(number: &str, timestamp: &str, txs: Value) -> Block {
        serde_json::from_value(json!({
            "number": number,
            "timestamp": timestamp,
            "transactions": txs,
        }))
        .unwrap()
    }

    #[test]
    fn keeps_only_transactions_touching_the_address() {
        let blocks = vec![
            block("0x1", "0x6553f100", json!([
                {"hash": "0xa", "from": "0xAbC", "to": "0x111", "value": "0x1", "blockNumber": "0x1"},
                {"hash": "0xb", "from": "0x222", "to": "0x333", "value": "0x2", "blockNumber": "0x1"},
            ])),
            block("0x2", "0x6553f10c", json!([
                {"hash": "0xc", "from": "0x444", "to": "0xabc", "value": "0x3"},
                {"hash": "0xd", "from": "0x555", "to": null, "value": "0x4"},
            ])),
        ];

        let records = extract_records(&blocks, "0xabc");
        let hashes: Vec<_> = records.iter().filter_map(|r| r.text("hash")).collect();
        assert_eq!(hashes, vec!["0xa", "0xc"]);
        assert_eq!(records[1].text("timestamp").as_deref(), Some("0x6553f10c"));
        assert_eq!(records[1].text("blockNumber").as_deref(), Some("0x2"));
    }

    #[test]
    fn batch_reply_tolerates_errors_and_nulls() {
        let replies: Vec<BatchReply> = serde_json::from_str(
            r#"[
                {"jsonrpc":"2.0","id":2,"result":null},
                {"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"pruned"}},
                {"jsonrpc":"2.0","id":3,"result":{"number":"0x3","timestamp":"0x1","transactions":[]}}
            ]"#,
        )
        .unwrap();
        assert_eq!(replies.len(), 3);
        assert!(replies.iter().any(|r| r.error.is_some()));
        assert_eq!(replies.iter().filter(|r| r.result.is_some()).count(), 1);
    }
}
