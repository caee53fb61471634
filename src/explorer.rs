// src/explorer.rs
use std::time::Duration;

use eyre::{eyre, Result};
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::RawTxRecord;
use crate::source::{RecordSource, ScanRange};

/// Upper bound the Etherscan-style API accepts for "up to the head".
const OPEN_END_BLOCK: u64 = 99_999_999;

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    message: String,
    result: Value,
}

/// Client for an Etherscan-compatible `account/txlist` endpoint (Seiscan).
pub struct ExplorerClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub async fn get_txlist(&self, address: &str, range: ScanRange) -> Result<Vec<RawTxRecord>> {
        let (start, end) = match range {
            ScanRange::Latest { .. } => (0, OPEN_END_BLOCK),
            ScanRange::Blocks { .. } => range.resolve(OPEN_END_BLOCK),
        };

        let mut query = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("startblock", start.to_string()),
            ("endblock", end.to_string()),
            ("sort", "asc".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        info!("📡 Sending txlist → {} (address {}, blocks {} → {})", self.base_url, address, start, end);

        let resp = self.client.get(&self.base_url).query(&query).send().await?;
        if !resp.status().is_success() {
            return Err(eyre!("Explorer error: HTTP {}", resp.status()));
        }
        let text = resp.text().await?;
        parse_txlist(&text)
    }
}

impl RecordSource for ExplorerClient {
    fn name(&self) -> &'static str {
        "explorer"
    }

    fn fetch<'a>(
        &'a self,
        address: &'a str,
        range: ScanRange,
    ) -> BoxFuture<'a, Result<Vec<RawTxRecord>>> {
        Box::pin(self.get_txlist(address, range))
    }
}

/// Decode a txlist body. `status == "0"` with "No transactions found" is an
/// empty history, not a failure.
pub fn parse_txlist(body: &str) -> Result<Vec<RawTxRecord>> {
    let parsed: TxListResponse = serde_json::from_str(body)?;

    match (parsed.status.as_str(), parsed.result) {
        ("1", Value::Array(items)) => {
            let total = items.len();
            let records: Vec<RawTxRecord> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(RawTxRecord(map)),
                    _ => None,
                })
                .collect();
            if records.len() != total {
                warn!("Dropped {} non-object entries from txlist", total - records.len());
            }
            info!("📩 txlist returned {} records", records.len());
            Ok(records)
        }
        ("0", _) if parsed.message.starts_with("No transactions found") => Ok(Vec::new()),
        ("0", Value::Array(items)) if items.is_empty() => Ok(Vec::new()),
        (_, Value::String(detail)) => Err(eyre!("Explorer error: {} ({})", parsed.message, detail)),
        (status, _) => Err(eyre!("Explorer error: status {} ({})", status, parsed.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_body_yields_records() {
        let body = r#"{"status":"1","message":"OK","result":[
            {"hash":"0x1","from":"0xa","to":"0xb","value":"10","blockNumber":"5","timeStamp":"1700000000"},
            {"hash":"0x2","from":"0xb","to":"0xa","value":"3","blockNumber":"6","timeStamp":"1700000100"}
        ]}"#;
        let records = parse_txlist(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text("hash").as_deref(), Some("0x2"));
    }

    #[test]
    fn no_transactions_is_empty() {
        let body = r#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(parse_txlist(body).unwrap().is_empty());
    }

    #[test]
    fn api_errors_surface_their_message() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let err = parse_txlist(body).unwrap_err().to_string();
        assert!(err.contains("Invalid API Key"), "{err}");
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_txlist("<html>gateway timeout</html>").is_err());
    }
}
