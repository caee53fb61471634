// src/tracker.rs
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::aggregator;
use crate::config::{Config, MAX_SCAN_BLOCKS};
use crate::error::ApiError;
use crate::explorer::ExplorerClient;
use crate::models::PipelineResult;
use crate::rpc::RpcScanner;
use crate::source::{RecordSource, ScanRange, SourceSet};

/// Build the source set from config. The explorer is only wired in when
/// `SEISCAN_API_URL` is set.
pub fn build_sources(cfg: &Config) -> eyre::Result<SourceSet> {
    let rpc: Arc<dyn RecordSource> = Arc::new(RpcScanner::new(&cfg.rpc_url, cfg.http_timeout)?);
    let explorer = match &cfg.explorer_url {
        Some(url) => {
            let client = ExplorerClient::new(url, cfg.explorer_api_key.clone(), cfg.http_timeout)?;
            Some(Arc::new(client) as Arc<dyn RecordSource>)
        }
        None => None,
    };
    Ok(SourceSet::new(explorer, rpc))
}

/// Reject empty or non-EVM addresses before touching the network.
pub fn validate_address(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::MissingAddress);
    }
    Address::from_str(trimmed).map_err(|_| ApiError::InvalidAddress(trimmed.to_string()))?;
    Ok(trimmed.to_string())
}

/// One user-triggered fetch: pick a source, pull raw records once and run
/// the pipeline over them. Returns the name of the source that was used.
pub async fn fetch_and_normalize(
    sources: &SourceSet,
    address: &str,
    prefer_explorer: bool,
    range: ScanRange,
) -> Result<(&'static str, PipelineResult), ApiError> {
    let address = validate_address(address)?;
    if range.depth() > MAX_SCAN_BLOCKS {
        return Err(ApiError::ScanTooDeep {
            requested: range.depth(),
            max: MAX_SCAN_BLOCKS,
        });
    }
    let source = sources.select(prefer_explorer);

    info!("Fetching transactions for {} via {} ({:?})", address, source.name(), range);

    let records = source
        .fetch(&address, range)
        .await
        .map_err(ApiError::Source)?;

    let result = aggregator::normalize(&records, &address)?;

    if result.is_empty() {
        info!("No transactions found for {}", address);
    } else {
        info!(
            "{} transactions for {} (in = {}, out = {})",
            result.transactions.len(),
            address,
            result.incoming,
            result.outgoing
        );
    }
    if !result.skipped.is_empty() {
        warn!("{} records skipped for {}", result.skipped.len(), address);
    }

    Ok((source.name(), result))
}
