use dotenvy::dotenv;
use eyre::{eyre, Result};
use std::env;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_RPC_URL: &str = "https://evm-rpc.sei-apis.com";

/// Largest supported token decimals; 10^18 still fits in a u64 divisor.
pub const MAX_VALUE_DECIMALS: u32 = 18;

/// Deepest RPC scan accepted; every block is one entry of a single batch.
pub const MAX_SCAN_BLOCKS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub explorer_url: Option<String>,
    pub explorer_api_key: Option<String>,
    pub scan_blocks: u64,
    pub value_decimals: u32,
    pub http_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_url: None,
            explorer_api_key: None,
            scan_blocks: 500,
            value_decimals: 18,
            http_timeout: Duration::from_secs(15),
            port: 8080,
        }
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok();
    let cfg = from_lookup(|key| env::var(key).ok())?;

    // Keep the API key out of the logs.
    info!(
        "Loaded config: rpc = {}, explorer = {:?}, scan blocks = {}, decimals = {}, port = {}",
        cfg.rpc_url, cfg.explorer_url, cfg.scan_blocks, cfg.value_decimals, cfg.port
    );

    Ok(cfg)
}

/// Build a config from any key lookup; `load` passes the process env.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();
    let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let rpc_url = non_empty("RPC_URL").unwrap_or(defaults.rpc_url);

    // Explorer is optional; without it every fetch goes through the RPC scan.
    let explorer_url = non_empty("SEISCAN_API_URL");
    let explorer_api_key = non_empty("SEISCAN_API_KEY");

    let scan_blocks = parse_or("RPC_SCAN_BLOCKS", non_empty("RPC_SCAN_BLOCKS"), defaults.scan_blocks)?;
    if scan_blocks > MAX_SCAN_BLOCKS {
        return Err(eyre!(
            "RPC_SCAN_BLOCKS must be at most {}, got {}",
            MAX_SCAN_BLOCKS,
            scan_blocks
        ));
    }

    let value_decimals = parse_or("VALUE_DECIMALS", non_empty("VALUE_DECIMALS"), defaults.value_decimals)?;
    if value_decimals > MAX_VALUE_DECIMALS {
        return Err(eyre!(
            "VALUE_DECIMALS must be at most {}, got {}",
            MAX_VALUE_DECIMALS,
            value_decimals
        ));
    }

    let timeout_secs = parse_or(
        "HTTP_TIMEOUT_SECS",
        non_empty("HTTP_TIMEOUT_SECS"),
        defaults.http_timeout.as_secs(),
    )?;

    let port = parse_or("PORT", non_empty("PORT"), defaults.port)?;

    Ok(Config {
        rpc_url,
        explorer_url,
        explorer_api_key,
        scan_blocks,
        value_decimals,
        http_timeout: Duration::from_secs(timeout_secs),
        port,
    })
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| eyre!("{} has an invalid value: {}", key, v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.explorer_url, None);
        assert_eq!(cfg.scan_blocks, 500);
        assert_eq!(cfg.value_decimals, 18);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn reads_overrides() {
        let cfg = from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:8545"),
            ("SEISCAN_API_URL", "https://seiscan.example/api"),
            ("RPC_SCAN_BLOCKS", "50"),
            ("VALUE_DECIMALS", "6"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(cfg.rpc_url, "http://localhost:8545");
        assert_eq!(cfg.explorer_url.as_deref(), Some("https://seiscan.example/api"));
        assert_eq!(cfg.scan_blocks, 50);
        assert_eq!(cfg.value_decimals, 6);
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn blank_explorer_url_means_unset() {
        let cfg = from_lookup(lookup(&[("SEISCAN_API_URL", "  ")])).unwrap();
        assert_eq!(cfg.explorer_url, None);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(from_lookup(lookup(&[("VALUE_DECIMALS", "30")])).is_err());
    }

    #[test]
    fn scan_depth_is_capped() {
        let at_cap = MAX_SCAN_BLOCKS.to_string();
        let cfg = from_lookup(lookup(&[("RPC_SCAN_BLOCKS", at_cap.as_str())])).unwrap();
        assert_eq!(cfg.scan_blocks, MAX_SCAN_BLOCKS);

        let over = (MAX_SCAN_BLOCKS + 1).to_string();
        assert!(from_lookup(lookup(&[("RPC_SCAN_BLOCKS", over.as_str())])).is_err());
    }
}
