// src/source.rs
use std::sync::Arc;

use eyre::Result;
use futures_util::future::BoxFuture;

use crate::models::RawTxRecord;

/// Block window to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRange {
    /// The most recent `blocks` blocks ending at the chain head.
    Latest { blocks: u64 },
    /// Inclusive explicit range.
    Blocks { from: u64, to: u64 },
}

impl ScanRange {
    /// Resolve against a known chain head.
    pub fn resolve(self, latest: u64) -> (u64, u64) {
        match self {
            ScanRange::Latest { blocks } => (latest.saturating_sub(blocks), latest),
            ScanRange::Blocks { from, to } => (from.min(to), from.max(to)),
        }
    }

    /// Number of blocks behind the upper end of the window.
    pub fn depth(self) -> u64 {
        match self {
            ScanRange::Latest { blocks } => blocks,
            ScanRange::Blocks { from, to } => from.abs_diff(to),
        }
    }
}

/// Anything that can produce raw transaction records for an address.
pub trait RecordSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch<'a>(
        &'a self,
        address: &'a str,
        range: ScanRange,
    ) -> BoxFuture<'a, Result<Vec<RawTxRecord>>>;
}

/// The configured sources. The indexing API is optional; the node RPC
/// scanner is always available.
#[derive(Clone)]
pub struct SourceSet {
    pub explorer: Option<Arc<dyn RecordSource>>,
    pub rpc: Arc<dyn RecordSource>,
}

impl SourceSet {
    pub fn new(explorer: Option<Arc<dyn RecordSource>>, rpc: Arc<dyn RecordSource>) -> Self {
        Self { explorer, rpc }
    }

    /// Explorer when it is preferred and configured, RPC scan otherwise.
    pub fn select(&self, prefer_explorer: bool) -> Arc<dyn RecordSource> {
        match (&self.explorer, prefer_explorer) {
            (Some(explorer), true) => Arc::clone(explorer),
            _ => Arc::clone(&self.rpc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl RecordSource for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn fetch<'a>(
            &'a self,
            _address: &'a str,
            _range: ScanRange,
        ) -> BoxFuture<'a, Result<Vec<RawTxRecord>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[test]
    fn latest_range_saturates_at_genesis() {
        assert_eq!(ScanRange::Latest { blocks: 500 }.resolve(1_000), (500, 1_000));
        assert_eq!(ScanRange::Latest { blocks: 500 }.resolve(100), (0, 100));
        assert_eq!(ScanRange::Blocks { from: 9, to: 3 }.resolve(1_000), (3, 9));
    }

    #[test]
    fn depth_matches_the_resolved_window() {
        assert_eq!(ScanRange::Latest { blocks: 500 }.depth(), 500);
        assert_eq!(ScanRange::Blocks { from: 9, to: 3 }.depth(), 6);
        assert_eq!(ScanRange::Blocks { from: 0, to: u64::MAX }.depth(), u64::MAX);
    }

    #[test]
    fn explorer_is_used_only_when_configured_and_preferred() {
        let rpc: Arc<dyn RecordSource> = Arc::new(Named("rpc"));
        let explorer: Arc<dyn RecordSource> = Arc::new(Named("explorer"));

        let with_explorer = SourceSet::new(Some(explorer), Arc::clone(&rpc));
        assert_eq!(with_explorer.select(true).name(), "explorer");
        assert_eq!(with_explorer.select(false).name(), "rpc");

        let rpc_only = SourceSet::new(None, rpc);
        assert_eq!(rpc_only.select(true).name(), "rpc");
    }
}
