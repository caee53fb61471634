pub mod aggregator;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod explorer;
pub mod models;
pub mod parser;
pub mod report;
pub mod rpc;
pub mod source;
pub mod tracker;

pub use aggregator::{normalize, normalize_value};
pub use models::{CanonicalTx, Direction, PipelineResult, RawTxRecord};
