// src/models.rs
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Timestamp keys in lookup order: indexing API first, RPC scan second.
pub const TIMESTAMP_FIELDS: [&str; 2] = ["timeStamp", "timestamp"];

/// One transaction record as delivered by a source. Any field may be
/// missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTxRecord(pub Map<String, Value>);

impl RawTxRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, mostly for sources and tests.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// JSON `null` counts as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Field rendered as text; strings as-is, numbers and bools via Display.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.field(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First recognized timestamp field present on the record.
    pub fn timestamp_field(&self) -> Option<&Value> {
        TIMESTAMP_FIELDS.iter().find_map(|key| self.field(key))
    }
}

impl From<Map<String, Value>> for RawTxRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Sign of a transaction relative to the queried address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Incoming => 1,
            Direction::Outgoing => -1,
        }
    }

    pub fn apply(self, value: Decimal) -> Decimal {
        match self {
            Direction::Incoming => value,
            Direction::Outgoing => -value,
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign())
    }
}

/// A normalized transaction with its running balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalTx {
    pub hash: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<u64>,
    pub value: Decimal,
    pub datetime: Option<DateTime<Utc>>,
    pub direction: Direction,
    pub net: Decimal,
    pub cumulative_balance: Decimal,
}

/// A record left out of the canonical sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position in the input list.
    pub index: usize,
    pub hash: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingValue,
    MalformedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub datetime: Option<DateTime<Utc>>,
    pub balance: Decimal,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineResult {
    pub transactions: Vec<CanonicalTx>,
    pub incoming: Decimal,
    pub outgoing: Decimal,
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    pub balance_series: Vec<BalancePoint>,
    pub skipped: Vec<SkippedRecord>,
}

impl PipelineResult {
    /// "No data": nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn final_balance(&self) -> Decimal {
        self.balance_series
            .last()
            .map(|p| p.balance)
            .unwrap_or(Decimal::ZERO)
    }
}
