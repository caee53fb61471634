// src/aggregator.rs
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::error::PipelineError;
use crate::models::{
    BalancePoint, CanonicalTx, Direction, PipelineResult, RawTxRecord, SkipReason, SkippedRecord,
};
use crate::parser;

/// Classify a record against the queried address (already normalized).
/// Only `to` is consulted, so a self transfer counts as incoming.
pub fn classify(to: Option<&str>, queried: &str) -> Direction {
    match to {
        Some(to) if parser::normalize_address(to) == queried => Direction::Incoming,
        _ => Direction::Outgoing,
    }
}

/// Entry point for untyped input: must be a JSON array of objects.
pub fn normalize_value(
    records: &Value,
    queried_address: &str,
) -> Result<PipelineResult, PipelineError> {
    let items = records
        .as_array()
        .ok_or_else(|| PipelineError::InvalidInput("records must be a list".into()))?;

    let typed = items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(RawTxRecord(map.clone())),
            _ => Err(PipelineError::InvalidInput(format!(
                "record {i} is not a mapping"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    normalize(&typed, queried_address)
}

/// Turn raw records into the ordered canonical sequence, summary totals and
/// derived series. Pure; malformed fields degrade a single record only.
pub fn normalize(
    records: &[RawTxRecord],
    queried_address: &str,
) -> Result<PipelineResult, PipelineError> {
    let queried = parser::normalize_address(queried_address);
    let mut result = PipelineResult::default();

    let mut txs = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        let hash = raw.text("hash");

        let value = match raw.field("value") {
            None => Err(SkipReason::MissingValue),
            Some(v) => parser::parse_value(v).ok_or(SkipReason::MalformedValue),
        };
        let value = match value {
            Ok(v) => v,
            Err(reason) => {
                debug!("Skipping record {} ({:?}): {:?}", index, hash, reason);
                result.skipped.push(SkippedRecord { index, hash, reason });
                continue;
            }
        };

        let to = raw.text("to");
        let direction = classify(to.as_deref(), &queried);

        txs.push(CanonicalTx {
            hash,
            from: raw.text("from"),
            to,
            block_number: raw.field("blockNumber").and_then(parser::parse_u64),
            value,
            datetime: raw.timestamp_field().and_then(parser::parse_timestamp),
            direction,
            net: direction.apply(value),
            cumulative_balance: Decimal::ZERO,
        });
    }

    // Stable: equal datetimes keep input order, nulls go last.
    txs.sort_by_key(|tx| (tx.datetime.is_none(), tx.datetime));

    let mut incoming = Decimal::ZERO;
    let mut outgoing = Decimal::ZERO;
    let mut running = Decimal::ZERO;

    for tx in txs.iter_mut() {
        match tx.direction {
            Direction::Incoming => {
                incoming = incoming.checked_add(tx.value).ok_or(PipelineError::Overflow)?
            }
            Direction::Outgoing => {
                outgoing = outgoing.checked_add(tx.value).ok_or(PipelineError::Overflow)?
            }
        }
        running = running.checked_add(tx.net).ok_or(PipelineError::Overflow)?;
        tx.cumulative_balance = running;

        result.balance_series.push(BalancePoint {
            datetime: tx.datetime,
            balance: running,
        });
        if let Some(dt) = tx.datetime {
            *result.daily_counts.entry(dt.date_naive()).or_insert(0) += 1;
        }
    }

    result.transactions = txs;
    result.incoming = incoming;
    result.outgoing = outgoing;

    debug!(
        "Normalized {} of {} records (in = {}, out = {}, net = {})",
        result.transactions.len(),
        records.len(),
        incoming,
        outgoing,
        running
    );

    Ok(result)
}
